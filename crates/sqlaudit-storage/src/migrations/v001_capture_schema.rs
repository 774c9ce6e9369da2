//! v001: capture schema mirroring the audited server's catalog and dynamic views.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS capture_info (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Per-capability export status. A missing row means the signal was exported.
CREATE TABLE IF NOT EXISTS capture_signals (
    signal    TEXT PRIMARY KEY,
    permitted INTEGER NOT NULL DEFAULT 1,
    enabled   INTEGER NOT NULL DEFAULT 1,
    detail    TEXT
);

CREATE TABLE IF NOT EXISTS tables (
    schema_name     TEXT NOT NULL,
    table_name      TEXT NOT NULL,
    row_count       INTEGER NOT NULL DEFAULT 0,
    size_bytes      INTEGER NOT NULL DEFAULT 0,
    storage         TEXT NOT NULL DEFAULT 'heap',
    has_primary_key INTEGER NOT NULL DEFAULT 0,
    trigger_count   INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (schema_name, table_name)
);

CREATE TABLE IF NOT EXISTS columns (
    schema_name    TEXT NOT NULL,
    table_name     TEXT NOT NULL,
    column_name    TEXT NOT NULL,
    data_type      TEXT NOT NULL,
    is_nullable    INTEGER NOT NULL DEFAULT 1,
    ordinal        INTEGER NOT NULL,
    is_primary_key INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (schema_name, table_name, column_name)
);

CREATE TABLE IF NOT EXISTS indexes (
    schema_name          TEXT NOT NULL,
    table_name           TEXT NOT NULL,
    index_name           TEXT NOT NULL,
    index_type           TEXT NOT NULL,
    is_unique            INTEGER NOT NULL DEFAULT 0,
    is_primary_key       INTEGER NOT NULL DEFAULT 0,
    is_unique_constraint INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (schema_name, table_name, index_name)
);

CREATE TABLE IF NOT EXISTS index_columns (
    schema_name TEXT NOT NULL,
    table_name  TEXT NOT NULL,
    index_name  TEXT NOT NULL,
    column_name TEXT NOT NULL,
    key_ordinal INTEGER NOT NULL DEFAULT 0,
    is_included INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS statistics (
    schema_name          TEXT NOT NULL,
    table_name           TEXT NOT NULL,
    stats_name           TEXT NOT NULL,
    rows                 INTEGER NOT NULL DEFAULT 0,
    modification_counter INTEGER NOT NULL DEFAULT 0,
    last_updated         INTEGER
);

CREATE TABLE IF NOT EXISTS index_usage (
    schema_name  TEXT NOT NULL,
    table_name   TEXT NOT NULL,
    index_name   TEXT NOT NULL,
    user_seeks   INTEGER NOT NULL DEFAULT 0,
    user_scans   INTEGER NOT NULL DEFAULT 0,
    user_lookups INTEGER NOT NULL DEFAULT 0,
    user_updates INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS index_physical (
    schema_name               TEXT NOT NULL,
    table_name                TEXT NOT NULL,
    index_name                TEXT NOT NULL,
    avg_fragmentation_percent REAL NOT NULL DEFAULT 0,
    page_count                INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS missing_indexes (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    statement          TEXT NOT NULL,
    equality_columns   TEXT,
    inequality_columns TEXT,
    included_columns   TEXT,
    avg_user_impact    REAL NOT NULL DEFAULT 0,
    user_seeks         INTEGER NOT NULL DEFAULT 0,
    user_scans         INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS query_stats (
    query_id          TEXT NOT NULL,
    avg_cpu_ms        REAL NOT NULL DEFAULT 0,
    avg_logical_reads REAL NOT NULL DEFAULT 0,
    avg_duration_ms   REAL NOT NULL DEFAULT 0,
    execution_count   INTEGER NOT NULL DEFAULT 0,
    query_text        TEXT,
    plan_ref          TEXT
);

CREATE TABLE IF NOT EXISTS query_store (
    query_id          TEXT NOT NULL,
    avg_cpu_ms        REAL NOT NULL DEFAULT 0,
    avg_logical_reads REAL NOT NULL DEFAULT 0,
    avg_duration_ms   REAL NOT NULL DEFAULT 0,
    execution_count   INTEGER NOT NULL DEFAULT 0,
    query_text        TEXT,
    plan_ref          TEXT
);

CREATE TABLE IF NOT EXISTS wait_stats (
    wait_type           TEXT PRIMARY KEY,
    wait_time_ms        INTEGER NOT NULL DEFAULT 0,
    signal_wait_time_ms INTEGER NOT NULL DEFAULT 0,
    waiting_tasks_count INTEGER NOT NULL DEFAULT 0
);
";
