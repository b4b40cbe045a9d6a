pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS app_preferences (
    package_id TEXT PRIMARY KEY,
    category TEXT,
    hidden INTEGER NOT NULL DEFAULT 0,
    locked INTEGER NOT NULL DEFAULT 0,
    pinned INTEGER NOT NULL DEFAULT 0,
    force_color INTEGER NOT NULL DEFAULT 0,
    updated_at INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS usage_events (
    id INTEGER PRIMARY KEY,
    package_id TEXT NOT NULL,
    started_at_ms INTEGER NOT NULL,
    duration_ms INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_usage_events_started ON usage_events(started_at_ms);
CREATE INDEX IF NOT EXISTS idx_usage_events_package ON usage_events(package_id);
"#;
