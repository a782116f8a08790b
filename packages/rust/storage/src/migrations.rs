//! SQL migration definitions for the counterclaim database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed within a transaction.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: articles, spoofs",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Fact-check articles, immutable once inserted
CREATE TABLE IF NOT EXISTS articles (
    slug       TEXT PRIMARY KEY,
    title      TEXT NOT NULL,
    subtitle   TEXT NOT NULL,
    date       TEXT NOT NULL,
    question   TEXT NOT NULL,
    rating     TEXT NOT NULL,
    context    TEXT,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_date ON articles(date);

-- Generated counter-articles. Only the fields that differ from the
-- article are stored; reads join back to articles for the rest.
CREATE TABLE IF NOT EXISTS spoofs (
    slug       TEXT PRIMARY KEY REFERENCES articles(slug) ON DELETE CASCADE,
    rating     TEXT NOT NULL,
    content    TEXT NOT NULL,
    published  INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_spoofs_published ON spoofs(published);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
