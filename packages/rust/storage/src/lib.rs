//! libSQL record store (offline mode).
//!
//! The [`RecordStore`] trait is the capability interface the pipeline
//! consumes; [`LibsqlStore`] is its durable implementation. Articles are
//! immutable rows keyed by slug; spoofs store only the fields that differ
//! from their article (rating, content) plus the `published` bookkeeping
//! flag, and reads join back to `articles` for the shared fields.

mod migrations;

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use libsql::{Connection, Database, params};

use counterclaim_shared::{Article, Claim, CounterclaimError, Result, Spoof, SpoofStub};

/// Capability interface for the record store.
///
/// Only the ingestion and reconciliation stages mutate the `published`
/// flag; the store itself never flips it.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a scraped article. Fails if the slug already exists.
    async fn save_article(&self, article: &Article) -> Result<()>;

    /// Whether an article with this slug has been recorded.
    async fn has_article(&self, slug: &str) -> Result<bool>;

    /// Every article slug ever recorded. This is the known-set the diff
    /// engine excludes against.
    async fn article_slugs(&self) -> Result<HashSet<String>>;

    /// Persist a spoof for an existing article.
    async fn save_spoof(&self, spoof: &Spoof) -> Result<()>;

    /// Fetch a spoof by slug, joined with its article.
    async fn get_spoof(&self, slug: &str) -> Result<Option<Spoof>>;

    /// Every spoof slug ever recorded, the universe drift detection walks.
    async fn spoof_slugs(&self) -> Result<Vec<String>>;

    /// All spoofs currently bookkept as unpublished.
    async fn unpublished_spoofs(&self) -> Result<Vec<Spoof>>;

    /// Flip the published flag for a spoof.
    async fn set_published(&self, slug: &str, published: bool) -> Result<()>;

    /// The most recent spoofs, newest-first, for the index artifact.
    async fn latest_stubs(&self, limit: u32) -> Result<Vec<SpoofStub>>;
}

/// Durable [`RecordStore`] backed by a local libSQL database.
pub struct LibsqlStore {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl LibsqlStore {
    /// Open or create a database at `path` and apply pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CounterclaimError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;

        let store = Self { db, conn };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    CounterclaimError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }
}

#[async_trait]
impl RecordStore for LibsqlStore {
    async fn save_article(&self, article: &Article) -> Result<()> {
        let content = serde_json::to_string(&article.content)
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO articles (slug, title, subtitle, date, question, rating, context, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    article.slug.as_str(),
                    article.title.as_str(),
                    article.subtitle.as_str(),
                    article.date.to_string(),
                    article.claim.question.as_str(),
                    article.claim.rating.as_str(),
                    article.claim.context.as_deref(),
                    content.as_str(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn has_article(&self, slug: &str) -> Result<bool> {
        let mut rows = self
            .conn
            .query(
                "SELECT EXISTS(SELECT 1 FROM articles WHERE slug = ?1)",
                params![slug],
            )
            .await
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row
                .get::<i64>(0)
                .map_err(|e| CounterclaimError::Storage(e.to_string()))?
                != 0),
            Ok(None) => Ok(false),
            Err(e) => Err(CounterclaimError::Storage(e.to_string())),
        }
    }

    async fn article_slugs(&self) -> Result<HashSet<String>> {
        let mut rows = self
            .conn
            .query("SELECT slug FROM articles", params![])
            .await
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;

        let mut slugs = HashSet::new();
        while let Ok(Some(row)) = rows.next().await {
            slugs.insert(
                row.get::<String>(0)
                    .map_err(|e| CounterclaimError::Storage(e.to_string()))?,
            );
        }
        Ok(slugs)
    }

    async fn save_spoof(&self, spoof: &Spoof) -> Result<()> {
        let content = serde_json::to_string(&spoof.content)
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO spoofs (slug, rating, content, published, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    spoof.slug.as_str(),
                    spoof.claim.rating.as_str(),
                    content.as_str(),
                    spoof.published as i64,
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_spoof(&self, slug: &str) -> Result<Option<Spoof>> {
        let mut rows = self
            .conn
            .query(
                "SELECT
                    spoofs.slug,
                    articles.title,
                    articles.subtitle,
                    articles.date,
                    articles.question,
                    spoofs.rating,
                    articles.context,
                    spoofs.content,
                    spoofs.published
                 FROM spoofs
                 JOIN articles ON articles.slug = spoofs.slug
                 WHERE spoofs.slug = ?1",
                params![slug],
            )
            .await
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_spoof(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(CounterclaimError::Storage(e.to_string())),
        }
    }

    async fn spoof_slugs(&self) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query("SELECT slug FROM spoofs ORDER BY slug", params![])
            .await
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;

        let mut slugs = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            slugs.push(
                row.get::<String>(0)
                    .map_err(|e| CounterclaimError::Storage(e.to_string()))?,
            );
        }
        Ok(slugs)
    }

    async fn unpublished_spoofs(&self) -> Result<Vec<Spoof>> {
        let mut rows = self
            .conn
            .query(
                "SELECT
                    spoofs.slug,
                    articles.title,
                    articles.subtitle,
                    articles.date,
                    articles.question,
                    spoofs.rating,
                    articles.context,
                    spoofs.content,
                    spoofs.published
                 FROM spoofs
                 JOIN articles ON articles.slug = spoofs.slug
                 WHERE spoofs.published = 0
                 ORDER BY articles.date DESC",
                params![],
            )
            .await
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;

        let mut spoofs = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            spoofs.push(row_to_spoof(&row)?);
        }
        Ok(spoofs)
    }

    async fn set_published(&self, slug: &str, published: bool) -> Result<()> {
        let affected = self
            .conn
            .execute(
                "UPDATE spoofs SET published = ?2 WHERE slug = ?1",
                params![slug, published as i64],
            )
            .await
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(CounterclaimError::Storage(format!(
                "no spoof with slug {slug}"
            )));
        }
        Ok(())
    }

    async fn latest_stubs(&self, limit: u32) -> Result<Vec<SpoofStub>> {
        let mut rows = self
            .conn
            .query(
                "SELECT
                    spoofs.slug,
                    articles.title,
                    articles.subtitle,
                    articles.date
                 FROM spoofs
                 JOIN articles ON articles.slug = spoofs.slug
                 ORDER BY articles.date DESC
                 LIMIT ?1",
                params![limit as i64],
            )
            .await
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?;

        let mut stubs = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            stubs.push(SpoofStub {
                slug: row
                    .get::<String>(0)
                    .map_err(|e| CounterclaimError::Storage(e.to_string()))?,
                title: row
                    .get::<String>(1)
                    .map_err(|e| CounterclaimError::Storage(e.to_string()))?,
                subtitle: row
                    .get::<String>(2)
                    .map_err(|e| CounterclaimError::Storage(e.to_string()))?,
                date: parse_date(
                    &row.get::<String>(3)
                        .map_err(|e| CounterclaimError::Storage(e.to_string()))?,
                )?,
            });
        }
        Ok(stubs)
    }
}

/// Convert a joined spoofs/articles row to a [`Spoof`].
fn row_to_spoof(row: &libsql::Row) -> Result<Spoof> {
    let rating_str: String = row
        .get(5)
        .map_err(|e| CounterclaimError::Storage(e.to_string()))?;
    let content_json: String = row
        .get(7)
        .map_err(|e| CounterclaimError::Storage(e.to_string()))?;
    let content: Vec<String> = serde_json::from_str(&content_json)
        .map_err(|e| CounterclaimError::Storage(format!("invalid content column: {e}")))?;

    Ok(Spoof {
        slug: row
            .get::<String>(0)
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?,
        title: row
            .get::<String>(1)
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?,
        subtitle: row
            .get::<String>(2)
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?,
        date: parse_date(
            &row.get::<String>(3)
                .map_err(|e| CounterclaimError::Storage(e.to_string()))?,
        )?,
        claim: Claim {
            question: row
                .get::<String>(4)
                .map_err(|e| CounterclaimError::Storage(e.to_string()))?,
            rating: rating_str
                .parse()
                .map_err(|_| CounterclaimError::Storage(format!("invalid rating column: {rating_str}")))?,
            context: row.get::<String>(6).ok(),
        },
        content,
        published: row
            .get::<i64>(8)
            .map_err(|e| CounterclaimError::Storage(e.to_string()))?
            != 0,
    })
}

/// Parse an ISO date column.
fn parse_date(s: &str) -> Result<NaiveDate> {
    s.parse::<NaiveDate>()
        .map_err(|e| CounterclaimError::Storage(format!("invalid date column: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use counterclaim_shared::Rating;
    use uuid::Uuid;

    /// Create a temp file store for testing.
    async fn test_store() -> LibsqlStore {
        let tmp = std::env::temp_dir().join(format!("cc_test_{}.db", Uuid::now_v7()));
        LibsqlStore::open(&tmp).await.expect("open test db")
    }

    fn sample_article(slug: &str, day: u32) -> Article {
        Article {
            slug: slug.into(),
            title: format!("Title for {slug}"),
            subtitle: format!("Subtitle for {slug}"),
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            claim: Claim {
                question: format!("Is {slug} real?"),
                rating: Rating::False,
                context: Some("Seen in viral posts.".into()),
            },
            content: vec!["First paragraph.".into(), "Second paragraph.".into()],
        }
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let store = test_store().await;
        assert_eq!(store.schema_version().await, 1);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("cc_test_{}.db", Uuid::now_v7()));
        let s1 = LibsqlStore::open(&tmp).await.expect("first open");
        drop(s1);
        let s2 = LibsqlStore::open(&tmp).await.expect("second open");
        assert_eq!(s2.schema_version().await, 1);
    }

    #[tokio::test]
    async fn article_save_and_existence() {
        let store = test_store().await;
        let article = sample_article("moon-cheese", 1);

        assert!(!store.has_article("moon-cheese").await.unwrap());
        store.save_article(&article).await.expect("save article");
        assert!(store.has_article("moon-cheese").await.unwrap());

        // Articles are immutable: a second insert with the same slug fails.
        assert!(store.save_article(&article).await.is_err());

        let slugs = store.article_slugs().await.unwrap();
        assert!(slugs.contains("moon-cheese"));
        assert_eq!(slugs.len(), 1);
    }

    #[tokio::test]
    async fn spoof_roundtrip_joins_article_fields() {
        let store = test_store().await;
        let article = sample_article("flat-ocean", 2);
        store.save_article(&article).await.unwrap();

        let spoof = article.to_spoof(vec!["Inverted paragraph.".into()]);
        store.save_spoof(&spoof).await.expect("save spoof");

        let found = store
            .get_spoof("flat-ocean")
            .await
            .expect("get spoof")
            .expect("spoof exists");
        assert_eq!(found, spoof);
        assert_eq!(found.title, article.title);
        assert_eq!(found.claim.rating, Rating::True);
        assert_eq!(found.claim.question, article.claim.question);
        assert!(!found.published);

        assert!(store.get_spoof("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn published_flag_lifecycle() {
        let store = test_store().await;
        let article = sample_article("haunted-toaster", 3);
        store.save_article(&article).await.unwrap();
        store
            .save_spoof(&article.to_spoof(vec!["Body.".into()]))
            .await
            .unwrap();

        let unpublished = store.unpublished_spoofs().await.unwrap();
        assert_eq!(unpublished.len(), 1);
        assert_eq!(unpublished[0].slug, "haunted-toaster");

        store.set_published("haunted-toaster", true).await.unwrap();
        assert!(store.unpublished_spoofs().await.unwrap().is_empty());
        assert!(store.get_spoof("haunted-toaster").await.unwrap().unwrap().published);

        store.set_published("haunted-toaster", false).await.unwrap();
        assert_eq!(store.unpublished_spoofs().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn set_published_rejects_unknown_slug() {
        let store = test_store().await;
        let result = store.set_published("no-such-spoof", true).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn latest_stubs_are_newest_first_and_limited() {
        let store = test_store().await;
        for (slug, day) in [("oldest", 1), ("middle", 10), ("newest", 20)] {
            let article = sample_article(slug, day);
            store.save_article(&article).await.unwrap();
            store
                .save_spoof(&article.to_spoof(vec!["Body.".into()]))
                .await
                .unwrap();
        }

        let stubs = store.latest_stubs(2).await.unwrap();
        assert_eq!(stubs.len(), 2);
        assert_eq!(stubs[0].slug, "newest");
        assert_eq!(stubs[1].slug, "middle");
    }

    #[tokio::test]
    async fn spoof_slugs_lists_only_spoofed_articles() {
        let store = test_store().await;
        let with_spoof = sample_article("a-spoofed", 4);
        let without_spoof = sample_article("b-orphan", 5);
        store.save_article(&with_spoof).await.unwrap();
        store.save_article(&without_spoof).await.unwrap();
        store
            .save_spoof(&with_spoof.to_spoof(vec!["Body.".into()]))
            .await
            .unwrap();

        assert_eq!(store.spoof_slugs().await.unwrap(), vec!["a-spoofed"]);
        assert_eq!(store.article_slugs().await.unwrap().len(), 2);
    }
}
