use sqlx::{Row, SqlitePool};
use tracing::debug;

/// A SQLite table keyed by a text `id` column.
#[async_trait::async_trait]
pub trait Table {
    type Record<'a>;

    fn get_name(&self) -> &str;
    fn get_pool(&self) -> &SqlitePool;
    /// Column definitions, `id` excluded.
    fn columns(&self) -> &'static str;

    async fn insert<'a>(&self, record: Self::Record<'a>) -> Result<(), sqlx::Error>;

    async fn create(&self) -> Result<(), sqlx::Error> {
        debug!("Create table {} if missing", self.get_name());
        let query = format!(
            "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY, {})",
            self.get_name(),
            self.columns()
        );
        sqlx::query(&query).execute(self.get_pool()).await?;
        Ok(())
    }

    async fn is_exist<I: AsRef<str> + Send + Sync>(&self, id: I) -> Result<bool, sqlx::Error> {
        let query = format!("SELECT id FROM {} WHERE id = ?", self.get_name());
        Ok(sqlx::query(&query)
            .bind(id.as_ref())
            .fetch_optional(self.get_pool())
            .await?
            .is_some())
    }

    async fn count(&self) -> Result<u32, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {}", self.get_name());
        Ok(sqlx::query(&query)
            .fetch_one(self.get_pool())
            .await?
            .try_get(0)?)
    }
}
