use super::TripRecord;
use crate::{utils, CrawlerError, Storage, Table};
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::path::Path;

/// Trips that could not be scraped, with the reason.
pub struct WarnedTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for WarnedTable {
    type Record<'a> = (&'a str, &'a str);

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn columns(&self) -> &'static str {
        "reason TEXT, created_at DATETIME"
    }

    async fn insert<'a>(&self, (url, reason): Self::Record<'a>) -> Result<(), sqlx::Error> {
        let query = format!(
            "INSERT OR REPLACE INTO {} (id, reason, created_at) VALUES (?, ?, ?)",
            &self.name
        );
        sqlx::query(&query)
            .bind(url.trim())
            .bind(reason)
            .bind(utils::get_now())
            .execute(self.get_pool())
            .await?;
        Ok(())
    }
}

pub struct TripTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for TripTable {
    type Record<'a> = (&'a str, &'a TripRecord, String);

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn columns(&self) -> &'static str {
        "created_at DATETIME,
         title TEXT,
         trip_code TEXT,
         review_count INTEGER,
         record TEXT"
    }

    async fn insert<'a>(&self, (url, record, json): Self::Record<'a>) -> Result<(), sqlx::Error> {
        let mut tx = self.get_pool().begin().await?;
        let query = format!(
            r#"INSERT OR REPLACE INTO {} (
                id,
                title,
                trip_code,
                review_count,
                record,
                created_at) VALUES (?, ?, ?, ?, ?, ?)"#,
            self.name
        );
        sqlx::query(&query)
            .bind(url.trim())
            .bind(record.title.as_str())
            .bind(record.trip_overview.trip_code.as_deref())
            .bind(record.reviews.len() as i64)
            .bind(json)
            .bind(utils::get_now())
            .execute(&mut tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

/// SQLite output for scraped trips: `<name>_results` and `<name>_warned`.
pub struct TripData {
    pub name: String,
    pub results: TripTable,
    pub warned: WarnedTable,
}

impl TripData {
    /// Opens or creates `<name>.db` in the working directory.
    pub async fn new(name: &str) -> Result<TripData, CrawlerError> {
        Self::open(format!("{}.db", name), name).await
    }

    pub async fn open<P: AsRef<Path>>(path: P, name: &str) -> Result<TripData, CrawlerError> {
        Self::connect(path.as_ref(), name, true).await
    }

    /// Opens `<name>.db` only if an earlier run created it.
    pub async fn existing(name: &str) -> Result<TripData, CrawlerError> {
        Self::connect(Path::new(&format!("{}.db", name)), name, false).await
    }

    async fn connect(path: &Path, name: &str, create: bool) -> Result<TripData, CrawlerError> {
        let opt = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create);
        let pool = SqlitePool::connect_with(opt).await?;
        let data = TripData {
            name: name.to_string(),
            results: TripTable {
                name: format!("{}_results", name),
                pool: pool.clone(),
            },
            warned: WarnedTable {
                name: format!("{}_warned", name),
                pool,
            },
        };

        data.results.create().await?;
        data.warned.create().await?;

        Ok(data)
    }

    /// Stored `(url, record json)` pairs, oldest first.
    pub async fn results_get(&self) -> Result<Vec<(String, String)>, CrawlerError> {
        let query = format!(
            "SELECT id, record FROM {} ORDER BY rowid",
            self.results.get_name()
        );
        let mut results = vec![];
        for row in sqlx::query(&query)
            .fetch_all(self.results.get_pool())
            .await?
        {
            results.push((row.try_get("id")?, row.try_get("record")?));
        }
        Ok(results)
    }
}

#[async_trait::async_trait]
impl Storage for TripData {
    async fn results_count(&self) -> Result<u32, CrawlerError> {
        Ok(self.results.count().await?)
    }

    async fn results_insert(&self, url: &str, record: &TripRecord) -> Result<(), CrawlerError> {
        let json = serde_json::to_string(record)?;
        Ok(self.results.insert((url, record, json)).await?)
    }

    async fn warned_insert(&self, url: &str, reason: &str) -> Result<(), CrawlerError> {
        Ok(self.warned.insert((url, reason)).await?)
    }
}
