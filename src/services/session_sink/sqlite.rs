use crate::error::{Result, TrackerError};
use crate::events::FocusSession;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::SessionSink;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS window_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        process_name TEXT NOT NULL,
        window_title TEXT NOT NULL,
        start_time DATETIME NOT NULL,
        end_time DATETIME NOT NULL,
        duration INTEGER NOT NULL
    )
";

/// Хранилище сессий в SQLite (таблица `window_records`)
pub struct SqliteSink {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSink {
    pub fn open(path: &Path) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn insert(conn: &Connection, session: &FocusSession) -> Result<()> {
        conn.execute(
            "INSERT INTO window_records (process_name, window_title, start_time, end_time, duration)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.process_name,
                session.window_title,
                session.start_time.to_rfc3339(),
                session.end_time.to_rfc3339(),
                session.duration.as_secs() as i64,
            ],
        )?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionSink for SqliteSink {
    async fn record(&self, session: &FocusSession) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let session = session.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = conn.lock();
            Self::insert(&conn, &session)?;
            debug!("Сессия записана в SQLite: {}", session);
            Ok(())
        })
        .await
        .map_err(|e| TrackerError::Internal(format!("запись в SQLite прервана: {}", e)))?
    }
}
