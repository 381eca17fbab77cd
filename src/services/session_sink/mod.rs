//! SessionSink: where closed focus sessions go.
//!
//! The poll loop hands every emitted session to exactly one sink. A failing
//! sink is logged by the caller and never stops polling.

mod sqlite;

pub use self::sqlite::SqliteSink;

use crate::config::Config;
use crate::error::Result;
use crate::events::FocusSession;
use std::sync::Arc;
use tracing::info;

#[async_trait::async_trait]
pub trait SessionSink: Send + Sync {
    /// Persist one closed session
    async fn record(&self, session: &FocusSession) -> Result<()>;
}

/// Пишет каждую закрытую сессию в лог
pub struct LogSink;

#[async_trait::async_trait]
impl SessionSink for LogSink {
    async fn record(&self, session: &FocusSession) -> Result<()> {
        info!(
            process = %session.process_name,
            title = %session.window_title,
            start = %session.start_time.to_rfc3339(),
            end = %session.end_time.to_rfc3339(),
            duration_secs = session.duration.as_secs_f64(),
            "Сессия фокуса завершена"
        );
        Ok(())
    }
}

/// Factory function to create the configured session sink
pub fn create_session_sink(config: &Config) -> Result<Arc<dyn SessionSink>> {
    match config.storage.backend.as_str() {
        "sqlite" => {
            info!("Сессии сохраняются в {:?}", config.storage.database_path);
            Ok(Arc::new(SqliteSink::open(&config.storage.database_path)?))
        }
        _ => {
            info!("Сессии пишутся только в лог");
            Ok(Arc::new(LogSink))
        }
    }
}

#[cfg(test)]
pub use self::testing::MemorySink;

#[cfg(test)]
mod testing {
    use super::*;
    use crate::tracker_error;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Собирает сессии в память; может имитировать отказ записи
    #[derive(Default)]
    pub struct MemorySink {
        sessions: Mutex<Vec<FocusSession>>,
        failing: AtomicBool,
    }

    impl MemorySink {
        pub fn failing() -> Self {
            let sink = Self::default();
            sink.failing.store(true, Ordering::SeqCst);
            sink
        }

        pub fn sessions(&self) -> Vec<FocusSession> {
            self.sessions.lock().clone()
        }
    }

    #[async_trait::async_trait]
    impl SessionSink for MemorySink {
        async fn record(&self, session: &FocusSession) -> Result<()> {
            self.sessions.lock().push(session.clone());
            if self.failing.load(Ordering::SeqCst) {
                return Err(tracker_error!(internal, "диск переполнен"));
            }
            Ok(())
        }
    }
}
