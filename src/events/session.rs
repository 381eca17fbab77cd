use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Закрытый интервал фокуса одного окна
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    pub process_name: String,
    pub window_title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: Duration,
}

impl FocusSession {
    /// Длительность считается как `end - start`; если часы ушли назад, она равна нулю.
    pub fn new(
        process_name: String,
        window_title: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        let duration = (end_time - start_time).to_std().unwrap_or(Duration::ZERO);
        Self {
            process_name,
            window_title,
            start_time,
            end_time,
            duration,
        }
    }
}

impl fmt::Display for FocusSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" ({}) {:.2}с",
            self.window_title,
            self.process_name,
            self.duration.as_secs_f64()
        )
    }
}
