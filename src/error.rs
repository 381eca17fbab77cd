use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка хранилища: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Ошибка опроса окна: {0}")]
    Probe(String),

    #[error("Процесс {0} не найден")]
    ProcessNotFound(u32),

    #[error("Нет доступа к процессу {0}")]
    AccessDenied(u32),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Планировщик опроса уже запущен")]
    AlreadyRunning,

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Ошибки резолвера, после которых снимок всё равно строится
    pub fn is_resolver_failure(&self) -> bool {
        matches!(self, TrackerError::ProcessNotFound(_) | TrackerError::AccessDenied(_))
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! tracker_error {
    (probe, $($arg:tt)*) => {
        $crate::error::TrackerError::Probe(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::TrackerError::ServiceUnavailable(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::TrackerError::Internal(format!($($arg)*))
    };
}
