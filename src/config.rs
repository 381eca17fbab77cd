use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub polling: PollingConfig,
    pub probe: ProbeConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
    /// Каталог файлового лога; пустой путь отключает запись в файл
    pub directory: PathBuf,
    pub file_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub probe_timeout_ms: u64,
    /// Закрывать ли открытую сессию при остановке
    pub flush_on_stop: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub backend: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: String,
    pub database_path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            filter: String::new(),
            directory: PathBuf::from("logs"),
            file_level: "debug".to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            probe_timeout_ms: 2000,
            flush_on_stop: false,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            backend: "auto".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "log".to_string(),
            database_path: PathBuf::from("usage_stats.db"),
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl LoggingConfig {
    /// Создаёт `focus-tracker_<время запуска>.log` в `directory`
    pub fn open_log_file(&self) -> Result<Option<File>> {
        if self.directory.as_os_str().is_empty() {
            return Ok(None);
        }

        fs::create_dir_all(&self.directory)
            .with_context(|| format!("Не удалось создать каталог логов {:?}", self.directory))?;

        let path = self.directory.join(format!(
            "focus-tracker_{}.log",
            chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
        ));
        let file = File::create(&path)
            .with_context(|| format!("Не удалось создать файл лога {:?}", path))?;

        Ok(Some(file))
    }
}

fn validate_level(name: &str, level: &str) -> Result<()> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => anyhow::bail!("Неверный уровень логирования ({}): {}", name, level),
    }
}

impl Config {
    /// Порядок слоёв: значения по умолчанию, TOML-файл (может отсутствовать),
    /// переменные окружения `FOCUS_<СЕКЦИЯ>__<КЛЮЧ>`.
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("FOCUS_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        Ok(config)
    }

    /// Флаги командной строки перекрывают все слои; `validate()` вызывается после
    pub fn apply_overrides(&mut self, log_level: Option<&str>, flush_on_stop: bool) {
        if let Some(level) = log_level {
            self.logging.level = level.to_string();
        }
        if flush_on_stop {
            self.polling.flush_on_stop = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        validate_level("level", &self.logging.level)?;
        validate_level("file_level", &self.logging.file_level)?;

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация настроек опроса
        if self.polling.interval_ms < 100 {
            anyhow::bail!("interval_ms должно быть минимум 100");
        }

        if self.polling.probe_timeout_ms == 0 {
            anyhow::bail!("probe_timeout_ms должно быть больше 0");
        }

        match self.probe.backend.as_str() {
            "auto" | "xdotool" | "kdotool" | "sway" | "windows" | "dry_run" => {}
            _ => anyhow::bail!("Неизвестный бэкенд пробы окон: {}", self.probe.backend),
        }

        match self.storage.backend.as_str() {
            "log" | "sqlite" => {}
            _ => anyhow::bail!("Неизвестный бэкенд хранилища: {}", self.storage.backend),
        }

        if self.storage.backend == "sqlite" && self.storage.database_path.as_os_str().is_empty() {
            anyhow::bail!("database_path не может быть пустым для sqlite");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.polling.interval(), Duration::from_secs(1));
        assert!(!config.polling.flush_on_stop);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut config = Config::default();
        config.polling.interval_ms = 10;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.probe.backend = "wmctrl".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.backend = "postgres".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "json".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.backend = "sqlite".to_string();
        config.storage.database_path = PathBuf::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.file_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_override_fixes_invalid_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focus.toml");
        std::fs::write(&path, "[logging]\nlevel = \"verbose\"\n").unwrap();

        let mut config = Config::load(&path).unwrap();
        assert!(config.validate().is_err());

        config.apply_overrides(Some("debug"), true);
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.level, "debug");
        assert!(config.polling.flush_on_stop);
    }

    #[test]
    fn test_log_file_created_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut logging = LoggingConfig::default();
        logging.directory = dir.path().join("logs");

        assert!(logging.open_log_file().unwrap().is_some());

        let names: Vec<String> = std::fs::read_dir(&logging.directory)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("focus-tracker_"));
        assert!(names[0].ends_with(".log"));
    }

    #[test]
    fn test_empty_log_directory_disables_file() {
        let mut logging = LoggingConfig::default();
        logging.directory = PathBuf::new();

        assert!(logging.open_log_file().unwrap().is_none());
    }

    #[test]
    fn test_load_merges_toml_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focus.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[polling]\ninterval_ms = 250\nflush_on_stop = true\n\n[storage]\nbackend = \"sqlite\"\ndatabase_path = \"stats.db\""
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.polling.interval_ms, 250);
        assert!(config.polling.flush_on_stop);
        assert_eq!(config.polling.probe_timeout_ms, 2000);
        assert_eq!(config.storage.backend, "sqlite");
        assert_eq!(config.storage.database_path, PathBuf::from("stats.db"));
        assert_eq!(config.probe.backend, "auto");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("missing.toml")).unwrap();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file_level, "debug");
        assert_eq!(config.logging.directory, PathBuf::from("logs"));
        assert_eq!(config.storage.backend, "log");
    }
}
