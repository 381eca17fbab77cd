use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use services::{
    create_session_sink,
    create_window_probe,
    DryRunProbe,
    PollScheduler,
    ProcessResolver,
    SchedulerConfig,
    SnapshotBuilder,
    StaticResolver,
    SysinfoResolver,
    TrackerState,
};

#[derive(Parser, Debug)]
#[command(name = "focus-tracker")]
#[command(about = "Учёт времени фокуса активных окон и процессов")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "focus-tracker.toml")]
    config: String,

    /// Режим сухого запуска (эмуляция окон вместо запросов к ОС)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает конфигурацию)
    #[arg(long)]
    log_level: Option<String>,

    /// Сохранять открытую сессию при остановке
    #[arg(long)]
    flush_on_stop: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let mut config = Config::load(&args.config)?;
    config.apply_overrides(args.log_level.as_deref(), args.flush_on_stop);
    config.validate()?;

    // Инициализация системы логирования
    init_tracing(&config)?;

    info!("Запуск focus-tracker v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    let dry_run = args.dry_run || config.probe.backend == "dry_run";
    if dry_run {
        warn!("Режим сухого запуска - окна эмулируются");
    }

    // Инициализация компонентов
    let probe = create_window_probe(&config, dry_run)?;
    let resolver: Arc<dyn ProcessResolver> = if dry_run {
        Arc::new(StaticResolver::new(DryRunProbe::process_table()))
    } else {
        Arc::new(SysinfoResolver::new())
    };
    let builder = Arc::new(SnapshotBuilder::new(probe, resolver));
    let sink = create_session_sink(&config)?;

    let mut scheduler = PollScheduler::new(builder, sink, SchedulerConfig::from(&config.polling));
    scheduler.start()?;

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    match scheduler.stop().await {
        Some(tracker) => {
            if let TrackerState::Tracking { window, started_at } = tracker.state() {
                info!("Последнее активное окно: {} (с {})", window, started_at);
            }
        }
        None => warn!("Цикл опроса завершился некорректно"),
    }

    info!("focus-tracker завершил работу");
    Ok(())
}

fn init_tracing(config: &Config) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let logging = &config.logging;

    // Консоль: RUST_LOG или logging.level
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives(&logging.level, &logging.filter)))?;

    let console = match logging.format.as_str() {
        "full" => fmt::layer().with_filter(console_filter).boxed(),
        _ => fmt::layer().compact().with_filter(console_filter).boxed(),
    };

    // Файл: подробнее консоли, logging.file_level
    let file = match logging.open_log_file()? {
        Some(file) => {
            let file_filter = EnvFilter::try_new(directives(&logging.file_level, &logging.filter))?;
            Some(
                fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_filter(file_filter)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry().with(console).with(file).init();

    Ok(())
}

fn directives(level: &str, filter: &str) -> String {
    if filter.is_empty() {
        level.to_string()
    } else {
        format!("{},{}", level, filter)
    }
}
