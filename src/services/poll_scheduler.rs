use crate::config::PollingConfig;
use crate::error::{Result, TrackerError};
use crate::events::{FocusSession, WindowSnapshot};
use crate::services::{FocusTracker, SessionSink, SnapshotBuilder};
use crate::{trace_if_enabled, tracker_error};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, info_span, warn, Instrument};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub probe_timeout: Duration,
    pub flush_on_stop: bool,
}

impl From<&PollingConfig> for SchedulerConfig {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: config.interval(),
            probe_timeout: config.probe_timeout(),
            flush_on_stop: config.flush_on_stop,
        }
    }
}

/// Запущенный фоновый цикл: флаг остановки, будильник и задача
struct Worker {
    stop: Arc<AtomicBool>,
    wake: Arc<Notify>,
    handle: JoinHandle<FocusTracker>,
}

/// Drives the snapshot builder on a dedicated tokio task.
///
/// Each `start()` spawns exactly one task; `stop()` retires it and waits for
/// it before returning. The tracker lives inside the task while it runs.
pub struct PollScheduler {
    builder: Arc<SnapshotBuilder>,
    sink: Arc<dyn SessionSink>,
    config: SchedulerConfig,
    worker: Option<Worker>,
}

impl PollScheduler {
    pub fn new(
        builder: Arc<SnapshotBuilder>,
        sink: Arc<dyn SessionSink>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            builder,
            sink,
            config,
            worker: None,
        }
    }

    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Должен вызываться внутри tokio runtime
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Err(TrackerError::AlreadyRunning);
        }

        info!(
            "Запуск опроса окон: интервал {:?}, таймаут пробы {:?}",
            self.config.interval, self.config.probe_timeout
        );

        let stop = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());
        let span = info_span!("poller", probe = self.builder.probe_name());

        let handle = tokio::spawn(
            poll_loop(
                Arc::clone(&self.builder),
                Arc::clone(&self.sink),
                self.config.clone(),
                Arc::clone(&stop),
                Arc::clone(&wake),
            )
            .instrument(span),
        );

        self.worker = Some(Worker { stop, wake, handle });
        Ok(())
    }

    /// Останавливает цикл и дожидается завершения задачи.
    ///
    /// Возвращает трекер с его последним состоянием; `None`, если цикл не был запущен
    /// или задача завершилась аварийно.
    pub async fn stop(&mut self) -> Option<FocusTracker> {
        let worker = self.worker.take()?;
        info!("Остановка опроса окон");

        worker.stop.store(true, Ordering::SeqCst);
        worker.wake.notify_one();

        match worker.handle.await {
            Ok(tracker) => {
                info!("Опрос окон остановлен");
                Some(tracker)
            }
            Err(e) => {
                error!("Задача опроса завершилась аварийно: {}", e);
                None
            }
        }
    }
}

/// Без `stop().await` цикл только получает сигнал остановки и завершается
/// сам; вызывающий код, которому нужен итоговый трекер, обязан вызвать `stop()`.
impl Drop for PollScheduler {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            warn!("PollScheduler удалён без stop(), цикл опроса получит сигнал остановки");
            worker.stop.store(true, Ordering::SeqCst);
            worker.wake.notify_one();
        }
    }
}

/// Незавершённый вызов пробы, переживший таймаут
type PendingCapture = Option<JoinHandle<Option<WindowSnapshot>>>;

async fn poll_loop(
    builder: Arc<SnapshotBuilder>,
    sink: Arc<dyn SessionSink>,
    config: SchedulerConfig,
    stop: Arc<AtomicBool>,
    wake: Arc<Notify>,
) -> FocusTracker {
    let mut tracker = FocusTracker::new();
    let mut pending: PendingCapture = None;
    let mut ticker = interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Цикл опроса запущен");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = wake.notified() => {}
        }

        if stop.load(Ordering::SeqCst) {
            break;
        }

        // Ошибка одного тика не останавливает цикл
        if let Err(e) = poll_once(&builder, sink.as_ref(), &mut tracker, &mut pending, config.probe_timeout).await {
            warn!("Тик опроса пропущен: {}", e);
        }
    }

    // Зависший вызов не отменяется, остановка ждёт его завершения
    if let Some(capture) = pending.take() {
        info!("Ожидание завершения зависшего опроса окна");
        if let Err(e) = capture.await {
            warn!("Зависший опрос окна завершился аварийно: {}", e);
        }
    }

    if config.flush_on_stop {
        if let Some(session) = tracker.flush(Utc::now()) {
            info!("Открытая сессия закрыта при остановке: {}", session);
            deliver(sink.as_ref(), &session).await;
        }
    } else if tracker.is_tracking() {
        // TODO: решить, нужен ли flush по умолчанию, когда появится отчётность по сессиям
        info!("Открытая сессия не сохранена (flush_on_stop = false)");
    }

    info!("Цикл опроса завершён");
    tracker
}

/// Одновременно выполняется не больше одного вызова пробы
async fn poll_once(
    builder: &Arc<SnapshotBuilder>,
    sink: &dyn SessionSink,
    tracker: &mut FocusTracker,
    pending: &mut PendingCapture,
    probe_timeout: Duration,
) -> Result<()> {
    if let Some(previous) = pending.take() {
        if !previous.is_finished() {
            *pending = Some(previous);
            debug!("Предыдущий опрос окна ещё выполняется, тик пропущен");
            return Ok(());
        }
        // Опоздавший ответ устарел и не наблюдается
        if let Err(e) = previous.await {
            warn!("Зависший опрос окна завершился аварийно: {}", e);
        }
    }

    let mut capture = tokio::task::spawn_blocking({
        let builder = Arc::clone(builder);
        move || builder.capture()
    });

    let snapshot = match timeout(probe_timeout, &mut capture).await {
        Err(_) => {
            *pending = Some(capture);
            return Err(tracker_error!(probe, "опрос окна дольше {:?}", probe_timeout));
        }
        Ok(Err(e)) => return Err(tracker_error!(internal, "опрос окна завершился аварийно: {}", e)),
        Ok(Ok(None)) => {
            trace_if_enabled!("Нет наблюдения в этом тике");
            return Ok(());
        }
        Ok(Ok(Some(snapshot))) => snapshot,
    };

    if let Some(session) = tracker.observe(snapshot) {
        deliver(sink, &session).await;
    }

    Ok(())
}

/// Отказ хранилища только логируется
async fn deliver(sink: &dyn SessionSink, session: &FocusSession) {
    if let Err(e) = sink.record(session).await {
        error!("Не удалось сохранить сессию {}: {}", session, e);
    }
}
