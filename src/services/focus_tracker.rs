use crate::events::{FocusSession, WindowSnapshot};
use chrono::{DateTime, Utc};
use tracing::info;

/// Состояние трекера: сессия либо открыта на конкретном окне, либо нет
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrackerState {
    #[default]
    Idle,
    Tracking {
        window: WindowSnapshot,
        started_at: DateTime<Utc>,
    },
}

/// Focus session state machine.
///
/// Consumes snapshots in capture order and closes a session every time the
/// foreground handle changes. Same input sequence, same output sequence.
#[derive(Debug, Default)]
pub struct FocusTracker {
    state: TrackerState,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, TrackerState::Tracking { .. })
    }

    /// Вызывается только с реальным снимком: пропущенный тик сменой окна не считается.
    pub fn observe(&mut self, snapshot: WindowSnapshot) -> Option<FocusSession> {
        match &self.state {
            TrackerState::Tracking { window, .. } if window.same_window(&snapshot) => None,
            TrackerState::Tracking { window, started_at } => {
                let session = FocusSession::new(
                    window.process_name.clone(),
                    window.title.clone(),
                    *started_at,
                    snapshot.captured_at,
                );

                info!(
                    "Смена окна: {} -> {} через {:.2}с",
                    window,
                    snapshot,
                    session.duration.as_secs_f64()
                );

                self.open(snapshot);
                Some(session)
            }
            TrackerState::Idle => {
                info!("Новое активное окно: {}", snapshot.title);
                self.open(snapshot);
                None
            }
        }
    }

    /// Закрывает открытую сессию моментом `at` и возвращает трекер в Idle.
    pub fn flush(&mut self, at: DateTime<Utc>) -> Option<FocusSession> {
        match std::mem::take(&mut self.state) {
            TrackerState::Idle => None,
            TrackerState::Tracking { window, started_at } => Some(FocusSession::new(
                window.process_name,
                window.title,
                started_at,
                at,
            )),
        }
    }

    fn open(&mut self, snapshot: WindowSnapshot) {
        let started_at = snapshot.captured_at;
        self.state = TrackerState::Tracking {
            window: snapshot,
            started_at,
        };
    }
}
