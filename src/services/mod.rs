pub mod focus_tracker;
pub mod poll_scheduler;
pub mod process_resolver;
pub mod session_sink;
pub mod snapshot_builder;
pub mod window_probe;

pub use focus_tracker::{FocusTracker, TrackerState};
pub use poll_scheduler::{PollScheduler, SchedulerConfig};
pub use process_resolver::{ProcessResolver, StaticResolver, SysinfoResolver};
pub use session_sink::{create_session_sink, SessionSink};
pub use snapshot_builder::SnapshotBuilder;
pub use window_probe::{create_window_probe, DryRunProbe, WindowProbe};
