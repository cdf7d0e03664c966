//! Call duration display.
//!
//! The timer only formats elapsed time for the active call; it never
//! touches the registry.

use crate::session::presentation::{PresentationHub, UiUpdate};

use std::time::{Duration, Instant};

use log::debug;
use tokio::spawn as TokioSpawn;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

const TICK: Duration = Duration::from_secs(1);

/// Format whole seconds as `MM:SS`. Minutes keep counting past 99.
pub fn format_duration(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[derive(Debug)]
pub struct CallTimer {
    hub: PresentationHub,
    running: Option<RunningTimer>,
}

#[derive(Debug)]
struct RunningTimer {
    call_id: String,
    started_at: Instant,
    task: JoinHandle<()>,
}

impl CallTimer {
    pub fn new(hub: PresentationHub) -> Self {
        Self { hub, running: None }
    }

    /// Start timing `call_id`, replacing any running timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, call_id: &str) {
        self.stop();

        let started_at = Instant::now();
        let hub = self.hub.clone();
        let id = call_id.to_string();

        let task = TokioSpawn(async move {
            let mut ticker = interval(TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                hub.publish(UiUpdate::Duration {
                    call_id: id.clone(),
                    text: format_duration(started_at.elapsed().as_secs()),
                });
            }
        });

        debug!("Duration timer started for call {call_id}");
        self.running = Some(RunningTimer {
            call_id: call_id.to_string(),
            started_at,
            task,
        });
    }

    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.task.abort();
            debug!("Duration timer stopped for call {}", running.call_id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Call currently being timed.
    pub fn call_id(&self) -> Option<&str> {
        self.running.as_ref().map(|running| running.call_id.as_str())
    }

    /// Elapsed time display, `00:00` when idle.
    pub fn elapsed_text(&self) -> String {
        let secs = self
            .running
            .as_ref()
            .map(|running| running.started_at.elapsed().as_secs())
            .unwrap_or(0);
        format_duration(secs)
    }
}

impl Drop for CallTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
