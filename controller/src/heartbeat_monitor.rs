use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::interval};
use utilities::logger::{Level, span, warn};

use crate::controller_state::ControllerState;

/// Recurring sweep over the chunk server table that flags entries whose last
/// heartbeat is older than the expiry threshold. Entries are never removed;
/// expiry stays a derived property so a late heartbeat revives the server.
pub struct HeartbeatMonitor {
    state: Arc<Mutex<ControllerState>>,
    expiry_threshold: Duration,
}

impl HeartbeatMonitor {
    pub fn new(state: Arc<Mutex<ControllerState>>, expiry_threshold: Duration) -> Self {
        Self {
            state,
            expiry_threshold,
        }
    }

    pub fn start(self, sweep_period: Duration) {
        tokio::spawn(async move {
            let mut ticker = interval(sweep_period);
            loop {
                ticker.tick().await;
                let state = self.state.lock().await;
                let span = span!(Level::INFO, "controller_liveness_sweep");
                let _entered = span.enter();
                for (hostname, entry) in &state.chunk_servers {
                    if entry.is_expired(self.expiry_threshold) {
                        warn!(
                            %hostname,
                            silent_for = ?entry.last_heartbeat.elapsed(),
                            chunks_at_risk = entry.total_chunks,
                            "Chunk server missed its heartbeat window, marking as failed"
                        );
                    }
                }
            }
        });
    }
}
