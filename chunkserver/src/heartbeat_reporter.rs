use std::sync::Arc;
use std::time::Duration;

use storage::chunk_store::ChunkStore;
use tokio::{
    sync::Mutex,
    time::{Instant, interval, interval_at},
};
use utilities::{logger::error, result::Result};

use crate::{chunkserver_state::ChunkserverState, controller_service::ControllerService};

/// Runs the two periodic reporting loops. Each tick's body runs in its own
/// task so a slow controller send never starves the next tick.
#[derive(Clone)]
pub struct HeartbeatReporter {
    store: ChunkStore,
    state: Arc<Mutex<ChunkserverState>>,
    controller: ControllerService,
    // a minor tick that coincides with a major report gets skipped so the
    // controller does not see the same delta twice
    major_every_minor_ticks: u64,
}

impl HeartbeatReporter {
    pub fn new(
        store: ChunkStore,
        state: Arc<Mutex<ChunkserverState>>,
        controller: ControllerService,
        major_every_minor_ticks: u64,
    ) -> Self {
        Self {
            store,
            state,
            controller,
            major_every_minor_ticks,
        }
    }

    pub fn start(self, minor_period: Duration) {
        let major_period = minor_period * self.major_every_minor_ticks as u32;
        // offset the major loop by half a minor period so its ticks never
        // land on a minor tick
        self.clone()
            .start_major_loop(major_period, minor_period / 2);
        self.start_minor_loop(minor_period);
    }

    fn start_minor_loop(self, period: Duration) {
        tokio::spawn(async move {
            let mut ticker = interval(period);
            let mut tick: u64 = 0;
            loop {
                ticker.tick().await;
                tick += 1;
                if tick % self.major_every_minor_ticks == 0 {
                    continue;
                }
                let reporter = self.clone();
                tokio::spawn(async move {
                    if let Err(e) = reporter.report_minor().await {
                        error!(error = %e, "Skipping minor heartbeat");
                    }
                });
            }
        });
    }

    fn start_major_loop(self, period: Duration, offset: Duration) {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period + offset, period);
            loop {
                ticker.tick().await;
                let reporter = self.clone();
                tokio::spawn(async move {
                    if let Err(e) = reporter.report_major().await {
                        error!(error = %e, "Skipping major heartbeat");
                    }
                });
            }
        });
    }

    /// Incremental report: free space and chunk count from a fresh scan plus
    /// the drained added/corrupted queues. A failed send puts the drained
    /// batches back so the deltas ride the next report instead of vanishing;
    /// corrupted slots in particular have no other path to the controller.
    async fn report_minor(&self) -> Result<()> {
        let scan = self.store.scan().await?;
        let (added, corrupted) = {
            let mut state = self.state.lock().await;
            (state.drain_added(), state.drain_corrupted())
        };
        let sent = self
            .controller
            .send_minor_heartbeat(
                scan.free_space(),
                scan.total_chunks(),
                added.clone(),
                corrupted.clone(),
            )
            .await;
        if sent.is_err() {
            let mut state = self.state.lock().await;
            state.requeue_added(added);
            state.requeue_corrupted(corrupted);
        }
        sent
    }

    /// Full inventory report; the controller reconciles its whole view of
    /// this server against it.
    async fn report_major(&self) -> Result<()> {
        let scan = self.store.scan().await?;
        let free_space = scan.free_space();
        self.controller
            .send_major_heartbeat(free_space, scan.chunks)
            .await
    }
}
