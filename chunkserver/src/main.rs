mod chunk_handler;
mod chunkserver_state;
mod config;
mod controller_service;
mod heartbeat_reporter;
mod tcp_service;

use std::sync::Arc;

use chunk_handler::ChunkHandler;
use chunkserver_state::ChunkserverState;
use config::CONFIG;
use controller_service::ControllerService;
use heartbeat_reporter::HeartbeatReporter;
use storage::chunk_store::ChunkStore;
use tcp_service::TcpService;
use tokio::sync::Mutex;
use utilities::{
    logger::{error, info, init_logger},
    result::Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logger(
        "Chunkserver",
        &CONFIG.chunkserver_id,
        CONFIG.log_level.clone(),
        &CONFIG.log_base,
    );
    // a storage root we cannot create is fatal, nothing works without it
    let store = match ChunkStore::new(&CONFIG.storage_root) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, root = %CONFIG.storage_root, "Cannot create the chunk storage root, shutting down");
            return Err(e.into());
        }
    };
    let state = Arc::new(Mutex::new(ChunkserverState::new()));
    let controller = ControllerService::new(
        CONFIG.controller_addrs.clone(),
        CONFIG.external_addrs.clone(),
        CONFIG.send_timeout(),
    );
    HeartbeatReporter::new(
        store.clone(),
        state.clone(),
        controller,
        CONFIG.major_every_minor_ticks,
    )
    .start(CONFIG.minor_heartbeat_period());
    let handler = ChunkHandler::new(store, state, CONFIG.slice_size, CONFIG.send_timeout());
    info!(listen_addrs = %CONFIG.listen_addrs, external_addrs = %CONFIG.external_addrs, "Starting the chunkserver message service");
    let service = TcpService::new(&CONFIG.listen_addrs, handler).await?;
    service.start_and_accept().await
}
