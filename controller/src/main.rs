mod chunkserver_handler;
mod client_handler;
mod config;
mod controller_state;
mod heartbeat_monitor;
mod tcp_service;

use std::sync::Arc;

use chunkserver_handler::ChunkserverHandler;
use client_handler::ClientHandler;
use config::CONFIG;
use controller_state::ControllerState;
use heartbeat_monitor::HeartbeatMonitor;
use tcp_service::TcpService;
use tokio::sync::Mutex;
use utilities::{
    logger::{info, init_logger},
    result::Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logger(
        "Controller",
        &CONFIG.controller_id,
        CONFIG.log_level.clone(),
        &CONFIG.log_base,
    );
    let state = Arc::new(Mutex::new(ControllerState::new(CONFIG.replication_factor)));
    HeartbeatMonitor::new(state.clone(), CONFIG.expiry_threshold()).start(CONFIG.grace_period());
    let chunkserver_handler = ChunkserverHandler::new(state.clone());
    let client_handler = ClientHandler::new(state, CONFIG.expiry_threshold());
    info!(listen_addrs = %CONFIG.listen_addrs, "Starting the controller message service");
    let service = TcpService::new(&CONFIG.listen_addrs, chunkserver_handler, client_handler).await?;
    service.start_and_accept().await
}
