mod chunk_joiner;
mod chunkserver_service;
mod command_runner;
mod config;
mod controller_service;
mod file_chunker;

use std::io;

use chunkserver_service::ChunkserverService;
use command_runner::CommandRunner;
use config::CONFIG;
use controller_service::ControllerService;
use utilities::{
    logger::{info, init_logger},
    result::Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logger(
        "Client",
        &CONFIG.client_id,
        CONFIG.log_level.clone(),
        &CONFIG.log_base,
    );
    let controller = ControllerService::new(
        CONFIG.controller_addrs.clone(),
        CONFIG.request_timeout(),
    );
    let chunkserver = ChunkserverService::new(CONFIG.request_timeout());
    let mut command_runner = CommandRunner::new(controller, chunkserver, CONFIG.chunk_size);
    info!("starting the Client");
    loop {
        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => return Ok(()),
            Ok(_bytes) => match command_runner.handle_input(&input).await {
                Ok(message) => {
                    println!("Success : {}", message);
                }
                Err(message) => {
                    println!("Error : {}", message);
                }
            },
            Err(e) => {
                println!("error while reading the command {:?}", e);
            }
        }
    }
}
