mod fetch_file_handler;
mod store_file_handler;

use crate::{chunkserver_service::ChunkserverService, controller_service::ControllerService};
use fetch_file_handler::FetchFileHandler;
use store_file_handler::StoreFileHandler;
use utilities::result::Result;

pub struct CommandRunner {
    store_file_handler: StoreFileHandler,
    fetch_file_handler: FetchFileHandler,
}

impl CommandRunner {
    pub fn new(
        controller: ControllerService,
        chunkserver: ChunkserverService,
        chunk_size: usize,
    ) -> Self {
        CommandRunner {
            store_file_handler: StoreFileHandler::new(
                controller.clone(),
                chunkserver.clone(),
                chunk_size,
            ),
            fetch_file_handler: FetchFileHandler::new(controller, chunkserver),
        }
    }

    pub async fn handle_input(&mut self, command: &str) -> Result<String> {
        match command {
            fetch_command if fetch_command.starts_with("fetch") => {
                let inputs: Vec<&str> = fetch_command.split_whitespace().collect();
                if inputs.len() < 3 {
                    return Err("Invalid fetch command usage please use <help> to get help".into());
                }
                self.fetch_file_handler
                    .fetch_file(inputs[1].to_owned(), inputs[2].to_owned())
                    .await
            }
            store_command if store_command.starts_with("store") => {
                let inputs: Vec<&str> = store_command.split_whitespace().collect();
                if inputs.len() < 3 {
                    return Err("Invalid store command usage please use <help> to get help".into());
                }
                self.store_file_handler
                    .store_file(inputs[1].to_owned(), inputs[2].to_owned())
                    .await
            }
            help_command if help_command.trim() == "help" => Ok(
                "\nfetch command : fetch remote_file_path target_file_path\nstore command : store source_file_path target_remote_file_path\n"
                    .to_owned(),
            ),
            _ => Err(
                "Invalid Command Please use valid command use help to list available commands"
                    .into(),
            ),
        }
    }
}
