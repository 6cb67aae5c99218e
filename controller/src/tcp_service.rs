use messages::{Message, codec};
use tokio::net::{TcpListener, TcpStream};
use utilities::{
    logger::{Instrument, Span, error},
    result::Result,
};

use crate::{chunkserver_handler::ChunkserverHandler, client_handler::ClientHandler};

/// Accepts inbound connections, decodes one message frame per connection,
/// dispatches on the tag and writes one reply frame back.
pub struct TcpService {
    listener: TcpListener,
    chunkserver_handler: ChunkserverHandler,
    client_handler: ClientHandler,
}

impl TcpService {
    pub async fn new(
        address: &str,
        chunkserver_handler: ChunkserverHandler,
        client_handler: ClientHandler,
    ) -> Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(TcpService {
            listener,
            chunkserver_handler,
            client_handler,
        })
    }

    pub async fn start_and_accept(&self) -> Result<()> {
        loop {
            let (tcp_stream, _) = self.listener.accept().await?;
            let chunkserver_handler = self.chunkserver_handler.clone();
            let client_handler = self.client_handler.clone();
            let span = Span::current();
            tokio::spawn(
                async move {
                    if let Err(e) =
                        Self::handle_connection(tcp_stream, chunkserver_handler, client_handler)
                            .await
                    {
                        error!("error while handling the controller connection {e}");
                    }
                }
                .instrument(span),
            );
        }
    }

    async fn handle_connection(
        mut tcp_stream: TcpStream,
        chunkserver_handler: ChunkserverHandler,
        client_handler: ClientHandler,
    ) -> Result<()> {
        let message = codec::read_frame(&mut tcp_stream).await?;
        let reply = match message {
            Message::MinorHeartbeat(report) => {
                Message::HeartbeatAck(chunkserver_handler.handle_minor_heartbeat(report).await)
            }
            Message::MajorHeartbeat(report) => {
                Message::HeartbeatAck(chunkserver_handler.handle_major_heartbeat(report).await)
            }
            Message::WritePlacement(request) => {
                match client_handler.handle_write_placement(request).await {
                    Ok(response) => Message::WritePlacementResponse(response),
                    Err(e) => Message::Error(e.to_string()),
                }
            }
            Message::ReadLocations(request) => {
                match client_handler.handle_read_locations(request).await {
                    Ok(response) => Message::ReadLocationsResponse(response),
                    Err(e) => Message::Error(e.to_string()),
                }
            }
            other => Message::Error(format!(
                "controller does not handle {} messages",
                other.kind()
            )),
        };
        codec::write_frame(&mut tcp_stream, &reply).await
    }
}
