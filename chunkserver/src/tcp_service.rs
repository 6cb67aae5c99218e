use messages::{Message, codec};
use tokio::net::{TcpListener, TcpStream};
use utilities::{
    logger::{Instrument, Span, error},
    result::Result,
};

use crate::chunk_handler::ChunkHandler;

/// Accepts store and retrieve requests, one frame exchange per connection.
pub struct TcpService {
    listener: TcpListener,
    handler: ChunkHandler,
}

impl TcpService {
    pub async fn new(address: &str, handler: ChunkHandler) -> Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(TcpService { listener, handler })
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn start_and_accept(&self) -> Result<()> {
        loop {
            let (tcp_stream, _) = self.listener.accept().await?;
            let handler = self.handler.clone();
            let span = Span::current();
            tokio::spawn(
                async move {
                    if let Err(e) = Self::handle_connection(tcp_stream, handler).await {
                        error!("error while handling the chunkserver connection {e}");
                    }
                }
                .instrument(span),
            );
        }
    }

    async fn handle_connection(mut tcp_stream: TcpStream, handler: ChunkHandler) -> Result<()> {
        let message = codec::read_frame(&mut tcp_stream).await?;
        let reply = match message {
            Message::StoreChunk(request) => {
                match handler.process_chunk_store_request(request).await {
                    Ok(ack) => Message::StoreChunkAck(ack),
                    Err(e) => Message::Error(e.to_string()),
                }
            }
            Message::RetrieveChunk(request) => {
                match handler.process_chunk_retrieve_request(request).await {
                    Ok(response) => Message::RetrieveChunkResponse(response),
                    Err(e) => Message::Error(e.to_string()),
                }
            }
            other => Message::Error(format!(
                "chunkserver does not handle {} messages",
                other.kind()
            )),
        };
        codec::write_frame(&mut tcp_stream, &reply).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunkserver_state::ChunkserverState;
    use messages::chunkserver_chunkserver::StoreChunkRequest;
    use messages::client_chunkserver::RetrieveChunkRequest;
    use messages::transport;
    use std::sync::Arc;
    use std::time::Duration;
    use storage::chunk_store::ChunkStore;
    use tokio::sync::Mutex;

    const SLICE_SIZE: usize = 8 * 1024;
    const CHUNK_SIZE: usize = 64 * 1024;

    struct TestServer {
        addrs: String,
        store: ChunkStore,
    }

    async fn spawn_chunkserver(dir: &std::path::Path) -> TestServer {
        let store = ChunkStore::new(dir).unwrap();
        let handler = ChunkHandler::new(
            store.clone(),
            Arc::new(Mutex::new(ChunkserverState::new())),
            SLICE_SIZE,
            Duration::from_secs(5),
        );
        let service = TcpService::new("127.0.0.1:0", handler).await.unwrap();
        let addrs = service.local_addr().unwrap().to_string();
        tokio::spawn(async move { service.start_and_accept().await });
        TestServer { addrs, store }
    }

    // a 100KB write through a three host chain: two chunks, every host ends
    // up with version 1 of both and digests that validate
    #[tokio::test]
    async fn chain_replication_across_three_hosts() {
        let dirs: Vec<_> = (0..3).map(|_| tempfile::tempdir().unwrap()).collect();
        let mut servers = Vec::new();
        for dir in &dirs {
            servers.push(spawn_chunkserver(dir.path()).await);
        }

        let file_bytes: Vec<u8> = (0..100 * 1024u32).map(|i| (i % 241) as u8).collect();
        for (sequence, payload) in file_bytes.chunks(CHUNK_SIZE).enumerate() {
            let request = StoreChunkRequest {
                absolute_file_path: "/media/file.bin".to_owned(),
                sequence: sequence as u32,
                payload: payload.to_vec(),
                remaining_targets: vec![servers[1].addrs.clone(), servers[2].addrs.clone()],
            };
            let reply = transport::send(
                &servers[0].addrs,
                &Message::StoreChunk(request),
                Duration::from_secs(10),
            )
            .await
            .unwrap();
            match reply {
                Message::StoreChunkAck(ack) => assert_eq!(ack.version, 1),
                other => panic!("unexpected reply {}", other.kind()),
            }
        }

        for server in &servers {
            for (sequence, payload) in file_bytes.chunks(CHUNK_SIZE).enumerate() {
                let chunk = server
                    .store
                    .load("/media/file.bin", sequence as u32)
                    .await
                    .unwrap();
                assert_eq!(chunk.metadata.version, 1);
                assert_eq!(chunk.payload, payload);
                assert!(chunk.integrity.matches(&chunk.payload, SLICE_SIZE));
            }
            // 64KB + 36KB
            let sizes: Vec<u64> = {
                let mut scan = server.store.scan().await.unwrap().chunks;
                scan.sort_by_key(|m| m.sequence);
                scan.iter().map(|m| m.size).collect()
            };
            assert_eq!(sizes, vec![64 * 1024, 36 * 1024]);
        }
    }

    #[tokio::test]
    async fn broken_chain_surfaces_to_the_originator() {
        let dir = tempfile::tempdir().unwrap();
        let server = spawn_chunkserver(dir.path()).await;
        let request = StoreChunkRequest {
            absolute_file_path: "/f".to_owned(),
            sequence: 0,
            payload: vec![1u8; 500],
            remaining_targets: vec!["127.0.0.1:1".to_owned()],
        };
        let reply = transport::send(
            &server.addrs,
            &Message::StoreChunk(request),
            Duration::from_secs(10),
        )
        .await;
        assert!(reply.is_err());
    }

    #[tokio::test]
    async fn retrieve_round_trips_over_the_wire() {
        let dir = tempfile::tempdir().unwrap();
        let server = spawn_chunkserver(dir.path()).await;
        let payload = vec![42u8; 9_000];
        let store_reply = transport::send(
            &server.addrs,
            &Message::StoreChunk(StoreChunkRequest {
                absolute_file_path: "/f".to_owned(),
                sequence: 2,
                payload: payload.clone(),
                remaining_targets: vec![],
            }),
            Duration::from_secs(10),
        )
        .await
        .unwrap();
        assert!(matches!(store_reply, Message::StoreChunkAck(_)));

        let reply = transport::send(
            &server.addrs,
            &Message::RetrieveChunk(RetrieveChunkRequest {
                absolute_file_path: "/f".to_owned(),
                sequence: 2,
            }),
            Duration::from_secs(10),
        )
        .await
        .unwrap();
        match reply {
            Message::RetrieveChunkResponse(response) => assert_eq!(response.payload, payload),
            other => panic!("unexpected reply {}", other.kind()),
        }
    }
}
