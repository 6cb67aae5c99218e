use crate::{Message, codec};
use std::time::Duration;
use tokio::time::timeout;
use utilities::{result::Result, tcp_pool::TCP_CONNECTION_POOL};

/// One shot request/reply exchange: open a connection, write one frame, read
/// one frame back, drop the connection. The deadline bounds the whole
/// exchange so an unreachable peer cannot stall a periodic task.
pub async fn send(addrs: &str, message: &Message, deadline: Duration) -> Result<Message> {
    match timeout(deadline, exchange(addrs, message)).await {
        Ok(reply) => reply,
        Err(_) => Err(format!("request to {addrs} timed out after {deadline:?}").into()),
    }
}

async fn exchange(addrs: &str, message: &Message) -> Result<Message> {
    let mut stream = TCP_CONNECTION_POOL.get_connection(addrs).await?;
    codec::write_frame(&mut stream, message).await?;
    let reply = codec::read_frame(&mut stream).await?;
    match reply {
        Message::Error(reason) => Err(format!("{addrs} answered with error: {reason}").into()),
        other => Ok(other),
    }
}
