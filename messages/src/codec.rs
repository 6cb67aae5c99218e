use crate::Message;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use utilities::result::Result;

// guards against allocating off a garbage length prefix
const MAX_FRAME_BYTES: u32 = 256 * 1024 * 1024;

pub async fn write_frame(stream: &mut (impl AsyncWrite + Unpin), message: &Message) -> Result<()> {
    let raw = bincode::serialize(message)?;
    stream.write_u32_le(raw.len() as u32).await?;
    stream.write_all(&raw).await?;
    stream.flush().await?;
    Ok(())
}

pub async fn read_frame(stream: &mut (impl AsyncRead + Unpin)) -> Result<Message> {
    let frame_size = stream.read_u32_le().await?;
    if frame_size > MAX_FRAME_BYTES {
        return Err(format!("frame of {frame_size} bytes exceeds the frame limit").into());
    }
    let mut raw = vec![0u8; frame_size as usize];
    stream.read_exact(&mut raw).await?;
    Ok(bincode::deserialize(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunkserver_chunkserver::StoreChunkRequest;

    #[tokio::test]
    async fn frame_round_trip() {
        let (mut client, mut server) = tokio::io::duplex(1024 * 1024);
        let sent = Message::StoreChunk(StoreChunkRequest {
            absolute_file_path: "/data/f.bin".into(),
            sequence: 4,
            payload: vec![9u8; 70_000],
            remaining_targets: vec!["127.0.0.1:4001".into(), "127.0.0.1:4002".into()],
        });
        write_frame(&mut client, &sent).await.unwrap();
        let received = read_frame(&mut server).await.unwrap();
        match received {
            Message::StoreChunk(request) => {
                assert_eq!(request.absolute_file_path, "/data/f.bin");
                assert_eq!(request.sequence, 4);
                assert_eq!(request.payload.len(), 70_000);
                assert_eq!(request.remaining_targets.len(), 2);
            }
            other => panic!("unexpected message kind {}", other.kind()),
        }
    }

    #[tokio::test]
    async fn back_to_back_frames_stay_separate() {
        let (mut client, mut server) = tokio::io::duplex(64 * 1024);
        write_frame(&mut client, &Message::Error("first".into())).await.unwrap();
        write_frame(&mut client, &Message::Error("second".into())).await.unwrap();
        for expected in ["first", "second"] {
            match read_frame(&mut server).await.unwrap() {
                Message::Error(reason) => assert_eq!(reason, expected),
                other => panic!("unexpected message kind {}", other.kind()),
            }
        }
    }
}
