//! Length-prefixed text frames.
//!
//! Every message on the coordinator socket, in either direction, is a 4-byte
//! big-endian payload length followed by that many bytes of UTF-8 text.

use crate::utils::error::{GossipError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const PREFIX_LEN: usize = 4;
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

fn prefix_for(text: &str) -> Result<[u8; PREFIX_LEN]> {
    let len = u32::try_from(text.len()).map_err(|_| GossipError::FrameTooLarge {
        len: text.len(),
        max: u32::MAX as usize,
    })?;
    Ok(len.to_be_bytes())
}

pub fn encode_frame(text: &str) -> Result<Vec<u8>> {
    let prefix = prefix_for(text)?;
    let mut buf = Vec::with_capacity(PREFIX_LEN + text.len());
    buf.extend_from_slice(&prefix);
    buf.extend_from_slice(text.as_bytes());
    Ok(buf)
}

pub async fn write_frame<W>(writer: &mut W, text: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let prefix = prefix_for(text)?;
    writer.write_all(&prefix).await?;
    writer.write_all(text.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame, refusing payloads longer than `max_len` before
/// allocating for them.
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; PREFIX_LEN];
    read_exact_or_closed(reader, &mut prefix).await?;

    let len = u32::from_be_bytes(prefix) as usize;
    if len > max_len {
        return Err(GossipError::FrameTooLarge { len, max: max_len });
    }
    tracing::debug!("Expected frame length: {} bytes", len);

    let mut payload = vec![0u8; len];
    read_exact_or_closed(reader, &mut payload).await?;

    Ok(String::from_utf8(payload)?)
}

async fn read_exact_or_closed<R>(reader: &mut R, buf: &mut [u8]) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(GossipError::ConnectionClosed)
        }
        Err(e) => Err(e.into()),
    }
}
