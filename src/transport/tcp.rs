use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::transport::Transport;

/// Default maximum frame length in bytes, newline excluded.
pub const DEFAULT_MAX_FRAME_LEN: usize = 4096;

/// Newline-delimited text frames over a TCP stream.
pub struct TcpTransport {
    stream: TcpStream,
    buf: Vec<u8>,
    max_frame_len: usize,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_max_frame_len(stream, DEFAULT_MAX_FRAME_LEN)
    }

    pub fn with_max_frame_len(stream: TcpStream, max_frame_len: usize) -> Self {
        Self {
            stream,
            buf: Vec::new(),
            max_frame_len,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// Pop the next complete line out of the read buffer.
    fn take_frame(&mut self) -> anyhow::Result<Option<String>> {
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.len() > self.max_frame_len {
                return Err(frame_too_large(line.len(), self.max_frame_len));
            }
            if line.is_empty() {
                continue;
            }
            return String::from_utf8(line)
                .map(Some)
                .map_err(|e| anyhow::anyhow!("Frame is not valid UTF-8: {}", e));
        }
        if self.buf.len() > self.max_frame_len {
            return Err(frame_too_large(self.buf.len(), self.max_frame_len));
        }
        Ok(None)
    }
}

fn frame_too_large(len: usize, max: usize) -> anyhow::Error {
    anyhow::anyhow!("Frame too large: {} bytes (max: {})", len, max)
}

fn map_io(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer"),
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, frame: &str) -> anyhow::Result<()> {
        if frame.len() > self.max_frame_len {
            return Err(frame_too_large(frame.len(), self.max_frame_len));
        }
        let mut data = Vec::with_capacity(frame.len() + 1);
        data.extend_from_slice(frame.as_bytes());
        data.push(b'\n');
        self.stream.write_all(&data).await.map_err(map_io)
    }

    async fn recv(&mut self) -> anyhow::Result<Option<String>> {
        loop {
            if let Some(frame) = self.take_frame()? {
                return Ok(Some(frame));
            }
            // `read_buf` is cancel safe; partial lines stay in `self.buf`.
            let n = self.stream.read_buf(&mut self.buf).await.map_err(map_io)?;
            if n == 0 {
                if self.buf.iter().all(|b| b.is_ascii_whitespace()) {
                    return Ok(None);
                }
                return Err(anyhow::anyhow!("Connection closed mid-frame"));
            }
        }
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.stream.shutdown().await.map_err(map_io)
    }
}
