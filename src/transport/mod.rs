/// A bidirectional stream of text frames, one JSON message per frame.
#[async_trait::async_trait]
pub trait Transport: Send {
    async fn send(&mut self, frame: &str) -> anyhow::Result<()>;
    /// Next inbound frame, or `None` once the peer has closed.
    ///
    /// Implementations must be cancel safe: a `recv` dropped before completion
    /// loses no data.
    async fn recv(&mut self) -> anyhow::Result<Option<String>>;
    async fn close(&mut self) -> anyhow::Result<()>;
}

pub mod in_memory;
pub mod tcp;
