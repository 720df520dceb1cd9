use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::transport::Transport;

/// One end of an in-process frame pipe.
pub struct InMemoryTransport {
    recv_queue: UnboundedReceiver<String>,
    send_queue: Option<UnboundedSender<String>>,
}

impl InMemoryTransport {
    pub fn pair() -> (Self, Self) {
        let (tx1, rx1) = unbounded_channel();
        let (tx2, rx2) = unbounded_channel();
        (
            Self {
                recv_queue: rx1,
                send_queue: Some(tx2),
            },
            Self {
                recv_queue: rx2,
                send_queue: Some(tx1),
            },
        )
    }
}

#[async_trait::async_trait]
impl Transport for InMemoryTransport {
    async fn send(&mut self, frame: &str) -> anyhow::Result<()> {
        let queue = self
            .send_queue
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Transport is closed"))?;
        queue
            .send(frame.to_string())
            .map_err(|_| anyhow::anyhow!("Channel closed"))
    }

    async fn recv(&mut self) -> anyhow::Result<Option<String>> {
        Ok(self.recv_queue.recv().await)
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.send_queue = None;
        self.recv_queue.close();
        Ok(())
    }
}
