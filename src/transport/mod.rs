use crate::protocol::Message;

/// An ordered, reliable message channel to a peer.
///
/// `recv` resolves to `Ok(None)` when the peer closes cleanly between
/// frames; any other shortfall is an error.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Option<Message>>;
}

pub mod in_memory;
pub mod tcp;
