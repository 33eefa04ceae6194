use std::net::SocketAddr;

use tokio::net::{TcpStream, ToSocketAddrs};

use crate::protocol::Message;
use crate::transport::Transport;
use crate::wire;

/// [`Transport`] over a TCP stream, framing messages through [`wire`].
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    pub fn peer_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        wire::write_frame(&mut self.stream, &msg).await?;
        Ok(())
    }

    async fn recv(&mut self) -> anyhow::Result<Option<Message>> {
        Ok(wire::read_frame(&mut self.stream).await?)
    }
}
