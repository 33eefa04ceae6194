//! TCP listener and the per-connection read loops.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::protocol::Message;
use crate::transport::tcp::TcpTransport;
use crate::transport::Transport;

/// Address the server listens on when none is given.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8888";

/// Live-connection bookkeeping. Guarded by its own lock, independent of any
/// game's lock.
#[derive(Default)]
pub struct Registry {
    next_id: AtomicU64,
    conns: Mutex<Vec<(u64, SocketAddr)>>,
}

impl Registry {
    /// Record a connection, returning the id to release it with.
    pub fn add(&self, addr: SocketAddr) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.conns.lock().unwrap().push((id, addr));
        id
    }

    pub fn remove(&self, id: u64) {
        self.conns.lock().unwrap().retain(|(conn_id, _)| *conn_id != id);
    }

    pub fn list(&self) -> Vec<SocketAddr> {
        self.conns.lock().unwrap().iter().map(|(_, addr)| *addr).collect()
    }

    pub fn len(&self) -> usize {
        self.conns.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Accepts connections and runs one read loop per connection.
pub struct Server {
    listener: TcpListener,
    registry: Arc<Registry>,
}

impl Server {
    /// Bind the listener without accepting anything yet.
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            registry: Arc::new(Registry::default()),
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared handle to the connection registry.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Accept connections until the listener itself fails. A single
    /// connection's error ends that connection alone.
    pub async fn run(self) -> anyhow::Result<()> {
        log::info!("listening on {}", self.listener.local_addr()?);
        loop {
            let (stream, addr) = self.listener.accept().await?;
            log::info!("accepting new connection from {}", addr);
            let registry = self.registry.clone();
            let id = registry.add(addr);
            tokio::spawn(async move {
                match handle_connection(stream).await {
                    Ok(()) => log::info!("connection from {} closed", addr),
                    Err(e) => log::error!("connection from {}: {}", addr, e),
                }
                registry.remove(id);
            });
        }
    }
}

/// Decode frames until the peer closes. A decode failure is terminal for
/// this connection and is never retried.
async fn handle_connection(stream: TcpStream) -> anyhow::Result<()> {
    let mut transport = TcpTransport::new(stream);
    while let Some(msg) = transport.recv().await? {
        log::info!("message received: {:?}", msg);
        dispatch(&msg);
    }
    Ok(())
}

/// Session wiring attaches here. Every kind is matched so the compiler
/// flags a new variant; no message currently drives any action.
fn dispatch(msg: &Message) {
    match msg {
        Message::Ping => {}
        Message::Ok { .. } => {}
        Message::Error { .. } => {}
        Message::GameMove { .. } => {}
        Message::ChatMessage { .. } => {}
        Message::Connect { .. } => {}
        Message::RequestOpenGamesList => {}
        Message::CreateGame => {}
        Message::JoinGame { .. } => {}
        Message::AcceptGame { .. } => {}
        Message::RejectGame { .. } => {}
        Message::GameSetPiece { .. } => {}
        Message::RequestGameState => {}
        Message::AbandonGame => {}
        Message::OpenGamesList { .. } => {}
        Message::GamePreGameStatus { .. } => {}
        Message::GameState { .. } => {}
        Message::GameWon => {}
        Message::GameLost => {}
    }
}
