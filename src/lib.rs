pub mod client;
pub mod game;
mod logging;
pub mod protocol;
pub mod server;
pub mod transport;
pub mod wire;

pub use game::*;
pub use logging::init_logging;
pub use protocol::*;
pub use server::{Registry, Server};
pub use transport::tcp::TcpTransport;
pub use wire::{read_frame, write_frame, WireError, MAX_FRAME_LEN};
