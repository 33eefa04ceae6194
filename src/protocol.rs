//! The closed set of messages exchanged between client and server, and the
//! tag table naming each one on the wire.

use serde::{Deserialize, Serialize};

use crate::game::Coord;

/// One joinable game advertised in [`Message::OpenGamesList`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGame {
    pub id: i32,
    pub username: String,
}

/// Messages exchanged between client and server.
///
/// Grouped as common, client-originated and server-originated; the wire tag
/// of each variant is its position in [`MessageKind`]. Equality is
/// structural, field by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Common
    Ping,
    Ok { ok: Option<String> },
    Error { error: Option<String> },
    /// Notification that `player` fired at `(x, y)`.
    GameMove { player: i32, x: i32, y: i32 },
    ChatMessage { msg: String },

    // Client
    Connect { username: String },
    RequestOpenGamesList,
    CreateGame,
    JoinGame { id: i32 },
    AcceptGame { id: i32 },
    RejectGame { id: i32 },
    GameSetPiece { piece: i32, start: Coord, end: Coord },
    RequestGameState,
    AbandonGame,

    // Server
    OpenGamesList { games: Vec<OpenGame> },
    GamePreGameStatus { id: i32, opponent: String },
    GameState {
        p1: String,
        p2: String,
        you: Vec<Vec<i32>>,
        opponent: Vec<Vec<i32>>,
    },
    GameWon,
    GameLost,
}

/// Wire tag of each [`Message`] variant. Tags are sequential, starting at
/// zero, in the order common, client, server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageKind {
    Ping = 0,
    Ok = 1,
    Error = 2,
    GameMove = 3,
    ChatMessage = 4,
    Connect = 5,
    RequestOpenGamesList = 6,
    CreateGame = 7,
    JoinGame = 8,
    AcceptGame = 9,
    RejectGame = 10,
    GameSetPiece = 11,
    RequestGameState = 12,
    AbandonGame = 13,
    OpenGamesList = 14,
    GamePreGameStatus = 15,
    GameState = 16,
    GameWon = 17,
    GameLost = 18,
}

impl MessageKind {
    /// Every kind, in tag order.
    pub const ALL: [MessageKind; 19] = [
        MessageKind::Ping,
        MessageKind::Ok,
        MessageKind::Error,
        MessageKind::GameMove,
        MessageKind::ChatMessage,
        MessageKind::Connect,
        MessageKind::RequestOpenGamesList,
        MessageKind::CreateGame,
        MessageKind::JoinGame,
        MessageKind::AcceptGame,
        MessageKind::RejectGame,
        MessageKind::GameSetPiece,
        MessageKind::RequestGameState,
        MessageKind::AbandonGame,
        MessageKind::OpenGamesList,
        MessageKind::GamePreGameStatus,
        MessageKind::GameState,
        MessageKind::GameWon,
        MessageKind::GameLost,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up the kind for a raw tag byte.
    pub fn from_code(code: u8) -> Option<MessageKind> {
        MessageKind::ALL.get(code as usize).copied()
    }
}

impl Message {
    /// The wire tag of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Ping => MessageKind::Ping,
            Message::Ok { .. } => MessageKind::Ok,
            Message::Error { .. } => MessageKind::Error,
            Message::GameMove { .. } => MessageKind::GameMove,
            Message::ChatMessage { .. } => MessageKind::ChatMessage,
            Message::Connect { .. } => MessageKind::Connect,
            Message::RequestOpenGamesList => MessageKind::RequestOpenGamesList,
            Message::CreateGame => MessageKind::CreateGame,
            Message::JoinGame { .. } => MessageKind::JoinGame,
            Message::AcceptGame { .. } => MessageKind::AcceptGame,
            Message::RejectGame { .. } => MessageKind::RejectGame,
            Message::GameSetPiece { .. } => MessageKind::GameSetPiece,
            Message::RequestGameState => MessageKind::RequestGameState,
            Message::AbandonGame => MessageKind::AbandonGame,
            Message::OpenGamesList { .. } => MessageKind::OpenGamesList,
            Message::GamePreGameStatus { .. } => MessageKind::GamePreGameStatus,
            Message::GameState { .. } => MessageKind::GameState,
            Message::GameWon => MessageKind::GameWon,
            Message::GameLost => MessageKind::GameLost,
        }
    }
}
