//! Binary framing and payload codec for [`Message`].
//!
//! A frame is `[4-byte big-endian payload length][1-byte tag][payload]`.
//! Tag-only messages carry an empty payload; every other message carries a
//! JSON record of the variant's fields.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::game::Coord;
use crate::protocol::{Message, MessageKind, OpenGame};

/// Upper bound on a declared payload length. A frame announcing more than
/// this is rejected before any allocation.
pub const MAX_FRAME_LEN: u32 = 10_000_000;

/// Errors produced while framing, encoding or decoding messages.
#[derive(Debug)]
pub enum WireError {
    /// Stream ended after a frame began but before its declared end.
    Truncated { expected: usize, got: usize },
    /// Tag byte with no corresponding message kind.
    UnknownTag(u8),
    /// Payload did not parse as the shape the tag requires.
    BadPayload {
        kind: MessageKind,
        payload: Vec<u8>,
        source: serde_json::Error,
    },
    /// Declared payload length exceeds [`MAX_FRAME_LEN`].
    Oversized { len: u32, max: u32 },
    /// A message failed to serialize.
    Encode(serde_json::Error),
    /// Underlying transport failure.
    Io(io::Error),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Truncated { expected, got } => write!(
                f,
                "stream ended mid-frame: expected {} bytes, received {}",
                expected, got
            ),
            WireError::UnknownTag(tag) => write!(f, "unknown message tag {}", tag),
            WireError::BadPayload { kind, payload, .. } => write!(
                f,
                "cannot decode payload: expected a {:?} message but received {}",
                kind,
                String::from_utf8_lossy(payload)
            ),
            WireError::Oversized { len, max } => write!(
                f,
                "declared payload of {} bytes exceeds the {} byte limit",
                len, max
            ),
            WireError::Encode(e) => write!(f, "cannot encode message: {}", e),
            WireError::Io(e) => write!(f, "transport error: {}", e),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WireError::BadPayload { source, .. } => Some(source),
            WireError::Encode(e) => Some(e),
            WireError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WireError {
    fn from(e: io::Error) -> Self {
        WireError::Io(e)
    }
}

// Payload bodies. A field-bearing variant serializes as a JSON record of
// exactly these fields; the same body type drives both directions.

#[derive(Serialize, Deserialize)]
struct OkBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ok: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct MoveBody {
    player: i32,
    x: i32,
    y: i32,
}

#[derive(Serialize, Deserialize)]
struct ChatBody {
    msg: String,
}

#[derive(Serialize, Deserialize)]
struct ConnectBody {
    username: String,
}

#[derive(Serialize, Deserialize)]
struct IdBody {
    id: i32,
}

#[derive(Serialize, Deserialize)]
struct PieceBody {
    piece: i32,
    start: Coord,
    end: Coord,
}

#[derive(Serialize, Deserialize)]
struct GamesBody {
    games: Vec<OpenGame>,
}

#[derive(Serialize, Deserialize)]
struct PreGameBody {
    id: i32,
    opponent: String,
}

#[derive(Serialize, Deserialize)]
struct StateBody {
    p1: String,
    p2: String,
    you: Vec<Vec<i32>>,
    opponent: Vec<Vec<i32>>,
}

/// Serialize a message to its wire tag and payload bytes.
pub fn encode(msg: &Message) -> Result<(u8, Vec<u8>), WireError> {
    let payload = match msg {
        Message::Ping
        | Message::RequestOpenGamesList
        | Message::CreateGame
        | Message::RequestGameState
        | Message::AbandonGame
        | Message::GameWon
        | Message::GameLost => Vec::new(),
        Message::Ok { ok } => to_vec(&OkBody { ok: ok.clone() })?,
        Message::Error { error } => to_vec(&ErrorBody {
            error: error.clone(),
        })?,
        Message::GameMove { player, x, y } => to_vec(&MoveBody {
            player: *player,
            x: *x,
            y: *y,
        })?,
        Message::ChatMessage { msg } => to_vec(&ChatBody { msg: msg.clone() })?,
        Message::Connect { username } => to_vec(&ConnectBody {
            username: username.clone(),
        })?,
        Message::JoinGame { id } | Message::AcceptGame { id } | Message::RejectGame { id } => {
            to_vec(&IdBody { id: *id })?
        }
        Message::GameSetPiece { piece, start, end } => to_vec(&PieceBody {
            piece: *piece,
            start: *start,
            end: *end,
        })?,
        Message::OpenGamesList { games } => to_vec(&GamesBody {
            games: games.clone(),
        })?,
        Message::GamePreGameStatus { id, opponent } => to_vec(&PreGameBody {
            id: *id,
            opponent: opponent.clone(),
        })?,
        Message::GameState {
            p1,
            p2,
            you,
            opponent,
        } => to_vec(&StateBody {
            p1: p1.clone(),
            p2: p2.clone(),
            you: you.clone(),
            opponent: opponent.clone(),
        })?,
    };
    Ok((msg.kind().code(), payload))
}

/// Rebuild a message from its wire tag and payload bytes.
///
/// Tag-only kinds ignore the payload entirely; field-bearing kinds must
/// parse, or the error names the expected kind and carries the raw bytes.
pub fn decode(tag: u8, payload: &[u8]) -> Result<Message, WireError> {
    let kind = MessageKind::from_code(tag).ok_or(WireError::UnknownTag(tag))?;
    let msg = match kind {
        MessageKind::Ping => Message::Ping,
        MessageKind::RequestOpenGamesList => Message::RequestOpenGamesList,
        MessageKind::CreateGame => Message::CreateGame,
        MessageKind::RequestGameState => Message::RequestGameState,
        MessageKind::AbandonGame => Message::AbandonGame,
        MessageKind::GameWon => Message::GameWon,
        MessageKind::GameLost => Message::GameLost,
        MessageKind::Ok => {
            let OkBody { ok } = parse(kind, payload)?;
            Message::Ok { ok }
        }
        MessageKind::Error => {
            let ErrorBody { error } = parse(kind, payload)?;
            Message::Error { error }
        }
        MessageKind::GameMove => {
            let MoveBody { player, x, y } = parse(kind, payload)?;
            Message::GameMove { player, x, y }
        }
        MessageKind::ChatMessage => {
            let ChatBody { msg } = parse(kind, payload)?;
            Message::ChatMessage { msg }
        }
        MessageKind::Connect => {
            let ConnectBody { username } = parse(kind, payload)?;
            Message::Connect { username }
        }
        MessageKind::JoinGame => {
            let IdBody { id } = parse(kind, payload)?;
            Message::JoinGame { id }
        }
        MessageKind::AcceptGame => {
            let IdBody { id } = parse(kind, payload)?;
            Message::AcceptGame { id }
        }
        MessageKind::RejectGame => {
            let IdBody { id } = parse(kind, payload)?;
            Message::RejectGame { id }
        }
        MessageKind::GameSetPiece => {
            let PieceBody { piece, start, end } = parse(kind, payload)?;
            Message::GameSetPiece { piece, start, end }
        }
        MessageKind::OpenGamesList => {
            let GamesBody { games } = parse(kind, payload)?;
            Message::OpenGamesList { games }
        }
        MessageKind::GamePreGameStatus => {
            let PreGameBody { id, opponent } = parse(kind, payload)?;
            Message::GamePreGameStatus { id, opponent }
        }
        MessageKind::GameState => {
            let StateBody {
                p1,
                p2,
                you,
                opponent,
            } = parse(kind, payload)?;
            Message::GameState {
                p1,
                p2,
                you,
                opponent,
            }
        }
    };
    Ok(msg)
}

fn to_vec<T: Serialize>(body: &T) -> Result<Vec<u8>, WireError> {
    serde_json::to_vec(body).map_err(WireError::Encode)
}

fn parse<'de, T: Deserialize<'de>>(
    kind: MessageKind,
    payload: &'de [u8],
) -> Result<T, WireError> {
    serde_json::from_slice(payload).map_err(|source| WireError::BadPayload {
        kind,
        payload: payload.to_vec(),
        source,
    })
}

/// Write one frame: length, tag, payload, as a single write.
pub async fn write_frame<W>(w: &mut W, msg: &Message) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    let (tag, payload) = encode(msg)?;
    let len = u32::try_from(payload.len()).unwrap_or(u32::MAX);
    if len > MAX_FRAME_LEN {
        return Err(WireError::Oversized {
            len,
            max: MAX_FRAME_LEN,
        });
    }
    let mut frame = Vec::with_capacity(5 + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.push(tag);
    frame.extend_from_slice(&payload);
    w.write_all(&frame).await?;
    w.flush().await?;
    Ok(())
}

/// Read one frame and decode it.
///
/// Returns `Ok(None)` when the stream ends cleanly on a frame boundary. A
/// stream ending anywhere inside a frame is [`WireError::Truncated`], never
/// a clean close, and a partially decoded message is never surfaced.
pub async fn read_frame<R>(r: &mut R) -> Result<Option<Message>, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match read_full(r, &mut len_buf).await? {
        0 => return Ok(None),
        4 => {}
        got => return Err(WireError::Truncated { expected: 4, got }),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_LEN {
        return Err(WireError::Oversized {
            len,
            max: MAX_FRAME_LEN,
        });
    }

    let mut tag_buf = [0u8; 1];
    if read_full(r, &mut tag_buf).await? == 0 {
        return Err(WireError::Truncated {
            expected: 5,
            got: 4,
        });
    }

    let mut payload = vec![0u8; len as usize];
    let got = read_full(r, &mut payload).await?;
    if got < payload.len() {
        return Err(WireError::Truncated {
            expected: len as usize,
            got,
        });
    }
    decode(tag_buf[0], &payload).map(Some)
}

/// Fill `buf` from the stream, stopping early only at end of input. Returns
/// the number of bytes actually read.
async fn read_full<R>(r: &mut R, buf: &mut [u8]) -> Result<usize, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = r.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
