//! Game state and rules: per-player grids, piece placement, moves, turn
//! order and win detection.

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Zero-based board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{x: {}, y: {}}}", self.x, self.y)
    }
}

/// State of a single grid cell.
///
/// A cell transitions `Empty` to `HitEmpty` or `Ship` to `HitShip` exactly
/// once; a cell already hit cannot be targeted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Ship,
    HitShip,
    HitEmpty,
}

impl Cell {
    /// Numeric code used in the grid rows of a game-state message.
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// The five piece classes. Length is a fixed function of the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    PatrolBoat,
    Destroyer,
    Submarine,
    Battleship,
    AircraftCarrier,
}

impl PieceKind {
    /// Every kind, in wire-code order.
    pub const ALL: [PieceKind; 5] = [
        PieceKind::PatrolBoat,
        PieceKind::Destroyer,
        PieceKind::Submarine,
        PieceKind::Battleship,
        PieceKind::AircraftCarrier,
    ];

    /// Number of cells the piece occupies.
    pub fn length(self) -> i32 {
        match self {
            PieceKind::PatrolBoat => 2,
            PieceKind::Destroyer => 3,
            PieceKind::Submarine => 3,
            PieceKind::Battleship => 4,
            PieceKind::AircraftCarrier => 5,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Look up the kind for a raw wire code.
    pub fn from_code(code: i32) -> Result<Self, GameError> {
        usize::try_from(code)
            .ok()
            .and_then(|i| PieceKind::ALL.get(i).copied())
            .ok_or(GameError::UnknownPiece(code))
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::PatrolBoat => "PatrolBoat",
            PieceKind::Destroyer => "Destroyer",
            PieceKind::Submarine => "Submarine",
            PieceKind::Battleship => "Battleship",
            PieceKind::AircraftCarrier => "AircraftCarrier",
        };
        f.write_str(name)
    }
}

/// A placed piece. `start` and `end` are stored normalized, so `start` never
/// exceeds `end` along the axis the piece runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub start: Coord,
    pub end: Coord,
}

impl Piece {
    pub fn length(&self) -> i32 {
        self.kind.length()
    }
}

/// One of the two players of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Look up the player for a raw wire code.
    pub fn from_code(code: i32) -> Result<Self, GameError> {
        match code {
            0 => Ok(Player::One),
            1 => Ok(Player::Two),
            _ => Err(GameError::UnknownPlayer(code)),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => f.write_str("Player1"),
            Player::Two => f.write_str("Player2"),
        }
    }
}

/// Errors returned by game operations. A failed operation never mutates the
/// game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Wire code with no corresponding piece kind.
    UnknownPiece(i32),
    /// Wire code with no corresponding player.
    UnknownPlayer(i32),
    /// Placement start coordinate is off the board.
    StartOutOfBounds(Coord),
    /// Placement end coordinate is off the board.
    EndOutOfBounds(Coord),
    /// The segment is not straight, or its length does not match the piece.
    BadSpan {
        kind: PieceKind,
        start: Coord,
        end: Coord,
    },
    /// Another piece already occupies a cell of the segment.
    Obstructed { at: Coord },
    /// A move was attempted by the player who does not hold the turn.
    OutOfTurn { player: Player, current: Player },
    /// Move target is off the board.
    OutOfBounds(Coord),
    /// Move target was already hit earlier in the game.
    AlreadyTargeted(Coord),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::UnknownPiece(code) => write!(f, "piece code {} is not a known piece", code),
            GameError::UnknownPlayer(code) => write!(f, "player code {} is not a player", code),
            GameError::StartOutOfBounds(at) => write!(f, "start coordinate {} is off the board", at),
            GameError::EndOutOfBounds(at) => write!(f, "end coordinate {} is off the board", at),
            GameError::BadSpan { kind, start, end } => write!(
                f,
                "invalid start {} and end {} for a {} of length {}",
                start,
                end,
                kind,
                kind.length()
            ),
            GameError::Obstructed { at } => {
                write!(f, "a piece already placed at {} obstructs the segment", at)
            }
            GameError::OutOfTurn { player, current } => write!(
                f,
                "cannot execute a move for {}, currently {}'s turn",
                player, current
            ),
            GameError::OutOfBounds(at) => write!(f, "move coordinate {} is off the board", at),
            GameError::AlreadyTargeted(at) => {
                write!(f, "move at {} has already been executed before", at)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// A single two-player game: one grid per player, the placed pieces, the
/// players' names and the turn indicator.
///
/// Each grid records that player's own ship cells and the hits landed
/// against them by the opponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    size: Coord,
    grids: [Vec<Vec<Cell>>; 2],
    names: [Option<String>; 2],
    pieces: [Vec<Piece>; 2],
    turn: Player,
}

impl Game {
    /// Create a game with two empty `width` x `height` grids. Player one
    /// holds the first turn.
    pub fn new(width: i32, height: i32) -> Self {
        let grid = vec![vec![Cell::Empty; width as usize]; height as usize];
        Self {
            size: Coord::new(width, height),
            grids: [grid.clone(), grid],
            names: [None, None],
            pieces: [Vec::new(), Vec::new()],
            turn: Player::One,
        }
    }

    /// Place a piece on `player`'s own grid.
    ///
    /// The segment must lie on the board, run straight along a row or
    /// column, span exactly the piece's length, and touch no cell that
    /// already holds a ship.
    pub fn set_piece(
        &mut self,
        player: Player,
        start: Coord,
        end: Coord,
        kind: PieceKind,
    ) -> Result<(), GameError> {
        if !self.in_bounds(start) {
            return Err(GameError::StartOutOfBounds(start));
        }
        if !self.in_bounds(end) {
            return Err(GameError::EndOutOfBounds(end));
        }
        let span = kind.length() - 1;
        let (mut start, mut end) = (start, end);
        let grid = &mut self.grids[player.index()];

        if start.x == end.x && (start.y - end.y).abs() == span {
            if end.y < start.y {
                core::mem::swap(&mut start, &mut end);
            }
            for y in start.y..=end.y {
                if grid[y as usize][start.x as usize] != Cell::Empty {
                    return Err(GameError::Obstructed {
                        at: Coord::new(start.x, y),
                    });
                }
            }
            for y in start.y..=end.y {
                grid[y as usize][start.x as usize] = Cell::Ship;
            }
        } else if start.y == end.y && (start.x - end.x).abs() == span {
            if end.x < start.x {
                core::mem::swap(&mut start, &mut end);
            }
            for x in start.x..=end.x {
                if grid[start.y as usize][x as usize] != Cell::Empty {
                    return Err(GameError::Obstructed {
                        at: Coord::new(x, start.y),
                    });
                }
            }
            for x in start.x..=end.x {
                grid[start.y as usize][x as usize] = Cell::Ship;
            }
        } else {
            return Err(GameError::BadSpan { kind, start, end });
        }

        self.pieces[player.index()].push(Piece { kind, start, end });
        Ok(())
    }

    /// Execute `player`'s move against the opponent's grid.
    ///
    /// The turn flips only when the move is accepted. Whether the move hit
    /// anything is not reported; callers read the resulting grid state.
    pub fn make_move(&mut self, player: Player, target: Coord) -> Result<(), GameError> {
        if self.turn != player {
            return Err(GameError::OutOfTurn {
                player,
                current: self.turn,
            });
        }
        if !self.in_bounds(target) {
            return Err(GameError::OutOfBounds(target));
        }
        let cell = &mut self.grids[player.opponent().index()][target.y as usize][target.x as usize];
        *cell = match *cell {
            Cell::Empty => Cell::HitEmpty,
            Cell::Ship => Cell::HitShip,
            Cell::HitShip | Cell::HitEmpty => return Err(GameError::AlreadyTargeted(target)),
        };
        self.turn = self.turn.opponent();
        Ok(())
    }

    /// True once both players are named and each has placed every distinct
    /// piece kind at least once. Duplicate placements of a kind are allowed
    /// but do not advance readiness.
    pub fn is_ready_to_start(&self) -> bool {
        self.names.iter().all(|name| name.is_some())
            && self.pieces.iter().all(|placed| {
                PieceKind::ALL
                    .iter()
                    .all(|kind| placed.iter().any(|p| p.kind == *kind))
            })
    }

    /// Assign `player`'s display name, overwriting any previous one.
    pub fn set_player(&mut self, player: Player, name: impl Into<String>) {
        self.names[player.index()] = Some(name.into());
    }

    /// True when no un-hit ship cell remains on the opponent's grid. An
    /// opponent who never placed a ship satisfies this trivially.
    pub fn has_player_won(&self, player: Player) -> bool {
        self.grids[player.opponent().index()]
            .iter()
            .flatten()
            .all(|cell| *cell != Cell::Ship)
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.x < self.size.x && coord.y >= 0 && coord.y < self.size.y
    }

    pub fn size(&self) -> Coord {
        self.size
    }

    pub fn current_turn(&self) -> Player {
        self.turn
    }

    pub fn player_name(&self, player: Player) -> Option<&str> {
        self.names[player.index()].as_deref()
    }

    /// The player's grid, indexed `[row][col]` (row = y, col = x).
    pub fn grid(&self, player: Player) -> &[Vec<Cell>] {
        &self.grids[player.index()]
    }

    pub fn pieces(&self, player: Player) -> &[Piece] {
        &self.pieces[player.index()]
    }

    /// The player's grid as numeric cell codes, row by row, as carried in a
    /// game-state message.
    pub fn grid_codes(&self, player: Player) -> Vec<Vec<i32>> {
        self.grids[player.index()]
            .iter()
            .map(|row| row.iter().map(|cell| cell.code()).collect())
            .collect()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Size: x: {}, y: {}", self.size.x, self.size.y)?;
        writeln!(
            f,
            "Players: 1: {}, 2: {}",
            self.player_name(Player::One).unwrap_or("<none>"),
            self.player_name(Player::Two).unwrap_or("<none>"),
        )?;
        for player in [Player::One, Player::Two] {
            writeln!(f, "{} pieces:", player)?;
            for piece in self.pieces(player) {
                writeln!(f, "\t{} {} -> {}", piece.kind, piece.start, piece.end)?;
            }
        }
        for player in [Player::One, Player::Two] {
            writeln!(f, "{} grid:", player)?;
            for row in self.grid(player) {
                write!(f, "\t")?;
                for cell in row {
                    write!(f, "{}", cell.code())?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Cloneable handle to a game shared between connection tasks.
///
/// Mutations funnel through the write lock, so at most one is in flight per
/// game; queries share the read lock and never overlap a mutation.
#[derive(Clone)]
pub struct SharedGame {
    inner: Arc<RwLock<Game>>,
}

impl SharedGame {
    pub fn new(game: Game) -> Self {
        Self {
            inner: Arc::new(RwLock::new(game)),
        }
    }

    pub async fn set_piece(
        &self,
        player: Player,
        start: Coord,
        end: Coord,
        kind: PieceKind,
    ) -> Result<(), GameError> {
        self.inner.write().await.set_piece(player, start, end, kind)
    }

    pub async fn make_move(&self, player: Player, target: Coord) -> Result<(), GameError> {
        self.inner.write().await.make_move(player, target)
    }

    pub async fn set_player(&self, player: Player, name: impl Into<String>) {
        self.inner.write().await.set_player(player, name);
    }

    pub async fn is_ready_to_start(&self) -> bool {
        self.inner.read().await.is_ready_to_start()
    }

    pub async fn has_player_won(&self, player: Player) -> bool {
        self.inner.read().await.has_player_won(player)
    }

    pub async fn current_turn(&self) -> Player {
        self.inner.read().await.current_turn()
    }

    pub async fn grid_codes(&self, player: Player) -> Vec<Vec<i32>> {
        self.inner.read().await.grid_codes(player)
    }

    /// Copy of the full game state at this instant.
    pub async fn snapshot(&self) -> Game {
        self.inner.read().await.clone()
    }
}
