use shakmaty::{Color, File, Rank, Role, Square};

use super::phase::PhaseBoundaries;
use super::snapshot::BoardSnapshot;

/// Board coordinate, both components in `0..8`. File 0 is the a-file, rank 0
/// is the first-moving side's back rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub file: u8,
    pub rank: u8,
}

impl Coord {
    pub const fn new(file: u8, rank: u8) -> Self {
        Self { file, rank }
    }

    pub fn from_square(sq: Square) -> Self {
        Self {
            file: sq.file() as u8,
            rank: sq.rank() as u8,
        }
    }

    pub fn square(self) -> Square {
        Square::from_coords(
            File::new(u32::from(self.file)),
            Rank::new(u32::from(self.rank)),
        )
    }

    /// Chebyshev distance, i.e. king steps.
    pub fn distance(self, other: Coord) -> u8 {
        self.file.abs_diff(other.file).max(self.rank.abs_diff(other.rank))
    }

    pub fn is_light(self) -> bool {
        (self.file + self.rank) % 2 == 1
    }

    /// Ranks advanced from the given side's back rank.
    pub fn relative_rank(self, color: Color) -> u8 {
        match color {
            Color::White => self.rank,
            Color::Black => 7 - self.rank,
        }
    }
}

/// Piece letter of a move record. `Castle` is the `O` of `O-O`/`O-O-O`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
    Castle,
}

impl PieceKind {
    /// Uppercase first character names the piece, anything else is a pawn.
    pub fn from_san_token(token: &str) -> Self {
        match token.chars().next() {
            Some('N') => Self::Knight,
            Some('B') => Self::Bishop,
            Some('R') => Self::Rook,
            Some('Q') => Self::Queen,
            Some('K') => Self::King,
            Some('O') | Some('0') => Self::Castle,
            _ => Self::Pawn,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
            Self::Castle => 'O',
        }
    }

    pub fn role(self) -> Option<Role> {
        match self {
            Self::Pawn => Some(Role::Pawn),
            Self::Knight => Some(Role::Knight),
            Self::Bishop => Some(Role::Bishop),
            Self::Rook => Some(Role::Rook),
            Self::Queen => Some(Role::Queen),
            Self::King => Some(Role::King),
            Self::Castle => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    None,
    EnPassant,
    Promotion(Role),
    CastleShort,
    CastleLong,
}

impl Special {
    pub fn marker(self) -> String {
        match self {
            Self::None => String::new(),
            Self::EnPassant => "p".to_string(),
            Self::Promotion(role) => role.upper_char().to_string(),
            Self::CastleShort => "O-O".to_string(),
            Self::CastleLong => "O-O-O".to_string(),
        }
    }

    pub fn is_castle(self) -> bool {
        matches!(self, Self::CastleShort | Self::CastleLong)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMarker {
    None,
    Check,
    Mate,
}

impl CheckMarker {
    pub fn marker(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Check => "+",
            Self::Mate => "#",
        }
    }

    pub fn is_check(self) -> bool {
        self != Self::None
    }
}

/// One resolved half-move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub ply: usize,
    pub piece: PieceKind,
    pub from: Coord,
    pub to: Coord,
    pub capture: Option<Role>,
    pub special: Special,
    pub check: CheckMarker,
}

impl MoveRecord {
    pub fn color(&self) -> Color {
        ply_color(self.ply)
    }

    /// Letter of the captured piece, empty when nothing was taken.
    pub fn capture_marker(&self) -> String {
        self.capture
            .map(|role| role.upper_char().to_string())
            .unwrap_or_default()
    }

    /// The role that actually travelled. Castling reports the king.
    pub fn moved_role(&self) -> Role {
        self.piece.role().unwrap_or(Role::King)
    }
}

pub fn ply_color(ply: usize) -> Color {
    if ply % 2 == 0 { Color::White } else { Color::Black }
}

/// Header fields located in the raw game text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameHeader {
    pub game_id: String,
    pub white: String,
    pub black: String,
    pub eco: String,
    pub time_control: String,
}

/// A replayed game. Built once, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub header: GameHeader,
    pub white_moves: Vec<MoveRecord>,
    pub black_moves: Vec<MoveRecord>,
    pub snapshots: Vec<BoardSnapshot>,
    pub phases: PhaseBoundaries,
}

impl GameRecord {
    pub fn plies(&self) -> usize {
        self.snapshots.len()
    }

    pub fn move_at(&self, ply: usize) -> Option<&MoveRecord> {
        if ply % 2 == 0 {
            self.white_moves.get(ply / 2)
        } else {
            self.black_moves.get(ply / 2)
        }
    }

    /// All moves in ply order.
    pub fn moves(&self) -> impl Iterator<Item = &MoveRecord> + '_ {
        (0..self.plies()).filter_map(|ply| self.move_at(ply))
    }

    pub fn side_moves(&self, color: Color) -> &[MoveRecord] {
        match color {
            Color::White => &self.white_moves,
            Color::Black => &self.black_moves,
        }
    }

    pub fn last_ply(&self) -> usize {
        self.plies().saturating_sub(1)
    }
}

pub fn piece_value(role: Role) -> u32 {
    match role {
        Role::Pawn => 1,
        Role::Knight | Role::Bishop => 3,
        Role::Rook => 5,
        Role::Queen => 9,
        Role::King => 100,
    }
}

/// Material without the king.
pub fn material_value(role: Role) -> u32 {
    if role == Role::King { 0 } else { piece_value(role) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_square_conversion() {
        let d4 = Coord::new(3, 3);
        assert_eq!(d4.square(), Square::D4);
        assert_eq!(Coord::from_square(Square::H8), Coord::new(7, 7));
    }

    #[test]
    fn test_coord_distance_and_color() {
        assert_eq!(Coord::new(0, 0).distance(Coord::new(3, 5)), 5);
        assert!(!Coord::new(0, 0).is_light());
        assert!(Coord::new(7, 0).is_light());
        assert_eq!(Coord::new(4, 6).relative_rank(Color::Black), 1);
    }

    #[test]
    fn test_piece_kind_from_token() {
        assert_eq!(PieceKind::from_san_token("exd5"), PieceKind::Pawn);
        assert_eq!(PieceKind::from_san_token("Nbd7"), PieceKind::Knight);
        assert_eq!(PieceKind::from_san_token("O-O-O+"), PieceKind::Castle);
        assert_eq!(PieceKind::from_san_token("e8=Q"), PieceKind::Pawn);
    }

    #[test]
    fn test_special_markers() {
        assert_eq!(Special::Promotion(Role::Knight).marker(), "N");
        assert_eq!(Special::EnPassant.marker(), "p");
        assert_eq!(Special::CastleLong.marker(), "O-O-O");
        assert_eq!(Special::None.marker(), "");
    }
}
