//! Frozen per-ply board states.

use shakmaty::fen::Fen;
use shakmaty::{Board, Chess, Color, EnPassantMode, Piece, Position, Role, Square};

use super::types::Coord;

/// Occupancy grid keyed `[file][rank]`.
pub type Grid = [[Option<Piece>; 8]; 8];

/// Locations of one side's pieces, grouped by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceIndex {
    by_role: [Vec<Coord>; 6],
}

impl PieceIndex {
    fn slot(role: Role) -> usize {
        match role {
            Role::Pawn => 0,
            Role::Knight => 1,
            Role::Bishop => 2,
            Role::Rook => 3,
            Role::Queen => 4,
            Role::King => 5,
        }
    }

    pub fn of(&self, role: Role) -> &[Coord] {
        &self.by_role[Self::slot(role)]
    }

    pub fn count(&self, role: Role) -> usize {
        self.of(role).len()
    }

    pub fn king(&self) -> Option<Coord> {
        self.of(Role::King).first().copied()
    }

    /// Knights, bishops, rooks and queens.
    pub fn minor_major(&self) -> impl Iterator<Item = Coord> + '_ {
        [Role::Knight, Role::Bishop, Role::Rook, Role::Queen]
            .into_iter()
            .flat_map(move |role| self.of(role).iter().copied())
    }

    pub fn minors(&self) -> usize {
        self.count(Role::Knight) + self.count(Role::Bishop)
    }

    /// Every piece with its role.
    pub fn iter(&self) -> impl Iterator<Item = (Role, Coord)> + '_ {
        Role::ALL
            .into_iter()
            .flat_map(move |role| self.of(role).iter().map(move |c| (role, *c)))
    }

    pub fn len(&self) -> usize {
        self.by_role.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, role: Role, coord: Coord) {
        self.by_role[Self::slot(role)].push(coord);
    }

    /// Derive both sides' indices from a grid, scanning file-major.
    pub fn from_grid(grid: &Grid) -> (PieceIndex, PieceIndex) {
        let mut white = PieceIndex::default();
        let mut black = PieceIndex::default();
        for (file, column) in grid.iter().enumerate() {
            for (rank, cell) in column.iter().enumerate() {
                if let Some(piece) = cell {
                    let coord = Coord::new(file as u8, rank as u8);
                    match piece.color {
                        Color::White => white.push(piece.role, coord),
                        Color::Black => black.push(piece.role, coord),
                    }
                }
            }
        }
        (white, black)
    }
}

/// The position after one ply.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub ply: usize,
    grid: Grid,
    white: PieceIndex,
    black: PieceIndex,
    fen: String,
    position: Chess,
}

impl BoardSnapshot {
    pub fn freeze(ply: usize, position: &Chess) -> Self {
        let grid = grid_of(position.board());
        let (white, black) = PieceIndex::from_grid(&grid);
        let fen = Fen::from_position(position, EnPassantMode::Legal).to_string();
        Self {
            ply,
            grid,
            white,
            black,
            fen,
            position: position.clone(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn piece_at(&self, coord: Coord) -> Option<Piece> {
        self.grid[coord.file as usize][coord.rank as usize]
    }

    pub fn pieces(&self, color: Color) -> &PieceIndex {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn fen(&self) -> &str {
        &self.fen
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn board(&self) -> &Board {
        self.position.board()
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn king(&self, color: Color) -> Option<Coord> {
        self.pieces(color).king()
    }

    /// Squares attacked by the piece at `coord`, empty board square yields none.
    pub fn attacks_from(&self, coord: Coord) -> shakmaty::Bitboard {
        self.board().attacks_from(coord.square())
    }

    /// Attacked squares not holding a piece of the mover's own color.
    pub fn mobility(&self, coord: Coord, color: Color) -> usize {
        (self.attacks_from(coord) & !self.board().by_color(color)).count()
    }

    /// Material of one side, king excluded.
    pub fn material(&self, color: Color) -> u32 {
        self.pieces(color)
            .iter()
            .map(|(role, _)| super::types::material_value(role))
            .sum()
    }
}

fn grid_of(board: &Board) -> Grid {
    let mut grid: Grid = [[None; 8]; 8];
    for sq in Square::ALL {
        if let Some(piece) = board.piece_at(sq) {
            let coord = Coord::from_square(sq);
            grid[coord.file as usize][coord.rank as usize] = Some(piece);
        }
    }
    grid
}
