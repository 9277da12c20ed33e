use shakmaty::{Color, Role, attacks};

use super::knights::role_mobility;
use super::{Aggregator, FeatureSet, GameView, OWN};
use crate::chess::snapshot::BoardSnapshot;
use crate::chess::types::Coord;

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "rooks",
    keys: &[
        "wr_back_rank",
        "wr_open_file",
        "wr_semi_open_file",
        "wr_doubled",
        "wr_mobility",
    ],
    compute,
};

fn rooks(snap: &BoardSnapshot, color: Color) -> &[Coord] {
    snap.pieces(color).of(Role::Rook)
}

fn has_pawn_on_file(snap: &BoardSnapshot, color: Color, file: u8) -> bool {
    snap.pieces(color).of(Role::Pawn).iter().any(|p| p.file == file)
}

pub fn back_rank_rooks(snap: &BoardSnapshot, color: Color) -> usize {
    rooks(snap, color)
        .iter()
        .filter(|r| r.relative_rank(color) == 0)
        .count()
}

/// Rooks on files without pawns of either side.
pub fn open_file_rooks(snap: &BoardSnapshot, color: Color) -> usize {
    rooks(snap, color)
        .iter()
        .filter(|r| !has_pawn_on_file(snap, color, r.file) && !has_pawn_on_file(snap, !color, r.file))
        .count()
}

/// Rooks on files with enemy pawns only.
pub fn semi_open_file_rooks(snap: &BoardSnapshot, color: Color) -> usize {
    rooks(snap, color)
        .iter()
        .filter(|r| !has_pawn_on_file(snap, color, r.file) && has_pawn_on_file(snap, !color, r.file))
        .count()
}

/// A rook sees another rook or queen of its own side along its file.
pub fn is_doubled(snap: &BoardSnapshot, color: Color) -> bool {
    let index = snap.pieces(color);
    let occupied = snap.board().occupied();
    let partners: Vec<Coord> = index
        .of(Role::Rook)
        .iter()
        .chain(index.of(Role::Queen))
        .copied()
        .collect();

    index.of(Role::Rook).iter().any(|rook| {
        partners.iter().any(|other| {
            other != rook
                && other.file == rook.file
                && (attacks::between(rook.square(), other.square()) & occupied).is_empty()
        })
    })
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let mid = view.windows.mid;
    vec![
        (
            "wr_back_rank",
            view.window_avg(view.windows.early, |s| back_rank_rooks(s, OWN) as f64),
        ),
        (
            "wr_open_file",
            view.window_avg(mid, |s| open_file_rooks(s, OWN) as f64),
        ),
        (
            "wr_semi_open_file",
            view.window_avg(mid, |s| semi_open_file_rooks(s, OWN) as f64),
        ),
        ("wr_doubled", view.window_fraction(mid, |s| is_doubled(s, OWN))),
        (
            "wr_mobility",
            view.window_avg(mid, |s| role_mobility(s, Role::Rook, OWN)),
        ),
    ]
}
