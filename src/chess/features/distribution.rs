use super::{Aggregator, FeatureSet, GameView, ratio};
use crate::chess::types::{MoveRecord, PieceKind};

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "distribution",
    keys: &["wmv_p", "wmv_n", "wmv_b", "wmv_r", "wmv_q", "wmv_k"],
    compute,
};

/// Moves per piece kind in `P N B R Q K` order. A castle moves king and rook.
pub fn piece_move_counts(moves: &[MoveRecord]) -> [usize; 6] {
    let mut counts = [0; 6];
    for m in moves {
        match m.piece {
            PieceKind::Pawn => counts[0] += 1,
            PieceKind::Knight => counts[1] += 1,
            PieceKind::Bishop => counts[2] += 1,
            PieceKind::Rook => counts[3] += 1,
            PieceKind::Queen => counts[4] += 1,
            PieceKind::King => counts[5] += 1,
            PieceKind::Castle => {
                counts[3] += 1;
                counts[5] += 1;
            }
        }
    }
    counts
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let counts = piece_move_counts(view.own_moves());
    let total = counts.iter().sum::<usize>() as f64;
    AGGREGATOR
        .keys
        .iter()
        .zip(counts)
        .map(|(&key, n)| (key, ratio(n as f64, total, 0.0)))
        .collect()
}
