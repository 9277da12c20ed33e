use shakmaty::{Color, Role};

use super::{Aggregator, FeatureSet, GameView, OWN, ratio};
use crate::chess::attacks::is_defended;
use crate::chess::snapshot::BoardSnapshot;

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "guarded",
    keys: &["wg_guarded"],
    compute,
};

/// Attacked-but-defended pieces over all non-king pieces of `color`.
pub fn guarded_ratio(snap: &BoardSnapshot, color: Color) -> f64 {
    let board = snap.board();
    let (mut guarded, mut total) = (0usize, 0usize);
    for (role, c) in snap.pieces(color).iter() {
        if role == Role::King {
            continue;
        }
        total += 1;
        let sq = c.square();
        if is_defended(board, sq, !color) && is_defended(board, sq, color) {
            guarded += 1;
        }
    }
    ratio(guarded as f64, total as f64, 0.0)
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    vec![(
        "wg_guarded",
        view.window_avg(view.windows.mid, |s| guarded_ratio(s, OWN)),
    )]
}
