use shakmaty::{Color, Role};

use super::bishops::on_long_diagonal;
use super::knights::role_mobility;
use super::{Aggregator, FeatureSet, GameView, OWN, per_piece};
use crate::chess::snapshot::BoardSnapshot;
use crate::chess::types::Coord;

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "queens",
    keys: &[
        "wq_early_aggression",
        "wq_mid_aggression",
        "wq_fianchetto",
        "wq_invasion",
        "wq_mobility",
    ],
    compute,
};

fn queens(snap: &BoardSnapshot, color: Color) -> &[Coord] {
    snap.pieces(color).of(Role::Queen)
}

/// Mean ranks advanced by the queens.
pub fn advancement(snap: &BoardSnapshot, color: Color) -> f64 {
    per_piece(
        queens(snap, color)
            .iter()
            .map(|q| f64::from(q.relative_rank(color))),
    )
}

pub fn is_fianchettoed(snap: &BoardSnapshot, color: Color) -> bool {
    queens(snap, color)
        .iter()
        .any(|&q| on_long_diagonal(q) && q.relative_rank(color) <= 2)
}

pub fn has_invaded(snap: &BoardSnapshot, color: Color) -> bool {
    queens(snap, color).iter().any(|q| q.relative_rank(color) == 7)
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let early = view.windows.early;
    let mid = view.windows.mid;
    vec![
        ("wq_early_aggression", view.window_avg(early, |s| advancement(s, OWN))),
        ("wq_mid_aggression", view.window_avg(mid, |s| advancement(s, OWN))),
        ("wq_fianchetto", view.window_fraction(early, |s| is_fianchettoed(s, OWN))),
        ("wq_invasion", view.window_fraction(mid, |s| has_invaded(s, OWN))),
        (
            "wq_mobility",
            view.window_avg(mid, |s| role_mobility(s, Role::Queen, OWN)),
        ),
    ]
}
