use shakmaty::{Color, Role};

use super::knights::role_mobility;
use super::{Aggregator, FeatureSet, GameView, OPP, OWN, flag, ratio};
use crate::chess::snapshot::BoardSnapshot;
use crate::chess::types::Coord;

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "bishops",
    keys: &[
        "wb_pair",
        "wb_fianchetto",
        "wb_opposite_color",
        "wb_pawn_coherency",
        "wb_long_diagonal",
        "wb_mobility",
    ],
    compute,
};

fn bishops(snap: &BoardSnapshot, color: Color) -> &[Coord] {
    snap.pieces(color).of(Role::Bishop)
}

pub fn on_long_diagonal(c: Coord) -> bool {
    c.file == c.rank || c.file + c.rank == 7
}

pub fn has_bishop_pair(snap: &BoardSnapshot, color: Color) -> bool {
    let own = bishops(snap, color);
    own.iter().any(|b| b.is_light()) && own.iter().any(|b| !b.is_light())
}

/// Bishop on b2/g2 (relative) in front of its pawn on b3/g3.
pub fn is_fianchettoed(snap: &BoardSnapshot, color: Color) -> bool {
    let pawns = snap.pieces(color).of(Role::Pawn);
    bishops(snap, color).iter().any(|b| {
        (b.file == 1 || b.file == 6)
            && b.relative_rank(color) == 1
            && pawns
                .iter()
                .any(|p| p.file == b.file && p.relative_rank(color) == 2)
    })
}

pub fn opposite_colored_bishops(snap: &BoardSnapshot) -> bool {
    match (bishops(snap, OWN), bishops(snap, OPP)) {
        ([own], [opp]) => own.is_light() != opp.is_light(),
        _ => false,
    }
}

/// With a single bishop: share of own pawns on the squares it cannot reach.
pub fn pawn_coherency(snap: &BoardSnapshot, color: Color) -> Option<f64> {
    let [bishop] = bishops(snap, color) else {
        return None;
    };
    let pawns = snap.pieces(color).of(Role::Pawn);
    if pawns.is_empty() {
        return None;
    }
    let other = pawns
        .iter()
        .filter(|p| p.is_light() != bishop.is_light())
        .count();
    Some(other as f64 / pawns.len() as f64)
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let mid = view.windows.mid;

    let (coherency_sum, coherency_n) = view
        .in_window(mid)
        .filter_map(|s| pawn_coherency(s, OWN))
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));

    vec![
        ("wb_pair", view.window_fraction(mid, |s| has_bishop_pair(s, OWN))),
        (
            "wb_fianchetto",
            flag(view.in_window(view.windows.early).any(|s| is_fianchettoed(s, OWN))),
        ),
        (
            "wb_opposite_color",
            flag(view.in_window(mid).any(opposite_colored_bishops)),
        ),
        (
            "wb_pawn_coherency",
            ratio(coherency_sum, coherency_n as f64, 0.5),
        ),
        (
            "wb_long_diagonal",
            view.window_fraction(mid, |s| bishops(s, OWN).iter().any(|&b| on_long_diagonal(b))),
        ),
        (
            "wb_mobility",
            view.window_avg(mid, |s| role_mobility(s, Role::Bishop, OWN)),
        ),
    ]
}
