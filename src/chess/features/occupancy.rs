//! Where the pieces stand and how much of the board they cover.

use shakmaty::{Bitboard, Color, Role};

use super::{Aggregator, FeatureSet, GameView, OWN, per_piece, ratio};
use crate::chess::snapshot::BoardSnapshot;
use crate::chess::types::material_value;

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "occupancy",
    keys: &[
        "wo_avg_rank",
        "wo_avg_file",
        "wo_density",
        "wo_attacked",
        "wo_share_p",
        "wo_share_n",
        "wo_share_b",
        "wo_share_r",
        "wo_share_q",
    ],
    compute,
};

const SHARE_ROLES: [Role; 5] = [Role::Pawn, Role::Knight, Role::Bishop, Role::Rook, Role::Queen];

pub fn avg_rank(snap: &BoardSnapshot, color: Color) -> f64 {
    per_piece(
        snap.pieces(color)
            .iter()
            .map(|(_, c)| f64::from(c.relative_rank(color))),
    )
}

pub fn avg_file(snap: &BoardSnapshot, color: Color) -> f64 {
    per_piece(snap.pieces(color).iter().map(|(_, c)| f64::from(c.file)))
}

/// Mean number of own neighbours per own piece.
pub fn density(snap: &BoardSnapshot, color: Color) -> f64 {
    let index = snap.pieces(color);
    per_piece(index.iter().map(|(_, c)| {
        index
            .iter()
            .filter(|&(_, other)| other != c && other.distance(c) == 1)
            .count() as f64
    }))
}

/// Distinct squares attacked by the side.
pub fn attacked_squares(snap: &BoardSnapshot, color: Color) -> usize {
    snap.pieces(color)
        .iter()
        .fold(Bitboard::EMPTY, |acc, (_, c)| acc | snap.attacks_from(c))
        .count()
}

/// Share of the side's material held by `role`.
pub fn material_share(snap: &BoardSnapshot, color: Color, role: Role) -> f64 {
    let held = snap.pieces(color).count(role) as u32 * material_value(role);
    ratio(f64::from(held), f64::from(snap.material(color)), 0.0)
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let mid = view.windows.mid;
    let mut set = vec![
        ("wo_avg_rank", view.window_avg(mid, |s| avg_rank(s, OWN))),
        ("wo_avg_file", view.window_avg(mid, |s| avg_file(s, OWN))),
        ("wo_density", view.window_avg(mid, |s| density(s, OWN))),
        (
            "wo_attacked",
            view.window_avg(mid, |s| attacked_squares(s, OWN) as f64),
        ),
    ];
    let share_keys = ["wo_share_p", "wo_share_n", "wo_share_b", "wo_share_r", "wo_share_q"];
    for (key, role) in share_keys.into_iter().zip(SHARE_ROLES) {
        set.push((key, view.window_avg(mid, |s| material_share(s, OWN, role))));
    }
    set
}
