//! Game-level facts: length, phase starts, clock.

use super::{Aggregator, FeatureSet, GameView, OWN};
use crate::chess::header::parse_time_control;

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "game",
    keys: &[
        "g_plies",
        "g_middle_game",
        "g_end_game",
        "g_base_seconds",
        "g_increment_seconds",
        "g_two_minor_ply",
    ],
    compute,
};

fn ply_or_unset(ply: Option<usize>) -> f64 {
    ply.map_or(-1.0, |p| p as f64)
}

/// First ply after which the first-moving side holds exactly two minors.
pub fn two_minor_ply(view: &GameView<'_>) -> Option<usize> {
    view.snapshots()
        .iter()
        .find(|snap| snap.pieces(OWN).minors() == 2)
        .map(|snap| snap.ply)
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let game = view.game;
    let (base, increment) = parse_time_control(&game.header.time_control);
    vec![
        ("g_plies", game.plies() as f64),
        ("g_middle_game", ply_or_unset(game.phases.middle_game)),
        ("g_end_game", ply_or_unset(game.phases.end_game)),
        ("g_base_seconds", f64::from(base)),
        ("g_increment_seconds", f64::from(increment)),
        ("g_two_minor_ply", ply_or_unset(two_minor_ply(view))),
    ]
}
