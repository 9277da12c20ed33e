//! Opening family and early development.

use shakmaty::{Color, Role};

use super::minors::is_home;
use super::{Aggregator, FeatureSet, GameView, OWN, ratio};
use crate::chess::snapshot::BoardSnapshot;

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "development",
    keys: &[
        "wd_eco_a",
        "wd_eco_b",
        "wd_eco_c",
        "wd_eco_d",
        "wd_eco_e",
        "wd_developed",
        "wd_eco_a_dev",
        "wd_eco_b_dev",
        "wd_eco_c_dev",
        "wd_eco_d_dev",
        "wd_eco_e_dev",
        "wd_side_preference",
    ],
    compute,
};

const ECO_FAMILIES: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

pub fn eco_one_hot(eco: &str) -> [f64; 5] {
    let family = eco.trim().chars().next().map(|c| c.to_ascii_uppercase());
    ECO_FAMILIES.map(|letter| if family == Some(letter) { 1.0 } else { 0.0 })
}

/// Share of the four minor pieces no longer on their starting squares.
pub fn developed_share(snap: &BoardSnapshot, color: Color) -> f64 {
    let index = snap.pieces(color);
    let at_home = [Role::Knight, Role::Bishop]
        .into_iter()
        .map(|role| {
            index
                .of(role)
                .iter()
                .filter(|&&c| is_home(role, c, color))
                .count()
        })
        .sum::<usize>();
    (4 - at_home.min(4)) as f64 / 4.0
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let early = view.windows.early;
    let one_hot = eco_one_hot(&view.game.header.eco);
    let developed = view
        .in_window(early)
        .last()
        .map_or(0.0, |snap| developed_share(snap, OWN));

    let files: Vec<f64> = view
        .own_moves()
        .iter()
        .filter(|m| early.contains(m.ply))
        .map(|m| f64::from(m.to.file))
        .collect();
    let side_preference = ratio(files.iter().sum::<f64>(), files.len() as f64 * 7.0, 0.5);

    let mut set = Vec::with_capacity(12);
    for (key, value) in ["wd_eco_a", "wd_eco_b", "wd_eco_c", "wd_eco_d", "wd_eco_e"]
        .into_iter()
        .zip(one_hot)
    {
        set.push((key, value));
    }
    set.push(("wd_developed", developed));
    for (key, value) in [
        "wd_eco_a_dev",
        "wd_eco_b_dev",
        "wd_eco_c_dev",
        "wd_eco_d_dev",
        "wd_eco_e_dev",
    ]
    .into_iter()
    .zip(one_hot)
    {
        set.push((key, value * developed));
    }
    set.push(("wd_side_preference", side_preference));
    set
}
