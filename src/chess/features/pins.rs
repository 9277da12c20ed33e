//! Pins held on the opponent and forks, available or delivered.

use shakmaty::{Chess, Position, Role};

use super::{Aggregator, FeatureSet, GameView, OPP, contract};
use crate::chess::attacks::{gives_fork, is_pinned};
use crate::chess::snapshot::BoardSnapshot;
use crate::chess::types::Coord;

pub const PINS: Aggregator = Aggregator {
    name: "pins",
    keys: &["wpin_total", "wpin_max_duration", "wpin_avg_duration"],
    compute: compute_pins,
};

pub const FORKS: Aggregator = Aggregator {
    name: "forks",
    keys: &["wf_available", "wf_played"],
    compute: compute_forks,
};

/// Opponent pieces pinned in a position where the opponent is to move.
pub fn pinned_pieces(snap: &BoardSnapshot) -> Vec<Coord> {
    let mover = snap.turn();
    snap.pieces(mover)
        .iter()
        .filter(|&(role, _)| role != Role::King)
        .filter(|&(_, c)| contract(is_pinned(snap, c)))
        .map(|(_, c)| c)
        .collect()
}

/// Lengths, in own turns, of every unbroken pin on a square.
pub fn pin_durations(turns: &[Vec<Coord>]) -> Vec<usize> {
    let mut durations = Vec::new();
    let mut running: Vec<(Coord, usize)> = Vec::new();
    for pinned in turns {
        let mut next = Vec::with_capacity(pinned.len());
        for &sq in pinned {
            let held = running
                .iter()
                .find(|(c, _)| *c == sq)
                .map_or(0, |(_, n)| *n);
            next.push((sq, held + 1));
        }
        for (sq, n) in running {
            if !pinned.contains(&sq) {
                durations.push(n);
            }
        }
        running = next;
    }
    durations.extend(running.into_iter().map(|(_, n)| n));
    durations
}

fn compute_pins(view: &GameView<'_>) -> FeatureSet {
    let turns: Vec<Vec<Coord>> = view
        .own_moves()
        .iter()
        .filter_map(|m| view.snapshots().get(m.ply))
        .filter(|snap| snap.turn() == OPP)
        .map(pinned_pieces)
        .collect();
    let total: usize = turns.iter().map(Vec::len).sum();
    let durations = pin_durations(&turns);
    let max = durations.iter().copied().max().unwrap_or(0);
    let avg = if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<usize>() as f64 / durations.len() as f64
    };

    vec![
        ("wpin_total", total as f64),
        ("wpin_max_duration", max as f64),
        ("wpin_avg_duration", avg),
    ]
}

/// Some legal move lands a piece on a square from which it forks. Castles
/// are left out.
pub fn fork_available(pos: &Chess) -> bool {
    pos.legal_moves().iter().filter(|m| !m.is_castle()).any(|m| {
        let mut child = pos.clone();
        child.play_unchecked(m.clone());
        contract(gives_fork(child.board(), Coord::from_square(m.to())))
    })
}

fn compute_forks(view: &GameView<'_>) -> FeatureSet {
    let available = view
        .own_turns()
        .filter(|(_, pos)| fork_available(pos))
        .count();
    let played = view
        .own_moves()
        .iter()
        .filter(|m| {
            view.snapshots()
                .get(m.ply)
                .is_some_and(|after| contract(gives_fork(after.board(), m.to)))
        })
        .count();

    vec![
        ("wf_available", available as f64),
        ("wf_played", played as f64),
    ]
}
