//! Fractional occupancy of eight board zones: two ranks deep, half a board wide.

use shakmaty::Color;

use super::{Aggregator, FeatureSet, GameView, OWN, ratio};
use crate::chess::snapshot::BoardSnapshot;
use crate::chess::types::Coord;

const ZONE_KEYS: [&str; 8] = [
    "wz_home_queenside",
    "wz_home_kingside",
    "wz_near_queenside",
    "wz_near_kingside",
    "wz_far_queenside",
    "wz_far_kingside",
    "wz_enemy_queenside",
    "wz_enemy_kingside",
];

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "clusters",
    keys: &ZONE_KEYS,
    compute,
};

/// Index into the zone table.
pub fn zone(c: Coord, color: Color) -> usize {
    let depth = (c.relative_rank(color) / 2) as usize;
    let kingside = usize::from(c.file >= 4);
    depth * 2 + kingside
}

pub fn zone_shares(snap: &BoardSnapshot, color: Color) -> [f64; 8] {
    let index = snap.pieces(color);
    let mut counts = [0usize; 8];
    for (_, c) in index.iter() {
        counts[zone(c, color)] += 1;
    }
    let total = index.len() as f64;
    counts.map(|n| ratio(n as f64, total, 0.0))
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let mid = view.windows.mid;
    let mut sums = [0.0; 8];
    for snap in view.in_window(mid) {
        for (sum, share) in sums.iter_mut().zip(zone_shares(snap, OWN)) {
            *sum += share;
        }
    }
    ZONE_KEYS
        .into_iter()
        .zip(sums)
        .map(|(key, sum)| (key, mid.normalize(sum)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Chess;

    #[test]
    fn test_starting_position_fills_home_zones() {
        let snap = BoardSnapshot::freeze(0, &Chess::default());
        let shares = zone_shares(&snap, Color::White);
        assert_eq!(shares[0], 0.5);
        assert_eq!(shares[1], 0.5);
        assert_eq!(shares[2..].iter().sum::<f64>(), 0.0);
        assert_eq!(zone_shares(&snap, Color::Black), shares);
    }

    #[test]
    fn test_zone_index() {
        assert_eq!(zone(Coord::new(0, 0), Color::White), 0);
        assert_eq!(zone(Coord::new(7, 7), Color::White), 7);
        assert_eq!(zone(Coord::new(7, 7), Color::Black), 1);
        assert_eq!(zone(Coord::new(3, 4), Color::White), 4);
    }
}
