//! Per-game feature aggregators.
//!
//! Every aggregator reads the frozen game through a [`GameView`] and returns
//! its own disjoint set of keys. Keys are prefixed by group and always
//! describe the first-moving side.

mod bishops;
mod castling;
mod clusters;
mod development;
mod discovered;
mod distribution;
mod game;
mod guarded;
mod king_safety;
mod knights;
mod minors;
mod occupancy;
mod pawns;
mod pins;
mod queens;
mod rooks;
mod trades;

use shakmaty::{Chess, Color};

use super::config::ExtractionConfig;
use super::error::RulesQueryError;
use super::phase::{PhaseWindow, Windows};
use super::snapshot::BoardSnapshot;
use super::types::{GameRecord, MoveRecord};

pub const OWN: Color = Color::White;
pub const OPP: Color = Color::Black;

pub type FeatureSet = Vec<(&'static str, f64)>;

/// One entry of the ordered aggregator registry.
pub struct Aggregator {
    pub name: &'static str,
    pub keys: &'static [&'static str],
    pub compute: fn(&GameView<'_>) -> FeatureSet,
}

/// Registry in output column order.
pub const AGGREGATORS: &[Aggregator] = &[
    game::AGGREGATOR,
    pawns::AGGREGATOR,
    knights::AGGREGATOR,
    bishops::AGGREGATOR,
    minors::AGGREGATOR,
    rooks::AGGREGATOR,
    queens::AGGREGATOR,
    occupancy::AGGREGATOR,
    clusters::AGGREGATOR,
    development::AGGREGATOR,
    castling::AGGREGATOR,
    discovered::AGGREGATOR,
    distribution::AGGREGATOR,
    pins::PINS,
    pins::FORKS,
    guarded::AGGREGATOR,
    trades::TRADES,
    trades::EXCHANGES,
    king_safety::AGGREGATOR,
];

/// Read-only view over a replayed game shared by all aggregators.
pub struct GameView<'a> {
    pub game: &'a GameRecord,
    pub windows: Windows,
    pub config: &'a ExtractionConfig,
    start: Chess,
}

impl<'a> GameView<'a> {
    pub fn new(game: &'a GameRecord, config: &'a ExtractionConfig) -> Self {
        Self {
            game,
            windows: game.phases.windows(game.plies()),
            config,
            start: Chess::default(),
        }
    }

    pub fn snapshots(&self) -> &'a [BoardSnapshot] {
        &self.game.snapshots
    }

    pub fn own_moves(&self) -> &'a [MoveRecord] {
        self.game.side_moves(OWN)
    }

    pub fn opp_moves(&self) -> &'a [MoveRecord] {
        self.game.side_moves(OPP)
    }

    pub fn in_window(&self, window: PhaseWindow) -> impl Iterator<Item = &'a BoardSnapshot> + 'a {
        window.snapshots(self.snapshots())
    }

    /// Sum of `f` over the window divided by the window length.
    pub fn window_avg(&self, window: PhaseWindow, f: impl FnMut(&BoardSnapshot) -> f64) -> f64 {
        window.normalize(self.in_window(window).map(f).sum())
    }

    /// Share of the window's snapshots satisfying `pred`.
    pub fn window_fraction(
        &self,
        window: PhaseWindow,
        mut pred: impl FnMut(&BoardSnapshot) -> bool,
    ) -> f64 {
        self.window_avg(window, |snap| flag(pred(snap)))
    }

    /// Position in which the move at `ply` was chosen.
    pub fn position_before(&self, ply: usize) -> &Chess {
        match ply.checked_sub(1).and_then(|prev| self.game.snapshots.get(prev)) {
            Some(snap) => snap.position(),
            None => &self.start,
        }
    }

    /// Positions where the first-moving side was about to move, with the ply
    /// of that move.
    pub fn own_turns(&self) -> impl Iterator<Item = (usize, &Chess)> + '_ {
        (0..self.game.plies())
            .step_by(2)
            .map(|ply| (ply, self.position_before(ply)))
    }
}

pub fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// `num / den`, or `fallback` when nothing was counted.
pub fn ratio(num: f64, den: f64, fallback: f64) -> f64 {
    if den == 0.0 { fallback } else { num / den }
}

/// Mean of per-piece values, 0 when there are no pieces.
pub fn per_piece(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    ratio(sum, count as f64, 0.0)
}

/// Attack queries inside aggregators are only fed well-formed squares.
pub fn contract(result: Result<bool, RulesQueryError>) -> bool {
    match result {
        Ok(value) => value,
        Err(err) => {
            debug_assert!(false, "attack query contract broken: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::fixtures::{SAMPLE, game};
    use shakmaty::Position;
    use std::collections::HashSet;

    #[test]
    fn test_registry_keys_are_disjoint() {
        let mut seen = HashSet::new();
        for aggregator in AGGREGATORS {
            for key in aggregator.keys {
                assert!(seen.insert(*key), "{key} declared twice");
            }
        }
    }

    #[test]
    fn test_every_aggregator_emits_its_declared_keys_in_order() {
        let game = game(SAMPLE);
        let config = ExtractionConfig::default();
        let view = GameView::new(&game, &config);
        for aggregator in AGGREGATORS {
            let keys: Vec<_> = (aggregator.compute)(&view)
                .into_iter()
                .map(|(key, _)| key)
                .collect();
            assert_eq!(keys, aggregator.keys, "{}", aggregator.name);
        }
    }

    #[test]
    fn test_no_feature_is_nan() {
        let game = game(SAMPLE);
        let config = ExtractionConfig::default();
        let view = GameView::new(&game, &config);
        for aggregator in AGGREGATORS {
            for (key, value) in (aggregator.compute)(&view) {
                assert!(value.is_finite(), "{key} = {value}");
            }
        }
    }

    #[test]
    fn test_own_turns_start_from_initial_position() {
        let game = game(SAMPLE);
        let config = ExtractionConfig::default();
        let view = GameView::new(&game, &config);
        let turns: Vec<_> = view.own_turns().map(|(ply, _)| ply).collect();
        assert_eq!(turns.first(), Some(&0));
        assert_eq!(turns.len(), 10);
        assert_eq!(view.position_before(0).board(), Chess::default().board());
    }

    #[test]
    fn test_helpers() {
        assert_eq!(ratio(1.0, 0.0, 0.5), 0.5);
        assert_eq!(per_piece([]), 0.0);
        assert_eq!(per_piece([1.0, 2.0]), 1.5);
        assert!(contract(Ok(true)));
    }
}
