//! Opening / middlegame / endgame segmentation.

use std::ops::Range;

use shakmaty::{Color, Role};

use super::snapshot::BoardSnapshot;

const MIDDLE_GAME_PIECE_LIMIT: usize = 10;
const BACK_RANK_LIMIT: usize = 3;
const END_GAME_PIECE_LIMIT: usize = 6;

/// First plies of the middle game and the end game, `None` when never reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseBoundaries {
    pub middle_game: Option<usize>,
    pub end_game: Option<usize>,
}

impl PhaseBoundaries {
    /// Feed one freshly frozen snapshot. Indices, once set, stay frozen.
    pub fn observe(&mut self, snapshot: &BoardSnapshot) {
        let white = snapshot.pieces(Color::White);
        let black = snapshot.pieces(Color::Black);
        let total = minor_major_count(snapshot);

        if self.middle_game.is_none() {
            let white_back = white.minor_major().filter(|c| c.rank == 0).count();
            let black_back = black.minor_major().filter(|c| c.rank == 7).count();
            if total <= MIDDLE_GAME_PIECE_LIMIT
                || (white_back <= BACK_RANK_LIMIT && black_back <= BACK_RANK_LIMIT)
            {
                self.middle_game = Some(snapshot.ply);
            }
        }

        if self.end_game.is_none() && total <= END_GAME_PIECE_LIMIT {
            self.end_game = Some(snapshot.ply);
        }
    }

    pub fn windows(&self, plies: usize) -> Windows {
        Windows::new(*self, plies)
    }
}

/// A `[start, end)` ply range over the snapshot sequence.
///
/// A window whose end does not exceed its start still covers the single
/// snapshot at `start`, so its length is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseWindow {
    pub start: usize,
    pub end: usize,
    plies: usize,
}

impl PhaseWindow {
    pub fn new(start: usize, end: usize, plies: usize) -> Self {
        let last = plies.saturating_sub(1);
        Self {
            start: start.min(last),
            end: end.min(plies),
            plies,
        }
    }

    /// Snapshot indices covered by this window.
    pub fn range(&self) -> Range<usize> {
        if self.plies == 0 {
            return 0..0;
        }
        self.start..self.end.max(self.start + 1)
    }

    /// Normalization denominator.
    pub fn len(&self) -> usize {
        self.range().len().max(1)
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, ply: usize) -> bool {
        self.range().contains(&ply)
    }

    pub fn snapshots<'a>(
        self,
        snapshots: &'a [BoardSnapshot],
    ) -> impl Iterator<Item = &'a BoardSnapshot> + 'a {
        let range = self.range();
        let end = range.end.min(snapshots.len());
        snapshots[range.start.min(end)..end].iter()
    }

    /// Divide a window-accumulated sum by the window length.
    pub fn normalize(&self, sum: f64) -> f64 {
        sum / self.len() as f64
    }
}

/// The derived windows shared by every aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    pub early: PhaseWindow,
    pub mid: PhaseWindow,
    pub late: PhaseWindow,
    pub pre_end: PhaseWindow,
    pub whole: PhaseWindow,
}

impl Windows {
    pub fn new(phases: PhaseBoundaries, plies: usize) -> Self {
        let last = plies.saturating_sub(1);
        let mid_start = phases.middle_game.unwrap_or(last);
        let mid_end = phases.end_game.unwrap_or(plies);
        let end_start = phases.end_game.unwrap_or(last);
        let early_end = phases.middle_game.unwrap_or(plies / 2);

        Self {
            early: PhaseWindow::new(0, early_end, plies),
            mid: PhaseWindow::new(mid_start, mid_end, plies),
            late: PhaseWindow::new(end_start, plies, plies),
            pre_end: PhaseWindow::new(0, phases.end_game.unwrap_or(plies), plies),
            whole: PhaseWindow::new(0, plies, plies),
        }
    }
}

/// Knights, bishops, rooks and queens of both sides.
pub fn minor_major_count(snapshot: &BoardSnapshot) -> usize {
    [Color::White, Color::Black]
        .into_iter()
        .map(|color| {
            let index = snapshot.pieces(color);
            [Role::Knight, Role::Bishop, Role::Rook, Role::Queen]
                .into_iter()
                .map(|role| index.count(role))
                .sum::<usize>()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::fixtures::snapshot;

    fn at_ply(ply: usize, fen: &str) -> BoardSnapshot {
        let mut snap = snapshot(fen);
        snap.ply = ply;
        snap
    }

    #[test]
    fn test_boundaries_follow_scripted_material() {
        let script = [
            at_ply(0, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            at_ply(1, "rnb1k2r/pppppppp/8/8/8/8/PPPPPPPP/RNB1K2R b - - 0 1"),
            at_ply(2, "4k3/pppppppp/8/8/8/8/PPPPPPPP/4K3 w - - 0 1"),
            at_ply(3, "r3k3/pppppppp/8/8/8/8/PPPPPPPP/4K3 b - - 0 1"),
        ];
        let mut phases = PhaseBoundaries::default();
        for snap in &script {
            phases.observe(snap);
        }
        assert_eq!(phases.middle_game, Some(1));
        assert_eq!(phases.end_game, Some(2));
    }

    #[test]
    fn test_start_position_is_no_phase() {
        let mut phases = PhaseBoundaries::default();
        phases.observe(&at_ply(
            0,
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        ));
        assert_eq!(phases, PhaseBoundaries::default());
    }

    #[test]
    fn test_window_degenerate_length_is_one() {
        let w = PhaseWindow::new(5, 5, 20);
        assert_eq!(w.len(), 1);
        assert_eq!(w.range(), 5..6);
        assert_eq!(w.normalize(3.0), 3.0);
    }

    #[test]
    fn test_window_caps_to_last_snapshot() {
        let w = PhaseWindow::new(30, 40, 20);
        assert_eq!(w.range(), 19..20);
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn test_windows_without_phases() {
        let w = Windows::new(PhaseBoundaries::default(), 20);
        assert_eq!(w.early.range(), 0..10);
        assert_eq!(w.mid.range(), 19..20);
        assert_eq!(w.late.range(), 19..20);
        assert_eq!(w.pre_end.range(), 0..20);
    }

    #[test]
    fn test_windows_with_phases() {
        let phases = PhaseBoundaries {
            middle_game: Some(12),
            end_game: Some(40),
        };
        let w = Windows::new(phases, 60);
        assert_eq!(w.early.range(), 0..12);
        assert_eq!(w.mid.range(), 12..40);
        assert_eq!(w.mid.len(), 28);
        assert_eq!(w.late.range(), 40..60);
        assert_eq!(w.pre_end.range(), 0..40);
    }

    #[test]
    fn test_middle_game_at_ply_zero_is_distinct_from_unset() {
        let phases = PhaseBoundaries {
            middle_game: Some(0),
            end_game: None,
        };
        let w = Windows::new(phases, 10);
        assert_eq!(w.early.range(), 0..1);
        assert_eq!(w.mid.range(), 0..10);
    }

    #[test]
    fn test_mid_window_reaches_final_snapshot_without_end_game() {
        let phases = PhaseBoundaries {
            middle_game: Some(5),
            end_game: None,
        };
        let w = Windows::new(phases, 20);
        assert_eq!(w.mid.range(), 5..20);
        assert_eq!(w.mid.len(), 15);
        assert_eq!(w.late.range(), 19..20);
    }

    #[test]
    fn test_empty_game_windows() {
        let w = Windows::new(PhaseBoundaries::default(), 0);
        assert_eq!(w.mid.range(), 0..0);
        assert_eq!(w.mid.len(), 1);
        assert!(w.mid.snapshots(&[]).next().is_none());
    }
}
