//! Discovered checks given, available and prepared.

use shakmaty::{Bitboard, Chess, Position};

use super::{Aggregator, FeatureSet, GameView, OWN};
use crate::chess::attacks::{discovery_blockers, gives_discovered_check};
use crate::chess::snapshot::BoardSnapshot;
use crate::chess::types::MoveRecord;

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "discovered",
    keys: &["wx_discovered", "wx_available", "wx_setup"],
    compute,
};

/// The move left the enemy king in check from a piece other than itself.
pub fn was_discovered_check(m: &MoveRecord, after: &BoardSnapshot) -> bool {
    !m.special.is_castle()
        && (after.position().checkers() & !Bitboard::from_square(m.to.square())).any()
}

pub fn discovered_check_available(pos: &Chess) -> bool {
    pos.legal_moves()
        .iter()
        .any(|m| gives_discovered_check(pos, m))
}

/// Some move puts a lone own piece between an own slider and the enemy king.
pub fn discovery_setup_available(pos: &Chess) -> bool {
    let us = pos.turn();
    pos.legal_moves().iter().any(|m| {
        let mut child = pos.clone();
        child.play_unchecked(m.clone());
        discovery_blockers(child.board(), us).any()
    })
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let snapshots = view.snapshots();
    let discovered = view
        .own_moves()
        .iter()
        .filter(|m| {
            snapshots
                .get(m.ply)
                .is_some_and(|after| was_discovered_check(m, after))
        })
        .count();

    let (mut available, mut setup) = (0usize, 0usize);
    for (_, pos) in view.own_turns() {
        debug_assert_eq!(pos.turn(), OWN);
        if discovered_check_available(pos) {
            available += 1;
        } else if discovery_setup_available(pos) {
            setup += 1;
        }
    }

    vec![
        ("wx_discovered", discovered as f64),
        ("wx_available", available as f64),
        ("wx_setup", setup as f64),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::fixtures::{game_from_moves, snapshot};

    #[test]
    fn test_availability_in_synthetic_position() {
        let armed = snapshot("4k3/8/8/8/8/8/4N3/4R1K1 w - - 0 1");
        assert!(discovered_check_available(armed.position()));

        let unarmed = snapshot("4k3/4p3/8/8/8/8/8/4R1K1 w - - 0 1");
        assert!(!discovered_check_available(unarmed.position()));

        // Ra1-e1 lines the rook up behind the e4 knight.
        let prepared = snapshot("4k3/8/8/8/4N3/8/8/R5K1 w - - 0 1");
        assert!(!discovered_check_available(prepared.position()));
        assert!(discovery_setup_available(prepared.position()));
    }

    #[test]
    fn test_quiet_opening_has_no_discoveries() {
        let game = game_from_moves("1. e4 e5 2. Nf3 Nc6");
        assert_eq!(
            compute(&GameView::new(&game, &Default::default())),
            vec![
                ("wx_discovered", 0.0),
                ("wx_available", 0.0),
                ("wx_setup", 0.0)
            ]
        );
    }

    #[test]
    fn test_discovered_check_is_recorded() {
        let game = game_from_moves("1. e4 e5 2. Nf3 Nf6 3. Nxe5 Nxe4 4. Qe2 Nf6 5. Nc6+");
        let knight = game.move_at(8).unwrap();
        assert!(was_discovered_check(knight, &game.snapshots[8]));

        let set = compute(&GameView::new(&game, &Default::default()));
        assert_eq!(set[0], ("wx_discovered", 1.0));
        assert!(set[1].1 >= 1.0);
    }
}
