//! King exposure before the end game.

use shakmaty::{Color, Role};

use super::{Aggregator, FeatureSet, GameView, OPP, OWN, per_piece};
use crate::chess::snapshot::BoardSnapshot;
use crate::chess::types::{PieceKind, piece_value};

/// Non-king material of one side in the initial position.
const FULL_MATERIAL: f64 = 39.0;

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "king_safety",
    keys: &["wk_moves_weighted", "wk_attacker_distance"],
    compute,
};

/// Mean over enemy pieces of distance to `color`'s king divided by value.
pub fn attacker_distance(snap: &BoardSnapshot, color: Color) -> f64 {
    let Some(king) = snap.king(color) else {
        return 0.0;
    };
    per_piece(
        snap.pieces(!color)
            .iter()
            .filter(|&(role, _)| role != Role::King)
            .map(|(role, c)| f64::from(c.distance(king)) / f64::from(piece_value(role))),
    )
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let pre_end = view.windows.pre_end;
    let moves_weighted: f64 = view
        .own_moves()
        .iter()
        .filter(|m| m.piece == PieceKind::King && pre_end.contains(m.ply))
        .map(|m| {
            let before = m
                .ply
                .checked_sub(1)
                .and_then(|prev| view.snapshots().get(prev))
                .map_or(FULL_MATERIAL, |snap| f64::from(snap.material(OPP)));
            before / FULL_MATERIAL
        })
        .sum();

    vec![
        ("wk_moves_weighted", moves_weighted),
        (
            "wk_attacker_distance",
            view.window_avg(pre_end, |s| attacker_distance(s, OWN)),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::fixtures::{game_from_moves, snapshot};

    #[test]
    fn test_attacker_distance() {
        // Rook four files away, knight three.
        let snap = snapshot("4k3/8/8/8/8/8/8/r3K2n w - - 0 1");
        let expected = (4.0 / 5.0 + 3.0 / 3.0) / 2.0;
        assert!((attacker_distance(&snap, Color::White) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_attacker_distance_without_attackers() {
        let snap = snapshot("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(attacker_distance(&snap, Color::White), 0.0);
    }

    #[test]
    fn test_king_moves_weighted_by_full_material() {
        let game = game_from_moves("1. e4 e5 2. Ke2 Ke7 3. Ke1 Ke8");
        let set = compute(&GameView::new(&game, &Default::default()));
        assert_eq!(set[0], ("wk_moves_weighted", 2.0));
    }

    #[test]
    fn test_castling_is_not_a_king_move() {
        let game = game_from_moves("1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. O-O Nf6");
        let set = compute(&GameView::new(&game, &Default::default()));
        assert_eq!(set[0], ("wk_moves_weighted", 0.0));
    }
}
