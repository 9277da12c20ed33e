//! Knight placement and activity.

use shakmaty::{Color, Role};

use super::{Aggregator, FeatureSet, GameView, OWN, flag, per_piece};
use crate::chess::snapshot::BoardSnapshot;
use crate::chess::types::{Coord, PieceKind};

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "knights",
    keys: &["wn_pair_retained", "wn_outpost", "wn_reposition", "wn_mobility"],
    compute,
};

/// A knight in the enemy half that no enemy pawn can ever challenge.
pub fn is_outpost(snap: &BoardSnapshot, knight: Coord, color: Color) -> bool {
    let rank = knight.relative_rank(color);
    if rank < 4 {
        return false;
    }
    !snap
        .pieces(!color)
        .of(Role::Pawn)
        .iter()
        .any(|p| p.file.abs_diff(knight.file) == 1 && p.relative_rank(color) > rank)
}

/// Per-piece mobility of one role, 0 without such pieces.
pub fn role_mobility(snap: &BoardSnapshot, role: Role, color: Color) -> f64 {
    per_piece(
        snap.pieces(color)
            .of(role)
            .iter()
            .map(|&c| snap.mobility(c, color) as f64),
    )
}

/// Sum of 1 / turns between consecutive knight moves inside the window.
fn reposition(view: &GameView<'_>) -> f64 {
    let mid = view.windows.mid;
    let plies: Vec<usize> = view
        .own_moves()
        .iter()
        .filter(|m| m.piece == PieceKind::Knight && mid.contains(m.ply))
        .map(|m| m.ply)
        .collect();
    plies
        .windows(2)
        .map(|pair| {
            let turns = ((pair[1] - pair[0]) / 2).max(1);
            1.0 / turns as f64
        })
        .sum()
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let mid = view.windows.mid;
    let game = view.game;
    let simplified = game.phases.end_game.unwrap_or(game.last_ply());
    let pair_retained = game
        .snapshots
        .get(simplified)
        .is_some_and(|snap| snap.pieces(OWN).count(Role::Knight) == 2);

    vec![
        ("wn_pair_retained", flag(pair_retained)),
        (
            "wn_outpost",
            view.window_fraction(mid, |s| {
                s.pieces(OWN)
                    .of(Role::Knight)
                    .iter()
                    .any(|&n| is_outpost(s, n, OWN))
            }),
        ),
        ("wn_reposition", reposition(view)),
        (
            "wn_mobility",
            view.window_avg(mid, |s| role_mobility(s, Role::Knight, OWN)),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::config::ExtractionConfig;
    use crate::chess::fixtures::{game_from_moves, snapshot};
    use crate::chess::phase::PhaseBoundaries;

    #[test]
    fn test_outpost_needs_enemy_half_and_no_challenger() {
        let snap = snapshot("4k3/8/2p5/4N3/8/8/8/4K3 w - - 0 1");
        assert!(is_outpost(&snap, Coord::new(4, 4), Color::White));

        let challenged = snapshot("4k3/5p2/8/4N3/8/8/8/4K3 w - - 0 1");
        assert!(!is_outpost(&challenged, Coord::new(4, 4), Color::White));

        let home = snapshot("4k3/8/8/8/4N3/8/8/4K3 w - - 0 1");
        assert!(!is_outpost(&home, Coord::new(4, 3), Color::White));
    }

    #[test]
    fn test_knight_mobility_in_starting_position() {
        let game = game_from_moves("1. e4 e5");
        let snap = &game.snapshots[0];
        assert_eq!(role_mobility(snap, Role::Knight, Color::White), 2.5);
        assert_eq!(role_mobility(snap, Role::Queen, Color::Black), 0.0);
    }

    #[test]
    fn test_reposition_sums_inverse_turn_gaps() {
        let mut game = game_from_moves("1. Nf3 e5 2. Ng5 d5 3. e3 c5 4. Nf3 a6");
        game.phases = PhaseBoundaries {
            middle_game: Some(0),
            end_game: None,
        };
        let config = ExtractionConfig::default();
        let view = GameView::new(&game, &config);
        assert_eq!(reposition(&view), 1.0 + 0.5);
    }

    #[test]
    fn test_pair_retained_at_last_ply_without_end_game() {
        let game = game_from_moves("1. Nf3 Nf6 2. Nc3 Nc6");
        let config = ExtractionConfig::default();
        let set = compute(&GameView::new(&game, &config));
        assert_eq!(set[0], ("wn_pair_retained", 1.0));
    }
}
