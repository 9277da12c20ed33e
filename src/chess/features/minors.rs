//! Knight versus bishop preferences over the whole game.

use shakmaty::{Color, Role};

use super::game::two_minor_ply;
use super::{Aggregator, FeatureSet, GameView, OWN, ratio};
use crate::chess::types::{Coord, MoveRecord, PieceKind};

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "minors",
    keys: &["wm_trade_preference", "wm_development_order"],
    compute,
};

pub const KNIGHT_HOMES: [u8; 2] = [1, 6];
pub const BISHOP_HOMES: [u8; 2] = [2, 5];

/// Whether `coord` is a starting square of `role` for `color`.
pub fn is_home(role: Role, coord: Coord, color: Color) -> bool {
    let files: &[u8] = match role {
        Role::Knight => &KNIGHT_HOMES,
        Role::Bishop => &BISHOP_HOMES,
        _ => return false,
    };
    coord.relative_rank(color) == 0 && files.contains(&coord.file)
}

fn is_development(m: &MoveRecord) -> bool {
    m.piece
        .role()
        .is_some_and(|role| is_home(role, m.from, m.color()))
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let trade_preference = two_minor_ply(view)
        .map(|ply| view.snapshots()[ply].pieces(OWN).count(Role::Bishop) as f64 / 2.0)
        .unwrap_or(0.5);

    let first_two: Vec<&MoveRecord> = view
        .own_moves()
        .iter()
        .filter(|m| is_development(m))
        .take(2)
        .collect();
    let knights = first_two
        .iter()
        .filter(|m| m.piece == PieceKind::Knight)
        .count();

    vec![
        ("wm_trade_preference", trade_preference),
        (
            "wm_development_order",
            ratio(knights as f64, first_two.len() as f64, 0.5),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::config::ExtractionConfig;
    use crate::chess::fixtures::{BULLET, game, game_from_moves};

    fn features(game: &crate::chess::types::GameRecord) -> FeatureSet {
        let config = ExtractionConfig::default();
        compute(&GameView::new(game, &config))
    }

    #[test]
    fn test_development_order_counts_first_two_minors() {
        let set = features(&game_from_moves("1. Nf3 d5 2. d4 e6 3. Bf4 c5 4. Nc3 a6"));
        assert_eq!(set[1], ("wm_development_order", 0.5));
    }

    #[test]
    fn test_neutral_values_without_minor_moves() {
        let set = features(&game_from_moves("1. e4 e5 2. d4 d5"));
        assert_eq!(set[0], ("wm_trade_preference", 0.5));
        assert_eq!(set[1], ("wm_development_order", 0.5));
    }

    #[test]
    fn test_trade_preference_in_bullet_game() {
        let set = features(&game(BULLET));
        assert_eq!(set[0].0, "wm_trade_preference");
        assert!((0.0..=1.0).contains(&set[0].1));
    }

    #[test]
    fn test_home_squares_are_relative() {
        assert!(is_home(Role::Knight, Coord::new(6, 7), Color::Black));
        assert!(!is_home(Role::Knight, Coord::new(6, 7), Color::White));
        assert!(!is_home(Role::Rook, Coord::new(0, 0), Color::White));
    }
}
