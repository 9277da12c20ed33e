use shakmaty::{Color, Role};

use super::minors::{BISHOP_HOMES, KNIGHT_HOMES};
use super::{Aggregator, FeatureSet, GameView, OWN, flag};
use crate::chess::phase::PhaseWindow;
use crate::chess::snapshot::BoardSnapshot;
use crate::chess::types::{Coord, MoveRecord, Special};

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "castling",
    keys: &[
        "wc_earliness",
        "wc_kingside",
        "wc_queenside",
        "wc_opposite",
        "wc_same",
        "wc_artificial",
        "wc_development",
    ],
    compute,
};

fn first_castle(moves: &[MoveRecord]) -> Option<&MoveRecord> {
    moves.iter().find(|m| m.special.is_castle())
}

fn is_kingside(m: &MoveRecord) -> bool {
    m.special == Special::CastleShort
}

/// King tucked on a wing of its back rank with every rook on its inner side.
pub fn looks_castled(snap: &BoardSnapshot, color: Color) -> bool {
    let Some(king) = snap.king(color) else {
        return false;
    };
    if king.relative_rank(color) != 0 {
        return false;
    }
    let rooks = snap.pieces(color).of(Role::Rook);
    match king.file {
        6 | 7 => rooks.iter().all(|r| r.file < king.file),
        0..=2 => rooks.iter().all(|r| r.file > king.file),
        _ => false,
    }
}

/// Share of the minor pieces on the far wing that had left home when the
/// king castled.
pub fn far_wing_development(snap: &BoardSnapshot, color: Color, kingside: bool) -> f64 {
    let (knight_file, bishop_file) = if kingside {
        (KNIGHT_HOMES[0], BISHOP_HOMES[0])
    } else {
        (KNIGHT_HOMES[1], BISHOP_HOMES[1])
    };
    let back = if color == Color::White { 0 } else { 7 };
    let still_home = |role: Role, file: u8| {
        snap.piece_at(Coord::new(file, back))
            .is_some_and(|p| p.role == role && p.color == color)
    };
    let left = [(Role::Knight, knight_file), (Role::Bishop, bishop_file)]
        .into_iter()
        .filter(|&(role, file)| !still_home(role, file))
        .count();
    left as f64 / 2.0
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let own = first_castle(view.own_moves());
    let opp = first_castle(view.opp_moves());

    let (opposite, same) = match (own, opp) {
        (Some(a), Some(b)) => (is_kingside(a) != is_kingside(b), is_kingside(a) == is_kingside(b)),
        _ => (false, false),
    };

    let mid = view.windows.mid;
    let half = PhaseWindow::new(mid.start, mid.start + mid.len() / 2, view.game.plies());
    let artificial = own.is_none() && view.in_window(half).any(|s| looks_castled(s, OWN));

    let development = own
        .and_then(|m| view.snapshots().get(m.ply).map(|s| (m, s)))
        .map_or(0.0, |(m, s)| far_wing_development(s, OWN, is_kingside(m)));

    vec![
        (
            "wc_earliness",
            own.map_or(0.0, |m| 1.0 / ((m.ply / 2) as f64 + 1.0)),
        ),
        ("wc_kingside", flag(own.is_some_and(is_kingside))),
        ("wc_queenside", flag(own.is_some_and(|m| !is_kingside(m)))),
        ("wc_opposite", flag(opposite)),
        ("wc_same", flag(same)),
        ("wc_artificial", flag(artificial)),
        ("wc_development", development),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::config::ExtractionConfig;
    use crate::chess::fixtures::{BLITZ, BULLET, game, game_from_moves, snapshot};

    fn features(game: &crate::chess::types::GameRecord) -> FeatureSet {
        let config = ExtractionConfig::default();
        compute(&GameView::new(game, &config))
    }

    #[test]
    fn test_kingside_castle_in_bullet_game() {
        let set = features(&game(BULLET));
        // 11. O-O is the eleventh white move.
        assert_eq!(set[0], ("wc_earliness", 1.0 / 11.0));
        assert_eq!(set[1], ("wc_kingside", 1.0));
        assert_eq!(set[2], ("wc_queenside", 0.0));
        assert_eq!(set[3], ("wc_opposite", 0.0));
        assert_eq!(set[5], ("wc_artificial", 0.0));
    }

    #[test]
    fn test_both_sides_castle_long_in_blitz_game() {
        let set = features(&game(BLITZ));
        assert_eq!(set[2], ("wc_queenside", 1.0));
        assert_eq!(set[4], ("wc_same", 1.0));
        assert_eq!(set[3], ("wc_opposite", 0.0));
    }

    #[test]
    fn test_looks_castled() {
        let castled = snapshot("4k3/8/8/8/8/8/5PPP/5RK1 w - - 0 1");
        assert!(looks_castled(&castled, Color::White));
        let walked = snapshot("4k3/8/8/8/8/8/5PPP/6KR w - - 0 1");
        assert!(!looks_castled(&walked, Color::White));
        let central = snapshot("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert!(!looks_castled(&central, Color::White));
    }

    #[test]
    fn test_far_wing_development_at_castling() {
        let game = game_from_moves("1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. O-O Nf6");
        let set = features(&game);
        assert_eq!(set[0], ("wc_earliness", 0.25));
        assert_eq!(set[6], ("wc_development", 0.0));
    }
}
