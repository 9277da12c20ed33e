//! Pawn structure.

use shakmaty::{Color, Role};

use super::{Aggregator, FeatureSet, GameView, OWN, per_piece, ratio};
use crate::chess::attacks::guards;
use crate::chess::snapshot::BoardSnapshot;
use crate::chess::types::{Coord, Special};

pub const AGGREGATOR: Aggregator = Aggregator {
    name: "pawns",
    keys: &[
        "wp_king_shield",
        "wp_center_strength",
        "wp_doubled",
        "wp_isolated",
        "wp_backward",
        "wp_chains",
        "wp_longest_chain",
        "wp_forwardness",
        "wp_storming",
        "wp_tension",
        "wp_en_passant",
        "wp_promotions",
        "wp_underpromotion",
    ],
    compute,
};

fn pawns(snap: &BoardSnapshot, color: Color) -> &[Coord] {
    snap.pieces(color).of(Role::Pawn)
}

/// Pawns one rank ahead of the king on its file or a neighbour count 1,
/// two ranks ahead count 0.5.
pub fn king_shield(snap: &BoardSnapshot, color: Color) -> f64 {
    let Some(king) = snap.king(color) else {
        return 0.0;
    };
    let king_rank = king.relative_rank(color);
    pawns(snap, color)
        .iter()
        .filter(|p| p.file.abs_diff(king.file) <= 1)
        .map(|p| match p.relative_rank(color).checked_sub(king_rank) {
            Some(1) => 1.0,
            Some(2) => 0.5,
            _ => 0.0,
        })
        .sum()
}

/// Defenders summed over the pawns on the c to f files.
pub fn center_strength(snap: &BoardSnapshot, color: Color) -> f64 {
    pawns(snap, color)
        .iter()
        .filter(|p| (2..=5).contains(&p.file))
        .map(|p| guards(snap.board(), p.square(), color).count() as f64)
        .sum()
}

fn file_counts(pawns: &[Coord]) -> [usize; 8] {
    let mut counts = [0; 8];
    for p in pawns {
        counts[p.file as usize] += 1;
    }
    counts
}

fn has_neighbour_file(counts: &[usize; 8], file: u8) -> bool {
    let file = file as usize;
    (file > 0 && counts[file - 1] > 0) || (file < 7 && counts[file + 1] > 0)
}

pub fn doubled(pawns: &[Coord]) -> usize {
    file_counts(pawns).iter().map(|n| n.saturating_sub(1)).sum()
}

pub fn isolated(pawns: &[Coord]) -> usize {
    let counts = file_counts(pawns);
    pawns
        .iter()
        .filter(|p| !has_neighbour_file(&counts, p.file))
        .count()
}

/// Pawns whose neighbours have all advanced past them and whose stop square
/// is covered by an enemy pawn.
pub fn backward(own: &[Coord], enemy: &[Coord], color: Color) -> usize {
    own.iter()
        .filter(|p| {
            let rank = p.relative_rank(color);
            let mut neighbours = own.iter().filter(|q| q.file.abs_diff(p.file) == 1).peekable();
            if neighbours.peek().is_none() {
                return false;
            }
            let unsupported = neighbours.all(|q| q.relative_rank(color) > rank);
            let stop_attacked = enemy
                .iter()
                .any(|e| e.file.abs_diff(p.file) == 1 && e.relative_rank(color) == rank + 2);
            unsupported && stop_attacked
        })
        .count()
}

/// Sizes of the diagonally linked pawn groups with at least two members.
pub fn chains(pawns: &[Coord]) -> Vec<usize> {
    let mut seen = vec![false; pawns.len()];
    let mut sizes = Vec::new();
    for start in 0..pawns.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut stack = vec![start];
        let mut size = 0;
        while let Some(i) = stack.pop() {
            size += 1;
            for (j, q) in pawns.iter().enumerate() {
                let p = pawns[i];
                if !seen[j] && p.file.abs_diff(q.file) == 1 && p.rank.abs_diff(q.rank) == 1 {
                    seen[j] = true;
                    stack.push(j);
                }
            }
        }
        if size >= 2 {
            sizes.push(size);
        }
    }
    sizes
}

pub fn forwardness(pawns: &[Coord], color: Color) -> f64 {
    per_piece(
        pawns
            .iter()
            .map(|p| f64::from(p.relative_rank(color).saturating_sub(1))),
    )
}

pub fn storming(pawns: &[Coord], enemy_king: Option<Coord>) -> f64 {
    let Some(king) = enemy_king else {
        return 0.0;
    };
    per_piece(pawns.iter().map(|p| f64::from(p.distance(king))))
}

/// Own/enemy pawn pairs standing diagonally in contact.
pub fn tension(own: &[Coord], enemy: &[Coord], color: Color) -> usize {
    own.iter()
        .map(|p| {
            enemy
                .iter()
                .filter(|e| {
                    e.file.abs_diff(p.file) == 1
                        && e.relative_rank(color) == p.relative_rank(color) + 1
                })
                .count()
        })
        .sum()
}

fn compute(view: &GameView<'_>) -> FeatureSet {
    let mid = view.windows.mid;
    let opp = !OWN;

    let longest_chain = view
        .in_window(mid)
        .filter_map(|snap| chains(pawns(snap, OWN)).into_iter().max())
        .max()
        .unwrap_or(0);

    let own_moves = view.own_moves();
    let en_passant = own_moves
        .iter()
        .filter(|m| m.special == Special::EnPassant)
        .count();
    let promotions: Vec<Role> = own_moves
        .iter()
        .filter_map(|m| match m.special {
            Special::Promotion(role) => Some(role),
            _ => None,
        })
        .collect();
    let under = promotions.iter().filter(|&&role| role != Role::Queen).count();

    vec![
        ("wp_king_shield", view.window_avg(mid, |s| king_shield(s, OWN))),
        ("wp_center_strength", view.window_avg(mid, |s| center_strength(s, OWN))),
        ("wp_doubled", view.window_avg(mid, |s| doubled(pawns(s, OWN)) as f64)),
        ("wp_isolated", view.window_avg(mid, |s| isolated(pawns(s, OWN)) as f64)),
        (
            "wp_backward",
            view.window_avg(mid, |s| backward(pawns(s, OWN), pawns(s, opp), OWN) as f64),
        ),
        ("wp_chains", view.window_avg(mid, |s| chains(pawns(s, OWN)).len() as f64)),
        ("wp_longest_chain", longest_chain as f64),
        ("wp_forwardness", view.window_avg(mid, |s| forwardness(pawns(s, OWN), OWN))),
        (
            "wp_storming",
            view.window_avg(mid, |s| storming(pawns(s, OWN), s.king(opp))),
        ),
        (
            "wp_tension",
            view.window_avg(mid, |s| tension(pawns(s, OWN), pawns(s, opp), OWN) as f64),
        ),
        ("wp_en_passant", ratio(en_passant as f64, own_moves.len() as f64, 0.0)),
        ("wp_promotions", promotions.len() as f64),
        (
            "wp_underpromotion",
            ratio(under as f64, promotions.len() as f64, 0.0),
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
    fn test_structure_counts() {
        let snap = snapshot("4k3/8/8/8/8/2P5/1PP2P1P/4K3 w - - 0 1");
        let own = pawns(&snap, Color::White);
        assert_eq!(doubled(own), 1);
        assert_eq!(isolated(own), 2);
        assert_eq!(chains(own), vec![2]);
        assert_eq!(king_shield(&snap, Color::White), 1.0);
        assert!((forwardness(own, Color::White) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_backward_pawn_and_center_strength() {
        let snap = snapshot("4k3/8/8/2p5/2P1P3/3P4/8/4K3 w - - 0 1");
        let own = pawns(&snap, Color::White);
        let enemy = pawns(&snap, Color::Black);
        assert_eq!(backward(own, enemy, Color::White), 1);
        assert_eq!(center_strength(&snap, Color::White), 2.0);
        assert_eq!(tension(own, enemy, Color::White), 0);
    }

    #[test]
    fn test_tension_and_storming() {
        let snap = snapshot("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let own = pawns(&snap, Color::White);
        assert_eq!(tension(own, pawns(&snap, Color::Black), Color::White), 1);
        assert_eq!(storming(own, snap.king(Color::Black)), 4.0);
        assert_eq!(tension(pawns(&snap, Color::Black), own, Color::Black), 1);
    }

    #[test]
    fn test_en_passant_and_promotion_counts() {
        let game = game_from_moves("1. h4 g5 2. hxg5 h6 3. gxh6 Nf6 4. h7 Ng8 5. hxg8=N e5 6. d4 e4 7. f4 exf3");
        let config = ExtractionConfig::default();
        let set = compute(&GameView::new(&game, &config));
        let get = |key: &str| set.iter().find(|(k, _)| *k == key).unwrap().1;
        assert_eq!(get("wp_promotions"), 1.0);
        assert_eq!(get("wp_underpromotion"), 1.0);
        assert_eq!(get("wp_en_passant"), 0.0);
    }

    #[test]
    fn test_degenerate_middle_equals_end_uses_length_one() {
        let mut game = game_from_moves("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6");
        game.phases = PhaseBoundaries {
            middle_game: Some(3),
            end_game: Some(3),
        };
        let config = ExtractionConfig::default();
        let view = GameView::new(&game, &config);
        assert_eq!(view.windows.mid.len(), 1);
        for (key, value) in compute(&view) {
            assert!(value.is_finite(), "{key} = {value}");
        }
    }
}
