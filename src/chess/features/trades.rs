//! Trade detection over the capture sequence, and equal exchanges on offer.
//!
//! Captures are scanned in ply order. A capture matched into a trade is
//! claimed and takes no part in later matches. A direct trade is completed
//! by the other side capturing equal value on the square the initiating
//! piece occupies, following that piece if it steps away before the
//! recapture. Otherwise the opponent's next unclaimed capture of equal value
//! inside the lookahead completes an indirect trade.

use shakmaty::{Chess, Color, Move, Position};

use super::{Aggregator, FeatureSet, GameView, OWN, ratio};
use crate::chess::types::{Coord, GameRecord, piece_value};

pub const TRADES: Aggregator = Aggregator {
    name: "trades",
    keys: &[
        "wt_num_trades",
        "wt_direct",
        "wt_indirect",
        "wt_initiated",
        "wt_avg_latency",
        "wt_avg_value",
    ],
    compute: compute_trades,
};

pub const EXCHANGES: Aggregator = Aggregator {
    name: "exchanges",
    keys: &["we_available"],
    compute: compute_exchanges,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeKind {
    Direct,
    Indirect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    pub kind: TradeKind,
    pub initiator: Color,
    pub ply: usize,
    pub latency: usize,
    pub value: u32,
}

#[derive(Debug, Clone, Copy)]
struct Capture {
    ply: usize,
    color: Color,
    to: Coord,
    value: u32,
}

fn captures(game: &GameRecord) -> Vec<Capture> {
    game.moves()
        .filter_map(|m| {
            m.capture.map(|role| Capture {
                ply: m.ply,
                color: m.color(),
                to: m.to,
                value: piece_value(role),
            })
        })
        .collect()
}

/// Recapture on the initiating piece's square within `lookahead` plies.
fn find_direct(
    game: &GameRecord,
    caps: &[Capture],
    claimed: &[bool],
    first: &Capture,
    lookahead: usize,
) -> Option<usize> {
    let mut tracked = first.to;
    for ply in first.ply + 1..=first.ply + lookahead {
        let m = game.move_at(ply)?;
        if m.color() == first.color {
            if m.from == tracked {
                tracked = m.to;
            }
            continue;
        }
        if m.capture.is_some() && m.to == tracked {
            let j = caps.iter().position(|c| c.ply == ply)?;
            return (!claimed[j] && caps[j].value == first.value).then_some(j);
        }
    }
    None
}

/// The opponent's next unclaimed capture inside the lookahead, if equal.
fn find_indirect(
    caps: &[Capture],
    claimed: &[bool],
    i: usize,
    lookahead: usize,
) -> Option<usize> {
    let first = &caps[i];
    let j = (i + 1..caps.len()).find(|&j| {
        !claimed[j] && caps[j].color != first.color && caps[j].ply - first.ply <= lookahead
    })?;
    (caps[j].value == first.value).then_some(j)
}

pub fn detect_trades(game: &GameRecord, lookahead: usize) -> Vec<Trade> {
    let caps = captures(game);
    let mut claimed = vec![false; caps.len()];
    let mut trades = Vec::new();

    for i in 0..caps.len() {
        if claimed[i] {
            continue;
        }
        let first = caps[i];
        let matched = find_direct(game, &caps, &claimed, &first, lookahead)
            .map(|j| (j, TradeKind::Direct))
            .or_else(|| find_indirect(&caps, &claimed, i, lookahead).map(|j| (j, TradeKind::Indirect)));

        if let Some((j, kind)) = matched {
            claimed[i] = true;
            claimed[j] = true;
            trades.push(Trade {
                kind,
                initiator: first.color,
                ply: first.ply,
                latency: caps[j].ply - first.ply,
                value: first.value,
            });
        }
    }
    trades
}

fn compute_trades(view: &GameView<'_>) -> FeatureSet {
    let trades = detect_trades(view.game, view.config.trade_lookahead);
    let n = trades.len() as f64;
    let count = |kind: TradeKind| trades.iter().filter(|t| t.kind == kind).count() as f64;
    let initiated = trades.iter().filter(|t| t.initiator == OWN).count() as f64;
    let latency: usize = trades.iter().map(|t| t.latency).sum();
    let value: u32 = trades.iter().map(|t| t.value).sum();

    vec![
        ("wt_num_trades", n),
        ("wt_direct", count(TradeKind::Direct)),
        ("wt_indirect", count(TradeKind::Indirect)),
        ("wt_initiated", ratio(initiated, n, 0.5)),
        ("wt_avg_latency", ratio(latency as f64, n, 0.0)),
        ("wt_avg_value", ratio(f64::from(value), n, 0.0)),
    ]
}

fn is_equal_exchange(m: &Move) -> bool {
    match m.capture() {
        Some(victim) => piece_value(victim) == piece_value(m.role()),
        None => false,
    }
}

/// Legal captures of a piece worth exactly as much as the capturer.
pub fn equal_exchanges(pos: &Chess) -> usize {
    pos.legal_moves()
        .iter()
        .filter(|m| is_equal_exchange(m))
        .count()
}

fn compute_exchanges(view: &GameView<'_>) -> FeatureSet {
    let mid = view.windows.mid;
    let (total, turns) = view
        .own_turns()
        .filter(|(ply, _)| mid.contains(*ply))
        .fold((0usize, 0usize), |(total, turns), (_, pos)| {
            (total + equal_exchanges(pos), turns + 1)
        });
    vec![("we_available", ratio(total as f64, turns as f64, 0.0))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::config::ExtractionConfig;
    use crate::chess::fixtures::{SAMPLE, game, game_from_moves, snapshot};

    #[test]
    fn test_no_captures_means_no_trades() {
        let game = game_from_moves("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6");
        assert!(detect_trades(&game, 3).is_empty());
        let set = compute_trades(&GameView::new(&game, &ExtractionConfig::default()));
        assert_eq!(set[0], ("wt_num_trades", 0.0));
        assert_eq!(set[3], ("wt_initiated", 0.5));
    }

    #[test]
    fn test_direct_recapture() {
        let game = game_from_moves("1. e4 d5 2. exd5 Qxd5");
        let trades = detect_trades(&game, 3);
        assert_eq!(
            trades,
            vec![Trade {
                kind: TradeKind::Direct,
                initiator: Color::White,
                ply: 2,
                latency: 1,
                value: 1,
            }]
        );
    }

    #[test]
    fn test_recapture_follows_the_relocated_piece() {
        // 3. Nxe4 wins the knight, which steps to d6 and is taken there.
        let game = game_from_moves("1. e4 Nf6 2. Nc3 Nxe4 3. Nxe4 d5 4. Nd6+ exd6");
        let trades = detect_trades(&game, 3);
        assert_eq!(
            trades,
            vec![Trade {
                kind: TradeKind::Direct,
                initiator: Color::White,
                ply: 4,
                latency: 3,
                value: 3,
            }]
        );
        assert!(detect_trades(&game, 2).is_empty());
    }

    #[test]
    fn test_indirect_trade_of_equal_value() {
        let game = game_from_moves("1. e4 d5 2. d4 c5 3. exd5 cxd4");
        let trades = detect_trades(&game, 3);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].kind, TradeKind::Indirect);
        assert_eq!(trades[0].initiator, Color::White);
        assert_eq!(trades[0].latency, 1);
    }

    #[test]
    fn test_sample_game_has_an_opening_pawn_trade() {
        let game = game(SAMPLE);
        let trades = detect_trades(&game, 3);
        assert!(trades.iter().any(|t| t.ply == 8 && t.kind == TradeKind::Direct));
    }

    #[test]
    fn test_equal_exchanges() {
        let pos = snapshot("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        assert_eq!(equal_exchanges(pos.position()), 1);
        let none = snapshot("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
        assert_eq!(equal_exchanges(none.position()), 0);
    }
}
