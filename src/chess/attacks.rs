//! Attack relation queries evaluated against a single snapshot.

use shakmaty::{Bitboard, Board, Chess, Color, Move, Piece, Position, Role, Square, attacks};

use super::error::RulesQueryError;
use super::snapshot::BoardSnapshot;
use super::types::{Coord, piece_value};

/// Pieces of `color` attacking `sq`.
pub fn guards(board: &Board, sq: Square, color: Color) -> Bitboard {
    board.attacks_to(sq, color, board.occupied())
}

pub fn is_defended(board: &Board, sq: Square, color: Color) -> bool {
    guards(board, sq, color).any()
}

fn piece_at(board: &Board, sq: Square) -> Result<Piece, RulesQueryError> {
    board
        .piece_at(sq)
        .ok_or(RulesQueryError::NoPieceAtSquare(sq))
}

/// Enemy sliders lined up with `king` on an otherwise empty board.
fn snipers(board: &Board, king: Square, attacker: Color) -> Bitboard {
    ((attacks::rook_attacks(king, Bitboard::EMPTY) & board.rooks_and_queens())
        | (attacks::bishop_attacks(king, Bitboard::EMPTY) & board.bishops_and_queens()))
        & board.by_color(attacker)
}

fn is_absolutely_pinned(board: &Board, sq: Square, color: Color) -> bool {
    let Some(king) = board.king_of(color) else {
        return false;
    };
    let only_sq = Bitboard::from_square(sq);
    snipers(board, king, !color)
        .into_iter()
        .any(|sniper| attacks::between(king, sniper) & board.occupied() == only_sq)
}

/// Captures the opponent gains once the piece on `sq` steps away.
fn has_hidden_attack(board: &Board, sq: Square, piece: Piece) -> bool {
    let mut without = board.clone();
    without.remove_piece_at(sq);

    let ours = without.by_color(piece.color);
    let sliders = without.by_color(!piece.color)
        & (without.rooks_and_queens() | without.bishops_and_queens());
    let pinned_value = piece_value(piece.role);

    sliders.into_iter().any(|attacker| {
        let attacker_value = without.role_at(attacker).map_or(0, piece_value);
        let before = board.attacks_from(attacker) & board.by_color(piece.color);
        let after = without.attacks_from(attacker) & ours;

        (after & !before).into_iter().any(|target| {
            let value = without.role_at(target).map_or(0, piece_value);
            let undefended = !is_defended(&without, target, piece.color);
            (value >= pinned_value && undefended) || value > attacker_value
        })
    })
}

/// Whether the piece at `coord` is pinned, absolutely or functionally.
///
/// The piece must belong to the side to move in the snapshot.
pub fn is_pinned(snapshot: &BoardSnapshot, coord: Coord) -> Result<bool, RulesQueryError> {
    let board = snapshot.board();
    let sq = coord.square();
    let piece = piece_at(board, sq)?;
    if piece.color != snapshot.turn() {
        return Err(RulesQueryError::WrongSideToMove(sq));
    }
    if piece.role == Role::King {
        return Ok(false);
    }

    Ok(is_absolutely_pinned(board, sq, piece.color) || has_hidden_attack(board, sq, piece))
}

/// Whether the piece at `coord` attacks more than one enemy piece that is
/// either worth more than it or left undefended.
pub fn gives_fork(board: &Board, coord: Coord) -> Result<bool, RulesQueryError> {
    let sq = coord.square();
    let piece = piece_at(board, sq)?;
    let value = piece_value(piece.role);
    let them = !piece.color;

    let forked = (board.attacks_from(sq) & board.by_color(them))
        .into_iter()
        .filter(|&target| {
            let target_value = board.role_at(target).map_or(0, piece_value);
            target_value > value || !is_defended(board, target, them)
        })
        .count();
    Ok(forked > 1)
}

/// Own pieces standing alone between an own slider and the enemy king.
pub fn discovery_blockers(board: &Board, color: Color) -> Bitboard {
    let Some(king) = board.king_of(!color) else {
        return Bitboard::EMPTY;
    };
    let ours = board.by_color(color);

    snipers(board, king, color)
        .into_iter()
        .map(|sniper| attacks::between(king, sniper) & board.occupied())
        .filter(|between| between.count() == 1 && (*between & ours).any())
        .fold(Bitboard::EMPTY, |acc, between| acc | between)
}

/// Whether playing `m` checks with a piece other than the one that moved.
pub fn gives_discovered_check(pos: &Chess, m: &Move) -> bool {
    if m.is_castle() {
        return false;
    }
    let to = m.to();
    let mut child = pos.clone();
    child.play_unchecked(m.clone());
    (child.checkers() & !Bitboard::from_square(to)).any()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::fixtures::snapshot;

    fn coord(sq: Square) -> Coord {
        Coord::from_square(sq)
    }

    #[test]
    fn test_guards_in_starting_position() {
        let snap = BoardSnapshot::freeze(0, &Chess::default());
        let e2 = guards(snap.board(), Square::E2, Color::White);
        assert_eq!(e2.count(), 4);
        assert!(e2.contains(Square::G1));
        assert!(guards(snap.board(), Square::E4, Color::White).is_empty());
    }

    #[test]
    fn test_knight_fork_on_two_rooks() {
        let snap = snapshot("r3r2k/2N5/8/8/8/8/8/7K b - - 0 1");
        let board = snap.board();
        assert!(gives_fork(board, coord(Square::C7)).unwrap());

        for sq in board.occupied() {
            if sq != Square::C7 {
                assert!(!gives_fork(board, coord(sq)).unwrap(), "{sq} should not fork");
            }
        }
    }

    #[test]
    fn test_fork_requires_a_piece() {
        let snap = BoardSnapshot::freeze(0, &Chess::default());
        assert_eq!(
            gives_fork(snap.board(), coord(Square::E4)),
            Err(RulesQueryError::NoPieceAtSquare(Square::E4))
        );
    }

    #[test]
    fn test_absolute_pin() {
        let snap = snapshot("k3r3/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(is_pinned(&snap, coord(Square::E2)).unwrap());
        assert!(!is_pinned(&snap, coord(Square::E1)).unwrap());
    }

    #[test]
    fn test_pin_against_undefended_queen() {
        let snap = snapshot("k7/b7/8/8/3N4/8/8/K5Q1 w - - 0 1");
        assert!(is_pinned(&snap, coord(Square::D4)).unwrap());
    }

    #[test]
    fn test_unpinned_piece() {
        let snap = BoardSnapshot::freeze(0, &Chess::default());
        assert!(!is_pinned(&snap, coord(Square::G1)).unwrap());
    }

    #[test]
    fn test_pin_query_contract_errors() {
        let snap = snapshot("k3r3/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert_eq!(
            is_pinned(&snap, coord(Square::E8)),
            Err(RulesQueryError::WrongSideToMove(Square::E8))
        );
        assert_eq!(
            is_pinned(&snap, coord(Square::D4)),
            Err(RulesQueryError::NoPieceAtSquare(Square::D4))
        );
    }

    #[test]
    fn test_discovery_blockers_and_discovered_check() {
        let snap = snapshot("4k3/8/8/8/8/8/4N3/4R1K1 w - - 0 1");
        let blockers = discovery_blockers(snap.board(), Color::White);
        assert_eq!(blockers, Bitboard::from_square(Square::E2));

        let pos = snap.position();
        let discovered = pos
            .legal_moves()
            .into_iter()
            .filter(|m| gives_discovered_check(pos, m))
            .count();
        assert_eq!(discovered, 5);
    }
}
