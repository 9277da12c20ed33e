//! Move resolution and position replay.

use pgn_reader::SanPlus;
use shakmaty::{CastlingSide, Chess, Move, Position, Role};

use super::error::ParseError;
use super::header::{locate_movetext, parse_header};
use super::phase::PhaseBoundaries;
use super::snapshot::BoardSnapshot;
use super::types::{CheckMarker, Coord, GameHeader, GameRecord, MoveRecord, PieceKind, Special};
use super::visitor::parse_movetext;

/// Resolve one SAN token against the current position. Read-only.
pub fn resolve_move(pos: &Chess, san_plus: &SanPlus, ply: usize) -> Result<(Move, MoveRecord), ParseError> {
    let token = san_plus.to_string();
    let m = san_plus
        .san
        .to_move(pos)
        .map_err(|e| ParseError::AmbiguousOrIllegalMove {
            ply,
            san: token.clone(),
            reason: e.to_string(),
        })?;

    let turn = pos.turn();
    let board = pos.board();
    let (from, to, capture, special) = match &m {
        Move::Normal {
            from,
            to,
            promotion,
            ..
        } => {
            // Read the victim before the move lands.
            let capture = board.piece_at(*to).map(|piece| piece.role);
            let special = promotion.map_or(Special::None, Special::Promotion);
            (*from, *to, capture, special)
        }
        Move::EnPassant { from, to } => (*from, *to, Some(Role::Pawn), Special::EnPassant),
        Move::Castle { king, rook } => {
            let side = if rook < king {
                CastlingSide::QueenSide
            } else {
                CastlingSide::KingSide
            };
            let special = match side {
                CastlingSide::KingSide => Special::CastleShort,
                CastlingSide::QueenSide => Special::CastleLong,
            };
            (*king, side.king_to(turn), None, special)
        }
        Move::Put { .. } => {
            return Err(ParseError::UnsupportedMove { ply, san: token });
        }
    };

    let record = MoveRecord {
        ply,
        piece: PieceKind::from_san_token(&token),
        from: Coord::from_square(from),
        to: Coord::from_square(to),
        capture,
        special,
        check: CheckMarker::None,
    };
    Ok((m, record))
}

/// Owns the current position during replay and freezes one snapshot per ply.
pub struct SnapshotBuilder {
    position: Chess,
    record: GameRecord,
}

impl SnapshotBuilder {
    pub fn new(header: GameHeader) -> Self {
        Self {
            position: Chess::default(),
            record: GameRecord {
                header,
                white_moves: Vec::new(),
                black_moves: Vec::new(),
                snapshots: Vec::new(),
                phases: PhaseBoundaries::default(),
            },
        }
    }

    fn ply(&self) -> usize {
        self.record.snapshots.len()
    }

    /// Resolve and apply one move, then freeze the resulting position.
    pub fn push(&mut self, san_plus: &SanPlus) -> Result<(), ParseError> {
        let ply = self.ply();
        let (m, mut record) = resolve_move(&self.position, san_plus, ply)?;

        self.position.play_unchecked(m);
        record.check = if self.position.is_checkmate() {
            CheckMarker::Mate
        } else if self.position.is_check() {
            CheckMarker::Check
        } else {
            CheckMarker::None
        };

        let snapshot = BoardSnapshot::freeze(ply, &self.position);
        self.record.phases.observe(&snapshot);
        self.record.snapshots.push(snapshot);

        if ply % 2 == 0 {
            self.record.white_moves.push(record);
        } else {
            self.record.black_moves.push(record);
        }
        Ok(())
    }

    pub fn finish(self) -> GameRecord {
        self.record
    }
}

/// Replay a tokenized move list into a frozen game record.
pub fn replay(header: GameHeader, sans: &[SanPlus]) -> Result<GameRecord, ParseError> {
    let mut builder = SnapshotBuilder::new(header);
    for san_plus in sans {
        builder.push(san_plus)?;
    }
    Ok(builder.finish())
}

/// Parse a raw game text blob: header tags, then the movetext section.
pub fn parse_game(text: &str) -> Result<GameRecord, ParseError> {
    let header = parse_header(text)?;
    let movetext = locate_movetext(text)?;
    let sans = parse_movetext(movetext)?;
    replay(header, &sans)
}
