use std::error::Error;
use std::fmt;

use shakmaty::Square;

/// Joins several messages into one `; `-separated string.
#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator(Option<String>);

impl ErrorAccumulator {
    pub fn push(&mut self, msg: &str) {
        match &mut self.0 {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(msg);
            }
            None => {
                self.0 = Some(msg.to_string());
            }
        }
    }

    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

/// Per-game failure. The game is dropped, no partial record is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// One or more required header tags could not be located.
    MissingHeader(String),
    /// No `1.` marker after the last header bracket.
    MissingMovetext,
    /// The movetext could not be tokenized.
    Movetext(String),
    /// The rules engine could not uniquely resolve a token.
    AmbiguousOrIllegalMove {
        ply: usize,
        san: String,
        reason: String,
    },
    UnsupportedMove { ply: usize, san: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader(tags) => write!(f, "missing header: {tags}"),
            Self::MissingMovetext => write!(f, "no movetext found after headers"),
            Self::Movetext(msg) => write!(f, "unreadable movetext: {msg}"),
            Self::AmbiguousOrIllegalMove { ply, san, reason } => {
                write!(f, "cannot resolve '{san}' at ply {ply}: {reason}")
            }
            Self::UnsupportedMove { ply, san } => {
                write!(f, "unsupported move '{san}' at ply {ply}")
            }
        }
    }
}

impl Error for ParseError {}

/// Malformed input to an attack query. This is a caller bug, not bad game data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesQueryError {
    NoPieceAtSquare(Square),
    WrongSideToMove(Square),
}

impl fmt::Display for RulesQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPieceAtSquare(sq) => write!(f, "no piece at {sq}"),
            Self::WrongSideToMove(sq) => write!(f, "piece at {sq} does not belong to the side to move"),
        }
    }
}

impl Error for RulesQueryError {}

/// Raised by the feature assembler when aggregator outputs do not line up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    DuplicateKey(&'static str),
    UndeclaredKey {
        aggregator: &'static str,
        key: &'static str,
    },
    MissingKey {
        aggregator: &'static str,
        key: &'static str,
    },
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey(key) => write!(f, "feature key '{key}' emitted twice"),
            Self::UndeclaredKey { aggregator, key } => {
                write!(f, "aggregator '{aggregator}' emitted undeclared key '{key}'")
            }
            Self::MissingKey { aggregator, key } => {
                write!(f, "aggregator '{aggregator}' did not emit '{key}'")
            }
        }
    }
}

impl Error for AssemblyError {}
