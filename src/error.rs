//! Error types for board, move, and notation operations.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Error parsing a base or extended FEN string.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FenError {
    InvalidRankCount { found: usize },
    InvalidFileCount { rank: usize, files: usize },
    MismatchedParentheses { rank: usize },
    InvalidPiece { char: char },
    InvalidFormat { reason: String },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::InvalidRankCount { found } => {
                write!(f, "FEN must have {RANKS} ranks, found {found}", RANKS = crate::square::RANKS)
            }
            FenError::InvalidFileCount { rank, files } => {
                write!(f, "rank {rank} has {files} files, expected {FILES}", FILES = crate::square::FILES)
            }
            FenError::MismatchedParentheses { rank } => {
                write!(f, "mismatched stack parentheses in rank {rank}")
            }
            FenError::InvalidPiece { char } => write!(f, "invalid piece character '{char}' in FEN"),
            FenError::InvalidFormat { reason } => write!(f, "invalid FEN: {reason}"),
        }
    }
}

impl std::error::Error for FenError {}

/// Error parsing a square in algebraic or LAN notation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SquareError {
    RankOutOfBounds { rank: usize },
    FileOutOfBounds { file: usize },
    InvalidNotation { notation: String },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::RankOutOfBounds { rank } => write!(f, "rank {rank} is out of bounds"),
            SquareError::FileOutOfBounds { file } => write!(f, "file {file} is out of bounds"),
            SquareError::InvalidNotation { notation } => {
                write!(f, "invalid square notation '{notation}'")
            }
        }
    }
}

impl std::error::Error for SquareError {}

/// Error parsing a move in SAN or deploy-LAN notation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SanError {
    Empty,
    InvalidPiece { char: char },
    InvalidSquare { notation: String },
    AmbiguousMove { san: String },
    NoMatchingMove { san: String },
    InvalidFormat { notation: String },
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanError::Empty => write!(f, "empty SAN string"),
            SanError::InvalidPiece { char } => write!(f, "invalid piece character '{char}' in SAN"),
            SanError::InvalidSquare { notation } => write!(f, "invalid square in SAN '{notation}'"),
            SanError::AmbiguousMove { san } => write!(f, "ambiguous move '{san}'"),
            SanError::NoMatchingMove { san } => write!(f, "no legal move matches '{san}'"),
            SanError::InvalidFormat { notation } => write!(f, "malformed move notation '{notation}'"),
        }
    }
}

impl std::error::Error for SanError {}

/// Error parsing a UCI-style long algebraic move string.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MoveParseError {
    InvalidFormat { notation: String },
    UnknownSquare { notation: String },
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidFormat { notation } => {
                write!(f, "malformed move notation '{notation}'")
            }
            MoveParseError::UnknownSquare { notation } => {
                write!(f, "unknown square in '{notation}'")
            }
            MoveParseError::IllegalMove { notation } => write!(f, "illegal move '{notation}'"),
        }
    }
}

impl std::error::Error for MoveParseError {}

/// The closed engine error set from the external interface spec (§6).
///
/// Everything that is not a parse failure surfaces here: board mutation
/// refusals, action execution failures, and session/commit violations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EngineError {
    FenInvalidRankCount { found: usize },
    FenInvalidFileCount { rank: usize, files: usize },
    FenMismatchParentheses { rank: usize },
    FenInvalidPiece { char: char },
    FenInvalidFormat { reason: String },
    BoardInvalidSquare { square: String },
    BoardInvalidTerrain { square: String, kind: &'static str },
    CommanderLimitExceeded { color: &'static str },
    CombinationFailed { reason: String },
    MovePieceNotFound { square: String },
    MoveInvalidDestination { square: String },
    CaptureInvalidTarget { square: String },
    SessionInvalidOperation { reason: String },
    InternalInconsistency { reason: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::FenInvalidRankCount { found } => {
                write!(f, "FEN_INVALID_RANK_COUNT: found {found} ranks")
            }
            EngineError::FenInvalidFileCount { rank, files } => {
                write!(f, "FEN_INVALID_FILE_COUNT: rank {rank} has {files} files")
            }
            EngineError::FenMismatchParentheses { rank } => {
                write!(f, "FEN_MISMATCH_PARENTHESES: rank {rank}")
            }
            EngineError::FenInvalidPiece { char } => {
                write!(f, "FEN_INVALID_PIECE: '{char}'")
            }
            EngineError::FenInvalidFormat { reason } => {
                write!(f, "FEN_INVALID_FORMAT: {reason}")
            }
            EngineError::BoardInvalidSquare { square } => {
                write!(f, "BOARD_INVALID_SQUARE: {square}")
            }
            EngineError::BoardInvalidTerrain { square, kind } => {
                write!(f, "BOARD_INVALID_TERRAIN: {kind} cannot occupy {square}")
            }
            EngineError::CommanderLimitExceeded { color } => {
                write!(f, "COMMANDER_LIMIT_EXCEEDED: {color}")
            }
            EngineError::CombinationFailed { reason } => {
                write!(f, "COMBINATION_FAILED: {reason}")
            }
            EngineError::MovePieceNotFound { square } => {
                write!(f, "MOVE_PIECE_NOT_FOUND: {square}")
            }
            EngineError::MoveInvalidDestination { square } => {
                write!(f, "MOVE_INVALID_DESTINATION: {square}")
            }
            EngineError::CaptureInvalidTarget { square } => {
                write!(f, "CAPTURE_INVALID_TARGET: {square}")
            }
            EngineError::SessionInvalidOperation { reason } => {
                write!(f, "SESSION_INVALID_OPERATION: {reason}")
            }
            EngineError::InternalInconsistency { reason } => {
                write!(f, "INTERNAL_INCONSISTENCY: {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<FenError> for EngineError {
    fn from(e: FenError) -> Self {
        match e {
            FenError::InvalidRankCount { found } => EngineError::FenInvalidRankCount { found },
            FenError::InvalidFileCount { rank, files } => {
                EngineError::FenInvalidFileCount { rank, files }
            }
            FenError::MismatchedParentheses { rank } => {
                EngineError::FenMismatchParentheses { rank }
            }
            FenError::InvalidPiece { char } => EngineError::FenInvalidPiece { char },
            FenError::InvalidFormat { reason } => EngineError::FenInvalidFormat { reason },
        }
    }
}
