//! All kinds of errors in this crate.

use thiserror::Error;

/// All kinds of errors in this crate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Rows, columns or generations are zero or negative.
    #[error("rows, columns and generations must be positive")]
    NonPositive,
    /// A translation is larger than the supported maximum.
    #[error("translation out of range (at most {0})")]
    TranslationRange(i32),
    /// More than one symmetry family was requested.
    #[error("conflicting symmetries specified")]
    ConflictingSymmetries,
    /// Translations and flips were combined in an unsupported way.
    #[error("conflicting translation or flipping specified")]
    ConflictingTransforms,
    /// A parent search cannot be transformed at the wrap.
    #[error("translations and flips cannot be combined with a parent search")]
    ParentTransform,
    /// Diagonal symmetry and quadrant flipping need a square world.
    #[error("rows must equal columns for diagonal symmetry or quadrant flipping")]
    SquareWorld,
    /// The required row is outside the rectangle.
    #[error("required row {0} out of range")]
    BadUseRow(i32),
    /// The required column is outside the rectangle.
    #[error("required column {0} out of range")]
    BadUseCol(i32),
    /// The rule string could not be parsed.
    #[error("bad rule string {0:?}")]
    ParseRule(String),
    /// The transformation reached more off-grid cells than the engine keeps.
    #[error("too many auxiliary cells")]
    AuxOverflow,
    /// A cell coordinate is outside the search rectangle.
    #[error("cell out of range at r{0} c{1} g{2}")]
    CellRange(i32, i32, i32),
    /// A cell setting contradicts the current state of the world.
    #[error("inconsistently setting cell at r{0} c{1} g{2}")]
    InconsistentCell(i32, i32, i32),
    /// An initial pattern sets an on cell beyond the search rectangle.
    #[error("pattern sets cells beyond the search rectangle")]
    PatternRange,
    /// An initial pattern contains a character the reader does not know.
    #[error("bad pattern character {0:?} in line {1}")]
    PatternChar(char, i32),
    /// A dump file is from an incompatible version.
    #[error("unknown version in state file")]
    DumpVersion,
    /// A dump file lacks a required line.
    #[error("missing {0} line in state file")]
    DumpMissing(&'static str),
    /// A dump file line does not parse.
    #[error("malformed {0} line in state file")]
    DumpLine(&'static str),
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
