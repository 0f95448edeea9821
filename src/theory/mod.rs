//! Tonal theory primitives: degree arithmetic, modes, tonalities and the
//! lookup tables that name them.

pub mod degree;
mod mode;
mod tables;
mod tonality;

pub use mode::Mode;
pub use tables::{TheoryTables, DEGREE_NAMES, SCALE_DEGREE_NAMES};
pub use tonality::Tonality;

/// Errors raised while interpreting theory symbols.
#[derive(Debug, thiserror::Error)]
pub enum TheoryError {
    /// Mode code not in the mode table.
    #[error("unknown mode: {0}")]
    UnknownMode(String),

    /// Text that is not a `<degree>.<mode>[.o(n)]` tonality.
    #[error("invalid tonality: {0}")]
    InvalidTonality(String),
}
