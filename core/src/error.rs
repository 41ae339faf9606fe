//! Error taxonomy shared by the factory, the scheduler and their callers.

use thiserror::Error;

/// Reasons a mob spec or wave configuration cannot be used.
///
/// A configuration error skips a single spawn attempt; the scheduler keeps
/// running.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The factory has no constructor registered under the requested name.
    #[error("mob variant `{name}` is not registered")]
    UnknownVariant {
        /// Variant name that failed to resolve.
        name: String,
    },
    /// The spec carried no letters, so the mob could never be defeated.
    #[error("mob variant `{variant}` requires at least one letter")]
    EmptyLetters {
        /// Variant name of the rejected spec.
        variant: String,
    },
    /// A wave resolved to an empty variant table.
    #[error("wave {wave} has no spawnable variants")]
    EmptyVariantTable {
        /// Wave whose table was empty.
        wave: u32,
    },
    /// Every weight in a variant table was zero, negative or not finite.
    #[error("variant weights for wave {wave} must contain a positive value")]
    NonPositiveWeights {
        /// Wave whose weights were rejected.
        wave: u32,
    },
    /// A numeric tuning value was not finite or fell outside its range.
    #[error("tuning value `{field}` is out of range")]
    InvalidTuning {
        /// Name of the offending configuration field.
        field: &'static str,
    },
}

/// Requests that fall outside the configured wave range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The requested wave is not within `1..=total`.
    #[error("wave {requested} is out of range (1-{total})")]
    WaveOutOfRange {
        /// Wave number that was requested.
        requested: u32,
        /// Number of waves the scheduler was configured with.
        total: u32,
    },
}
