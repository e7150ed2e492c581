//! Definition-time errors for the option registry

use thiserror::Error;

/// Problems with the option catalog itself.
///
/// These are raised while the registry is being built, before any input is
/// read, and always abort startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    /// Name is empty or starts with a dash
    #[error("Invalid option name '{0}'")]
    InvalidName(String),

    /// Two options share a name
    #[error("Option '{0}' is already registered")]
    DuplicateName(String),

    /// Two options (or an option and a negation) share a short form
    #[error("Short form '-{short}' of '{option}' is already used by '{existing}'")]
    DuplicateShort {
        short: String,
        option: String,
        existing: String,
    },

    /// Metadata that does not fit the option's kind
    #[error("Option '{option}': {reason}")]
    Invalid { option: String, reason: String },

    /// An alias token names no registered option
    #[error("Alias '{option}' expands to unknown option via '{token}'")]
    UnknownAliasTarget { option: String, token: String },

    /// Alias expansion does not reach a fixed point
    #[error("Alias expansion of '{0}' does not terminate")]
    AliasCycle(String),

    /// An implies entry names no registered (non-alias) option
    #[error("Option '{option}' implies unknown option '{target}'")]
    UnknownImpliesTarget { option: String, target: String },

    /// An implied value does not match the target's type
    #[error("Option '{option}' implies a {found:?} value for {expected:?} option '{target}'")]
    ImpliedTypeMismatch {
        option: String,
        target: String,
        expected: super::ValueType,
        found: super::ValueType,
    },

    /// The implies graph loops back on itself
    #[error("Implies chain starting at '{0}' is cyclic")]
    ImpliesCycle(String),
}
