//! Option registry
//!
//! The registry provides:
//! - Typed option definitions (flag, string, number, list, env-only)
//! - Short forms, negations, aliases and implications
//! - Declaration order grouped by section for help output
//! - Fail-fast checks for duplicate names, short forms and cycles

pub mod builder;
pub mod error;
pub mod registry;
pub mod types;

pub use builder::OptionDefBuilder;
pub use error::DefinitionError;
pub use registry::{OptionId, Registry, RegistryBuilder, Section, ShortMatch};
pub use types::{
    Negate, NumRange, OptionDef, OptionKind, OptionValue, ValueType, Violation, format_num,
};
