//! Help and config-dump rendering
//!
//! Both renderers only produce text; writing it anywhere is the host's job.

mod dump;
mod help;

pub use dump::render_config_dump;
pub use help::render_help;
