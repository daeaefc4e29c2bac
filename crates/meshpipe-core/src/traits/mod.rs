//! Host service traits consumed by task plugins.
//!
//! The host owns workspace layout and process execution; plugins only see
//! these seams, which keeps them testable with scripted fakes.

pub mod command;
pub mod project;

pub use command::{CommandOutput, CommandRunner, CommandSpec};
pub use project::ProjectResolver;
