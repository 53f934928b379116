//! Editor undo support
//!
//! Editor tools wrap every reversible action in an [`EditorCommand`] and
//! hand it to a [`CommandStack`]. Undo always reverses the most recent
//! command first.

mod command;
mod command_stack;

pub use command::{EditorCommand, FnCommand, PropertyCommand};
pub use command_stack::CommandStack;
