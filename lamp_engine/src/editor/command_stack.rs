/// LIFO stack of reversible editor commands
///
/// `push` records a command whose effect the caller has already applied;
/// it never executes the command. `perform` executes then records.
/// `undo` reverses and discards the most recent command.
///
/// The stack is single-threaded: commands typically capture `Rc` editor
/// state and the stack is owned by the editor's UI loop.

use std::collections::VecDeque;
use std::fmt;
use crate::engine_debug;
use super::EditorCommand;

pub struct CommandStack {
    /// Oldest command at the front, most recent at the back
    commands: VecDeque<Box<dyn EditorCommand>>,
    /// Maximum depth (None = unbounded)
    limit: Option<usize>,
}

impl CommandStack {
    /// Create an unbounded stack
    pub fn new() -> Self {
        Self {
            commands: VecDeque::new(),
            limit: None,
        }
    }

    /// Create a stack holding at most `limit` commands
    ///
    /// When full, pushing discards the oldest command without undoing it.
    /// A limit of 0 keeps nothing.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            commands: VecDeque::with_capacity(limit.min(64)),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Record a command without executing it
    pub fn push(&mut self, command: Box<dyn EditorCommand>) {
        self.commands.push_back(command);

        if let Some(limit) = self.limit {
            while self.commands.len() > limit {
                if let Some(dropped) = self.commands.pop_front() {
                    engine_debug!("lamp::CommandStack",
                        "History full, forgetting '{}'", dropped.description());
                }
            }
        }
    }

    /// Execute a command, then record it
    pub fn perform(&mut self, mut command: Box<dyn EditorCommand>) {
        command.execute();
        self.push(command);
    }

    /// Undo the most recent command and remove it from the stack
    ///
    /// Returns `false` (and does nothing) when the stack is empty.
    pub fn undo(&mut self) -> bool {
        match self.commands.pop_back() {
            Some(mut command) => {
                engine_debug!("lamp::CommandStack", "Undo '{}'", command.description());
                command.undo();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Description of the command the next `undo` would reverse
    pub fn peek_description(&self) -> Option<String> {
        self.commands.back().map(|command| command.description())
    }

    /// Forget every command without undoing any
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descriptions: Vec<String> = self.commands.iter().map(|c| c.description()).collect();
        f.debug_struct("CommandStack")
            .field("commands", &descriptions)
            .field("limit", &self.limit)
            .finish()
    }
}

#[cfg(test)]
#[path = "command_stack_tests.rs"]
mod tests;
