/// Reversible editor commands

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// ===== EDITOR COMMAND TRAIT =====

/// A reversible editor action
///
/// `execute` applies the action, `undo` reverses it. The command stack
/// calls `undo` at most once per recorded command.
pub trait EditorCommand {
    /// Apply the action
    fn execute(&mut self);

    /// Reverse the action
    fn undo(&mut self);

    /// Human-readable label, shown in the editor history
    fn description(&self) -> String {
        "command".to_string()
    }
}

// ===== PROPERTY COMMAND =====

/// Sets a shared value, remembering the previous one for undo
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use lamp_engine::lamp::editor::{CommandStack, PropertyCommand};
///
/// let exposure = Rc::new(RefCell::new(1.0_f32));
/// let mut stack = CommandStack::new();
///
/// stack.perform(Box::new(PropertyCommand::new("Set exposure", exposure.clone(), 2.5)));
/// assert_eq!(*exposure.borrow(), 2.5);
///
/// stack.undo();
/// assert_eq!(*exposure.borrow(), 1.0);
/// ```
pub struct PropertyCommand<T: Clone> {
    label: String,
    target: Rc<RefCell<T>>,
    old_value: T,
    new_value: T,
}

impl<T: Clone> PropertyCommand<T> {
    /// Command that will set `target` to `new_value` when executed
    ///
    /// The value to restore on undo is captured by `execute`, so commands
    /// built ahead of time still undo to the value they overwrote.
    pub fn new(label: impl Into<String>, target: Rc<RefCell<T>>, new_value: T) -> Self {
        let old_value = target.borrow().clone();
        Self {
            label: label.into(),
            target,
            old_value,
            new_value,
        }
    }

    /// Record a change the editor already made to `target`
    ///
    /// The current value of `target` is the new value; undo restores
    /// `old_value`. Meant for [`CommandStack::push`].
    pub fn applied(label: impl Into<String>, target: Rc<RefCell<T>>, old_value: T) -> Self {
        let new_value = target.borrow().clone();
        Self {
            label: label.into(),
            target,
            old_value,
            new_value,
        }
    }

    pub fn old_value(&self) -> &T {
        &self.old_value
    }

    pub fn new_value(&self) -> &T {
        &self.new_value
    }
}

impl<T: Clone> EditorCommand for PropertyCommand<T> {
    fn execute(&mut self) {
        let mut target = self.target.borrow_mut();
        self.old_value = target.clone();
        *target = self.new_value.clone();
    }

    fn undo(&mut self) {
        *self.target.borrow_mut() = self.old_value.clone();
    }

    fn description(&self) -> String {
        self.label.clone()
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for PropertyCommand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCommand")
            .field("label", &self.label)
            .field("old_value", &self.old_value)
            .field("new_value", &self.new_value)
            .finish()
    }
}

// ===== CLOSURE COMMAND =====

/// Command built from an apply closure and a revert closure
pub struct FnCommand {
    label: String,
    apply: Box<dyn FnMut()>,
    revert: Box<dyn FnMut()>,
}

impl FnCommand {
    pub fn new(
        label: impl Into<String>,
        apply: impl FnMut() + 'static,
        revert: impl FnMut() + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            apply: Box::new(apply),
            revert: Box::new(revert),
        }
    }
}

impl EditorCommand for FnCommand {
    fn execute(&mut self) {
        (self.apply)();
    }

    fn undo(&mut self) {
        (self.revert)();
    }

    fn description(&self) -> String {
        self.label.clone()
    }
}

impl fmt::Debug for FnCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
