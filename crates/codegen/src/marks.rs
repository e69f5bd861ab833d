//! Jump label management for control flow and function entry points.

use std::{collections::HashMap, fmt};

/// Symbolic jump destination, bound to a byte offset by [`CodeBuffer::set_label`].
///
/// [`CodeBuffer::set_label`]: crate::buffer::CodeBuffer::set_label
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Label(usize);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Manages allocation of labels
#[derive(Debug, Default)]
pub struct LabelAllocator {
    /// Maps function name to its landing pad
    function_labels: HashMap<String, Label>,
    next_label: usize,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh label
    pub fn allocate(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    /// Get or allocate the landing pad of a function
    pub fn function_label(&mut self, name: &str) -> Label {
        if let Some(&label) = self.function_labels.get(name) {
            label
        } else {
            let label = self.allocate();
            self.function_labels.insert(name.to_owned(), label);
            label
        }
    }
}
