//! Document Tree
//!
//! Immutable element tree built by the well-formedness pass.
//! No validation logic - pure data representation, cheap to build by hand
//! in rule tests.

use crate::parser::lexer::{Attribute, Position};

/// An element of a well-formed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    /// Element name (e.g., "pl-question-panel")
    pub name: String,
    /// Attributes in source order; names are unique
    pub attributes: Vec<Attribute>,
    /// Child elements in source order
    pub children: Vec<DocumentNode>,
    /// Position of the opening tag
    pub position: Position,
}

impl DocumentNode {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            position,
        }
    }

    /// Builder-style attribute, for constructing trees in tests and tools
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        let position = self.position;
        self.attributes.push(Attribute {
            name: name.to_string(),
            value: value.to_string(),
            position,
        });
        self
    }

    /// Builder-style child
    pub fn with_child(mut self, child: DocumentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Visit every strict descendant depth-first in document order.
    ///
    /// The callback receives the node and its ancestor chain, root first.
    /// The walk keeps its own stack, so nesting depth is bounded by memory only.
    pub fn walk_descendants<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&'a DocumentNode, &[&'a DocumentNode]),
    {
        // next_child[i] indexes into ancestors[i].children
        let mut ancestors: Vec<&'a DocumentNode> = vec![self];
        let mut next_child: Vec<usize> = vec![0];

        while let Some(index) = next_child.last_mut() {
            let parent = ancestors[ancestors.len() - 1];
            match parent.children.get(*index) {
                Some(child) => {
                    *index += 1;
                    visit(child, ancestors.as_slice());
                    ancestors.push(child);
                    next_child.push(0);
                }
                None => {
                    ancestors.pop();
                    next_child.pop();
                }
            }
        }
    }
}

impl Drop for DocumentNode {
    // Flatten the subtree so dropping a deep document does not recurse
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
