//! Well-Formedness Validation
//!
//! Consumes the token stream with a nesting stack and either builds the
//! document tree or reports every nesting error it can safely recover from.

use crate::core::Diagnostic;
use crate::parser::{DocumentNode, Position, SyntaxError, Token, TokenKind};

/// An element whose close tag has not been seen yet
#[derive(Debug)]
struct NestingFrame {
    node: DocumentNode,
}

/// Builds the tree while tracking the ancestor chain of the parse position
#[derive(Debug, Default)]
struct TreeBuilder {
    stack: Vec<NestingFrame>,
    root: Option<DocumentNode>,
    root_name: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

/// Outcome of feeding one token to the builder
enum Step {
    Continue,
    /// The stack can no longer be trusted
    Abort,
}

impl TreeBuilder {
    fn feed(&mut self, token: Token) -> Step {
        let position = token.position;
        let blank = token.is_blank_text();

        match token.kind {
            TokenKind::Comment(_) | TokenKind::Declaration(_) => {}
            TokenKind::Text { .. } => {
                if self.stack.is_empty() && !blank {
                    self.error(position, "text is not allowed outside the root element");
                }
            }
            TokenKind::OpenTag { name, attributes } => {
                self.check_top_level(&name, position);
                let mut node = DocumentNode::new(name, position);
                node.attributes = attributes;
                self.stack.push(NestingFrame { node });
            }
            TokenKind::SelfClosingTag { name, attributes } => {
                self.check_top_level(&name, position);
                let mut node = DocumentNode::new(name, position);
                node.attributes = attributes;
                self.attach(node);
            }
            TokenKind::CloseTag { name } => return self.close(&name, position),
        }

        Step::Continue
    }

    fn close(&mut self, name: &str, position: Position) -> Step {
        let Some(frame) = self.stack.last() else {
            self.error(position, format!("unexpected close tag </{name}> with no open element"));
            return Step::Continue;
        };

        if frame.node.name != name {
            let message = format!(
                "mismatched close tag: expected </{}>, found </{}> (<{}> opened at {})",
                frame.node.name, name, frame.node.name, frame.node.position
            );
            self.error(position, message);
            return Step::Abort;
        }

        if let Some(frame) = self.stack.pop() {
            self.attach(frame.node);
        }
        Step::Continue
    }

    /// An element starting with an empty stack is a top-level element
    fn check_top_level(&mut self, name: &str, position: Position) {
        if !self.stack.is_empty() {
            return;
        }
        match &self.root_name {
            Some(root) => {
                let message = format!(
                    "multiple root elements: <{name}> appears after root element <{root}>"
                );
                self.error(position, message);
            }
            None => self.root_name = Some(name.to_string()),
        }
    }

    fn attach(&mut self, node: DocumentNode) {
        if let Some(parent) = self.stack.last_mut() {
            parent.node.children.push(node);
        } else if self.root.is_none() {
            self.root = Some(node);
        }
        // Extra top-level elements were already reported and are not kept
    }

    fn error(&mut self, position: Position, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::malformed(position, message));
    }

    fn syntax_error(&mut self, err: SyntaxError) {
        self.diagnostics
            .push(Diagnostic::malformed(err.position, err.message));
    }

    fn finish(mut self) -> Result<DocumentNode, Vec<Diagnostic>> {
        let unclosed = std::mem::take(&mut self.stack);
        let had_unclosed = !unclosed.is_empty();
        for frame in unclosed {
            let message = format!("unclosed tag <{}>", frame.node.name);
            self.error(frame.node.position, message);
        }

        if self.root.is_none() && !had_unclosed {
            self.error(Position::start(), "document has no root element");
        }

        match self.root {
            Some(root) if self.diagnostics.is_empty() => Ok(root),
            _ => Err(self.diagnostics),
        }
    }
}

/// Validate nesting and root cardinality over a token stream.
///
/// Returns the root element on success, or the diagnostics in the order
/// they were found. A syntax error or a mismatched close tag ends the scan.
pub fn check_well_formed<I>(tokens: I) -> Result<DocumentNode, Vec<Diagnostic>>
where
    I: IntoIterator<Item = Result<Token, SyntaxError>>,
{
    let mut builder = TreeBuilder::default();

    for item in tokens {
        match item {
            Ok(token) => {
                if let Step::Abort = builder.feed(token) {
                    return Err(builder.diagnostics);
                }
            }
            Err(err) => {
                builder.syntax_error(err);
                return Err(builder.diagnostics);
            }
        }
    }

    builder.finish()
}
