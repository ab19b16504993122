//! Markup Parser
//!
//! Tokenization and the element tree produced from a well-formed token stream.

pub mod ast;
pub mod lexer;

pub use ast::DocumentNode;
pub use lexer::{tokenize, Attribute, Lexer, Position, SyntaxError, Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_mixed_document() {
        let src = "<?xml version=\"1.0\"?>\n<pl-question-panel>\n  <p>Hi &amp; bye</p>\n  <!-- note -->\n  <br/>\n</pl-question-panel>\n";
        let kinds: Vec<_> = tokenize(src)
            .map(|t| t.expect("token"))
            .filter(|t| !t.is_blank_text())
            .map(|t| match t.kind {
                TokenKind::OpenTag { name, .. } => format!("open:{name}"),
                TokenKind::CloseTag { name } => format!("close:{name}"),
                TokenKind::SelfClosingTag { name, .. } => format!("empty:{name}"),
                TokenKind::Comment(_) => "comment".to_string(),
                TokenKind::Text { .. } => "text".to_string(),
                TokenKind::Declaration(_) => "decl".to_string(),
            })
            .collect();

        assert_eq!(
            kinds,
            [
                "decl",
                "open:pl-question-panel",
                "open:p",
                "text",
                "close:p",
                "comment",
                "empty:br",
                "close:pl-question-panel",
            ]
        );
    }
}
