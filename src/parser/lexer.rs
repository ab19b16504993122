//! Markup Lexer
//!
//! Strict, position-tracking tokenization of tag-structured markup.
//! Focus: exact locations on every token and on the first syntax error.

use serde::Serialize;
use std::fmt;

/// A location in the source text
///
/// Lines and columns start at 1; columns count characters, offsets count bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Position of the first character of a document
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A `name="value"` pair on a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Raw value between the quotes, references left unexpanded
    pub value: String,
    pub position: Position,
}

/// Token types in markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `<name attr="v">`
    OpenTag {
        name: String,
        attributes: Vec<Attribute>,
    },
    /// `</name>`
    CloseTag { name: String },
    /// `<name attr="v"/>`
    SelfClosingTag {
        name: String,
        attributes: Vec<Attribute>,
    },
    /// `<!-- ... -->`, body only
    Comment(String),
    /// Character data; `cdata` marks a `<![CDATA[...]]>` section
    Text { content: String, cdata: bool },
    /// `<?...?>` or `<!DOCTYPE ...>`, kept verbatim and otherwise ignored
    Declaration(String),
}

/// A token with the position of its first character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    /// Whether this token is plain text made only of whitespace
    pub fn is_blank_text(&self) -> bool {
        match &self.kind {
            TokenKind::Text {
                content,
                cdata: false,
            } => content.chars().all(is_xml_whitespace),
            _ => false,
        }
    }
}

/// Malformed tag, attribute, comment or reference syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub position: Position,
    pub message: String,
}

impl SyntaxError {
    fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

impl std::error::Error for SyntaxError {}

const PREDEFINED_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

/// Single-pass token stream over a source string
///
/// Yields `Err` at most once; the stream is fused after an error.
#[derive(Debug)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    done: bool,
}

/// Tokenize markup text
pub fn tokenize(src: &str) -> Lexer<'_> {
    Lexer::new(src)
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            done: false,
        }
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column, self.pos)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();

        match ch {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            // CRLF counts once, on the '\n'
            '\r' if self.peek() == Some('\n') => {}
            '\r' => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }

        Some(ch)
    }

    /// Consume an ASCII prefix already checked with `starts_with`
    fn skip_literal(&mut self, literal: &str) {
        for _ in 0..literal.len() {
            self.bump();
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(is_xml_whitespace) {
            self.bump();
            skipped = true;
        }
        skipped
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        if self.starts_with("<!--") {
            self.lex_comment()
        } else if self.starts_with("<![CDATA[") {
            self.lex_cdata()
        } else if self.starts_with("<!") {
            self.lex_doctype()
        } else if self.starts_with("<?") {
            self.lex_processing_instruction()
        } else if self.starts_with("</") {
            self.lex_close_tag()
        } else if self.starts_with("<") {
            self.lex_open_tag()
        } else {
            self.lex_text()
        }
    }

    fn lex_text(&mut self) -> Result<Token, SyntaxError> {
        let start = self.here();

        while let Some(ch) = self.peek() {
            match ch {
                '<' => break,
                '&' => self.scan_reference()?,
                _ => {
                    self.bump();
                }
            }
        }

        Ok(Token {
            kind: TokenKind::Text {
                content: self.src[start.offset..self.pos].to_string(),
                cdata: false,
            },
            position: start,
        })
    }

    fn lex_comment(&mut self) -> Result<Token, SyntaxError> {
        let start = self.here();
        self.skip_literal("<!--");
        let body_start = self.pos;

        loop {
            if self.starts_with("-->") {
                let body = self.src[body_start..self.pos].to_string();
                self.skip_literal("-->");
                return Ok(Token {
                    kind: TokenKind::Comment(body),
                    position: start,
                });
            }
            if self.starts_with("--") {
                return Err(SyntaxError::new(
                    self.here(),
                    "'--' is not allowed inside a comment",
                ));
            }
            if self.bump().is_none() {
                return Err(SyntaxError::new(start, "unterminated comment"));
            }
        }
    }

    fn lex_cdata(&mut self) -> Result<Token, SyntaxError> {
        let start = self.here();
        self.skip_literal("<![CDATA[");
        let body_start = self.pos;

        let Some(len) = self.rest().find("]]>") else {
            return Err(SyntaxError::new(start, "unterminated CDATA section"));
        };
        let content = self.src[body_start..body_start + len].to_string();
        while self.pos < body_start + len {
            self.bump();
        }
        self.skip_literal("]]>");

        Ok(Token {
            kind: TokenKind::Text {
                content,
                cdata: true,
            },
            position: start,
        })
    }

    fn lex_doctype(&mut self) -> Result<Token, SyntaxError> {
        let start = self.here();
        self.skip_literal("<!");

        if !self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(SyntaxError::new(
                self.here(),
                "malformed markup declaration after '<!'",
            ));
        }

        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        while let Some(ch) = self.bump() {
            match (quote, ch) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(ch),
                (None, '[') => depth += 1,
                (None, ']') => depth = depth.saturating_sub(1),
                (None, '>') if depth == 0 => {
                    return Ok(Token {
                        kind: TokenKind::Declaration(self.src[start.offset..self.pos].to_string()),
                        position: start,
                    });
                }
                _ => {}
            }
        }

        Err(SyntaxError::new(start, "unterminated markup declaration"))
    }

    fn lex_processing_instruction(&mut self) -> Result<Token, SyntaxError> {
        let start = self.here();
        self.skip_literal("<?");

        loop {
            if self.starts_with("?>") {
                self.skip_literal("?>");
                return Ok(Token {
                    kind: TokenKind::Declaration(self.src[start.offset..self.pos].to_string()),
                    position: start,
                });
            }
            if self.bump().is_none() {
                return Err(SyntaxError::new(start, "unterminated processing instruction"));
            }
        }
    }

    /// Check the element name right after `<` or `</`
    fn expect_name_start(&self, opener: &str) -> Result<(), SyntaxError> {
        match self.peek() {
            Some(c) if is_name_start(c) => Ok(()),
            Some(c) if is_xml_whitespace(c) => Err(SyntaxError::new(
                self.here(),
                format!("whitespace is not allowed between '{opener}' and the element name"),
            )),
            Some(c) => Err(SyntaxError::new(
                self.here(),
                format!("invalid element name start character '{c}' after '{opener}'"),
            )),
            None => Err(SyntaxError::new(
                self.here(),
                format!("unexpected end of input after '{opener}'"),
            )),
        }
    }

    fn lex_close_tag(&mut self) -> Result<Token, SyntaxError> {
        let start = self.here();
        self.skip_literal("</");
        self.expect_name_start("</")?;
        let name = self.read_name();
        self.skip_whitespace();

        match self.peek() {
            Some('>') => {
                self.bump();
                Ok(Token {
                    kind: TokenKind::CloseTag { name },
                    position: start,
                })
            }
            Some(c) => Err(SyntaxError::new(
                self.here(),
                format!("unexpected character '{c}' in close tag </{name}>"),
            )),
            None => Err(SyntaxError::new(
                start,
                format!("unterminated close tag </{name}>"),
            )),
        }
    }

    fn lex_open_tag(&mut self) -> Result<Token, SyntaxError> {
        let start = self.here();
        self.bump();
        self.expect_name_start("<")?;
        let name = self.read_name();
        let mut attributes: Vec<Attribute> = Vec::new();

        loop {
            let separated = self.skip_whitespace();

            match self.peek() {
                Some('>') => {
                    self.bump();
                    return Ok(Token {
                        kind: TokenKind::OpenTag { name, attributes },
                        position: start,
                    });
                }
                Some('/') => {
                    self.bump();
                    if self.peek() != Some('>') {
                        return Err(SyntaxError::new(
                            self.here(),
                            format!("expected '>' after '/' in tag <{name}>"),
                        ));
                    }
                    self.bump();
                    return Ok(Token {
                        kind: TokenKind::SelfClosingTag { name, attributes },
                        position: start,
                    });
                }
                Some(c) if is_name_start(c) => {
                    if !separated {
                        return Err(SyntaxError::new(
                            self.here(),
                            format!("missing whitespace before attribute in tag <{name}>"),
                        ));
                    }
                    let attribute = self.lex_attribute(&name)?;
                    if attributes.iter().any(|a| a.name == attribute.name) {
                        return Err(SyntaxError::new(
                            attribute.position,
                            format!("duplicate attribute '{}' on <{name}>", attribute.name),
                        ));
                    }
                    attributes.push(attribute);
                }
                Some(c) => {
                    return Err(SyntaxError::new(
                        self.here(),
                        format!("unexpected character '{c}' in tag <{name}>"),
                    ));
                }
                None => {
                    return Err(SyntaxError::new(start, format!("unterminated tag <{name}>")));
                }
            }
        }
    }

    fn lex_attribute(&mut self, tag: &str) -> Result<Attribute, SyntaxError> {
        let position = self.here();
        let name = self.read_name();
        self.skip_whitespace();

        if self.peek() != Some('=') {
            return Err(SyntaxError::new(
                position,
                format!("attribute '{name}' on <{tag}> has no value"),
            ));
        }
        self.bump();
        self.skip_whitespace();

        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            Some(_) => {
                return Err(SyntaxError::new(
                    self.here(),
                    format!("unquoted value for attribute '{name}' on <{tag}>"),
                ));
            }
            None => {
                return Err(SyntaxError::new(
                    position,
                    format!("unterminated tag <{tag}>"),
                ));
            }
        };
        let quote_position = self.here();
        self.bump();
        let value_start = self.pos;

        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    let value = self.src[value_start..self.pos].to_string();
                    self.bump();
                    return Ok(Attribute {
                        name,
                        value,
                        position,
                    });
                }
                Some('<') => {
                    return Err(SyntaxError::new(
                        self.here(),
                        format!("'<' is not allowed in the value of attribute '{name}'"),
                    ));
                }
                Some('&') => self.scan_reference()?,
                Some(_) => {
                    self.bump();
                }
                None => {
                    return Err(SyntaxError::new(
                        quote_position,
                        format!("unterminated value for attribute '{name}' on <{tag}>"),
                    ));
                }
            }
        }
    }

    /// Check a `&...;` reference without expanding it
    fn scan_reference(&mut self) -> Result<(), SyntaxError> {
        let start = self.here();
        self.bump();
        let body_start = self.pos;

        while self
            .peek()
            .is_some_and(|c| c == '#' || is_name_char(c))
        {
            self.bump();
        }
        let body = &self.src[body_start..self.pos];

        if body.is_empty() || self.peek() != Some(';') {
            return Err(SyntaxError::new(
                start,
                "'&' must start a reference terminated by ';' (use &amp; for a literal '&')",
            ));
        }
        self.bump();

        let valid = if let Some(hex) = body.strip_prefix("#x") {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32).is_some()
        } else if let Some(dec) = body.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32).is_some()
        } else {
            PREDEFINED_ENTITIES.contains(&body)
        };

        if valid {
            Ok(())
        } else if body.starts_with('#') {
            Err(SyntaxError::new(
                start,
                format!("invalid character reference '&{body};'"),
            ))
        } else {
            Err(SyntaxError::new(
                start,
                format!("undefined entity '&{body};'"),
            ))
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.src.len() {
            self.done = true;
            return None;
        }

        let token = self.next_token();
        if token.is_err() {
            self.done = true;
        }
        Some(token)
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

/// Only the four XML whitespace characters separate markup
fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':' || (!c.is_ascii() && c.is_alphabetic())
}

fn is_name_char(c: char) -> bool {
    is_name_start(c)
        || c.is_ascii_digit()
        || c == '-'
        || c == '.'
        || (!c.is_ascii() && c.is_alphanumeric())
}
