//! Structural parser for PostgreSQL array literals.
//!
//! Turns `{1,{2,3}}`-style text into a tree of [`Node`]s without interpreting
//! leaf tokens. Element typing and dimension checks happen in the caller,
//! which knows the declared [`ArraySpec`](crate::fields::ArraySpec).
//!
//! Accepted syntax follows PostgreSQL's `array_in`:
//!
//! - optional dimension decoration before `=`, e.g. `[1:3]={1,2,3}`
//! - whitespace around elements and delimiters is ignored
//! - quoted elements use `"` with `\` escaping any character
//! - unquoted elements may use `\` escapes; trailing unescaped whitespace is trimmed
//! - an unquoted, unescaped `NULL` (any case) is a null element
//! - nesting deeper than [`MAX_DIMENSIONS`] is rejected

use crate::fields::MAX_DIMENSIONS;

/// One node of a parsed array literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    /// A brace-delimited sub-array.
    Array(Vec<Node>),
    /// A leaf element.
    Element(Element),
}

/// A leaf element, with quoting and escapes already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Element {
    /// The unquoted `NULL` token.
    Null,
    /// Any other token, as text.
    Text(String),
}

/// Parses a complete literal and returns the items of its outermost array.
pub(crate) fn parse(input: &str) -> Result<Vec<Node>, String> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
    };
    parser.skip_ws();
    if parser.peek() == Some('[') {
        parser.skip_bounds()?;
        parser.skip_ws();
    }
    let items = parser.parse_array(1)?;
    parser.skip_ws();
    if parser.pos < parser.chars.len() {
        return Err(format!(
            "junk after closing right brace at position {}",
            parser.pos
        ));
    }
    Ok(items)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Skips `[lo:hi]` groups and the `=` that follows them.
    fn skip_bounds(&mut self) -> Result<(), String> {
        while self.peek() == Some('[') {
            self.pos += 1;
            loop {
                match self.bump() {
                    Some(']') => break,
                    Some(c) if c.is_ascii_digit() || matches!(c, ':' | '-' | '+') => {}
                    Some(c) => {
                        return Err(format!(
                            "unexpected '{c}' in dimension bounds at position {}",
                            self.pos - 1
                        ))
                    }
                    None => return Err("unterminated dimension bounds".to_string()),
                }
            }
            self.skip_ws();
        }
        match self.bump() {
            Some('=') => Ok(()),
            _ => Err("missing '=' after dimension bounds".to_string()),
        }
    }

    fn parse_array(&mut self, depth: usize) -> Result<Vec<Node>, String> {
        if depth > MAX_DIMENSIONS {
            return Err(format!(
                "number of array dimensions exceeds the maximum allowed ({MAX_DIMENSIONS})"
            ));
        }
        match self.bump() {
            Some('{') => {}
            Some(c) => {
                return Err(format!(
                    "expected '{{' at position {}, found '{c}'",
                    self.pos - 1
                ))
            }
            None => return Err("expected '{' but the literal is empty".to_string()),
        }

        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(items);
        }

        loop {
            self.skip_ws();
            let item = match self.peek() {
                Some('{') => Node::Array(self.parse_array(depth + 1)?),
                Some('"') => Node::Element(Element::Text(self.parse_quoted()?)),
                Some(_) => Node::Element(self.parse_unquoted()?),
                None => return Err("unterminated array".to_string()),
            };
            items.push(item);
            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some('}') => return Ok(items),
                Some(c) => {
                    return Err(format!(
                        "unexpected '{c}' at position {}, expected ',' or '}}'",
                        self.pos - 1
                    ))
                }
                None => return Err("unterminated array".to_string()),
            }
        }
    }

    fn parse_quoted(&mut self) -> Result<String, String> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(c) => out.push(c),
                    None => break,
                },
                Some('"') => return Ok(out),
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(format!("unterminated quoted element starting at position {start}"))
    }

    fn parse_unquoted(&mut self) -> Result<Element, String> {
        let start = self.pos;
        let mut out = String::new();
        // Bytes of `out` that came from escapes and must survive trimming.
        let mut protected = 0;
        let mut escaped = false;
        loop {
            match self.peek() {
                Some(',' | '}') => break,
                Some(c @ ('{' | '"')) => {
                    return Err(format!(
                        "unexpected '{c}' inside unquoted element at position {}",
                        self.pos
                    ))
                }
                Some('\\') => {
                    self.pos += 1;
                    let c = self
                        .bump()
                        .ok_or_else(|| "literal ends with a dangling backslash".to_string())?;
                    out.push(c);
                    protected = out.len();
                    escaped = true;
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
                None => return Err("unterminated array".to_string()),
            }
        }

        let keep = protected.max(out.trim_end().len());
        out.truncate(keep);

        if out.is_empty() && !escaped {
            return Err(format!("empty unquoted element at position {start}"));
        }
        if !escaped && out.eq_ignore_ascii_case("NULL") {
            return Ok(Element::Null);
        }
        Ok(Element::Text(out))
    }
}
