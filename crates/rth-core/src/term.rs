//! Reader and printer for the dot-terminated term files used by the build
//! tool (`*.app`, `*.app.src`, `rebar.lock`, `*.rel`, `rebar.config`).

use std::fmt::{self, Display, Write as _};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, HarnessError};

/// A single term value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Term {
    /// Bare or quoted atom.
    Atom(String),
    /// Double-quoted list string.
    Str(String),
    /// Binary string, `<<"...">>`.
    Bin(String),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// `{...}`
    Tuple(Vec<Term>),
    /// `[...]`
    List(Vec<Term>),
}

impl Term {
    /// Creates an atom.
    pub fn atom(value: impl Into<String>) -> Self {
        Term::Atom(value.into())
    }

    /// Creates a list string.
    pub fn string(value: impl Into<String>) -> Self {
        Term::Str(value.into())
    }

    /// Creates a binary string.
    pub fn bin(value: impl Into<String>) -> Self {
        Term::Bin(value.into())
    }

    /// Creates a tuple.
    pub fn tuple(items: impl IntoIterator<Item = Term>) -> Self {
        Term::Tuple(items.into_iter().collect())
    }

    /// Creates a list.
    pub fn list(items: impl IntoIterator<Item = Term>) -> Self {
        Term::List(items.into_iter().collect())
    }

    /// Returns the textual payload of an atom, string or binary.
    ///
    /// Names and versions show up in all three forms depending on the file
    /// format revision, so comparisons go through this normalisation.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Term::Atom(s) | Term::Str(s) | Term::Bin(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the atom name if this is an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Term::Atom(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the tuple elements if this is a tuple.
    pub fn as_tuple(&self) -> Option<&[Term]> {
        match self {
            Term::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the list elements if this is a list.
    pub fn as_list(&self) -> Option<&[Term]> {
        match self {
            Term::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up `key` in a property list (`[{key, Value}, ...]`).
    pub fn proplist_get(&self, key: &str) -> Option<&Term> {
        self.as_list()?.iter().find_map(|item| match item.as_tuple() {
            Some([k, v]) if k.as_atom() == Some(key) => Some(v),
            _ => None,
        })
    }
}

const RESERVED: &[&str] = &[
    "after", "and", "andalso", "band", "begin", "bnot", "bor", "bsl", "bsr", "bxor", "case",
    "catch", "cond", "div", "end", "fun", "if", "let", "not", "of", "or", "orelse", "receive",
    "rem", "try", "when", "xor",
];

fn is_bare_atom(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '@') && !RESERVED.contains(&name)
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str, quote: char) -> fmt::Result {
    f.write_char(quote)?;
    for c in value.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Term], open: char, close: char) -> fmt::Result {
    f.write_char(open)?;
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_char(',')?;
        }
        write!(f, "{item}")?;
    }
    f.write_char(close)
}

// the reader requires a fractional part, so `1e20` is written as `1.0e20`
fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    let mut text = format!("{value:?}");
    if value.is_finite() && !text.contains('.') {
        let at = text.find('e').unwrap_or(text.len());
        text.insert_str(at, ".0");
    }
    f.write_str(&text)
}

impl Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) if is_bare_atom(name) => f.write_str(name),
            Term::Atom(name) => write_escaped(f, name, '\''),
            Term::Str(value) => write_escaped(f, value, '"'),
            Term::Bin(value) if value.is_empty() => f.write_str("<<>>"),
            Term::Bin(value) => {
                f.write_str("<<")?;
                write_escaped(f, value, '"')?;
                f.write_str(">>")
            }
            Term::Int(value) => write!(f, "{value}"),
            Term::Float(value) => write_float(f, *value),
            Term::Tuple(items) => write_seq(f, items, '{', '}'),
            Term::List(items) => write_seq(f, items, '[', ']'),
        }
    }
}

/// Parses every dot-terminated term in `text`.
pub fn consult_str(text: &str) -> Result<Vec<Term>, HarnessError> {
    let mut reader = Reader::new(text);
    let mut terms = Vec::new();
    loop {
        reader.skip_trivia();
        if reader.at_end() {
            break;
        }
        terms.push(reader.term()?);
        reader.skip_trivia();
        reader.expect('.')?;
    }
    Ok(terms)
}

/// Reads and parses a term file.
pub fn consult_file(path: &Path) -> Result<Vec<Term>, HarnessError> {
    let text = fs::read_to_string(path).map_err(|err| HarnessError::io("term_read", path, err))?;
    consult_str(&text).map_err(|err| match err {
        HarnessError::Parse(info) => HarnessError::Parse(info.with_path(path)),
        other => other,
    })
}

struct Reader {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Reader {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> HarnessError {
        HarnessError::Parse(
            ErrorInfo::new("term_syntax", message).with_context("line", self.line.to_string()),
        )
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '%' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, want: char) -> Result<(), HarnessError> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(self.error(format!("expected `{want}`, found `{c}`"))),
            None => Err(self.error(format!("expected `{want}`, found end of input"))),
        }
    }

    fn term(&mut self) -> Result<Term, HarnessError> {
        self.skip_trivia();
        match self.peek() {
            Some('{') => {
                self.bump();
                Ok(Term::Tuple(self.sequence('}')?))
            }
            Some('[') => {
                self.bump();
                self.list()
            }
            Some('<') if self.peek_at(1) == Some('<') => {
                self.pos += 2;
                self.binary()
            }
            Some('"') => {
                self.bump();
                Ok(Term::Str(self.quoted('"')?))
            }
            Some('\'') => {
                self.bump();
                Ok(Term::Atom(self.quoted('\'')?))
            }
            Some(c) if c.is_ascii_digit() || c == '-' => self.number(),
            Some(c) if c.is_ascii_lowercase() => Ok(Term::Atom(self.bare_atom())),
            Some(c) => Err(self.error(format!("unexpected character `{c}`"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn sequence(&mut self, close: char) -> Result<Vec<Term>, HarnessError> {
        let mut items = Vec::new();
        self.skip_trivia();
        if self.peek() == Some(close) {
            self.bump();
            return Ok(items);
        }
        loop {
            items.push(self.term()?);
            self.skip_trivia();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(items),
                Some(c) => return Err(self.error(format!("expected `,` or `{close}`, found `{c}`"))),
                None => return Err(self.error(format!("unterminated sequence, missing `{close}`"))),
            }
        }
    }

    fn list(&mut self) -> Result<Term, HarnessError> {
        let mut items = Vec::new();
        self.skip_trivia();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(Term::List(items));
        }
        loop {
            items.push(self.term()?);
            self.skip_trivia();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(Term::List(items)),
                Some('|') => {
                    match self.term()? {
                        Term::List(tail) => items.extend(tail),
                        _ => return Err(self.error("improper list tails are not supported")),
                    }
                    self.skip_trivia();
                    self.expect(']')?;
                    return Ok(Term::List(items));
                }
                Some(c) => return Err(self.error(format!("expected `,` or `]`, found `{c}`"))),
                None => return Err(self.error("unterminated list")),
            }
        }
    }

    fn binary(&mut self) -> Result<Term, HarnessError> {
        self.skip_trivia();
        let value = if self.peek() == Some('"') {
            self.bump();
            let value = self.quoted('"')?;
            self.skip_trivia();
            value
        } else {
            String::new()
        };
        self.expect('>')?;
        self.expect('>')?;
        Ok(Term::Bin(value))
    }

    fn quoted(&mut self, quote: char) -> Result<String, HarnessError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(c) => out.push(c),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(self.error(format!("unterminated quoted text, missing `{quote}`"))),
            }
        }
    }

    fn bare_atom(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '@' {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
        out
    }

    fn number(&mut self) -> Result<Term, HarnessError> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }
        self.digits(&mut text);
        let is_float = self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit());
        if is_float {
            text.push('.');
            self.bump();
            self.digits(&mut text);
            if matches!(self.peek(), Some('e' | 'E')) {
                text.push('e');
                self.bump();
                if matches!(self.peek(), Some('-' | '+')) {
                    text.extend(self.bump());
                }
                self.digits(&mut text);
            }
            return text
                .parse::<f64>()
                .map(Term::Float)
                .map_err(|err| self.error(format!("invalid float `{text}`: {err}")));
        }
        text.parse::<i64>()
            .map(Term::Int)
            .map_err(|err| self.error(format!("invalid integer `{text}`: {err}")))
    }

    fn digits(&mut self, out: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_application_resource() {
        let text = r#"
            %% generated
            {application, foo,
             [{description, "demo"},
              {vsn, "1.0.0"},
              {modules, [foo, foo_sup]},
              {applications, [kernel, stdlib]}]}.
        "#;
        let terms = consult_str(text).unwrap();
        assert_eq!(terms.len(), 1);
        let items = terms[0].as_tuple().unwrap();
        assert_eq!(items[0].as_atom(), Some("application"));
        assert_eq!(items[1].as_atom(), Some("foo"));
        assert_eq!(items[2].proplist_get("vsn").and_then(Term::as_text), Some("1.0.0"));
        let modules = items[2].proplist_get("modules").and_then(Term::as_list).unwrap();
        assert_eq!(modules.len(), 2);
    }

    #[test]
    fn reads_binaries_and_numbers() {
        let terms = consult_str(r#"{<<"a">>, <<>>, -3, 1.5, 'Quoted atom'}."#).unwrap();
        assert_eq!(
            terms[0],
            Term::tuple([
                Term::bin("a"),
                Term::bin(""),
                Term::Int(-3),
                Term::Float(1.5),
                Term::atom("Quoted atom"),
            ])
        );
    }

    #[test]
    fn list_tail_is_spliced() {
        let terms = consult_str("[a, b | [c]].").unwrap();
        assert_eq!(
            terms[0],
            Term::list([Term::atom("a"), Term::atom("b"), Term::atom("c")])
        );
    }

    #[test]
    fn printed_terms_read_back() {
        let term = Term::tuple([
            Term::atom("deps"),
            Term::list([Term::tuple([
                Term::atom("foo"),
                Term::string("1.0.0"),
            ])]),
            Term::atom("Needs quotes"),
            Term::atom("end"),
            Term::bin("x\"y"),
        ]);
        let printed = format!("{term}.");
        assert_eq!(consult_str(&printed).unwrap(), vec![term]);
    }

    #[test]
    fn floats_print_with_a_fractional_part() {
        assert_eq!(Term::Float(1e20).to_string(), "1.0e20");
        assert_eq!(Term::Float(2.5e-7).to_string(), "2.5e-7");
        assert_eq!(Term::Float(3.0).to_string(), "3.0");
        for value in [1e20, 2.5e-7, -4e-9, 0.125] {
            let printed = format!("{}.", Term::Float(value));
            assert_eq!(consult_str(&printed).unwrap(), vec![Term::Float(value)]);
        }
    }

    #[test]
    fn missing_terminator_is_a_parse_error() {
        let err = consult_str("{a, b}").unwrap_err();
        assert_eq!(err.code(), "term_syntax");
        assert!(matches!(err, HarnessError::Parse(_)));
    }
}
