//! JSON tokens and the bundled tokenizer.
//!
//! The decoder only needs a forward-only stream of [`Token`]s. Anything that
//! produces one can implement [`TokenSource`]; [`JsonTokenizer`] does so for
//! a JSON document held in memory.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str;

use crate::error::{DecodeError, DecodeErrorKind, Span};

/// One JSON token.
///
/// Object keys and colons are folded into [`Token::Key`]; commas are not
/// reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'de> {
    /// `{`
    ObjectStart,
    /// `}`
    ObjectEnd,
    /// `[`
    ArrayStart,
    /// `]`
    ArrayEnd,
    /// An object key, with escapes decoded
    Key(Cow<'de, str>),
    /// A string value, with escapes decoded
    String(Cow<'de, str>),
    /// A number, in its exact textual form
    Number(Cow<'de, str>),
    /// `true` or `false`
    Bool(bool),
    /// `null`
    Null,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::ObjectStart => f.write_str("`{`"),
            Token::ObjectEnd => f.write_str("`}`"),
            Token::ArrayStart => f.write_str("`[`"),
            Token::ArrayEnd => f.write_str("`]`"),
            Token::Key(k) => write!(f, "key {k:?}"),
            Token::String(s) => write!(f, "string {s:?}"),
            Token::Number(n) => write!(f, "number {n}"),
            Token::Bool(b) => write!(f, "`{b}`"),
            Token::Null => f.write_str("`null`"),
        }
    }
}

/// A forward-only source of JSON tokens.
pub trait TokenSource<'de> {
    /// Returns the next token, or `Ok(None)` at end of input.
    fn next_token(&mut self) -> Result<Option<Token<'de>>, DecodeError>;

    /// Span of the token most recently returned, if the source tracks one.
    fn span(&self) -> Option<Span> {
        None
    }
}

/// Ways a document can fail to be JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A character that can't start or continue a token here
    UnexpectedChar {
        /// The character found
        ch: char,
        /// What was expected instead
        expected: &'static str,
    },
    /// The document ended inside a token
    UnexpectedEof(&'static str),
    /// A raw control character inside a string
    ControlCharacter(char),
    /// A backslash followed by something other than a JSON escape
    InvalidEscape(char),
    /// `\u` not followed by four hex digits
    InvalidUnicodeEscape,
    /// A UTF-16 surrogate that is not part of a valid pair
    LoneSurrogate(u16),
    /// A malformed number
    InvalidNumber,
    /// A string that is not valid UTF-8
    InvalidUtf8,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::UnexpectedChar { ch, expected } => {
                write!(f, "unexpected {ch:?}, expected {expected}")
            }
            SyntaxErrorKind::UnexpectedEof(ctx) => write!(f, "unexpected end of input {ctx}"),
            SyntaxErrorKind::ControlCharacter(c) => {
                write!(f, "control character {c:?} must be escaped")
            }
            SyntaxErrorKind::InvalidEscape(c) => write!(f, "invalid escape `\\{c}`"),
            SyntaxErrorKind::InvalidUnicodeEscape => {
                f.write_str("`\\u` must be followed by four hex digits")
            }
            SyntaxErrorKind::LoneSurrogate(unit) => write!(f, "lone surrogate `\\u{unit:04X}`"),
            SyntaxErrorKind::InvalidNumber => f.write_str("invalid number"),
            SyntaxErrorKind::InvalidUtf8 => f.write_str("invalid UTF-8"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    Object(ObjectState),
    Array(ArrayState),
}

#[derive(Debug, Clone, Copy)]
enum ObjectState {
    KeyOrEnd,
    Key,
    Value,
    CommaOrEnd,
}

#[derive(Debug, Clone, Copy)]
enum ArrayState {
    ValueOrEnd,
    Value,
    CommaOrEnd,
}

/// Tokenizer for a JSON document held in memory.
///
/// Strings without escapes and all numbers are borrowed from the input.
/// After the first top-level value, further values are tokenized as well,
/// so callers can detect trailing data.
pub struct JsonTokenizer<'de> {
    input: &'de [u8],
    pos: usize,
    stack: Vec<Frame>,
    span: Span,
}

impl<'de> JsonTokenizer<'de> {
    /// Creates a tokenizer over `input`.
    pub fn new(input: &'de [u8]) -> Self {
        Self {
            input,
            pos: 0,
            stack: Vec::new(),
            span: Span::default(),
        }
    }

    /// Current position in the input.
    pub fn pos(&self) -> usize {
        self.pos
    }

    fn error(&self, kind: SyntaxErrorKind, span: Span) -> DecodeError {
        DecodeError::new(DecodeErrorKind::Syntax(kind), span)
    }

    fn unexpected(&self, expected: &'static str) -> DecodeError {
        let ch = self.char_at(self.pos);
        self.error(
            SyntaxErrorKind::UnexpectedChar { ch, expected },
            Span::new(self.pos, ch.len_utf8()),
        )
    }

    fn char_at(&self, pos: usize) -> char {
        self.input[pos..]
            .utf8_chunks()
            .next()
            .and_then(|chunk| chunk.valid().chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.input.get(self.pos) {
            self.pos += 1;
        }
    }

    fn emit(&mut self, token: Token<'de>, start: usize) -> Result<Option<Token<'de>>, DecodeError> {
        self.span = Span::new(start, self.pos - start);
        Ok(Some(token))
    }

    fn end_container(&mut self, token: Token<'de>) -> Result<Option<Token<'de>>, DecodeError> {
        let start = self.pos;
        self.pos += 1;
        self.stack.pop();
        self.emit(token, start)
    }

    fn value(&mut self, byte: u8) -> Result<Option<Token<'de>>, DecodeError> {
        match self.stack.last_mut() {
            Some(Frame::Object(state)) => *state = ObjectState::CommaOrEnd,
            Some(Frame::Array(state)) => *state = ArrayState::CommaOrEnd,
            None => {}
        }

        let start = self.pos;
        match byte {
            b'{' => {
                self.pos += 1;
                self.stack.push(Frame::Object(ObjectState::KeyOrEnd));
                self.emit(Token::ObjectStart, start)
            }
            b'[' => {
                self.pos += 1;
                self.stack.push(Frame::Array(ArrayState::ValueOrEnd));
                self.emit(Token::ArrayStart, start)
            }
            b'"' => {
                let s = self.string()?;
                self.emit(Token::String(s), start)
            }
            b't' => self.literal(b"true", Token::Bool(true)),
            b'f' => self.literal(b"false", Token::Bool(false)),
            b'n' => self.literal(b"null", Token::Null),
            b'-' | b'0'..=b'9' => {
                let n = self.number()?;
                self.emit(Token::Number(Cow::Borrowed(n)), start)
            }
            _ => Err(self.unexpected("a value")),
        }
    }

    fn key(&mut self) -> Result<Option<Token<'de>>, DecodeError> {
        let start = self.pos;
        let key = self.string()?;
        let span = Span::new(start, self.pos - start);

        self.skip_whitespace();
        match self.input.get(self.pos) {
            Some(b':') => self.pos += 1,
            Some(_) => return Err(self.unexpected("`:`")),
            None => {
                return Err(self.error(
                    SyntaxErrorKind::UnexpectedEof("after object key"),
                    Span::new(self.pos, 0),
                ));
            }
        }
        if let Some(Frame::Object(state)) = self.stack.last_mut() {
            *state = ObjectState::Value;
        }

        self.span = span;
        Ok(Some(Token::Key(key)))
    }

    fn literal(
        &mut self,
        text: &'static [u8],
        token: Token<'de>,
    ) -> Result<Option<Token<'de>>, DecodeError> {
        let start = self.pos;
        let rest = &self.input[start..];
        if rest.starts_with(text) {
            self.pos += text.len();
            return self.emit(token, start);
        }

        // Point at the first byte that diverges.
        let matched = rest
            .iter()
            .zip(text)
            .take_while(|(a, b)| a == b)
            .count();
        if matched == rest.len() {
            return Err(self.error(
                SyntaxErrorKind::UnexpectedEof("in literal"),
                Span::new(start, matched),
            ));
        }
        self.pos = start + matched;
        Err(self.unexpected("a literal"))
    }

    /// Scans a string starting at the opening quote.
    fn string(&mut self) -> Result<Cow<'de, str>, DecodeError> {
        let input = self.input;
        let start = self.pos + 1;
        let mut pos = start;
        let mut has_escapes = false;

        loop {
            match input.get(pos) {
                None => {
                    return Err(self.error(
                        SyntaxErrorKind::UnexpectedEof("in string"),
                        Span::new(start - 1, pos - start + 1),
                    ));
                }
                Some(b'"') => break,
                Some(b'\\') => {
                    has_escapes = true;
                    pos += 2;
                }
                Some(&b) if b < 0x20 => {
                    return Err(self.error(
                        SyntaxErrorKind::ControlCharacter(char::from(b)),
                        Span::new(pos, 1),
                    ));
                }
                Some(_) => pos += 1,
            }
        }
        self.pos = pos + 1;

        let raw = str::from_utf8(&input[start..pos]).map_err(|e| {
            self.error(
                SyntaxErrorKind::InvalidUtf8,
                Span::new(start + e.valid_up_to(), 1),
            )
        })?;

        if has_escapes {
            unescape(raw, start).map(Cow::Owned)
        } else {
            Ok(Cow::Borrowed(raw))
        }
    }

    /// Scans a number, checking it against the JSON grammar.
    fn number(&mut self) -> Result<&'de str, DecodeError> {
        let input = self.input;
        let start = self.pos;
        let mut pos = start;

        let digits = |pos: &mut usize| {
            let from = *pos;
            while input.get(*pos).is_some_and(u8::is_ascii_digit) {
                *pos += 1;
            }
            *pos - from
        };

        if input.get(pos) == Some(&b'-') {
            pos += 1;
        }
        match input.get(pos) {
            Some(b'0') => {
                pos += 1;
                if input.get(pos).is_some_and(u8::is_ascii_digit) {
                    return Err(self.invalid_number(start, pos));
                }
            }
            Some(b'1'..=b'9') => {
                digits(&mut pos);
            }
            _ => return Err(self.invalid_number(start, pos)),
        }
        if input.get(pos) == Some(&b'.') {
            pos += 1;
            if digits(&mut pos) == 0 {
                return Err(self.invalid_number(start, pos));
            }
        }
        if let Some(b'e' | b'E') = input.get(pos) {
            pos += 1;
            if let Some(b'+' | b'-') = input.get(pos) {
                pos += 1;
            }
            if digits(&mut pos) == 0 {
                return Err(self.invalid_number(start, pos));
            }
        }

        self.pos = pos;
        str::from_utf8(&input[start..pos])
            .map_err(|_| self.error(SyntaxErrorKind::InvalidUtf8, Span::new(start, pos - start)))
    }

    fn invalid_number(&self, start: usize, pos: usize) -> DecodeError {
        if pos >= self.input.len() {
            self.error(
                SyntaxErrorKind::UnexpectedEof("in number"),
                Span::new(start, pos - start),
            )
        } else {
            self.error(
                SyntaxErrorKind::InvalidNumber,
                Span::new(start, pos - start + 1),
            )
        }
    }
}

impl<'de> TokenSource<'de> for JsonTokenizer<'de> {
    fn next_token(&mut self) -> Result<Option<Token<'de>>, DecodeError> {
        loop {
            self.skip_whitespace();
            let Some(&byte) = self.input.get(self.pos) else {
                self.span = Span::new(self.pos, 0);
                return Ok(None);
            };

            let Some(frame) = self.stack.last_mut() else {
                return self.value(byte);
            };

            match frame {
                Frame::Object(state) => match (*state, byte) {
                    (ObjectState::KeyOrEnd | ObjectState::CommaOrEnd, b'}') => {
                        return self.end_container(Token::ObjectEnd);
                    }
                    (ObjectState::KeyOrEnd | ObjectState::Key, b'"') => return self.key(),
                    (ObjectState::KeyOrEnd | ObjectState::Key, _) => {
                        return Err(self.unexpected("an object key"));
                    }
                    (ObjectState::Value, _) => return self.value(byte),
                    (ObjectState::CommaOrEnd, b',') => {
                        *state = ObjectState::Key;
                        self.pos += 1;
                    }
                    (ObjectState::CommaOrEnd, _) => return Err(self.unexpected("`,` or `}`")),
                },
                Frame::Array(state) => match (*state, byte) {
                    (ArrayState::ValueOrEnd | ArrayState::CommaOrEnd, b']') => {
                        return self.end_container(Token::ArrayEnd);
                    }
                    (ArrayState::ValueOrEnd | ArrayState::Value, _) => return self.value(byte),
                    (ArrayState::CommaOrEnd, b',') => {
                        *state = ArrayState::Value;
                        self.pos += 1;
                    }
                    (ArrayState::CommaOrEnd, _) => return Err(self.unexpected("`,` or `]`")),
                },
            }
        }
    }

    fn span(&self) -> Option<Span> {
        Some(self.span)
    }
}

/// Decodes the escapes of a string whose raw contents start at `offset`.
fn unescape(raw: &str, offset: usize) -> Result<String, DecodeError> {
    let error = |kind, at: usize, len| {
        DecodeError::new(DecodeErrorKind::Syntax(kind), Span::new(offset + at, len))
    };

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices();

    while let Some((at, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some((_, escape)) = chars.next() else {
            return Err(error(SyntaxErrorKind::UnexpectedEof("in escape"), at, 1));
        };
        let decoded = match escape {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{08}',
            'f' => '\u{0c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let unit = hex4(&mut chars)
                    .ok_or_else(|| error(SyntaxErrorKind::InvalidUnicodeEscape, at, 2))?;
                match unit {
                    0xD800..=0xDBFF => {
                        let low = match (chars.next(), chars.next()) {
                            (Some((_, '\\')), Some((_, 'u'))) => hex4(&mut chars),
                            _ => None,
                        };
                        match low {
                            Some(low @ 0xDC00..=0xDFFF) => {
                                let high = u32::from(unit - 0xD800);
                                let low = u32::from(low - 0xDC00);
                                char::from_u32(0x10000 + (high << 10) + low).ok_or_else(|| {
                                    error(SyntaxErrorKind::LoneSurrogate(unit), at, 6)
                                })?
                            }
                            _ => return Err(error(SyntaxErrorKind::LoneSurrogate(unit), at, 6)),
                        }
                    }
                    0xDC00..=0xDFFF => {
                        return Err(error(SyntaxErrorKind::LoneSurrogate(unit), at, 6));
                    }
                    _ => char::from_u32(u32::from(unit))
                        .ok_or_else(|| error(SyntaxErrorKind::InvalidUnicodeEscape, at, 6))?,
                }
            }
            other => {
                return Err(error(
                    SyntaxErrorKind::InvalidEscape(other),
                    at,
                    1 + other.len_utf8(),
                ));
            }
        };
        out.push(decoded);
    }

    Ok(out)
}

/// Reads four hex digits.
fn hex4(chars: &mut str::CharIndices<'_>) -> Option<u16> {
    let hex = chars.as_str().get(..4)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let unit = u16::from_str_radix(hex, 16).ok()?;
    chars.nth(3);
    Some(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        let mut tokenizer = JsonTokenizer::new(input.as_bytes());
        let mut out = Vec::new();
        while let Some(token) = tokenizer.next_token().unwrap() {
            out.push(token);
        }
        out
    }

    fn syntax_error(input: &str) -> (SyntaxErrorKind, Span) {
        let mut tokenizer = JsonTokenizer::new(input.as_bytes());
        loop {
            match tokenizer.next_token() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected a syntax error for {input:?}"),
                Err(DecodeError {
                    kind: DecodeErrorKind::Syntax(kind),
                    span,
                }) => return (kind, span.unwrap()),
                Err(other) => panic!("unexpected error {other}"),
            }
        }
    }

    #[test]
    fn whitespace_and_structure() {
        assert_eq!(
            tokens("  {\n\t\"key\"  :  [1, true ,null] }  "),
            vec![
                Token::ObjectStart,
                Token::Key(Cow::Borrowed("key")),
                Token::ArrayStart,
                Token::Number(Cow::Borrowed("1")),
                Token::Bool(true),
                Token::Null,
                Token::ArrayEnd,
                Token::ObjectEnd,
            ]
        );
    }

    #[test]
    fn strings_without_escapes_are_borrowed() {
        let toks = tokens(r#"["plain", "esc\taped"]"#);
        assert!(matches!(&toks[1], Token::String(Cow::Borrowed("plain"))));
        assert!(matches!(&toks[2], Token::String(Cow::Owned(s)) if s == "esc\taped"));
    }

    #[test]
    fn unicode_escapes() {
        let toks = tokens(r#""Hello \uD83D\uDE00 \u00e9""#);
        assert_eq!(toks, vec![Token::String(Cow::Owned("Hello 😀 é".into()))]);
    }

    #[test]
    fn lone_surrogates_are_rejected() {
        assert_eq!(
            syntax_error(r#""ab\uD83Dcd""#),
            (SyntaxErrorKind::LoneSurrogate(0xD83D), Span::new(3, 6))
        );
        assert_eq!(
            syntax_error(r#""\uDE00""#).0,
            SyntaxErrorKind::LoneSurrogate(0xDE00)
        );
    }

    #[test]
    fn number_text_is_preserved() {
        assert_eq!(
            tokens("[18446744073709551616, -0.5e+10, 1.000]"),
            vec![
                Token::ArrayStart,
                Token::Number(Cow::Borrowed("18446744073709551616")),
                Token::Number(Cow::Borrowed("-0.5e+10")),
                Token::Number(Cow::Borrowed("1.000")),
                Token::ArrayEnd,
            ]
        );
    }

    #[test]
    fn malformed_numbers() {
        assert_eq!(syntax_error("[1.]").0, SyntaxErrorKind::InvalidNumber);
        assert_eq!(syntax_error("[-x]").0, SyntaxErrorKind::InvalidNumber);
        assert_eq!(syntax_error("1e").0, SyntaxErrorKind::UnexpectedEof("in number"));
    }

    #[test]
    fn leading_zeros_are_rejected() {
        assert_eq!(
            syntax_error("01"),
            (SyntaxErrorKind::InvalidNumber, Span::new(0, 2))
        );
        assert_eq!(syntax_error("[-012]").0, SyntaxErrorKind::InvalidNumber);
    }

    #[test]
    fn structural_errors_point_at_the_offending_byte() {
        assert_eq!(
            syntax_error(r#"{"a" 1}"#),
            (
                SyntaxErrorKind::UnexpectedChar {
                    ch: '1',
                    expected: "`:`"
                },
                Span::new(5, 1)
            )
        );
        assert_eq!(
            syntax_error("[1 2]"),
            (
                SyntaxErrorKind::UnexpectedChar {
                    ch: '2',
                    expected: "`,` or `]`"
                },
                Span::new(3, 1)
            )
        );
        assert_eq!(
            syntax_error("{,}").0,
            SyntaxErrorKind::UnexpectedChar {
                ch: ',',
                expected: "an object key"
            }
        );
        assert_eq!(
            syntax_error("[nul]").0,
            SyntaxErrorKind::UnexpectedChar {
                ch: ']',
                expected: "a literal"
            }
        );
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(
            syntax_error(r#"{"abc"#),
            (SyntaxErrorKind::UnexpectedEof("in string"), Span::new(1, 4))
        );
    }

    #[test]
    fn control_characters_must_be_escaped() {
        assert_eq!(
            syntax_error("\"a\nb\""),
            (SyntaxErrorKind::ControlCharacter('\n'), Span::new(2, 1))
        );
    }

    #[test]
    fn values_after_the_first_are_tokenized() {
        assert_eq!(
            tokens("1 2"),
            vec![
                Token::Number(Cow::Borrowed("1")),
                Token::Number(Cow::Borrowed("2"))
            ]
        );
    }

    #[test]
    fn spans_cover_tokens() {
        let mut tokenizer = JsonTokenizer::new(br#"{"id": "x"}"#);
        let mut spans = Vec::new();
        while tokenizer.next_token().unwrap().is_some() {
            spans.push(tokenizer.span().unwrap());
        }
        assert_eq!(
            spans,
            vec![
                Span::new(0, 1),
                Span::new(1, 4),
                Span::new(7, 3),
                Span::new(10, 1)
            ]
        );
    }
}
