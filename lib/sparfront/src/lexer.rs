//! Tokenizer for the [SPARQL 1.1 grammar terminals](https://www.w3.org/TR/sparql11-query/#terminals).
//!
//! Tokens keep their exact lexical text: escape sequences are validated here but only resolved when terms are built.

use crate::error::{LexError, TextPosition};
use memchr::{memchr, memchr2};
use std::borrow::Cow;
use std::fmt;
use std::ops::{Range, RangeInclusive};

/// A SPARQL token.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Token<'a> {
    /// The content of an `<...>` IRI reference, without the angle brackets.
    IriRef(&'a str),
    /// A `prefix:local` name. The local part still contains its `\` and `%` escapes.
    PrefixedName { prefix: &'a str, local: &'a str },
    /// A variable name, without the leading `?` or `$`.
    Variable(&'a str),
    /// A blank node label, without the leading `_:`.
    BlankNodeLabel(&'a str),
    /// The body of a string literal, without its quotes.
    String { value: &'a str, long: bool },
    Integer(&'a str),
    Decimal(&'a str),
    Double(&'a str),
    /// A language tag, without the leading `@`.
    LangTag(&'a str),
    /// A bare word like `SELECT`, `a` or `true`.
    Keyword(&'a str),
    Punctuation(&'static str),
    End,
}

impl Token<'_> {
    /// Case-insensitive keyword match.
    #[inline]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Self::Keyword(k) if k.eq_ignore_ascii_case(keyword))
    }

    #[inline]
    pub fn is_punctuation(&self, punctuation: &str) -> bool {
        matches!(self, Self::Punctuation(p) if *p == punctuation)
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Self::IriRef(_) => TokenKind::IriRef,
            Self::PrefixedName { .. } => TokenKind::PrefixedName,
            Self::Variable(_) => TokenKind::Variable,
            Self::BlankNodeLabel(_) => TokenKind::BlankNodeLabel,
            Self::String { .. } => TokenKind::String,
            Self::Integer(_) => TokenKind::Integer,
            Self::Decimal(_) => TokenKind::Decimal,
            Self::Double(_) => TokenKind::Double,
            Self::LangTag(_) => TokenKind::LangTag,
            Self::Keyword(k) => TokenKind::Keyword(Cow::Owned((*k).to_owned())),
            Self::Punctuation(p) => TokenKind::Punctuation(p),
            Self::End => TokenKind::EndOfInput,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IriRef(iri) => write!(f, "<{iri}>"),
            Self::PrefixedName { prefix, local } => write!(f, "{prefix}:{local}"),
            Self::Variable(name) => write!(f, "?{name}"),
            Self::BlankNodeLabel(label) => write!(f, "_:{label}"),
            Self::String { value, long: false } => write!(f, "\"{value}\""),
            Self::String { value, long: true } => write!(f, "\"\"\"{value}\"\"\""),
            Self::Integer(v)
            | Self::Decimal(v)
            | Self::Double(v)
            | Self::Keyword(v)
            | Self::Punctuation(v) => f.write_str(v),
            Self::LangTag(tag) => write!(f, "@{tag}"),
            Self::End => Ok(()),
        }
    }
}

/// A class of tokens, used to report what the parser expected.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    IriRef,
    PrefixedName,
    Variable,
    BlankNodeLabel,
    String,
    Integer,
    Decimal,
    Double,
    LangTag,
    Keyword(Cow<'static, str>),
    Punctuation(&'static str),
    EndOfInput,
}

impl TokenKind {
    #[inline]
    pub(crate) const fn keyword(keyword: &'static str) -> Self {
        Self::Keyword(Cow::Borrowed(keyword))
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IriRef => f.write_str("an IRI"),
            Self::PrefixedName => f.write_str("a prefixed name"),
            Self::Variable => f.write_str("a variable"),
            Self::BlankNodeLabel => f.write_str("a blank node"),
            Self::String => f.write_str("a string"),
            Self::Integer => f.write_str("an integer"),
            Self::Decimal => f.write_str("a decimal"),
            Self::Double => f.write_str("a double"),
            Self::LangTag => f.write_str("a language tag"),
            Self::Keyword(k) => write!(f, "'{k}'"),
            Self::Punctuation(p) => write!(f, "'{p}'"),
            Self::EndOfInput => f.write_str("the end of the query"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenWithPosition<T> {
    pub token: T,
    pub location: Range<TextPosition>,
}

/// Error returned by the recognizers, with a byte range relative to the token start.
struct TokenRecognizerError {
    position: Range<usize>,
    message: String,
}

impl<S: Into<String>> From<(Range<usize>, S)> for TokenRecognizerError {
    fn from((position, message): (Range<usize>, S)) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

#[allow(clippy::range_plus_one)]
impl<S: Into<String>> From<(RangeInclusive<usize>, S)> for TokenRecognizerError {
    fn from((position, message): (RangeInclusive<usize>, S)) -> Self {
        (*position.start()..*position.end() + 1, message).into()
    }
}

impl<S: Into<String>> From<(usize, S)> for TokenRecognizerError {
    fn from((position, message): (usize, S)) -> Self {
        (position..=position, message).into()
    }
}

/// Splits a query into [`Token`]s, skipping whitespace and `#` comments.
///
/// ```
/// use sparfront::lexer::{Lexer, Token};
///
/// let mut lexer = Lexer::new("SELECT ?s # comment\n{}");
/// assert_eq!(lexer.next_token()?.token, Token::Keyword("SELECT"));
/// assert_eq!(lexer.next_token()?.token, Token::Variable("s"));
/// assert_eq!(lexer.next_token()?.token, Token::Punctuation("{"));
/// assert_eq!(lexer.next_token()?.token, Token::Punctuation("}"));
/// assert_eq!(lexer.next_token()?.token, Token::End);
/// # Ok::<_, sparfront::LexError>(())
/// ```
pub struct Lexer<'a> {
    data: &'a str,
    offset: usize,
    line: u64,
    column: u64,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a str) -> Self {
        Self {
            data,
            offset: 0,
            line: 0,
            column: 0,
        }
    }

    /// Returns the next token, or [`Token::End`] once the input is exhausted.
    pub fn next_token(&mut self) -> Result<TokenWithPosition<Token<'a>>, LexError> {
        self.skip_whitespace_and_comments();
        let start = self.position();
        let data = &self.data[self.offset..];
        if data.is_empty() {
            return Ok(TokenWithPosition {
                token: Token::End,
                location: start..start,
            });
        }
        match recognize_next_token(data) {
            Ok((consumed, token)) => {
                self.advance(consumed);
                Ok(TokenWithPosition {
                    token,
                    location: start..self.position(),
                })
            }
            Err(e) => {
                let location =
                    self.position_at(start, e.position.start)..self.position_at(start, e.position.end);
                // Lexing errors are fatal
                self.offset = self.data.len();
                Err(LexError::new(location, e.message))
            }
        }
    }

    /// The position right after the last returned token.
    pub fn position(&self) -> TextPosition {
        TextPosition {
            line: self.line,
            column: self.column,
            offset: self.offset as u64,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        let bytes = self.data.as_bytes();
        while let Some(c) = bytes.get(self.offset) {
            match c {
                b' ' | b'\t' | b'\r' => {
                    self.offset += 1;
                    self.column += 1;
                }
                b'\n' => {
                    self.offset += 1;
                    self.line += 1;
                    self.column = 0;
                }
                b'#' => {
                    let end = memchr(b'\n', &bytes[self.offset..])
                        .unwrap_or(bytes.len() - self.offset);
                    self.advance(end);
                }
                _ => return,
            }
        }
    }

    fn advance(&mut self, len: usize) {
        let end = self.offset + len;
        for c in self.data[self.offset..end].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.offset = end;
    }

    fn position_at(&self, start: TextPosition, relative: usize) -> TextPosition {
        let begin = start.offset as usize;
        let mut end = (begin + relative).min(self.data.len());
        while !self.data.is_char_boundary(end) {
            end -= 1;
        }
        let mut position = start;
        for c in self.data[begin..end].chars() {
            if c == '\n' {
                position.line += 1;
                position.column = 0;
            } else {
                position.column += 1;
            }
        }
        position.offset = end as u64;
        position
    }
}

fn recognize_next_token(data: &str) -> Result<(usize, Token<'_>), TokenRecognizerError> {
    let bytes = data.as_bytes();
    let next = bytes.get(1).copied();
    Ok(match bytes[0] {
        b'<' => {
            if let Some(iri) = recognize_iri(data)? {
                iri
            } else if next == Some(b'=') {
                (2, Token::Punctuation("<="))
            } else {
                (1, Token::Punctuation("<"))
            }
        }
        b'>' => {
            if next == Some(b'=') {
                (2, Token::Punctuation(">="))
            } else {
                (1, Token::Punctuation(">"))
            }
        }
        b'_' => {
            if next == Some(b':') {
                recognize_blank_node_label(data)?
            } else {
                return Err((0, "Unexpected character '_'").into());
            }
        }
        b'"' | b'\'' => {
            if next == Some(bytes[0]) && bytes.get(2) == Some(&bytes[0]) {
                recognize_long_string(data, bytes[0])?
            } else {
                recognize_string(data, bytes[0])?
            }
        }
        b'@' => recognize_lang_tag(data)?,
        b'.' => {
            if next.is_some_and(|c| c.is_ascii_digit()) {
                recognize_number(data)?
            } else {
                (1, Token::Punctuation("."))
            }
        }
        b'^' => {
            if next == Some(b'^') {
                (2, Token::Punctuation("^^"))
            } else {
                (1, Token::Punctuation("^"))
            }
        }
        b'|' => {
            if next == Some(b'|') {
                (2, Token::Punctuation("||"))
            } else {
                (1, Token::Punctuation("|"))
            }
        }
        b'&' => {
            if next == Some(b'&') {
                (2, Token::Punctuation("&&"))
            } else {
                return Err((0, "Unexpected character '&', did you mean '&&'?").into());
            }
        }
        b'!' => {
            if next == Some(b'=') {
                (2, Token::Punctuation("!="))
            } else {
                (1, Token::Punctuation("!"))
            }
        }
        b'(' => (1, Token::Punctuation("(")),
        b')' => (1, Token::Punctuation(")")),
        b'[' => (1, Token::Punctuation("[")),
        b']' => (1, Token::Punctuation("]")),
        b'{' => (1, Token::Punctuation("{")),
        b'}' => (1, Token::Punctuation("}")),
        b',' => (1, Token::Punctuation(",")),
        b';' => (1, Token::Punctuation(";")),
        b'*' => (1, Token::Punctuation("*")),
        b'/' => (1, Token::Punctuation("/")),
        b'=' => (1, Token::Punctuation("=")),
        b'+' | b'-' => {
            let is_number = match next {
                Some(b'0'..=b'9') => true,
                Some(b'.') => bytes.get(2).is_some_and(u8::is_ascii_digit),
                _ => false,
            };
            if is_number {
                recognize_number(data)?
            } else if bytes[0] == b'+' {
                (1, Token::Punctuation("+"))
            } else {
                (1, Token::Punctuation("-"))
            }
        }
        b'0'..=b'9' => recognize_number(data)?,
        b'?' => recognize_variable(data)?.unwrap_or((1, Token::Punctuation("?"))),
        b'$' => recognize_variable(data)?
            .ok_or_else(|| TokenRecognizerError::from((0, "A variable name cannot be empty")))?,
        _ => recognize_pname_or_keyword(data)?,
    })
}

/// Returns `None` if the input does not look like an IRI reference so that `<` is read as an operator.
///
/// This includes a `<` without any closing `>` before the end of the input.
fn recognize_iri(data: &str) -> Result<Option<(usize, Token<'_>)>, TokenRecognizerError> {
    // [139] IRIREF ::= '<' ([^<>"{}|^`\]-[#x00-#x20])* '>'
    let bytes = data.as_bytes();
    let mut i = 1;
    while let Some(c) = bytes.get(i) {
        match c {
            b'>' => return Ok(Some((i + 1, Token::IriRef(&data[1..i])))),
            b'\\' => i += recognize_escape(&data[i..], i, false)?,
            b'<' | b'"' | b'{' | b'}' | b'|' | b'^' | b'`' | 0x00..=0x20 => return Ok(None),
            _ => i += 1,
        }
    }
    Ok(None)
}

fn recognize_pname_or_keyword(data: &str) -> Result<(usize, Token<'_>), TokenRecognizerError> {
    // [140] PNAME_NS   ::= PN_PREFIX? ':'
    // [141] PNAME_LN   ::= PNAME_NS PN_LOCAL
    // [168] PN_PREFIX  ::= PN_CHARS_BASE ((PN_CHARS|'.')* PN_CHARS)?
    let mut end = 0;
    let mut colon = None;
    for (i, c) in data.char_indices() {
        if c == ':' {
            colon = Some(i);
            break;
        }
        let is_valid = if i == 0 {
            is_possible_pn_chars_base(c)
        } else {
            is_possible_pn_chars(c) || c == '.'
        };
        if !is_valid {
            break;
        }
        end = i + c.len_utf8();
    }
    let Some(colon) = colon else {
        while data[..end].ends_with('.') {
            end -= 1;
        }
        if end == 0 {
            let c = data.chars().next().unwrap_or_default();
            return Err((0..c.len_utf8(), format!("Unexpected character '{c}'")).into());
        }
        return Ok((end, Token::Keyword(&data[..end])));
    };
    let prefix = &data[..colon];
    if prefix.ends_with('.') {
        return Err((
            0..colon,
            format!("'{prefix}' is not a valid prefix: prefixes are not allowed to end with '.'"),
        )
            .into());
    }
    let local_start = colon + 1;
    let local_len = recognize_pn_local(&data[local_start..]).map_err(|e| TokenRecognizerError {
        position: e.position.start + local_start..e.position.end + local_start,
        message: e.message,
    })?;
    Ok((
        local_start + local_len,
        Token::PrefixedName {
            prefix,
            local: &data[local_start..local_start + local_len],
        },
    ))
}

fn recognize_pn_local(data: &str) -> Result<usize, TokenRecognizerError> {
    // [169] PN_LOCAL ::= (PN_CHARS_U | ':' | [0-9] | PLX ) ((PN_CHARS | '.' | ':' | PLX)* (PN_CHARS | ':' | PLX) )?
    // [170] PLX      ::= PERCENT | PN_LOCAL_ESC
    let bytes = data.as_bytes();
    let mut i = 0;
    let mut end_without_dots = 0;
    while let Some(c) = data[i..].chars().next() {
        if c == '%' {
            let is_hex = |j: usize| bytes.get(j).is_some_and(u8::is_ascii_hexdigit);
            if !is_hex(i + 1) || !is_hex(i + 2) {
                return Err((
                    i..(i + 3).min(data.len()),
                    "escapes in IRIs should be % followed by two hexadecimal characters",
                )
                    .into());
            }
            i += 3;
            end_without_dots = i;
        } else if c == '\\' {
            match bytes.get(i + 1) {
                Some(
                    b'_' | b'~' | b'.' | b'-' | b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*'
                    | b'+' | b',' | b';' | b'=' | b'/' | b'?' | b'#' | b'@' | b'%',
                ) => {
                    i += 2;
                    end_without_dots = i;
                }
                _ => {
                    return Err((
                        i..(i + 2).min(data.len()),
                        "The characters that are allowed to be escaped in local names are _~.-!$&'()*+,;=/?#@%",
                    )
                        .into());
                }
            }
        } else if i == 0 {
            if !(is_possible_pn_chars_u(c) || c == ':' || c.is_ascii_digit()) {
                break;
            }
            i += c.len_utf8();
            end_without_dots = i;
        } else if is_possible_pn_chars(c) || c == ':' {
            i += c.len_utf8();
            end_without_dots = i;
        } else if c == '.' {
            i += 1;
        } else {
            break;
        }
    }
    // The trailing dots are not part of the name
    Ok(end_without_dots)
}

/// Returns `None` if `?` is not followed by a variable name.
fn recognize_variable(data: &str) -> Result<Option<(usize, Token<'_>)>, TokenRecognizerError> {
    // [108] VAR1    ::= '?' VARNAME
    // [109] VAR2    ::= '$' VARNAME
    // [166] VARNAME ::= ( PN_CHARS_U | [0-9] ) ( PN_CHARS_U | [0-9] | #x00B7 | [#x0300-#x036F] | [#x203F-#x2040] )*
    let mut end = 1;
    for (i, c) in data[1..].char_indices() {
        let is_valid = if i == 0 {
            is_possible_pn_chars_u(c) || c.is_ascii_digit()
        } else {
            is_possible_pn_chars_u(c)
                || matches!(c, '0'..='9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
        };
        if !is_valid {
            break;
        }
        end = 1 + i + c.len_utf8();
    }
    Ok((end > 1).then(|| (end, Token::Variable(&data[1..end]))))
}

fn recognize_blank_node_label(data: &str) -> Result<(usize, Token<'_>), TokenRecognizerError> {
    // [142] BLANK_NODE_LABEL ::= '_:' ( PN_CHARS_U | [0-9] ) ((PN_CHARS|'.')* PN_CHARS)?
    let mut end = 2;
    for (i, c) in data[2..].char_indices() {
        let is_valid = if i == 0 {
            is_possible_pn_chars_u(c) || c.is_ascii_digit()
        } else {
            is_possible_pn_chars(c) || c == '.'
        };
        if !is_valid {
            break;
        }
        end = 2 + i + c.len_utf8();
    }
    while data[..end].ends_with('.') {
        end -= 1;
    }
    if end == 2 {
        return Err((0..2, "A blank node label cannot be empty").into());
    }
    Ok((end, Token::BlankNodeLabel(&data[2..end])))
}

fn recognize_lang_tag(data: &str) -> Result<(usize, Token<'_>), TokenRecognizerError> {
    // [145] LANGTAG ::= '@' [a-zA-Z]+ ('-' [a-zA-Z0-9]+)*
    let bytes = data.as_bytes();
    let mut i = 1;
    while bytes.get(i).is_some_and(u8::is_ascii_alphabetic) {
        i += 1;
    }
    if i == 1 {
        return Err((0..1, "A language tag should always start with a letter").into());
    }
    while bytes.get(i) == Some(&b'-') && bytes.get(i + 1).is_some_and(u8::is_ascii_alphanumeric) {
        i += 1;
        while bytes.get(i).is_some_and(u8::is_ascii_alphanumeric) {
            i += 1;
        }
    }
    Ok((i, Token::LangTag(&data[1..i])))
}

fn recognize_string(data: &str, delimiter: u8) -> Result<(usize, Token<'_>), TokenRecognizerError> {
    // [156] STRING_LITERAL1 ::= "'" ( ([^#x27#x5C#xA#xD]) | ECHAR )* "'"
    // [157] STRING_LITERAL2 ::= '"' ( ([^#x22#x5C#xA#xD]) | ECHAR )* '"'
    let bytes = data.as_bytes();
    let mut i = 1;
    loop {
        let Some(end) = memchr2(delimiter, b'\\', &bytes[i..]) else {
            if let Some(line_jump) = memchr2(b'\n', b'\r', &bytes[i..]) {
                return Err((
                    i + line_jump,
                    "Line jumps are not allowed in string literals, use \\n",
                )
                    .into());
            }
            return Err((0..bytes.len(), "The string literal is not terminated").into());
        };
        if let Some(line_jump) = memchr2(b'\n', b'\r', &bytes[i..i + end]) {
            return Err((
                i + line_jump,
                "Line jumps are not allowed in string literals, use \\n",
            )
                .into());
        }
        i += end;
        if bytes[i] == delimiter {
            return Ok((
                i + 1,
                Token::String {
                    value: &data[1..i],
                    long: false,
                },
            ));
        }
        i += recognize_escape(&data[i..], i, true)?;
    }
}

fn recognize_long_string(
    data: &str,
    delimiter: u8,
) -> Result<(usize, Token<'_>), TokenRecognizerError> {
    // [158] STRING_LITERAL_LONG1 ::= "'''" ( ( "'" | "''" )? ( [^'\] | ECHAR ) )* "'''"
    // [159] STRING_LITERAL_LONG2 ::= '"""' ( ( '"' | '""' )? ( [^"\] | ECHAR ) )* '"""'
    let bytes = data.as_bytes();
    let mut i = 3;
    loop {
        let Some(end) = memchr2(delimiter, b'\\', &bytes[i..]) else {
            return Err((0..bytes.len(), "The long string literal is not terminated").into());
        };
        i += end;
        if bytes[i] == delimiter {
            if bytes.get(i + 1) == Some(&delimiter) && bytes.get(i + 2) == Some(&delimiter) {
                return Ok((
                    i + 3,
                    Token::String {
                        value: &data[3..i],
                        long: true,
                    },
                ));
            }
            i += 1;
        } else {
            i += recognize_escape(&data[i..], i, true)?;
        }
    }
}

/// Validates the escape sequence starting at `data[0] == '\\'` and returns its length.
fn recognize_escape(
    data: &str,
    position: usize,
    with_echar: bool,
) -> Result<usize, TokenRecognizerError> {
    // [160] ECHAR ::= '\' [tbnrf\"']
    // and the \u and \U code point escapes
    let bytes = data.as_bytes();
    match bytes.get(1) {
        Some(b'u') => recognize_hex_char(data, 4, position).map(|()| 6),
        Some(b'U') => recognize_hex_char(data, 8, position).map(|()| 10),
        Some(b't' | b'b' | b'n' | b'r' | b'f' | b'"' | b'\'' | b'\\') if with_echar => Ok(2),
        Some(_) => {
            let c = data[1..].chars().next().unwrap_or_default();
            Err((
                position..position + 1 + c.len_utf8(),
                format!("Unexpected escape character '\\{c}'"),
            )
                .into())
        }
        None => Err((position, "Unterminated escape sequence").into()),
    }
}

fn recognize_hex_char(data: &str, len: usize, position: usize) -> Result<(), TokenRecognizerError> {
    let Some(hex) = data.get(2..2 + len) else {
        return Err((
            position..data.len() + position,
            "Unterminated escape sequence",
        )
            .into());
    };
    let codepoint = u32::from_str_radix(hex, 16).map_err(|_| {
        (
            position..position + 2 + len,
            format!("The escape sequence '{}' is not a valid hexadecimal string", &data[..2 + len]),
        )
    })?;
    if char::from_u32(codepoint).is_none() {
        return Err((
            position..position + 2 + len,
            format!("The escape sequence '{}' is encoding {codepoint:X} that is not a valid unicode character", &data[..2 + len]),
        )
            .into());
    }
    Ok(())
}

fn recognize_number(data: &str) -> Result<(usize, Token<'_>), TokenRecognizerError> {
    // [146] INTEGER  ::= [0-9]+
    // [147] DECIMAL  ::= [0-9]* '.' [0-9]+
    // [148] DOUBLE   ::= [0-9]+ '.' [0-9]* EXPONENT | '.' ([0-9])+ EXPONENT | ([0-9])+ EXPONENT
    // [155] EXPONENT ::= [eE] [+-]? [0-9]+
    // and their signed variants
    let bytes = data.as_bytes();
    let mut i = 0;
    if matches!(bytes[0], b'+' | b'-') {
        i += 1;
    }
    let count_before = recognize_digits(&bytes[i..]);
    i += count_before;

    let count_after = if bytes.get(i) == Some(&b'.') {
        let count_after = recognize_digits(&bytes[i + 1..]);
        i += 1 + count_after;
        Some(count_after)
    } else {
        None
    };

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let count_exp = recognize_digits(&bytes[j..]);
        if count_exp > 0 && (count_before > 0 || count_after.unwrap_or(0) > 0) {
            j += count_exp;
            return Ok((j, Token::Double(&data[..j])));
        }
        if count_exp == 0 {
            return Err((0..j, "A double exponent cannot be empty").into());
        }
    }
    match count_after {
        Some(0) => {
            // The '.' is not part of the number, it is a triple separator
            i -= 1;
            if count_before == 0 {
                return Err((0..i, "A number should not be empty").into());
            }
            Ok((i, Token::Integer(&data[..i])))
        }
        Some(_) => Ok((i, Token::Decimal(&data[..i]))),
        None => Ok((i, Token::Integer(&data[..i]))),
    }
}

fn recognize_digits(data: &[u8]) -> usize {
    data.iter().take_while(|c| c.is_ascii_digit()).count()
}

// [164] PN_CHARS_BASE ::= [A-Z] | [a-z] | [#x00C0-#x00D6] | [#x00D8-#x00F6] | [#x00F8-#x02FF] | [#x0370-#x037D] | [#x037F-#x1FFF] | [#x200C-#x200D] | [#x2070-#x218F] | [#x2C00-#x2FEF] | [#x3001-#xD7FF] | [#xF900-#xFDCF] | [#xFDF0-#xFFFD] | [#x10000-#xEFFFF]
fn is_possible_pn_chars_base(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

// [165] PN_CHARS_U ::= PN_CHARS_BASE | '_'
fn is_possible_pn_chars_u(c: char) -> bool {
    is_possible_pn_chars_base(c) || c == '_'
}

// [167] PN_CHARS ::= PN_CHARS_U | '-' | [0-9] | #x00B7 | [#x0300-#x036F] | [#x203F-#x2040]
fn is_possible_pn_chars(c: char) -> bool {
    is_possible_pn_chars_u(c)
        || matches!(c,
        '-' | '0'..='9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}
