use crate::error::{ParseError, SparqlSyntaxError, TextPosition};
use crate::lexer::{Lexer, Token, TokenKind, TokenWithPosition};
use std::collections::VecDeque;
use std::ops::Range;

/// Token stream with bounded lookahead.
///
/// Every failed check records the kind it was looking for, so that an error raised at the current token
/// lists all the alternatives the grammar would have accepted there.
pub struct TokenCursor<'a> {
    lexer: Lexer<'a>,
    buffer: VecDeque<TokenWithPosition<Token<'a>>>,
    expected: Vec<TokenKind>,
    last_end: TextPosition,
}

impl<'a> TokenCursor<'a> {
    /// How far [`peek_nth`](Self::peek_nth) is allowed to look.
    pub const MAX_LOOKAHEAD: usize = 3;

    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
            buffer: VecDeque::with_capacity(Self::MAX_LOOKAHEAD + 1),
            expected: Vec::new(),
            last_end: TextPosition::default(),
        }
    }

    fn fill(&mut self, k: usize) -> Result<(), SparqlSyntaxError> {
        debug_assert!(k <= Self::MAX_LOOKAHEAD, "lookahead too far");
        while self.buffer.len() <= k {
            if self
                .buffer
                .back()
                .is_some_and(|t| matches!(t.token, Token::End))
            {
                // The end token repeats itself
                let end = self.buffer.back().cloned();
                self.buffer.extend(end);
            } else {
                let token = self.lexer.next_token()?;
                self.buffer.push_back(token);
            }
        }
        Ok(())
    }

    /// The current token.
    #[inline]
    pub fn peek(&mut self) -> Result<Token<'a>, SparqlSyntaxError> {
        self.peek_nth(0)
    }

    /// The `k`-th token after the current one, `peek_nth(0)` being the current one.
    pub fn peek_nth(&mut self, k: usize) -> Result<Token<'a>, SparqlSyntaxError> {
        self.fill(k)?;
        Ok(self.buffer.get(k).map_or(Token::End, |t| t.token))
    }

    /// The location of the current token.
    pub fn location(&mut self) -> Result<Range<TextPosition>, SparqlSyntaxError> {
        self.fill(0)?;
        Ok(self
            .buffer
            .front()
            .map_or(self.last_end..self.last_end, |t| t.location.clone()))
    }

    /// The end of the last consumed token.
    #[inline]
    pub fn last_end(&self) -> TextPosition {
        self.last_end
    }

    /// Consumes the current token.
    pub fn next(&mut self) -> Result<TokenWithPosition<Token<'a>>, SparqlSyntaxError> {
        self.fill(0)?;
        let token = self.buffer.pop_front().ok_or_else(|| {
            ParseError::new(
                self.last_end..self.last_end,
                Vec::new(),
                TokenKind::EndOfInput,
                "",
            )
        })?;
        self.last_end = token.location.end;
        self.expected.clear();
        Ok(token)
    }

    /// Records that `kind` would have been accepted at the current token.
    pub fn expect_kind(&mut self, kind: TokenKind) {
        if !self.expected.contains(&kind) {
            self.expected.push(kind);
        }
    }

    pub fn check_keyword(&mut self, keyword: &'static str) -> Result<bool, SparqlSyntaxError> {
        if self.peek()?.is_keyword(keyword) {
            Ok(true)
        } else {
            self.expect_kind(TokenKind::keyword(keyword));
            Ok(false)
        }
    }

    pub fn check_punctuation(&mut self, punctuation: &'static str) -> Result<bool, SparqlSyntaxError> {
        if self.peek()?.is_punctuation(punctuation) {
            Ok(true)
        } else {
            self.expect_kind(TokenKind::Punctuation(punctuation));
            Ok(false)
        }
    }

    /// Consumes the current token if it is the given keyword.
    pub fn eat_keyword(&mut self, keyword: &'static str) -> Result<bool, SparqlSyntaxError> {
        let found = self.check_keyword(keyword)?;
        if found {
            self.next()?;
        }
        Ok(found)
    }

    /// Consumes the current token if it is the given punctuation.
    pub fn eat_punctuation(&mut self, punctuation: &'static str) -> Result<bool, SparqlSyntaxError> {
        let found = self.check_punctuation(punctuation)?;
        if found {
            self.next()?;
        }
        Ok(found)
    }

    pub fn expect_keyword(
        &mut self,
        keyword: &'static str,
    ) -> Result<TokenWithPosition<Token<'a>>, SparqlSyntaxError> {
        if self.check_keyword(keyword)? {
            self.next()
        } else {
            Err(self.unexpected())
        }
    }

    pub fn expect_punctuation(
        &mut self,
        punctuation: &'static str,
    ) -> Result<TokenWithPosition<Token<'a>>, SparqlSyntaxError> {
        if self.check_punctuation(punctuation)? {
            self.next()
        } else {
            Err(self.unexpected())
        }
    }

    /// Builds the error for the current token with everything that was expected at its position.
    pub fn unexpected(&mut self) -> SparqlSyntaxError {
        let token = match self.peek() {
            Ok(token) => token,
            Err(e) => return e,
        };
        let location = match self.location() {
            Ok(location) => location,
            Err(e) => return e,
        };
        ParseError::new(
            location,
            self.expected.clone(),
            token.kind(),
            token.to_string(),
        )
        .into()
    }
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;

    #[test]
    fn test_lookahead() -> Result<(), SparqlSyntaxError> {
        let mut cursor = TokenCursor::new("SELECT * {");
        assert_eq!(cursor.peek_nth(2)?, Token::Punctuation("{"));
        assert_eq!(cursor.peek_nth(3)?, Token::End);
        assert_eq!(cursor.peek()?, Token::Keyword("SELECT"));
        cursor.next()?;
        cursor.next()?;
        cursor.next()?;
        assert_eq!(cursor.peek()?, Token::End);
        assert_eq!(cursor.peek_nth(3)?, Token::End);
        Ok(())
    }

    #[test]
    fn test_expected_set() -> Result<(), SparqlSyntaxError> {
        let mut cursor = TokenCursor::new("ASK ?x");
        assert!(!cursor.check_keyword("SELECT")?);
        assert!(!cursor.check_keyword("select")?);
        assert!(cursor.eat_keyword("ask")?);
        assert!(!cursor.check_punctuation("{")?);
        assert!(!cursor.check_keyword("WHERE")?);
        assert!(!cursor.check_punctuation("{")?);
        let SparqlSyntaxError::Parse(error) = cursor.unexpected() else {
            panic!("a parse error is expected")
        };
        assert_eq!(
            error.expected(),
            [TokenKind::Punctuation("{"), TokenKind::keyword("WHERE")]
        );
        assert_eq!(error.found(), &TokenKind::Variable);
        assert_eq!(error.location().start.offset, 4);
        assert_eq!(
            error.to_string(),
            "Parser error at line 1 between columns 5 and 7: expected one of '{', 'WHERE', found a variable '?x'"
        );
        Ok(())
    }

    #[test]
    fn test_lex_error_is_propagated() {
        let mut cursor = TokenCursor::new("ASK \"foo");
        assert!(cursor.eat_keyword("ASK").is_ok());
        assert!(matches!(cursor.peek(), Err(SparqlSyntaxError::Lex(_))));
    }
}
