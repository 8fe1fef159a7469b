use super::{ParseResult, Parser};
use crate::error::TextPosition;
use crate::lexer::{Token, TokenKind};
use crate::term::*;
use oxilangtag::LanguageTag;
use std::ops::Range;

impl Parser<'_> {
    /// [136] iri ::= IRIREF | PrefixedName
    ///
    /// Returns `None` without consuming anything if the current token is not an IRI.
    pub(super) fn try_iri(&mut self) -> ParseResult<Option<Iri>> {
        match self.cursor.peek()? {
            Token::IriRef(_) | Token::PrefixedName { .. } => {
                let token = self.cursor.next()?;
                match token.token {
                    Token::IriRef(iri) => self.resolve_iri_ref(iri, token.location).map(Some),
                    Token::PrefixedName { prefix, local } => self
                        .resolve_prefixed_name(prefix, local, token.location)
                        .map(Some),
                    _ => Ok(None),
                }
            }
            _ => {
                self.cursor.expect_kind(TokenKind::IriRef);
                self.cursor.expect_kind(TokenKind::PrefixedName);
                Ok(None)
            }
        }
    }

    pub(super) fn iri(&mut self) -> ParseResult<Iri> {
        self.try_iri()?.ok_or_else(|| self.cursor.unexpected())
    }

    /// Resolves an `<...>` reference against the current base IRI.
    pub(super) fn resolve_iri_ref(
        &self,
        iri: &str,
        location: Range<TextPosition>,
    ) -> ParseResult<Iri> {
        let iri = unescape_iriref(iri).map_err(|e| Self::semantic_error(location.clone(), e))?;
        let resolved = if let Some(base_iri) = &self.base_iri {
            base_iri.resolve(&iri)
        } else {
            oxiri::Iri::parse(iri.clone())
        };
        match resolved {
            Ok(iri) => Ok(Iri::new_unchecked(iri.into_inner())),
            Err(e) => Err(Self::semantic_error(
                location,
                format!("Invalid IRI <{iri}>: {e}"),
            )),
        }
    }

    fn resolve_prefixed_name(
        &self,
        prefix: &str,
        local: &str,
        location: Range<TextPosition>,
    ) -> ParseResult<Iri> {
        let Some(namespace) = self.prefixes.get(prefix) else {
            return Err(Self::semantic_error(
                location,
                format!("The prefix {prefix}: has not been declared"),
            ));
        };
        let iri = format!("{namespace}{}", unescape_pn_local(local));
        match oxiri::Iri::parse(iri) {
            Ok(iri) => Ok(Iri::new_unchecked(iri.into_inner())),
            Err(e) => Err(Self::semantic_error(
                location,
                format!("The prefixed name {prefix}:{local} is not a valid IRI: {e}"),
            )),
        }
    }

    /// [108] Var ::= VAR1 | VAR2
    pub(super) fn try_var(&mut self) -> ParseResult<Option<Variable>> {
        if let Token::Variable(name) = self.cursor.peek()? {
            self.cursor.next()?;
            Ok(Some(Variable::new_unchecked(name)))
        } else {
            self.cursor.expect_kind(TokenKind::Variable);
            Ok(None)
        }
    }

    pub(super) fn var(&mut self) -> ParseResult<Variable> {
        self.try_var()?.ok_or_else(|| self.cursor.unexpected())
    }

    /// [107] VarOrIri ::= Var | iri
    pub(super) fn try_var_or_iri(&mut self) -> ParseResult<Option<VarOrIri>> {
        if let Some(var) = self.try_var()? {
            return Ok(Some(var.into()));
        }
        Ok(self.try_iri()?.map(VarOrIri::from))
    }

    pub(super) fn var_or_iri(&mut self) -> ParseResult<VarOrIri> {
        self.try_var_or_iri()?
            .ok_or_else(|| self.cursor.unexpected())
    }

    /// [129] RDFLiteral ::= String ( LANGTAG | ( '^^' iri ) )?
    ///
    /// The language tag and the datatype are exclusive alternatives: once one is read the rule ends.
    pub(super) fn try_rdf_literal(&mut self) -> ParseResult<Option<Literal>> {
        let Some(value) = self.try_string()? else {
            return Ok(None);
        };
        if let Token::LangTag(tag) = self.cursor.peek()? {
            let location = self.cursor.next()?.location;
            let tag = LanguageTag::parse(tag.to_ascii_lowercase()).map_err(|e| {
                Self::semantic_error(location, format!("Invalid language tag @{tag}: {e}"))
            })?;
            return Ok(Some(Literal::new_language_tagged_literal_unchecked(
                value,
                tag.into_inner(),
            )));
        }
        self.cursor.expect_kind(TokenKind::LangTag);
        if self.cursor.eat_punctuation("^^")? {
            let datatype = self.iri()?;
            return Ok(Some(Literal::new_typed_literal(value, datatype)));
        }
        Ok(Some(Literal::new_simple_literal(value)))
    }

    /// [135] String ::= STRING_LITERAL1 | STRING_LITERAL2 | STRING_LITERAL_LONG1 | STRING_LITERAL_LONG2
    pub(super) fn try_string(&mut self) -> ParseResult<Option<String>> {
        let Token::String { value, .. } = self.cursor.peek()? else {
            self.cursor.expect_kind(TokenKind::String);
            return Ok(None);
        };
        let location = self.cursor.next()?.location;
        unescape_string(value)
            .map(Some)
            .map_err(|e| Self::semantic_error(location, e))
    }

    /// [130] NumericLiteral ::= NumericLiteralUnsigned | NumericLiteralPositive | NumericLiteralNegative
    pub(super) fn try_numeric_literal(&mut self) -> ParseResult<Option<NumericLiteral>> {
        let literal = numeric_literal(self.cursor.peek()?);
        if literal.is_some() {
            self.cursor.next()?;
        } else {
            self.cursor.expect_kind(TokenKind::Integer);
            self.cursor.expect_kind(TokenKind::Decimal);
            self.cursor.expect_kind(TokenKind::Double);
        }
        Ok(literal)
    }

    /// [134] BooleanLiteral ::= 'true' | 'false'
    pub(super) fn try_boolean_literal(&mut self) -> ParseResult<Option<bool>> {
        if self.cursor.eat_keyword("true")? {
            Ok(Some(true))
        } else if self.cursor.eat_keyword("false")? {
            Ok(Some(false))
        } else {
            Ok(None)
        }
    }

    /// [138] BlankNode ::= BLANK_NODE_LABEL | ANON
    pub(super) fn try_blank_node(&mut self) -> ParseResult<Option<BlankNode>> {
        match self.cursor.peek()? {
            Token::BlankNodeLabel(label) => {
                let location = self.cursor.next()?.location;
                if self.used_bnodes.contains(label) {
                    return Err(Self::semantic_error(
                        location,
                        format!("The blank node _:{label} is already used in another basic graph pattern"),
                    ));
                }
                self.currently_used_bnodes.insert(label.into());
                Ok(Some(BlankNode::Labeled(label.into())))
            }
            Token::Punctuation("[") if self.cursor.peek_nth(1)?.is_punctuation("]") => {
                self.cursor.next()?;
                self.cursor.next()?;
                Ok(Some(self.fresh_blank_node()))
            }
            _ => {
                self.cursor.expect_kind(TokenKind::BlankNodeLabel);
                Ok(None)
            }
        }
    }

    /// A new blank node, distinct from all the ones minted before in the same query.
    pub(super) fn fresh_blank_node(&mut self) -> BlankNode {
        let id = self.blank_node_counter;
        self.blank_node_counter += 1;
        BlankNode::Anonymous(id)
    }

    /// [109] GraphTerm ::= iri | RDFLiteral | NumericLiteral | BooleanLiteral | BlankNode | NIL
    pub(super) fn try_graph_term(&mut self) -> ParseResult<Option<Term>> {
        if let Some(iri) = self.try_iri()? {
            return Ok(Some(iri.into()));
        }
        if let Some(literal) = self.try_rdf_literal()? {
            return Ok(Some(literal.into()));
        }
        if let Some(literal) = self.try_numeric_literal()? {
            return Ok(Some(literal.into()));
        }
        if let Some(value) = self.try_boolean_literal()? {
            return Ok(Some(Term::Boolean(value)));
        }
        if let Some(node) = self.try_blank_node()? {
            return Ok(Some(node.into()));
        }
        if self.cursor.check_punctuation("(")? && self.cursor.peek_nth(1)?.is_punctuation(")") {
            self.cursor.next()?;
            self.cursor.next()?;
            return Ok(Some(Iri::new_unchecked(RDF_NIL).into()));
        }
        Ok(None)
    }

    /// [106] VarOrTerm ::= Var | GraphTerm
    pub(super) fn try_var_or_term(&mut self) -> ParseResult<Option<Term>> {
        if let Some(var) = self.try_var()? {
            return Ok(Some(var.into()));
        }
        self.try_graph_term()
    }

    /// [65] DataBlockValue ::= iri | RDFLiteral | NumericLiteral | BooleanLiteral | 'UNDEF'
    pub(super) fn data_block_value(&mut self) -> ParseResult<Option<Term>> {
        if self.cursor.eat_keyword("UNDEF")? {
            return Ok(None);
        }
        if let Some(iri) = self.try_iri()? {
            return Ok(Some(iri.into()));
        }
        if let Some(literal) = self.try_rdf_literal()? {
            return Ok(Some(literal.into()));
        }
        if let Some(literal) = self.try_numeric_literal()? {
            return Ok(Some(literal.into()));
        }
        if let Some(value) = self.try_boolean_literal()? {
            return Ok(Some(Term::Boolean(value)));
        }
        Err(self.cursor.unexpected())
    }
}

/// Builds a numeric literal from its token, the sign being part of the lexical form.
pub(super) fn numeric_literal(token: Token<'_>) -> Option<NumericLiteral> {
    match token {
        Token::Integer(v) => Some(NumericLiteral::new(v, NumericKind::Integer)),
        Token::Decimal(v) => Some(NumericLiteral::new(v, NumericKind::Decimal)),
        Token::Double(v) => Some(NumericLiteral::new(v, NumericKind::Double)),
        _ => None,
    }
}

fn unescape_iriref(mut input: &str) -> Result<String, &'static str> {
    let mut output = String::with_capacity(input.len());
    while let Some((before, after)) = input.split_once('\\') {
        output.push_str(before);
        let mut after = after.chars();
        let (escape, after) = match after.next() {
            Some('u') => read_hex_char::<4>(after.as_str())?,
            Some('U') => read_hex_char::<8>(after.as_str())?,
            Some(_) => {
                return Err(
                    "IRIs are only allowed to contain escape sequences \\uXXXX and \\UXXXXXXXX",
                );
            }
            None => return Err("IRIs are not allowed to end with a '\\'"),
        };
        output.push(escape);
        input = after;
    }
    output.push_str(input);
    Ok(output)
}

fn unescape_string(mut input: &str) -> Result<String, &'static str> {
    let mut output = String::with_capacity(input.len());
    while let Some((before, after)) = input.split_once('\\') {
        output.push_str(before);
        let mut after = after.chars();
        let (escape, after) = match after.next() {
            Some('t') => ('\u{0009}', after.as_str()),
            Some('b') => ('\u{0008}', after.as_str()),
            Some('n') => ('\u{000A}', after.as_str()),
            Some('r') => ('\u{000D}', after.as_str()),
            Some('f') => ('\u{000C}', after.as_str()),
            Some('"') => ('\u{0022}', after.as_str()),
            Some('\'') => ('\u{0027}', after.as_str()),
            Some('\\') => ('\u{005C}', after.as_str()),
            Some('u') => read_hex_char::<4>(after.as_str())?,
            Some('U') => read_hex_char::<8>(after.as_str())?,
            Some(_) => return Err("The characters that can be escaped in strings are tbnrf\"'\\"),
            None => return Err("Strings are not allowed to end with a '\\'"),
        };
        output.push(escape);
        input = after;
    }
    output.push_str(input);
    Ok(output)
}

/// Removes the `\` of [PN_LOCAL_ESC](https://www.w3.org/TR/sparql11-query/#rPN_LOCAL_ESC). Percent encodings are kept.
fn unescape_pn_local(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            output.extend(chars.next());
        } else {
            output.push(c);
        }
    }
    output
}

fn read_hex_char<const SIZE: usize>(input: &str) -> Result<(char, &str), &'static str> {
    if let Some(escape) = input.get(..SIZE) {
        if let Some(char) = u32::from_str_radix(escape, 16)
            .ok()
            .and_then(char::from_u32)
        {
            Ok((char, &input[SIZE..]))
        } else {
            Err("\\u escape sequence should be followed by hexadecimal digits")
        }
    } else {
        Err("\\u escape sequence should be followed by hexadecimal digits")
    }
}
