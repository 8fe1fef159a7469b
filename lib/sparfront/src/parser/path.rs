use super::{ParseResult, Parser};
use crate::lexer::{Token, TokenKind};
use crate::path::{NegatedPathElement, PathModifier, PropertyPath};
use crate::term::{Iri, RDF_TYPE};

impl Parser<'_> {
    /// [88] Path ::= PathAlternative
    pub(super) fn path(&mut self) -> ParseResult<PropertyPath> {
        self.guarded(Self::path_alternative)
    }

    /// [89] PathAlternative ::= PathSequence ( '|' PathSequence )*
    fn path_alternative(&mut self) -> ParseResult<PropertyPath> {
        let mut path = self.path_sequence()?;
        while self.cursor.eat_punctuation("|")? {
            let right = self.path_sequence()?;
            path = PropertyPath::Alternative(Box::new(path), Box::new(right));
        }
        Ok(path)
    }

    /// [90] PathSequence ::= PathEltOrInverse ( '/' PathEltOrInverse )*
    fn path_sequence(&mut self) -> ParseResult<PropertyPath> {
        let mut path = self.path_elt_or_inverse()?;
        while self.cursor.eat_punctuation("/")? {
            let right = self.path_elt_or_inverse()?;
            path = PropertyPath::Sequence(Box::new(path), Box::new(right));
        }
        Ok(path)
    }

    /// [92] PathEltOrInverse ::= PathElt | '^' PathElt
    ///
    /// The inversion applies to the primary and the modifier wraps the result: `^p*` is `(^p)*`.
    fn path_elt_or_inverse(&mut self) -> ParseResult<PropertyPath> {
        let inverse = self.cursor.eat_punctuation("^")?;
        let mut path = self.path_primary()?;
        if inverse {
            path = PropertyPath::Inverse(Box::new(path));
        }
        self.path_mod(path)
    }

    /// [93] PathMod ::= '?' | '*' | '+'
    fn path_mod(&mut self, path: PropertyPath) -> ParseResult<PropertyPath> {
        let modifier = if self.cursor.eat_punctuation("*")? {
            PathModifier::ZeroOrMore
        } else if self.cursor.eat_punctuation("+")? {
            PathModifier::OneOrMore
        } else if self.cursor.eat_punctuation("?")? {
            PathModifier::ZeroOrOne
        } else {
            return Ok(path);
        };
        Ok(PropertyPath::Modified(Box::new(path), modifier))
    }

    /// [94] PathPrimary ::= iri | 'a' | '!' PathNegatedPropertySet | '(' Path ')'
    fn path_primary(&mut self) -> ParseResult<PropertyPath> {
        if let Some(iri) = self.try_iri_or_a()? {
            return Ok(PropertyPath::Iri(iri));
        }
        if self.cursor.eat_punctuation("!")? {
            return self.path_negated_property_set();
        }
        if self.cursor.eat_punctuation("(")? {
            let path = self.path()?;
            self.cursor.expect_punctuation(")")?;
            return Ok(path);
        }
        Err(self.cursor.unexpected())
    }

    /// [95] PathNegatedPropertySet ::= PathOneInPropertySet | '(' ( PathOneInPropertySet ( '|' PathOneInPropertySet )* )? ')'
    fn path_negated_property_set(&mut self) -> ParseResult<PropertyPath> {
        if !self.cursor.eat_punctuation("(")? {
            return Ok(PropertyPath::Negated(vec![
                self.path_one_in_property_set()?,
            ]));
        }
        let mut elements = Vec::new();
        if self.cursor.eat_punctuation(")")? {
            return Ok(PropertyPath::Negated(elements));
        }
        loop {
            elements.push(self.path_one_in_property_set()?);
            if self.cursor.eat_punctuation(")")? {
                return Ok(PropertyPath::Negated(elements));
            }
            // Only alternatives are allowed in a negated set, never sequences or modifiers
            self.cursor.expect_punctuation("|")?;
        }
    }

    /// [96] PathOneInPropertySet ::= iri | 'a' | '^' ( iri | 'a' )
    fn path_one_in_property_set(&mut self) -> ParseResult<NegatedPathElement> {
        if self.cursor.eat_punctuation("^")? {
            let iri = self
                .try_iri_or_a()?
                .ok_or_else(|| self.cursor.unexpected())?;
            return Ok(NegatedPathElement::Inverse(iri));
        }
        if let Some(iri) = self.try_iri_or_a()? {
            return Ok(NegatedPathElement::Iri(iri));
        }
        Err(self.cursor.unexpected())
    }

    /// An IRI or the `a` shortcut for `rdf:type`.
    pub(super) fn try_iri_or_a(&mut self) -> ParseResult<Option<Iri>> {
        if let Some(iri) = self.try_iri()? {
            return Ok(Some(iri));
        }
        // 'a' is the only case-sensitive keyword
        if matches!(self.cursor.peek()?, Token::Keyword("a")) {
            self.cursor.next()?;
            return Ok(Some(Iri::new_unchecked(RDF_TYPE)));
        }
        self.cursor.expect_kind(TokenKind::keyword("a"));
        Ok(None)
    }
}
