//! [Property paths](https://www.w3.org/TR/sparql11-query/#propertypaths).

use crate::term::Iri;
use std::fmt;

/// A [property path expression](https://www.w3.org/TR/sparql11-query/#defn_PropertyPathExpr).
///
/// Paths are built in token order: in `^ex:p*` the inversion is applied first and the `*` modifier wraps it.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyPath {
    Iri(Iri),
    /// A [negated property set](https://www.w3.org/TR/sparql11-query/#pp-language) `!(...)`.
    Negated(Vec<NegatedPathElement>),
    /// `^path`
    Inverse(Box<Self>),
    /// `left / right`
    Sequence(Box<Self>, Box<Self>),
    /// `left | right`
    Alternative(Box<Self>, Box<Self>),
    /// `path*`, `path+` or `path?`
    Modified(Box<Self>, PathModifier),
}

impl PropertyPath {
    /// Formats using the [SPARQL S-Expression syntax](https://jena.apache.org/documentation/notes/sse.html).
    pub(crate) fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Self::Iri(p) => write!(f, "{p}"),
            Self::Inverse(p) => {
                write!(f, "(reverse ")?;
                p.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::Alternative(a, b) => {
                write!(f, "(alt ")?;
                a.fmt_sse(f)?;
                write!(f, " ")?;
                b.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::Sequence(a, b) => {
                write!(f, "(seq ")?;
                a.fmt_sse(f)?;
                write!(f, " ")?;
                b.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::Modified(p, modifier) => {
                write!(f, "(path{modifier} ")?;
                p.fmt_sse(f)?;
                write!(f, ")")
            }
            Self::Negated(elements) => {
                write!(f, "(notoneof")?;
                for element in elements {
                    match element {
                        NegatedPathElement::Iri(p) => write!(f, " {p}")?,
                        NegatedPathElement::Inverse(p) => write!(f, " (reverse {p})")?,
                    }
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(p) => p.fmt(f),
            Self::Inverse(p) => match p.as_ref() {
                Self::Inverse(_) | Self::Modified(..) => write!(f, "^({p})"),
                p => write!(f, "^{p}"),
            },
            Self::Sequence(a, b) => write!(f, "({a} / {b})"),
            Self::Alternative(a, b) => write!(f, "({a} | {b})"),
            Self::Modified(p, modifier) => match p.as_ref() {
                Self::Modified(..) => write!(f, "({p}){modifier}"),
                p => write!(f, "{p}{modifier}"),
            },
            Self::Negated(elements) => {
                write!(f, "!(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<Iri> for PropertyPath {
    #[inline]
    fn from(p: Iri) -> Self {
        Self::Iri(p)
    }
}

/// An element of a negated property set: only IRIs and inverted IRIs are allowed.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NegatedPathElement {
    Iri(Iri),
    Inverse(Iri),
}

impl fmt::Display for NegatedPathElement {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(p) => p.fmt(f),
            Self::Inverse(p) => write!(f, "^{p}"),
        }
    }
}

/// A [path cardinality modifier](https://www.w3.org/TR/sparql11-query/#rPathMod).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathModifier {
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
    /// `?`
    ZeroOrOne,
}

impl fmt::Display for PathModifier {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
            Self::ZeroOrOne => "?",
        })
    }
}
