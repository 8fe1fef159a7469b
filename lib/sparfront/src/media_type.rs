//! [HTTP `Accept` header](https://httpwg.org/specs/rfc7231.html#header.accept) negotiation.
//!
//! ```
//! use sparfront::media_type::{MediaType, select_media_type};
//!
//! let json = MediaType::new("application", "json");
//! let png = MediaType::new("image", "png");
//! assert_eq!(
//!     select_media_type("image/*, application/json;q=0.3", &[json, png.clone()])?,
//!     Some(png)
//! );
//! # Result::<_, sparfront::media_type::MediaTypeError>::Ok(())
//! ```

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

/// Types and subtypes with their usual file extensions.
static WELL_KNOWN: &[(&str, &str, &[&str])] = &[
    ("text", "html", &["htm", "html", "php"]),
    ("text", "css", &["css"]),
    ("text", "plain", &["txt"]),
    ("application", "javascript", &["js"]),
    ("application", "json", &["json"]),
    ("application", "xml", &["xml"]),
    ("image", "png", &["png"]),
    ("image", "jpeg", &["jpe", "jpg", "jpeg"]),
    ("image", "gif", &["gif"]),
    ("image", "bmp", &["bmp"]),
    ("image", "tiff", &["tiff", "tif"]),
    ("image", "svg+xml", &["svg", "svgz"]),
    ("text", "tab-separated-values", &["tsv"]),
    ("text", "csv", &["csv"]),
    ("application", "sparql-results+json", &["srj"]),
    ("application", "sparql-results+xml", &["srx"]),
    ("text", "turtle", &["ttl"]),
    ("application", "n-triples", &["nt"]),
    ("application", "octet-stream", &[]),
];

/// A media type without parameters, like `application/json`.
///
/// Both parts are stored in lowercase, so comparisons are case-insensitive.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct MediaType {
    type_: String,
    subtype: String,
}

impl MediaType {
    pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
        let mut type_ = type_.into();
        type_.make_ascii_lowercase();
        let mut subtype = subtype.into();
        subtype.make_ascii_lowercase();
        Self { type_, subtype }
    }

    /// Parses a `type/subtype` string.
    ///
    /// ```
    /// use sparfront::media_type::MediaType;
    ///
    /// assert_eq!(MediaType::parse("Text/Turtle")?, MediaType::new("text", "turtle"));
    /// assert!(MediaType::parse("text/turtle; charset=utf-8").is_err());
    /// # Result::<_, sparfront::media_type::MediaTypeError>::Ok(())
    /// ```
    pub fn parse(media_type: &str) -> Result<Self, MediaTypeError> {
        let (type_, subtype) =
            accept_header::media_type(media_type.trim()).map_err(MediaTypeError::from)?;
        Ok(Self::new(type_, subtype))
    }

    #[inline]
    pub fn type_(&self) -> &str {
        &self.type_
    }

    #[inline]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// The file extensions of the type, without the leading dot. Empty for unknown types.
    pub fn file_extensions(&self) -> &'static [&'static str] {
        WELL_KNOWN
            .iter()
            .find(|(t, s, _)| *t == self.type_ && *s == self.subtype)
            .map_or(&[], |(_, _, extensions)| extensions)
    }

    /// The type usually associated with a file extension, given without the leading dot.
    ///
    /// ```
    /// use sparfront::media_type::MediaType;
    ///
    /// assert_eq!(MediaType::from_extension("JPG"), Some(MediaType::new("image", "jpeg")));
    /// ```
    pub fn from_extension(extension: &str) -> Option<Self> {
        WELL_KNOWN
            .iter()
            .find(|(_, _, extensions)| {
                extensions.iter().any(|e| e.eq_ignore_ascii_case(extension))
            })
            .map(|(t, s, _)| Self::new(*t, *s))
    }

    /// All the types this module knows about.
    pub fn well_known() -> impl Iterator<Item = Self> {
        WELL_KNOWN.iter().map(|(t, s, _)| Self::new(*t, *s))
    }
}

impl fmt::Display for MediaType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    #[inline]
    fn from_str(media_type: &str) -> Result<Self, Self::Err> {
        Self::parse(media_type)
    }
}

/// The media types an `Accept` header entry matches.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum MediaRange {
    /// `*/*`
    Any,
    /// `type/*`, the type being in lowercase.
    Type(String),
    Exact(MediaType),
}

impl MediaRange {
    /// Exact types first, then `type/*` and finally `*/*`.
    fn specificity(&self) -> u8 {
        match self {
            Self::Any => 0,
            Self::Type(_) => 1,
            Self::Exact(_) => 2,
        }
    }

    /// The first of `candidates` in the range.
    pub fn select<'a>(&self, candidates: &'a [MediaType]) -> Option<&'a MediaType> {
        match self {
            Self::Any => candidates.first(),
            Self::Type(type_) => candidates.iter().find(|c| c.type_ == *type_),
            Self::Exact(media_type) => candidates.iter().find(|c| *c == media_type),
        }
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*/*"),
            Self::Type(type_) => write!(f, "{type_}/*"),
            Self::Exact(media_type) => media_type.fmt(f),
        }
    }
}

/// An entry of an `Accept` header.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct AcceptEntry {
    pub range: MediaRange,
    /// The `q` weight in thousandths, 1000 if absent.
    pub quality: u16,
}

/// Parses an `Accept` header, keeping the header order.
///
/// ```
/// use sparfront::media_type::{AcceptEntry, MediaRange, parse_accept_header};
///
/// assert_eq!(
///     parse_accept_header("text/*;q=0.5")?,
///     [AcceptEntry { range: MediaRange::Type("text".into()), quality: 500 }]
/// );
/// # Result::<_, sparfront::media_type::MediaTypeError>::Ok(())
/// ```
pub fn parse_accept_header(header: &str) -> Result<Vec<AcceptEntry>, MediaTypeError> {
    accept_header::accept(header)?
        .into_iter()
        .map(|(range, parameters)| {
            let mut quality = 1000;
            for (name, value) in parameters {
                if name.eq_ignore_ascii_case("q") {
                    quality = accept_header::qvalue(value)
                        .map_err(|_| MediaTypeError::InvalidQuality(value.into()))?;
                    // The parameters after q are accept extensions: they are ignored
                    break;
                }
                return Err(MediaTypeError::NotSupported(format!(
                    "The media type parameter {name}={value} of {range} is not supported, only q is"
                )));
            }
            Ok(AcceptEntry { range, quality })
        })
        .collect()
}

/// Returns the candidate with the best quality in `header`, exact matches winning over wildcards on ties.
///
/// An empty header accepts anything: the first candidate is returned.
/// `None` is returned when the header accepts none of the candidates.
pub fn select_media_type(
    header: &str,
    candidates: &[MediaType],
) -> Result<Option<MediaType>, MediaTypeError> {
    if header.trim().is_empty() {
        return Ok(candidates.first().cloned());
    }
    let mut entries = parse_accept_header(header)?;
    entries.sort_by_key(|e| (Reverse(e.quality), Reverse(e.range.specificity())));
    Ok(entries
        .iter()
        .filter(|e| e.quality > 0)
        .find_map(|e| e.range.select(candidates))
        .cloned())
}

/// A message listing the candidates, suitable for a "406 Not Acceptable" response.
///
/// ```
/// use sparfront::media_type::{MediaType, supported_media_types_message};
///
/// assert_eq!(
///     supported_media_types_message(&[
///         MediaType::new("application", "json"),
///         MediaType::new("text", "csv"),
///         MediaType::new("text", "tab-separated-values"),
///     ]),
///     "Currently supported media types are application/json, text/csv and text/tab-separated-values."
/// );
/// ```
pub fn supported_media_types_message(candidates: &[MediaType]) -> String {
    let mut message = String::from("Currently supported media types are ");
    for (i, candidate) in candidates.iter().enumerate() {
        if i > 0 {
            message.push_str(if i + 1 == candidates.len() {
                " and "
            } else {
                ", "
            });
        }
        message.push_str(&candidate.to_string());
    }
    message.push('.');
    message
}

/// An error raised while reading an `Accept` header or a media type.
#[derive(Debug, thiserror::Error)]
pub enum MediaTypeError {
    /// The header does not follow the RFC 7231 grammar.
    #[error("Invalid media type syntax at position {position}: {message}")]
    Syntax { position: usize, message: String },
    /// A `q` value with more than 3 decimals or greater than 1.
    #[error("Invalid quality value '{0}', it must be a number between 0 and 1 with at most 3 decimals")]
    InvalidQuality(String),
    #[error("{0}")]
    NotSupported(String),
}

impl From<peg::error::ParseError<peg::str::LineCol>> for MediaTypeError {
    fn from(error: peg::error::ParseError<peg::str::LineCol>) -> Self {
        Self::Syntax {
            position: error.location.offset,
            message: format!("expected {}", error.expected),
        }
    }
}

peg::parser! {
    // RFC 7231 section 5.3.2
    grammar accept_header() for str {
        pub rule accept() -> Vec<(MediaRange, Vec<(&'input str, &'input str)>)>
            = _ entries:(entry() ++ (_ "," _)) _ { entries }

        rule entry() -> (MediaRange, Vec<(&'input str, &'input str)>)
            = range:media_range() parameters:(_ ";" _ p:parameter() { p })* { (range, parameters) }

        rule media_range() -> MediaRange
            = "*/*" { MediaRange::Any }
            / t:token() "/*" { MediaRange::Type(t.to_ascii_lowercase()) }
            / t:token() "/" s:token() { MediaRange::Exact(MediaType::new(t, s)) }

        pub rule media_type() -> (&'input str, &'input str)
            = t:token() "/" s:token() { (t, s) }

        rule parameter() -> (&'input str, &'input str)
            = name:token() _ "=" _ value:(token() / quoted_string()) { (name, value) }

        rule token() -> &'input str
            = $(['!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~' | '0'..='9' | 'a'..='z' | 'A'..='Z']+)

        rule quoted_string() -> &'input str
            = "\"" s:$((!['"' | '\\'] [_] / "\\" [_])*) "\"" { s }

        // In thousandths
        pub rule qvalue() -> u16
            = "0" decimals:("." d:$(['0'..='9']*<0,3>) { d })? {
                format!("{:0<3}", decimals.unwrap_or_default()).parse().unwrap_or_default()
            }
            / "1" ("." "0"*<0,3>)? { 1000 }

        rule _ = [' ' | '\t']*
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json() -> MediaType {
        MediaType::new("application", "json")
    }

    fn png() -> MediaType {
        MediaType::new("image", "png")
    }

    #[test]
    fn test_wildcard_beats_lower_quality() -> Result<(), MediaTypeError> {
        assert_eq!(
            select_media_type("image/*, application/json;q=0.3", &[json(), png()])?,
            Some(png())
        );
        Ok(())
    }

    #[test]
    fn test_specificity_breaks_ties() -> Result<(), MediaTypeError> {
        assert_eq!(
            select_media_type("*/*, image/*, application/json", &[png(), json()])?,
            Some(json())
        );
        assert_eq!(
            select_media_type("*/*;q=0.8, image/*;q=0.8", &[json(), png()])?,
            Some(png())
        );
        Ok(())
    }

    #[test]
    fn test_any() -> Result<(), MediaTypeError> {
        assert_eq!(select_media_type("*/*", &[json(), png()])?, Some(json()));
        assert_eq!(select_media_type("", &[png(), json()])?, Some(png()));
        assert_eq!(select_media_type("  ", &[])?, None);
        Ok(())
    }

    #[test]
    fn test_no_match() -> Result<(), MediaTypeError> {
        assert_eq!(select_media_type("text/html, text/*", &[json(), png()])?, None);
        assert_eq!(select_media_type("application/json;q=0", &[json()])?, None);
        Ok(())
    }

    #[test]
    fn test_case_insensitive() -> Result<(), MediaTypeError> {
        assert_eq!(select_media_type("Application/JSON", &[json()])?, Some(json()));
        Ok(())
    }

    #[test]
    fn test_quality_values() -> Result<(), MediaTypeError> {
        let header = "text/csv;q=0.5, text/html;q=1.000, text/plain;q=0, text/turtle;q=0.05";
        let qualities = parse_accept_header(header)?
            .into_iter()
            .map(|e| e.quality)
            .collect::<Vec<_>>();
        assert_eq!(qualities, [500, 1000, 0, 50]);
        Ok(())
    }

    #[test]
    fn test_invalid_quality() {
        for header in [
            "application/json;q=1.3",
            "application/json;q=0.1234",
            "application/json;q=2",
            "application/json;q=-1",
        ] {
            assert!(
                matches!(
                    select_media_type(header, &[json()]),
                    Err(MediaTypeError::InvalidQuality(_))
                ),
                "{header} should have an invalid quality"
            );
        }
    }

    #[test]
    fn test_unsupported_parameter() {
        assert!(matches!(
            select_media_type("text/html;charset=utf-8", &[json()]),
            Err(MediaTypeError::NotSupported(_))
        ));
    }

    #[test]
    fn test_accept_extensions_are_ignored() -> Result<(), MediaTypeError> {
        assert_eq!(
            select_media_type("application/json;q=0.5;foo=\"bar\"", &[json()])?,
            Some(json())
        );
        Ok(())
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            select_media_type("json", &[json()]),
            Err(MediaTypeError::Syntax { position: 4, .. })
        ));
    }

    #[test]
    fn test_file_extensions() {
        assert_eq!(MediaType::new("text", "turtle").file_extensions(), ["ttl"]);
        assert!(MediaType::new("foo", "bar").file_extensions().is_empty());
        assert_eq!(
            MediaType::from_extension("tsv").map(|t| t.to_string()),
            Some("text/tab-separated-values".into())
        );
    }
}
