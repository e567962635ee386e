//! The crate's layered error hierarchy: one `Error` enum per component,
//! composed into a single top-level [`Error`] via `From` impls, matching
//! the style used throughout `bits`/`read` in the teacher this crate grew
//! from rather than a single opaque boxed error.

use std::fmt;
use std::io;

/// Failures from the Class Parser / Front End.
#[derive(Debug)]
pub enum ParseError {
    UnexpectedEof { context: &'static str },
    MalformedDeclaration { class_name: String, text: String },
    UnterminatedBlock { class_name: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEof { context } => {
                write!(f, "unexpected end of input while parsing {context}")
            }
            ParseError::MalformedDeclaration { class_name, text } => {
                write!(f, "malformed declaration in class {class_name}: {text:?}")
            }
            ParseError::UnterminatedBlock { class_name } => {
                write!(f, "unterminated block in class {class_name}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Failures from the Template Substitution Engine.
#[derive(Debug)]
pub enum TemplateError {
    TooManyActuals { class_name: String, expected: usize, got: usize },
    TooFewActuals { class_name: String, missing: String },
    NotTemplated { class_name: String },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::TooManyActuals { class_name, expected, got } => write!(
                f,
                "{class_name} takes {expected} template argument(s), got {got}"
            ),
            TemplateError::TooFewActuals { class_name, missing } => write!(
                f,
                "{class_name} is missing a template argument for `{missing}` with no default"
            ),
            TemplateError::NotTemplated { class_name } => {
                write!(f, "{class_name} has no template parameter list to specialize")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Failures from hint/hierarchy collaborator input loading.
#[derive(Debug)]
pub enum HintsError {
    Io(io::Error),
    Toml(toml::de::Error),
}

impl fmt::Display for HintsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HintsError::Io(e) => write!(f, "I/O error reading hints/hierarchy file: {e}"),
            HintsError::Toml(e) => write!(f, "malformed TOML in hints/hierarchy file: {e}"),
        }
    }
}

impl std::error::Error for HintsError {}

impl From<io::Error> for HintsError {
    fn from(e: io::Error) -> Self {
        HintsError::Io(e)
    }
}

impl From<toml::de::Error> for HintsError {
    fn from(e: toml::de::Error) -> Self {
        HintsError::Toml(e)
    }
}

/// The top-level error a `driver` job can fail with.
#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Template(TemplateError),
    Hints(HintsError),
    Io(io::Error),
    Xml(quick_xml::Error),
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{e}"),
            Error::Template(e) => write!(f, "{e}"),
            Error::Hints(e) => write!(f, "{e}"),
            Error::Io(e) => write!(f, "{e}"),
            Error::Xml(e) => write!(f, "{e}"),
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Template(e) => Some(e),
            Error::Hints(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Xml(e) => Some(e),
            Error::Config(_) => None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<TemplateError> for Error {
    fn from(e: TemplateError) -> Self {
        Error::Template(e)
    }
}

impl From<HintsError> for Error {
    fn from(e: HintsError) -> Self {
        Error::Hints(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Xml(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
