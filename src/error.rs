use std::{
    error::Error as StdError,
    fmt, io,
    num::ParseIntError,
    result::Result as StdResult,
};

/// A type alias for `Result<T, ltrflank::Error>`.
pub type Result<T> = StdResult<T, Error>;

/// Error raised anywhere in the flank extraction and filtering pipeline.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    /// A crate private constructor for `Error`.
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Unwrap this error into its underlying type.
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// True for errors that only invalidate a single hit or record.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            *self.0,
            ErrorKind::MissingField(_)
                | ErrorKind::InvalidField(_)
                | ErrorKind::MissingOrCorruptSequence(_)
                | ErrorKind::InvalidStrandTerminusCombination(_)
                | ErrorKind::QueryRange(_)
        )
    }
}

/// Specific errors that can happen.
#[derive(Debug)]
pub enum ErrorKind {
    /// I/O error.
    Io(io::Error),
    /// Could not convert a field into an integer.
    Int(ParseIntError),
    /// Could not read or write a JSON document.
    Json(serde_json::Error),
    /// Error during parsing of a report line.
    Parser(String),
    /// The scanned motif is not one of the known LTR termini.
    UnknownMotif(String),
    /// A hit is missing one of its required tags.
    MissingField(String),
    /// A hit carries a tag whose value cannot be used.
    InvalidField(String),
    /// The read sequence is absent or empty.
    MissingOrCorruptSequence(String),
    /// A query id does not carry a usable strand/terminus pair.
    InvalidStrandTerminusCombination(String),
    /// Query coordinates fall outside the flank they should align with.
    QueryRange(String),
    /// Wrong column count or a non-numeric coordinate in a tabular file.
    MalformedTabularRow { line: u64, msg: String },
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::new(ErrorKind::Io(err))
    }
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        Error::new(ErrorKind::Int(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorKind::Json(err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Io(ref err) => write!(f, "I/O error - {}", err),
            ErrorKind::Int(ref err) => write!(f, "parsing integer error - {}", err),
            ErrorKind::Json(ref err) => write!(f, "JSON error - {}", err),
            ErrorKind::Parser(ref err) => write!(f, "parser error - {}", err),
            ErrorKind::UnknownMotif(ref err) => write!(f, "unknown motif - {}", err),
            ErrorKind::MissingField(ref err) => write!(f, "missing field - {}", err),
            ErrorKind::InvalidField(ref err) => write!(f, "invalid field - {}", err),
            ErrorKind::MissingOrCorruptSequence(ref err) => {
                write!(f, "missing or corrupt sequence - {}", err)
            }
            ErrorKind::InvalidStrandTerminusCombination(ref err) => {
                write!(f, "invalid strand/terminus combination - {}", err)
            }
            ErrorKind::QueryRange(ref err) => write!(f, "query range - {}", err),
            ErrorKind::MalformedTabularRow { line, ref msg } => {
                write!(f, "malformed row at line {} - {}", line, msg)
            }
        }
    }
}

impl StdError for Error {}
