//! Error handling for the interposed operations.

use std::fmt;

/// A specialized [`Result`] type for operations implemented by the wrapper.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for operations the wrapper implements itself.
///
/// Errors produced by the wrapped driver never show up here, they're forwarded
/// to the caller unchanged.
#[derive(Debug, Clone)]
pub struct Error {
    /// The raw code of the underlying error.
    raw_code: Option<i64>,

    /// The raw message from the os in case it could be obtained.
    raw_os_message: Option<String>,

    /// The simplified error kind to handle matching.
    kind: ErrorKind,
}

impl Error {
    pub(crate) fn new(
        raw_code: Option<i64>,
        raw_os_message: Option<String>,
        kind: ErrorKind,
    ) -> Self {
        Self { raw_code, raw_os_message, kind }
    }

    /// Build an error from an [`std::io::Error`], keeping the `errno`.
    #[cfg_attr(not(wayland_platform), allow(dead_code))]
    pub(crate) fn from_io(err: &std::io::Error, kind: ErrorKind) -> Self {
        Self::new(err.raw_os_error().map(i64::from), Some(err.to_string()), kind)
    }

    /// Build an error from a failed dynamic library operation.
    pub(crate) fn from_dl(err: &libloading::Error, kind: ErrorKind) -> Self {
        Self::new(None, Some(err.to_string()), kind)
    }

    /// The underlying error kind.
    #[inline]
    pub fn error_kind(&self) -> ErrorKind {
        self.kind
    }

    /// The underlying raw code in case it's present.
    #[inline]
    pub fn raw_code(&self) -> Option<i64> {
        self.raw_code
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(raw_code) = self.raw_code {
            write!(f, "[{raw_code:x}] ")?;
        }

        let msg = if let Some(raw_os_message) = self.raw_os_message.as_ref() {
            raw_os_message
        } else {
            self.kind.as_str()
        };

        write!(f, "{msg}")
    }
}

impl std::error::Error for Error {}

/// Build an error with just a kind.
impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error { raw_code: None, raw_os_message: None, kind }
    }
}

/// A list specifying general categories of wrapper errors.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ErrorKind {
    /// The driver, a helper library, or a symbol in one of them is missing.
    NotFound,

    /// The protocol bridge refused to start.
    InitializationFailed,

    /// The buffer device could not be opened or wrapped.
    ResourceUnavailable,

    /// A display server is already bound.
    AlreadyBound,

    /// No display server is bound.
    NotBound,

    /// An unrecognized attribute was passed.
    BadAttribute,

    /// One or more argument values are invalid.
    BadParameter,

    /// The advertised extension list could not be allocated.
    OutOfMemory,

    /// The misc error that can't be classified occurred.
    Misc,
}

impl ErrorKind {
    pub(crate) fn as_str(&self) -> &'static str {
        use ErrorKind::*;
        match *self {
            NotFound => "not found",
            InitializationFailed => "initialization failed",
            ResourceUnavailable => "the buffer device is unavailable",
            AlreadyBound => "a display server is already bound",
            NotBound => "no display server is bound",
            BadAttribute => "an unrecognized attribute was passed",
            BadParameter => "one or more argument values are invalid",
            OutOfMemory => "out of memory",
            Misc => "misc error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
