use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Error raised by parsing, decoding, or encoding.
///
/// Carries the failure kind, a human-readable reason, and the source
/// location where it was raised (captured by [`asn1_error!`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    reason: String,
    file: &'static str,
    line: u32,
}

impl Error {
    pub fn new(kind: ErrorKind, reason: impl Into<String>, file: &'static str, line: u32) -> Self {
        Error {
            kind,
            reason: reason.into(),
            file,
            line,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[mutants::skip]
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} ({}:{})",
            self.kind, self.reason, self.file, self.line
        )
    }
}

impl std::error::Error for Error {}

/// The closed set of failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Structural or constraint violation: EOC misuse, excessive
    /// depth/nodes, trailing bytes, bad boolean byte, illegal OID component
    /// ranges, NaN or decimal REAL.
    InvalidASN1Object,
    /// Input ran out in the middle of a TLV.
    TruncatedASN1Field,
    /// Indefinite length under DER, long form where short is required, or
    /// non-minimal length octets.
    UnsupportedFieldLength,
    /// Identifier mismatch or primitive/constructed shape mismatch during
    /// typed decoding.
    UnexpectedFieldType,
    /// Numeric conversion outside the supported range.
    ValueOutOfRange,
    /// Identifier decoding failure: non-minimal long form and friends.
    MalformedASN1Identifier,
    /// Redundant leading 0x00 or 0xFF on an INTEGER.
    InvalidASN1IntegerEncoding,
    /// OBJECT IDENTIFIER constructed from fewer than two components.
    TooFewOIDComponents,
}

#[macro_export]
macro_rules! asn1_error {
    ($kind:expr, $($arg:tt)+) => {
        $crate::error::Error::new($kind, format!($($arg)+), file!(), line!())
    };
}
