//! Closed error set for the elliptic-curve core.

use core::fmt::{self, Display};

/// Errors surfaced by the curve arithmetic core.
///
/// This is a closed set: every failure mode the core can produce maps onto
/// one of these variants, rather than an open-ended/opaque error type, so
/// callers can match on the cause (malformed wire data vs. exhausted RNG
/// retries vs. a group-level invariant violation) without downcasting.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Malformed wire data: wrong length, bad leading byte, truncated
    /// record, or a scalar/coordinate out of its valid range.
    BadInputData,
    /// An unknown curve identifier, or a wire format this build doesn't
    /// implement (e.g. compressed points, which RFC 8422 excludes).
    FeatureUnavailable,
    /// Output buffer too small for the encoded value.
    NoSpace,
    /// Rejection sampling for a private scalar or blinding value did not
    /// succeed within the retry bound.
    RandomFailed,
    /// A group-level invariant was violated: a public key off the curve,
    /// a private scalar out of `[1, N)`, or similar.
    Invalid,
    /// An internal precondition was violated (programming error). Only
    /// ever returned in release builds; debug builds assert instead.
    Internal,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::BadInputData => "malformed curve input data",
            Error::FeatureUnavailable => "unsupported curve or wire format",
            Error::NoSpace => "output buffer too small",
            Error::RandomFailed => "random sampling did not converge",
            Error::Invalid => "curve invariant violation",
            Error::Internal => "internal assertion failure",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Convenience alias for fallible core operations.
pub type Result<T> = core::result::Result<T, Error>;
