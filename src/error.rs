//! Surfaced error codes.
//!
//! Every subsystem keeps its own error enum; this module collects them into
//! the single code set callers see. Components propagate the first error
//! encountered upward unchanged; nothing in this crate retries a failed
//! cryptographic or I/O operation. Rendering human-readable messages is the
//! host application's job.

use crate::container::ContainerError;
use crate::entropy::keystroke::KeystrokeError;
use crate::entropy::EntropyError;
use crate::sss::SssError;
use crate::storage::StorageError;

/// Error codes surfaced by the credential core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Invalid parameter or descriptor syntax. Raised before any I/O or
    /// RNG use.
    Parameter,
    /// An option appeared more than once in a scheme descriptor.
    DuplicateOption,
    /// Allocation failure.
    OutOfMemory,
    /// No random generator available, or the generator is not valid.
    RngUnavailable,
    /// Container malformed, authentication failed, or recovered length
    /// does not match expectations. Never accompanied by partial output.
    BadFormat,
    /// Output file already exists and overwrite was not confirmed.
    FileExists,
    /// Input file does not exist.
    NotFound,
    /// File could not be opened or created.
    OpenFailed,
    /// File read failed.
    ReadFailed,
    /// File write failed.
    WriteFailed,
    /// Keystroke collection timed out.
    Timeout,
    /// An entropy source failed its startup self-test.
    SelfTest,
}

impl From<EntropyError> for Error {
    fn from(err: EntropyError) -> Self {
        match err {
            EntropyError::HealthTestFailed => Error::SelfTest,
            EntropyError::Timeout => Error::Timeout,
            _ => Error::RngUnavailable,
        }
    }
}

impl From<KeystrokeError> for Error {
    fn from(err: KeystrokeError) -> Self {
        match err {
            KeystrokeError::Timeout { .. } => Error::Timeout,
            KeystrokeError::Unavailable => Error::RngUnavailable,
            KeystrokeError::Backend => Error::ReadFailed,
        }
    }
}

impl From<SssError> for Error {
    fn from(err: SssError) -> Self {
        match err {
            SssError::InvalidThreshold | SssError::InvalidShareIndex | SssError::EmptySecret => {
                Error::Parameter
            }
            SssError::RngFailure => Error::RngUnavailable,
            // Recombination-side defects mean the share set on disk is bad.
            SssError::InsufficientShares
            | SssError::DuplicateShareIndex
            | SssError::ShareLengthMismatch => Error::BadFormat,
        }
    }
}

impl From<ContainerError> for Error {
    fn from(err: ContainerError) -> Self {
        match err {
            ContainerError::BadIterations => Error::Parameter,
            ContainerError::Malformed | ContainerError::AuthFailed => Error::BadFormat,
            ContainerError::Kdf => Error::SelfTest,
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Error::NotFound,
            StorageError::AlreadyExists => Error::FileExists,
            StorageError::ReadFailed => Error::ReadFailed,
            StorageError::WriteFailed => Error::WriteFailed,
            StorageError::PermissionDenied | StorageError::OpenFailed | StorageError::InvalidPath => {
                Error::OpenFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_health_failure_maps_to_self_test() {
        assert_eq!(Error::from(EntropyError::HealthTestFailed), Error::SelfTest);
        assert_eq!(Error::from(EntropyError::CollectionFailed), Error::RngUnavailable);
    }

    #[test]
    fn keystroke_timeout_maps_to_timeout() {
        let err = KeystrokeError::Timeout { completed_blocks: 2 };
        assert_eq!(Error::from(err), Error::Timeout);
    }

    #[test]
    fn storage_codes_keep_their_identity() {
        assert_eq!(Error::from(StorageError::NotFound), Error::NotFound);
        assert_eq!(Error::from(StorageError::AlreadyExists), Error::FileExists);
        assert_eq!(Error::from(StorageError::WriteFailed), Error::WriteFailed);
    }
}
