use thiserror::Error;

use crate::CapabilityKind;

/// Reason code reported by a failed position acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionErrorCode {
    /// The user or system refused location access.
    PermissionDenied,
    /// No position could be determined.
    PositionUnavailable,
    /// The timeout hint elapsed before a fix was obtained.
    Timeout,
}

/// Failures reported by platform primitives.
///
/// Variants mirror the DOM exception names the permission surface uses, so
/// handlers can tell a refusal apart from an opaque failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// `NotAllowedError`.
    #[error("NotAllowedError: {0}")]
    NotAllowed(String),
    /// `SecurityError`.
    #[error("SecurityError: {0}")]
    Security(String),
    /// `PermissionDeniedError`, raised by media capture.
    #[error("PermissionDeniedError: {0}")]
    PermissionDenied(String),
    /// `NotFoundError`.
    #[error("NotFoundError: {0}")]
    NotFound(String),
    /// `InvalidStateError`.
    #[error("InvalidStateError: {0}")]
    InvalidState(String),
    /// `AbortError`.
    #[error("AbortError: {0}")]
    Abort(String),
    /// `NotSupportedError`.
    #[error("NotSupportedError: {0}")]
    NotSupported(String),
    /// `TypeError`.
    #[error("TypeError: {0}")]
    Type(String),
    /// A position could not be acquired.
    #[error("GeolocationPositionError ({code:?}): {message}")]
    Position {
        /// Reason code.
        code: PositionErrorCode,
        /// Human readable detail.
        message: String,
    },
    /// Any other named failure.
    #[error("{name}: {message}")]
    Other {
        /// Error name as reported by the platform.
        name: String,
        /// Human readable detail.
        message: String,
    },
}

impl PlatformError {
    /// Builds an error from a platform error name, falling back to
    /// [`PlatformError::Other`] for names without a dedicated variant.
    pub fn from_name(name: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match name {
            "NotAllowedError" => Self::NotAllowed(message),
            "SecurityError" => Self::Security(message),
            "PermissionDeniedError" => Self::PermissionDenied(message),
            "NotFoundError" => Self::NotFound(message),
            "InvalidStateError" => Self::InvalidState(message),
            "AbortError" => Self::Abort(message),
            "NotSupportedError" => Self::NotSupported(message),
            "TypeError" => Self::Type(message),
            _ => Self::Other {
                name: name.to_owned(),
                message,
            },
        }
    }

    /// The platform error name, e.g. `"NotAllowedError"`.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::NotAllowed(_) => "NotAllowedError",
            Self::Security(_) => "SecurityError",
            Self::PermissionDenied(_) => "PermissionDeniedError",
            Self::NotFound(_) => "NotFoundError",
            Self::InvalidState(_) => "InvalidStateError",
            Self::Abort(_) => "AbortError",
            Self::NotSupported(_) => "NotSupportedError",
            Self::Type(_) => "TypeError",
            Self::Position { .. } => "GeolocationPositionError",
            Self::Other { name, .. } => name,
        }
    }

    /// The detail message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotAllowed(message)
            | Self::Security(message)
            | Self::PermissionDenied(message)
            | Self::NotFound(message)
            | Self::InvalidState(message)
            | Self::Abort(message)
            | Self::NotSupported(message)
            | Self::Type(message)
            | Self::Position { message, .. }
            | Self::Other { message, .. } => message,
        }
    }
}

/// Errors that can occur when requesting permissions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// A descriptor is missing a required field or carries a bad one.
    #[error("invalid {kind} descriptor: {reason}")]
    InvalidDescriptor {
        /// Kind named by the descriptor.
        kind: CapabilityKind,
        /// What was wrong with it.
        reason: String,
    },
    /// Untyped input that does not look like a descriptor at all.
    #[error("malformed permission descriptor: {0}")]
    Malformed(String),
    /// The kind supports status queries only.
    #[error("{0} can't be requested")]
    NotRequestable(CapabilityKind),
    /// The platform exposes no primitive for this kind.
    #[error("{0} is not supported on this platform")]
    Unsupported(CapabilityKind),
    /// A permission name outside the known set.
    #[error("unknown permission name: {0}")]
    UnrecognizedKind(String),
    /// The notification prompt returned a value outside its vocabulary.
    #[error("unexpected notification permission value: {0}")]
    UnexpectedNotificationState(String),
    /// A callback-style primitive dropped its callback without settling.
    #[error("{0} request was dropped before it settled")]
    Abandoned(CapabilityKind),
    /// The registry lacks the named capability.
    #[error("permission registry has no {0} capability")]
    MissingCapability(&'static str),
    /// An opaque platform failure, passed through untouched.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}
