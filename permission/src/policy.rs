//! Per-kind outcome vocabulary.
//!
//! Each requestable kind whose primitive can fail in a "declined" way is
//! described by one [`Policy`]: which state a success resolves to, which
//! failures count as a refusal, and what a refusal resolves to.

use crate::{PermissionState, PlatformError};

/// How a settled primitive turns into a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Report this state directly.
    Report(PermissionState),
    /// Ask the status query, using `default` if there is none.
    Query { default: PermissionState },
}

/// Which failures are a refusal rather than an error.
#[derive(Debug, Clone, Copy)]
pub enum Decline {
    /// Every failure is inconclusive rather than an error.
    Always,
    /// Failures matching the predicate.
    When(fn(&PlatformError) -> bool),
}

impl Decline {
    pub fn matches(self, error: &PlatformError) -> bool {
        match self {
            Self::Always => true,
            Self::When(predicate) => predicate(error),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Policy {
    pub on_success: Resolution,
    pub decline: Decline,
    pub on_decline: Resolution,
}

const fn is_not_allowed(error: &PlatformError) -> bool {
    matches!(error, PlatformError::NotAllowed(_))
}

const fn is_security(error: &PlatformError) -> bool {
    matches!(error, PlatformError::Security(_))
}

const fn is_permission_denied(error: &PlatformError) -> bool {
    matches!(error, PlatformError::PermissionDenied(_))
}

const fn is_not_found(error: &PlatformError) -> bool {
    matches!(error, PlatformError::NotFound(_))
}

/// A fix implies an implicit grant; a failed fix says nothing.
pub const GEOLOCATION: Policy = Policy {
    on_success: Resolution::Query {
        default: PermissionState::Granted,
    },
    decline: Decline::Always,
    on_decline: Resolution::Query {
        default: PermissionState::Prompt,
    },
};

pub const PUSH: Policy = Policy {
    on_success: Resolution::Report(PermissionState::Granted),
    decline: Decline::When(is_not_allowed),
    on_decline: Resolution::Report(PermissionState::Denied),
};

pub const MIDI: Policy = Policy {
    on_success: Resolution::Report(PermissionState::Granted),
    decline: Decline::When(is_security),
    on_decline: Resolution::Report(PermissionState::Denied),
};

pub const MEDIA: Policy = Policy {
    on_success: Resolution::Report(PermissionState::Granted),
    decline: Decline::When(is_permission_denied),
    on_decline: Resolution::Report(PermissionState::Denied),
};

pub const BACKGROUND_SYNC: Policy = Policy {
    on_success: Resolution::Report(PermissionState::Granted),
    decline: Decline::When(is_not_allowed),
    on_decline: Resolution::Report(PermissionState::Denied),
};

/// Picking a device is not a standing grant.
pub const BLUETOOTH: Policy = Policy {
    on_success: Resolution::Report(PermissionState::Prompt),
    decline: Decline::When(is_not_found),
    on_decline: Resolution::Report(PermissionState::Prompt),
};

/// Maps the notification prompt's native value.
pub fn notification_state(value: &str) -> Option<PermissionState> {
    match value {
        "default" => Some(PermissionState::Prompt),
        "granted" => Some(PermissionState::Granted),
        "denied" => Some(PermissionState::Denied),
        _ => None,
    }
}

pub const fn persisted_state(persisted: bool) -> PermissionState {
    if persisted {
        PermissionState::Granted
    } else {
        PermissionState::Denied
    }
}
