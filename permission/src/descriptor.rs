//! Typed descriptions of what is being requested.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PermissionError;
use crate::platform::ServiceWorkerRegistration;

/// Shared handle to a service worker registration.
pub type Registration = Arc<dyn ServiceWorkerRegistration>;

/// The permission categories this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityKind {
    /// Device position.
    Geolocation,
    /// User-visible notifications.
    Notifications,
    /// Push message subscriptions.
    Push,
    /// Web MIDI access.
    Midi,
    /// Video capture.
    Camera,
    /// Audio capture.
    Microphone,
    /// Audio output selection.
    Speaker,
    /// Media device enumeration details.
    DeviceInfo,
    /// One-off background sync.
    BackgroundSync,
    /// Bluetooth device access.
    Bluetooth,
    /// Storage that is exempt from eviction.
    PersistentStorage,
}

impl CapabilityKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Geolocation,
        Self::Notifications,
        Self::Push,
        Self::Midi,
        Self::Camera,
        Self::Microphone,
        Self::Speaker,
        Self::DeviceInfo,
        Self::BackgroundSync,
        Self::Bluetooth,
        Self::PersistentStorage,
    ];

    /// The permission name, e.g. `"background-sync"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Geolocation => "geolocation",
            Self::Notifications => "notifications",
            Self::Push => "push",
            Self::Midi => "midi",
            Self::Camera => "camera",
            Self::Microphone => "microphone",
            Self::Speaker => "speaker",
            Self::DeviceInfo => "device-info",
            Self::BackgroundSync => "background-sync",
            Self::Bluetooth => "bluetooth",
            Self::PersistentStorage => "persistent-storage",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityKind {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PermissionError::UnrecognizedKind(s.to_owned()))
    }
}

/// Location request hints. None of them are enforced by this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeolocationDescriptor {
    /// Prefer a precise fix over a fast one.
    pub enable_high_accuracy: Option<bool>,
    /// Timeout hint in milliseconds.
    pub timeout: Option<u64>,
    /// Maximum acceptable age of a cached fix, in milliseconds.
    pub maximum_age: Option<u64>,
}

impl GeolocationDescriptor {
    /// Sets the high accuracy hint.
    #[must_use]
    pub const fn high_accuracy(mut self, enabled: bool) -> Self {
        self.enable_high_accuracy = Some(enabled);
        self
    }

    /// Sets the timeout hint in milliseconds.
    #[must_use]
    pub const fn timeout(mut self, millis: u64) -> Self {
        self.timeout = Some(millis);
        self
    }

    /// Sets the maximum age hint in milliseconds.
    #[must_use]
    pub const fn maximum_age(mut self, millis: u64) -> Self {
        self.maximum_age = Some(millis);
        self
    }
}

/// Push subscription request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PushDescriptor {
    /// Registration the subscription is made on. Required.
    #[serde(skip)]
    pub registration: Option<Registration>,
    /// Whether every push must produce a visible notification.
    pub user_visible_only: Option<bool>,
    /// Application server public key.
    pub application_server_key: Option<Vec<u8>>,
}

impl PushDescriptor {
    /// Creates a push request on the given registration.
    #[must_use]
    pub fn new(registration: Registration) -> Self {
        Self {
            registration: Some(registration),
            ..Self::default()
        }
    }

    /// Sets the user-visible-only flag.
    #[must_use]
    pub const fn user_visible_only(mut self, visible: bool) -> Self {
        self.user_visible_only = Some(visible);
        self
    }

    /// Sets the application server key.
    #[must_use]
    pub fn application_server_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.application_server_key = Some(key.into());
        self
    }
}

/// MIDI access request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiDescriptor {
    /// Request system exclusive messages.
    pub sysex: bool,
    /// Include software synthesizers.
    pub software: bool,
}

/// Camera or microphone request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaDescriptor {
    /// Track constraints; `true` is used when absent.
    pub constraints: Option<Value>,
    /// Peer identity the stream is isolated to.
    pub peer_identity: Option<String>,
}

impl MediaDescriptor {
    /// Sets the track constraints.
    #[must_use]
    pub fn constraints(mut self, constraints: Value) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Sets the peer identity.
    #[must_use]
    pub fn peer_identity(mut self, identity: impl Into<String>) -> Self {
        self.peer_identity = Some(identity.into());
        self
    }
}

/// Background sync registration request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackgroundSyncDescriptor {
    /// Registration the sync is registered on. Required.
    #[serde(skip)]
    pub registration: Option<Registration>,
    /// Sync tag.
    pub tag: String,
}

impl BackgroundSyncDescriptor {
    /// Creates a sync request for `tag` on the given registration.
    #[must_use]
    pub fn new(registration: Registration, tag: impl Into<String>) -> Self {
        Self {
            registration: Some(registration),
            tag: tag.into(),
        }
    }
}

/// One Bluetooth device filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BluetoothFilter {
    /// GATT services the device must advertise.
    pub services: Vec<String>,
    /// Exact device name.
    pub name: Option<String>,
    /// Device name prefix.
    pub name_prefix: Option<String>,
}

/// Bluetooth device request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BluetoothDescriptor {
    /// A previously granted device.
    pub device_id: Option<String>,
    /// Device filters.
    pub filters: Vec<BluetoothFilter>,
    /// Services to access beyond those named in the filters.
    pub optional_services: Vec<String>,
}

impl BluetoothDescriptor {
    /// Adds a filter.
    #[must_use]
    pub fn filter(mut self, filter: BluetoothFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds an optional service.
    #[must_use]
    pub fn optional_service(mut self, service: impl Into<String>) -> Self {
        self.optional_services.push(service.into());
        self
    }
}

/// A request for one capability, with that capability's parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum RequestDescriptor {
    /// See [`CapabilityKind::Geolocation`].
    Geolocation(GeolocationDescriptor),
    /// See [`CapabilityKind::Notifications`].
    Notifications,
    /// See [`CapabilityKind::Push`].
    Push(PushDescriptor),
    /// See [`CapabilityKind::Midi`].
    Midi(MidiDescriptor),
    /// See [`CapabilityKind::Camera`].
    Camera(MediaDescriptor),
    /// See [`CapabilityKind::Microphone`].
    Microphone(MediaDescriptor),
    /// See [`CapabilityKind::Speaker`].
    Speaker,
    /// See [`CapabilityKind::DeviceInfo`].
    DeviceInfo,
    /// See [`CapabilityKind::BackgroundSync`].
    BackgroundSync(BackgroundSyncDescriptor),
    /// See [`CapabilityKind::Bluetooth`].
    Bluetooth(BluetoothDescriptor),
    /// See [`CapabilityKind::PersistentStorage`].
    PersistentStorage,
}

impl RequestDescriptor {
    /// The kind this descriptor requests.
    #[must_use]
    pub const fn kind(&self) -> CapabilityKind {
        match self {
            Self::Geolocation(_) => CapabilityKind::Geolocation,
            Self::Notifications => CapabilityKind::Notifications,
            Self::Push(_) => CapabilityKind::Push,
            Self::Midi(_) => CapabilityKind::Midi,
            Self::Camera(_) => CapabilityKind::Camera,
            Self::Microphone(_) => CapabilityKind::Microphone,
            Self::Speaker => CapabilityKind::Speaker,
            Self::DeviceInfo => CapabilityKind::DeviceInfo,
            Self::BackgroundSync(_) => CapabilityKind::BackgroundSync,
            Self::Bluetooth(_) => CapabilityKind::Bluetooth,
            Self::PersistentStorage => CapabilityKind::PersistentStorage,
        }
    }

    /// Checks that required handles are present.
    ///
    /// # Errors
    /// Returns [`PermissionError::InvalidDescriptor`] when a push or
    /// background sync descriptor carries no registration.
    pub fn validate(&self) -> Result<(), PermissionError> {
        let registration = match self {
            Self::Push(push) => push.registration.as_ref(),
            Self::BackgroundSync(sync) => sync.registration.as_ref(),
            _ => return Ok(()),
        };
        require_registration(registration, self.kind()).map(|_| ())
    }

    /// Parses an untyped descriptor such as `{"name": "midi", "sysex": true}`.
    ///
    /// Registration handles cannot be expressed in JSON, so push and
    /// background sync descriptors parsed here fail [`Self::validate`].
    ///
    /// # Errors
    /// - [`PermissionError::Malformed`] if `name` is missing or not a string.
    /// - [`PermissionError::UnrecognizedKind`] if `name` is unknown.
    /// - [`PermissionError::InvalidDescriptor`] if the remaining fields do
    ///   not fit the named kind.
    pub fn from_value(value: Value) -> Result<Self, PermissionError> {
        let kind: CapabilityKind = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| PermissionError::Malformed("missing name".into()))?
            .parse()?;

        let reason = match serde_json::from_value(value) {
            Ok(descriptor) => return Ok(descriptor),
            Err(err) => err.to_string(),
        };
        Err(PermissionError::InvalidDescriptor { kind, reason })
    }
}

pub fn require_registration(
    registration: Option<&Registration>,
    kind: CapabilityKind,
) -> Result<&Registration, PermissionError> {
    match registration {
        Some(registration) => Ok(registration),
        None => Err(PermissionError::InvalidDescriptor {
            kind,
            reason: "a service worker registration is required".to_owned(),
        }),
    }
}

impl From<GeolocationDescriptor> for RequestDescriptor {
    fn from(descriptor: GeolocationDescriptor) -> Self {
        Self::Geolocation(descriptor)
    }
}

impl From<PushDescriptor> for RequestDescriptor {
    fn from(descriptor: PushDescriptor) -> Self {
        Self::Push(descriptor)
    }
}

impl From<MidiDescriptor> for RequestDescriptor {
    fn from(descriptor: MidiDescriptor) -> Self {
        Self::Midi(descriptor)
    }
}

impl From<BackgroundSyncDescriptor> for RequestDescriptor {
    fn from(descriptor: BackgroundSyncDescriptor) -> Self {
        Self::BackgroundSync(descriptor)
    }
}

impl From<BluetoothDescriptor> for RequestDescriptor {
    fn from(descriptor: BluetoothDescriptor) -> Self {
        Self::Bluetooth(descriptor)
    }
}
