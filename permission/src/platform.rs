//! Platform primitives consumed by the dispatcher.
//!
//! The host implements these traits over whatever actually grants the
//! capability (a browser engine, an OS permission broker, a test fake) and
//! hands them to [`Platform`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::{
    BluetoothDevice, BluetoothFilter, MediaStream, MidiAccess, PermissionStatus, PlatformError,
    Position, PushSubscription, RequestDescriptor,
};

/// A boxed future returned by platform primitives.
pub type PlatformFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, PlatformError>> + Send + 'a>>;

/// Completion callback for callback-style primitives. It can be called once.
pub type Callback<T> = Box<dyn FnOnce(Result<T, PlatformError>) + Send>;

/// Hints passed through to position acquisition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionOptions {
    /// Prefer a precise fix.
    pub enable_high_accuracy: Option<bool>,
    /// Timeout in milliseconds.
    pub timeout: Option<u64>,
    /// Maximum cached fix age in milliseconds.
    pub maximum_age: Option<u64>,
}

/// Options for a push subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscriptionOptions {
    /// Whether every push must produce a visible notification.
    pub user_visible_only: Option<bool>,
    /// Application server public key.
    pub application_server_key: Option<Vec<u8>>,
}

/// Options for a MIDI access request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MidiOptions {
    /// Request system exclusive messages.
    pub sysex: bool,
    /// Include software synthesizers.
    pub software: bool,
}

/// Constraints for a media stream acquisition.
///
/// Exactly one of `audio` and `video` is set by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStreamConstraints {
    /// Audio track constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Value>,
    /// Video track constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Value>,
    /// Peer identity the stream is isolated to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_identity: Option<String>,
}

/// Options for a Bluetooth device request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDeviceOptions {
    /// A previously granted device.
    pub device_id: Option<String>,
    /// Device filters.
    pub filters: Vec<BluetoothFilter>,
    /// Services to access beyond those in the filters.
    pub optional_services: Vec<String>,
}

/// Read-only check of the current grant state.
pub trait StatusQuery: Send + Sync {
    /// Reports the state for `descriptor` without prompting.
    fn query<'a>(
        &'a self,
        descriptor: &'a RequestDescriptor,
    ) -> PlatformFuture<'a, PermissionStatus>;
}

/// Position acquisition.
pub trait Geolocation: Send + Sync {
    /// Acquires one fix and reports it through `callback`.
    fn get_current_position(&self, options: PositionOptions, callback: Callback<Position>);
}

/// Notification permission prompt.
pub trait Notifications: Send + Sync {
    /// Prompts and resolves to `"default"`, `"granted"` or `"denied"`.
    fn request_permission(&self) -> PlatformFuture<'_, String>;
}

/// A service worker registration supplied by the caller.
pub trait ServiceWorkerRegistration: fmt::Debug + Send + Sync {
    /// Subscribes to push messages.
    fn subscribe(&self, options: PushSubscriptionOptions) -> PlatformFuture<'_, PushSubscription>;

    /// Registers a one-off background sync for `tag`.
    fn register_sync(&self, tag: String) -> PlatformFuture<'_, ()>;
}

/// MIDI access.
pub trait Midi: Send + Sync {
    /// Requests access to MIDI ports.
    fn request_midi_access(&self, options: MidiOptions) -> PlatformFuture<'_, MidiAccess>;
}

/// Media capture.
pub trait MediaDevices: Send + Sync {
    /// Acquires a stream and reports it through `callback`.
    fn get_user_media(&self, constraints: MediaStreamConstraints, callback: Callback<MediaStream>);
}

/// Bluetooth device discovery.
pub trait Bluetooth: Send + Sync {
    /// Scans and lets the user pick one device.
    fn request_device(&self, options: RequestDeviceOptions) -> PlatformFuture<'_, BluetoothDevice>;
}

/// Storage persistence.
pub trait StorageManager: Send + Sync {
    /// Requests persistent storage, resolving to whether it is now persisted.
    fn persist(&self) -> PlatformFuture<'_, bool>;
}

/// The primitives a host exposes. Each one is optional.
#[derive(Clone, Default)]
pub struct Platform {
    geolocation: Option<Arc<dyn Geolocation>>,
    notifications: Option<Arc<dyn Notifications>>,
    midi: Option<Arc<dyn Midi>>,
    media_devices: Option<Arc<dyn MediaDevices>>,
    bluetooth: Option<Arc<dyn Bluetooth>>,
    storage: Option<Arc<dyn StorageManager>>,
}

impl Platform {
    /// A platform with no primitives at all.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets position acquisition.
    #[must_use]
    pub fn with_geolocation(mut self, geolocation: Arc<dyn Geolocation>) -> Self {
        self.geolocation = Some(geolocation);
        self
    }

    /// Sets the notification prompt.
    #[must_use]
    pub fn with_notifications(mut self, notifications: Arc<dyn Notifications>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    /// Sets MIDI access.
    #[must_use]
    pub fn with_midi(mut self, midi: Arc<dyn Midi>) -> Self {
        self.midi = Some(midi);
        self
    }

    /// Sets media capture.
    #[must_use]
    pub fn with_media_devices(mut self, media_devices: Arc<dyn MediaDevices>) -> Self {
        self.media_devices = Some(media_devices);
        self
    }

    /// Sets Bluetooth discovery.
    #[must_use]
    pub fn with_bluetooth(mut self, bluetooth: Arc<dyn Bluetooth>) -> Self {
        self.bluetooth = Some(bluetooth);
        self
    }

    /// Sets storage persistence.
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn StorageManager>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub(crate) fn geolocation(&self) -> Option<&dyn Geolocation> {
        self.geolocation.as_deref()
    }

    pub(crate) fn notifications(&self) -> Option<&dyn Notifications> {
        self.notifications.as_deref()
    }

    pub(crate) fn midi(&self) -> Option<&dyn Midi> {
        self.midi.as_deref()
    }

    pub(crate) fn media_devices(&self) -> Option<&dyn MediaDevices> {
        self.media_devices.as_deref()
    }

    pub(crate) fn bluetooth(&self) -> Option<&dyn Bluetooth> {
        self.bluetooth.as_deref()
    }

    pub(crate) fn storage(&self) -> Option<&dyn StorageManager> {
        self.storage.as_deref()
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("geolocation", &self.geolocation.is_some())
            .field("notifications", &self.notifications.is_some())
            .field("midi", &self.midi.is_some())
            .field("media_devices", &self.media_devices.is_some())
            .field("bluetooth", &self.bluetooth.is_some())
            .field("storage", &self.storage.is_some())
            .finish()
    }
}
