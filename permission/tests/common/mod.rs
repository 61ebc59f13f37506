//! Fake platform primitives shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use permshim_permission::platform::{
    Bluetooth, Callback, Geolocation, MediaDevices, MediaStreamConstraints, Midi, MidiOptions,
    Notifications, PlatformFuture, PositionOptions, PushSubscriptionOptions, RequestDeviceOptions,
    ServiceWorkerRegistration, StatusQuery, StorageManager,
};
use permshim_permission::{
    BluetoothDevice, Coordinates, MediaKind, MediaStream, MediaTrack, MidiAccess, PermissionState,
    PermissionStatus, PlatformError, Position, PushSubscription, RequestDescriptor,
};

pub fn position() -> Position {
    Position {
        coords: Coordinates {
            latitude: 48.8566,
            longitude: 2.3522,
            accuracy: 25.0,
            altitude: Some(35.0),
            altitude_accuracy: None,
            heading: None,
            speed: None,
        },
        timestamp: 1_700_000_000_000,
    }
}

pub fn stream(kind: MediaKind) -> MediaStream {
    MediaStream {
        id: "stream-1".into(),
        tracks: vec![MediaTrack {
            id: "track-1".into(),
            kind,
            label: "Built-in".into(),
        }],
    }
}

pub fn device() -> BluetoothDevice {
    BluetoothDevice {
        id: "hr-strap".into(),
        name: Some("Pulse HR".into()),
    }
}

pub fn subscription() -> PushSubscription {
    PushSubscription {
        endpoint: "https://push.example.net/send/abc".into(),
        expiration_time: None,
    }
}

fn ready<'a, T: Send + 'a>(outcome: Result<T, PlatformError>) -> PlatformFuture<'a, T> {
    futures::future::ready(outcome).boxed()
}

/// Counts how many times a primitive was invoked.
#[derive(Debug, Default)]
pub struct Calls(AtomicUsize);

impl Calls {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A status query that always reports the same state.
#[derive(Debug)]
pub struct FixedQuery {
    pub state: PermissionState,
    pub calls: Calls,
}

impl FixedQuery {
    pub fn new(state: PermissionState) -> Arc<Self> {
        Arc::new(Self {
            state,
            calls: Calls::default(),
        })
    }
}

impl StatusQuery for FixedQuery {
    fn query<'a>(
        &'a self,
        _descriptor: &'a RequestDescriptor,
    ) -> PlatformFuture<'a, PermissionStatus> {
        self.calls.hit();
        ready(Ok(PermissionStatus::new(self.state)))
    }
}

/// Reports a fixed position outcome through the callback.
pub struct FakeGeolocation {
    pub outcome: Option<Result<Position, PlatformError>>,
    pub seen: Mutex<Option<PositionOptions>>,
    pub calls: Calls,
}

impl FakeGeolocation {
    pub fn new(outcome: Result<Position, PlatformError>) -> Arc<Self> {
        Self::with_outcome(Some(outcome))
    }

    /// Drops the callback without calling it.
    pub fn silent() -> Arc<Self> {
        Self::with_outcome(None)
    }

    fn with_outcome(outcome: Option<Result<Position, PlatformError>>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            seen: Mutex::new(None),
            calls: Calls::default(),
        })
    }
}

impl Geolocation for FakeGeolocation {
    fn get_current_position(&self, options: PositionOptions, callback: Callback<Position>) {
        self.calls.hit();
        *self.seen.lock().unwrap() = Some(options);
        if let Some(outcome) = self.outcome.clone() {
            callback(outcome);
        }
    }
}

/// Resolves the notification prompt to a fixed string.
pub struct FakeNotifications {
    pub value: String,
    pub calls: Calls,
}

impl FakeNotifications {
    pub fn new(value: &str) -> Arc<Self> {
        Arc::new(Self {
            value: value.to_owned(),
            calls: Calls::default(),
        })
    }
}

impl Notifications for FakeNotifications {
    fn request_permission(&self) -> PlatformFuture<'_, String> {
        self.calls.hit();
        ready(Ok(self.value.clone()))
    }
}

/// A registration whose push and sync outcomes are fixed.
#[derive(Debug)]
pub struct FakeRegistration {
    pub subscribe: Result<PushSubscription, PlatformError>,
    pub sync: Result<(), PlatformError>,
    pub calls: Calls,
    pub seen: Mutex<Option<PushSubscriptionOptions>>,
    pub tags: Mutex<Vec<String>>,
}

impl FakeRegistration {
    pub fn new(
        subscribe: Result<PushSubscription, PlatformError>,
        sync: Result<(), PlatformError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            subscribe,
            sync,
            calls: Calls::default(),
            seen: Mutex::new(None),
            tags: Mutex::new(Vec::new()),
        })
    }

    /// A registration whose push subscription succeeds.
    pub fn subscribing() -> Arc<Self> {
        Self::new(Ok(subscription()), Ok(()))
    }

    /// A registration whose push subscription fails with `error`.
    pub fn refusing(error: PlatformError) -> Arc<Self> {
        Self::new(Err(error), Ok(()))
    }

    /// A registration whose sync registration fails with `error`.
    pub fn refusing_sync(error: PlatformError) -> Arc<Self> {
        Self::new(Ok(subscription()), Err(error))
    }
}

impl ServiceWorkerRegistration for FakeRegistration {
    fn subscribe(&self, options: PushSubscriptionOptions) -> PlatformFuture<'_, PushSubscription> {
        self.calls.hit();
        *self.seen.lock().unwrap() = Some(options);
        ready(self.subscribe.clone())
    }

    fn register_sync(&self, tag: String) -> PlatformFuture<'_, ()> {
        self.calls.hit();
        self.tags.lock().unwrap().push(tag);
        ready(self.sync.clone())
    }
}

/// Grants or refuses MIDI access, echoing the sysex option.
pub struct FakeMidi {
    pub outcome: Result<MidiAccess, PlatformError>,
    pub calls: Calls,
}

impl FakeMidi {
    pub fn new(outcome: Result<MidiAccess, PlatformError>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Calls::default(),
        })
    }
}

impl Midi for FakeMidi {
    fn request_midi_access(&self, options: MidiOptions) -> PlatformFuture<'_, MidiAccess> {
        self.calls.hit();
        let mut outcome = self.outcome.clone();
        if let Ok(access) = &mut outcome {
            access.sysex_enabled = options.sysex;
        }
        ready(outcome)
    }
}

/// Media capture fake reporting through the callback.
pub struct FakeMedia {
    pub outcome: Option<Result<MediaStream, PlatformError>>,
    pub seen: Mutex<Option<MediaStreamConstraints>>,
    pub calls: Calls,
}

impl FakeMedia {
    pub fn new(outcome: Result<MediaStream, PlatformError>) -> Arc<Self> {
        Self::with_outcome(Some(outcome))
    }

    /// Drops the callback without calling it.
    pub fn silent() -> Arc<Self> {
        Self::with_outcome(None)
    }

    fn with_outcome(outcome: Option<Result<MediaStream, PlatformError>>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            seen: Mutex::new(None),
            calls: Calls::default(),
        })
    }

    pub fn constraints(&self) -> MediaStreamConstraints {
        self.seen.lock().unwrap().clone().unwrap()
    }
}

impl MediaDevices for FakeMedia {
    fn get_user_media(&self, wanted: MediaStreamConstraints, callback: Callback<MediaStream>) {
        self.calls.hit();
        *self.seen.lock().unwrap() = Some(wanted);
        if let Some(outcome) = self.outcome.clone() {
            callback(outcome);
        }
    }
}

pub struct FakeBluetooth {
    pub outcome: Result<BluetoothDevice, PlatformError>,
    pub seen: Mutex<Option<RequestDeviceOptions>>,
    pub calls: Calls,
}

impl FakeBluetooth {
    pub fn new(outcome: Result<BluetoothDevice, PlatformError>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            seen: Mutex::new(None),
            calls: Calls::default(),
        })
    }
}

impl Bluetooth for FakeBluetooth {
    fn request_device(&self, wanted: RequestDeviceOptions) -> PlatformFuture<'_, BluetoothDevice> {
        self.calls.hit();
        *self.seen.lock().unwrap() = Some(wanted);
        ready(self.outcome.clone())
    }
}

pub struct FakeStorage {
    pub outcome: Result<bool, PlatformError>,
    pub calls: Calls,
}

impl FakeStorage {
    pub fn new(outcome: Result<bool, PlatformError>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Calls::default(),
        })
    }
}

impl StorageManager for FakeStorage {
    fn persist(&self) -> PlatformFuture<'_, bool> {
        self.calls.hit();
        ready(self.outcome.clone())
    }
}
