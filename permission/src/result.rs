//! Normalized request outcomes and the payloads they may carry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CapabilityKind;

/// The normalized grant outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// The capability may be used.
    Granted,
    /// The user or system refused the capability.
    Denied,
    /// The user would be asked again.
    Prompt,
}

impl PermissionState {
    /// The lowercase state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Prompt => "prompt",
        }
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bare state, as returned by status queries and by kinds without a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionStatus {
    /// The current state.
    pub state: PermissionState,
}

impl PermissionStatus {
    /// Wraps a state.
    #[must_use]
    pub const fn new(state: PermissionState) -> Self {
        Self { state }
    }
}

impl From<PermissionState> for PermissionStatus {
    fn from(state: PermissionState) -> Self {
        Self::new(state)
    }
}

/// Geographic coordinates of a position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
    /// Horizontal accuracy in meters.
    pub accuracy: f64,
    /// Altitude in meters above sea level, if available.
    pub altitude: Option<f64>,
    /// Vertical accuracy in meters, if available.
    pub altitude_accuracy: Option<f64>,
    /// Direction of travel in degrees from true north, if available.
    pub heading: Option<f64>,
    /// Ground speed in meters per second, if available.
    pub speed: Option<f64>,
}

/// A position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Where the device is.
    pub coords: Coordinates,
    /// Timestamp as Unix epoch milliseconds.
    pub timestamp: u64,
}

/// A push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    /// Push service endpoint.
    pub endpoint: String,
    /// Expiry as Unix epoch milliseconds, if the subscription expires.
    pub expiration_time: Option<u64>,
}

/// A MIDI input or output port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiPort {
    /// Port identifier.
    pub id: String,
    /// Port name, if known.
    pub name: Option<String>,
    /// Manufacturer, if known.
    pub manufacturer: Option<String>,
}

/// Granted MIDI access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MidiAccess {
    /// Whether system exclusive messages are enabled.
    pub sysex_enabled: bool,
    /// Input ports.
    pub inputs: Vec<MidiPort>,
    /// Output ports.
    pub outputs: Vec<MidiPort>,
}

/// The media type of a captured track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Microphone track.
    Audio,
    /// Camera track.
    Video,
}

/// One captured track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTrack {
    /// Track identifier.
    pub id: String,
    /// Audio or video.
    pub kind: MediaKind,
    /// Device label.
    pub label: String,
}

/// A captured media stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaStream {
    /// Stream identifier.
    pub id: String,
    /// Tracks in the stream.
    pub tracks: Vec<MediaTrack>,
}

/// A discovered Bluetooth device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BluetoothDevice {
    /// Device identifier.
    pub id: String,
    /// Advertised name, if any.
    pub name: Option<String>,
}

/// Outcome of a geolocation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeolocationResult {
    state: PermissionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<Position>,
}

impl GeolocationResult {
    /// Keeps the position only when the state is granted.
    pub(crate) fn new(state: PermissionState, position: Option<Position>) -> Self {
        Self {
            state,
            position: position.filter(|_| state == PermissionState::Granted),
        }
    }

    /// The resolved state.
    #[must_use]
    pub const fn state(&self) -> PermissionState {
        self.state
    }

    /// The fix that was acquired, when granted.
    #[must_use]
    pub const fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }
}

/// Outcome of a push request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushResult {
    state: PermissionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscription: Option<PushSubscription>,
}

impl PushResult {
    /// Keeps the subscription only when the state is granted.
    pub(crate) fn new(state: PermissionState, subscription: Option<PushSubscription>) -> Self {
        Self {
            state,
            subscription: subscription.filter(|_| state == PermissionState::Granted),
        }
    }

    /// The resolved state.
    #[must_use]
    pub const fn state(&self) -> PermissionState {
        self.state
    }

    /// The new subscription, when granted.
    #[must_use]
    pub const fn subscription(&self) -> Option<&PushSubscription> {
        self.subscription.as_ref()
    }
}

/// Outcome of a MIDI request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MidiResult {
    state: PermissionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    access: Option<MidiAccess>,
}

impl MidiResult {
    /// Keeps the access only when the state is granted.
    pub(crate) fn new(state: PermissionState, access: Option<MidiAccess>) -> Self {
        Self {
            state,
            access: access.filter(|_| state == PermissionState::Granted),
        }
    }

    /// The resolved state.
    #[must_use]
    pub const fn state(&self) -> PermissionState {
        self.state
    }

    /// The granted access, when granted.
    #[must_use]
    pub const fn access(&self) -> Option<&MidiAccess> {
        self.access.as_ref()
    }
}

/// Outcome of a camera or microphone request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaResult {
    state: PermissionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<MediaStream>,
}

impl MediaResult {
    /// Keeps the stream only when the state is granted.
    pub(crate) fn new(state: PermissionState, stream: Option<MediaStream>) -> Self {
        Self {
            state,
            stream: stream.filter(|_| state == PermissionState::Granted),
        }
    }

    /// The resolved state.
    #[must_use]
    pub const fn state(&self) -> PermissionState {
        self.state
    }

    /// The acquired stream, when granted.
    #[must_use]
    pub const fn stream(&self) -> Option<&MediaStream> {
        self.stream.as_ref()
    }
}

/// Outcome of a Bluetooth request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BluetoothResult {
    state: PermissionState,
    devices: Vec<BluetoothDevice>,
}

impl BluetoothResult {
    pub(crate) const fn new(state: PermissionState, devices: Vec<BluetoothDevice>) -> Self {
        Self { state, devices }
    }

    /// The resolved state. Selecting a device is not a standing grant, so
    /// this is `prompt` for every settled request.
    #[must_use]
    pub const fn state(&self) -> PermissionState {
        self.state
    }

    /// Devices the user picked; empty when none matched.
    #[must_use]
    pub fn devices(&self) -> &[BluetoothDevice] {
        &self.devices
    }
}

/// The outcome of a request, one variant per requestable kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum PermissionResult {
    /// Geolocation outcome.
    Geolocation(GeolocationResult),
    /// Notifications outcome.
    Notifications(PermissionStatus),
    /// Push outcome.
    Push(PushResult),
    /// MIDI outcome.
    Midi(MidiResult),
    /// Camera outcome.
    Camera(MediaResult),
    /// Microphone outcome.
    Microphone(MediaResult),
    /// Background sync outcome.
    BackgroundSync(PermissionStatus),
    /// Bluetooth outcome.
    Bluetooth(BluetoothResult),
    /// Persistent storage outcome.
    PersistentStorage(PermissionStatus),
}

impl PermissionResult {
    /// The resolved state.
    #[must_use]
    pub const fn state(&self) -> PermissionState {
        match self {
            Self::Geolocation(result) => result.state(),
            Self::Push(result) => result.state(),
            Self::Midi(result) => result.state(),
            Self::Camera(result) | Self::Microphone(result) => result.state(),
            Self::Bluetooth(result) => result.state(),
            Self::Notifications(status)
            | Self::BackgroundSync(status)
            | Self::PersistentStorage(status) => status.state,
        }
    }

    /// The kind that was requested.
    #[must_use]
    pub const fn kind(&self) -> CapabilityKind {
        match self {
            Self::Geolocation(_) => CapabilityKind::Geolocation,
            Self::Notifications(_) => CapabilityKind::Notifications,
            Self::Push(_) => CapabilityKind::Push,
            Self::Midi(_) => CapabilityKind::Midi,
            Self::Camera(_) => CapabilityKind::Camera,
            Self::Microphone(_) => CapabilityKind::Microphone,
            Self::BackgroundSync(_) => CapabilityKind::BackgroundSync,
            Self::Bluetooth(_) => CapabilityKind::Bluetooth,
            Self::PersistentStorage(_) => CapabilityKind::PersistentStorage,
        }
    }

    /// Drops any payload.
    #[must_use]
    pub const fn status(&self) -> PermissionStatus {
        PermissionStatus::new(self.state())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_with_name_and_state() {
        let result = PermissionResult::Bluetooth(BluetoothResult::new(
            PermissionState::Prompt,
            vec![BluetoothDevice {
                id: "hr-1".into(),
                name: Some("Pulse".into()),
            }],
        ));

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "name": "bluetooth",
                "state": "prompt",
                "devices": [{ "id": "hr-1", "name": "Pulse" }],
            })
        );

        let denied = PermissionResult::Camera(MediaResult::new(PermissionState::Denied, None));
        assert_eq!(
            serde_json::to_value(&denied).unwrap(),
            json!({ "name": "camera", "state": "denied" })
        );
    }

    #[test]
    fn status_keeps_only_the_state() {
        let stream = MediaStream {
            id: "s-1".into(),
            tracks: Vec::new(),
        };
        let granted = MediaResult::new(PermissionState::Granted, Some(stream));
        let result = PermissionResult::Microphone(granted);

        assert_eq!(result.kind(), CapabilityKind::Microphone);
        assert_eq!(result.status(), PermissionState::Granted.into());

        let value = serde_json::to_value(result.status()).unwrap();
        assert_eq!(value, json!({ "state": "granted" }));
    }

    #[test]
    fn geolocation_drops_position_unless_granted() {
        let position = Position {
            coords: Coordinates {
                latitude: 52.52,
                longitude: 13.405,
                accuracy: 12.0,
                altitude: None,
                altitude_accuracy: None,
                heading: None,
                speed: None,
            },
            timestamp: 1_700_000_000_000,
        };

        let granted = GeolocationResult::new(PermissionState::Granted, Some(position));
        assert_eq!(granted.position(), Some(&position));

        let prompt = GeolocationResult::new(PermissionState::Prompt, Some(position));
        assert_eq!(prompt.position(), None);
    }
}
