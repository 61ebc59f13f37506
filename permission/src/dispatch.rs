//! Routing descriptors to platform primitives and normalizing the outcome.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{self, BoxFuture, FutureExt};
use log::{debug, warn};
use serde_json::Value;

use crate::descriptor::require_registration;
use crate::platform::{
    Callback, MediaStreamConstraints, MidiOptions, Platform, PositionOptions,
    PushSubscriptionOptions, RequestDeviceOptions, StatusQuery,
};
use crate::policy::{self, Policy, Resolution};
use crate::{
    BackgroundSyncDescriptor, BluetoothDescriptor, BluetoothResult, CapabilityKind,
    GeolocationDescriptor, GeolocationResult, MediaDescriptor, MediaKind, MediaResult,
    MidiDescriptor, MidiResult, PermissionError, PermissionResult, PermissionState,
    PermissionStatus, Permissions, PlatformError, PushDescriptor, PushResult, RequestDescriptor,
};

/// A request that has passed validation and will settle exactly once.
#[must_use = "a pending request does nothing unless awaited"]
pub struct PendingRequest {
    inner: BoxFuture<'static, Result<PermissionResult, PermissionError>>,
}

impl PendingRequest {
    /// Wraps a future that settles the request.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<PermissionResult, PermissionError>> + Send + 'static,
    {
        Self {
            inner: future.boxed(),
        }
    }

    /// A request that rejects with `error` when awaited.
    pub fn rejected(error: PermissionError) -> Self {
        Self::new(future::ready(Err(error)))
    }
}

impl Future for PendingRequest {
    type Output = Result<PermissionResult, PermissionError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest").finish_non_exhaustive()
    }
}

/// The `request` capability of a permission registry.
pub trait RequestPermission: Send + Sync {
    /// Starts a request.
    ///
    /// # Errors
    /// Fails synchronously, before any platform primitive runs, when the
    /// descriptor is invalid. Every other failure rejects the returned
    /// [`PendingRequest`].
    fn request(&self, descriptor: RequestDescriptor) -> Result<PendingRequest, PermissionError>;

    /// Starts a request from an untyped descriptor.
    ///
    /// An unknown permission name rejects the returned request; other
    /// parse failures are returned synchronously.
    ///
    /// # Errors
    /// See [`RequestDescriptor::from_value`] and [`Self::request`].
    fn request_value(&self, value: Value) -> Result<PendingRequest, PermissionError> {
        match RequestDescriptor::from_value(value) {
            Ok(descriptor) => self.request(descriptor),
            Err(err @ PermissionError::UnrecognizedKind(_)) => Ok(PendingRequest::rejected(err)),
            Err(err) => Err(err),
        }
    }
}

#[derive(Clone)]
enum QuerySource {
    Absent,
    Fixed(Arc<dyn StatusQuery>),
    Registry(Weak<Permissions>),
}

impl QuerySource {
    fn current(&self) -> Option<Arc<dyn StatusQuery>> {
        match self {
            Self::Absent => None,
            Self::Fixed(query) => Some(query.clone()),
            Self::Registry(registry) => registry.upgrade()?.query_capability(),
        }
    }
}

enum Settled<T> {
    Succeeded(PermissionState, T),
    Declined(PermissionState),
}

/// Request dispatcher over a [`Platform`].
#[derive(Clone)]
pub struct Dispatcher {
    platform: Arc<Platform>,
    query: QuerySource,
}

impl Dispatcher {
    /// Creates a dispatcher with no status query; fallbacks use each
    /// kind's default state.
    pub fn new(platform: impl Into<Arc<Platform>>) -> Self {
        Self {
            platform: platform.into(),
            query: QuerySource::Absent,
        }
    }

    /// Uses `query` for status fallbacks.
    #[must_use]
    pub fn with_status_query(mut self, query: Arc<dyn StatusQuery>) -> Self {
        self.query = QuerySource::Fixed(query);
        self
    }

    /// Looks the status query up on `registry` for every fallback.
    pub(crate) fn with_registry(mut self, registry: Weak<Permissions>) -> Self {
        self.query = QuerySource::Registry(registry);
        self
    }

    /// The platform requests are dispatched to.
    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    async fn dispatch(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<PermissionResult, PermissionError> {
        match descriptor {
            RequestDescriptor::Geolocation(hints) => self
                .geolocation(*hints, descriptor)
                .await
                .map(PermissionResult::Geolocation),
            RequestDescriptor::Notifications => self
                .notifications()
                .await
                .map(PermissionResult::Notifications),
            RequestDescriptor::Push(push) => self
                .push(push, descriptor)
                .await
                .map(PermissionResult::Push),
            RequestDescriptor::Midi(midi) => self
                .midi(*midi, descriptor)
                .await
                .map(PermissionResult::Midi),
            RequestDescriptor::Camera(media) => self
                .media(MediaKind::Video, media, descriptor)
                .await
                .map(PermissionResult::Camera),
            RequestDescriptor::Microphone(media) => self
                .media(MediaKind::Audio, media, descriptor)
                .await
                .map(PermissionResult::Microphone),
            RequestDescriptor::Speaker | RequestDescriptor::DeviceInfo => {
                Err(PermissionError::NotRequestable(descriptor.kind()))
            }
            RequestDescriptor::BackgroundSync(sync) => self
                .background_sync(sync, descriptor)
                .await
                .map(PermissionResult::BackgroundSync),
            RequestDescriptor::Bluetooth(bluetooth) => self
                .bluetooth(bluetooth, descriptor)
                .await
                .map(PermissionResult::Bluetooth),
            RequestDescriptor::PersistentStorage => self
                .persistent_storage()
                .await
                .map(PermissionResult::PersistentStorage),
        }
    }

    async fn settle<T>(
        &self,
        policy: Policy,
        descriptor: &RequestDescriptor,
        outcome: Result<T, PlatformError>,
    ) -> Result<Settled<T>, PermissionError> {
        match outcome {
            Ok(value) => {
                let state = self.resolve(policy.on_success, descriptor).await?;
                Ok(Settled::Succeeded(state, value))
            }
            Err(error) if policy.decline.matches(&error) => {
                debug!("{} request declined: {error}", descriptor.kind());
                let state = self.resolve(policy.on_decline, descriptor).await?;
                Ok(Settled::Declined(state))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn resolve(
        &self,
        resolution: Resolution,
        descriptor: &RequestDescriptor,
    ) -> Result<PermissionState, PermissionError> {
        match resolution {
            Resolution::Report(state) => Ok(state),
            Resolution::Query { default } => {
                let Some(query) = self.query.current() else {
                    let kind = descriptor.kind();
                    debug!("no status query for {kind}, assuming {default}");
                    return Ok(default);
                };
                let status = query.query(descriptor).await?;
                Ok(status.state)
            }
        }
    }

    async fn geolocation(
        &self,
        hints: GeolocationDescriptor,
        descriptor: &RequestDescriptor,
    ) -> Result<GeolocationResult, PermissionError> {
        let geolocation = self
            .platform
            .geolocation()
            .ok_or(PermissionError::Unsupported(CapabilityKind::Geolocation))?;
        let options = PositionOptions {
            enable_high_accuracy: hints.enable_high_accuracy,
            timeout: hints.timeout,
            maximum_age: hints.maximum_age,
        };

        let outcome = bridge(CapabilityKind::Geolocation, |callback| {
            geolocation.get_current_position(options, callback);
        })
        .await?;

        Ok(match self.settle(policy::GEOLOCATION, descriptor, outcome).await? {
            Settled::Succeeded(state, position) => GeolocationResult::new(state, Some(position)),
            Settled::Declined(state) => GeolocationResult::new(state, None),
        })
    }

    async fn notifications(&self) -> Result<PermissionStatus, PermissionError> {
        let notifications = self
            .platform
            .notifications()
            .ok_or(PermissionError::Unsupported(CapabilityKind::Notifications))?;

        let value = notifications.request_permission().await?;
        policy::notification_state(&value)
            .map(PermissionStatus::new)
            .ok_or(PermissionError::UnexpectedNotificationState(value))
    }

    async fn push(
        &self,
        push: &PushDescriptor,
        descriptor: &RequestDescriptor,
    ) -> Result<PushResult, PermissionError> {
        let registration = require_registration(push.registration.as_ref(), CapabilityKind::Push)?;
        let options = PushSubscriptionOptions {
            user_visible_only: push.user_visible_only,
            application_server_key: push.application_server_key.clone(),
        };

        let outcome = registration.subscribe(options).await;
        Ok(match self.settle(policy::PUSH, descriptor, outcome).await? {
            Settled::Succeeded(state, subscription) => PushResult::new(state, Some(subscription)),
            Settled::Declined(state) => PushResult::new(state, None),
        })
    }

    async fn midi(
        &self,
        midi: MidiDescriptor,
        descriptor: &RequestDescriptor,
    ) -> Result<MidiResult, PermissionError> {
        let access = self
            .platform
            .midi()
            .ok_or(PermissionError::Unsupported(CapabilityKind::Midi))?;
        let options = MidiOptions {
            sysex: midi.sysex,
            software: midi.software,
        };

        let outcome = access.request_midi_access(options).await;
        Ok(match self.settle(policy::MIDI, descriptor, outcome).await? {
            Settled::Succeeded(state, access) => MidiResult::new(state, Some(access)),
            Settled::Declined(state) => MidiResult::new(state, None),
        })
    }

    async fn media(
        &self,
        media_kind: MediaKind,
        media: &MediaDescriptor,
        descriptor: &RequestDescriptor,
    ) -> Result<MediaResult, PermissionError> {
        let kind = descriptor.kind();
        let devices = self
            .platform
            .media_devices()
            .ok_or(PermissionError::Unsupported(kind))?;

        let track = media
            .constraints
            .clone()
            .filter(|constraints| !is_falsy(constraints))
            .unwrap_or(Value::Bool(true));
        let track = Some(track);
        let (audio, video) = match media_kind {
            MediaKind::Audio => (track, None),
            MediaKind::Video => (None, track),
        };
        let constraints = MediaStreamConstraints {
            audio,
            video,
            peer_identity: media.peer_identity.clone(),
        };

        let outcome = bridge(kind, |callback| {
            devices.get_user_media(constraints, callback);
        })
        .await?;
        Ok(match self.settle(policy::MEDIA, descriptor, outcome).await? {
            Settled::Succeeded(state, stream) => MediaResult::new(state, Some(stream)),
            Settled::Declined(state) => MediaResult::new(state, None),
        })
    }

    async fn background_sync(
        &self,
        sync: &BackgroundSyncDescriptor,
        descriptor: &RequestDescriptor,
    ) -> Result<PermissionStatus, PermissionError> {
        let registration =
            require_registration(sync.registration.as_ref(), CapabilityKind::BackgroundSync)?;

        let outcome = registration.register_sync(sync.tag.clone()).await;
        let settled = self
            .settle(policy::BACKGROUND_SYNC, descriptor, outcome)
            .await?;
        let state = match settled {
            Settled::Succeeded(state, ()) | Settled::Declined(state) => state,
        };
        Ok(PermissionStatus::new(state))
    }

    async fn bluetooth(
        &self,
        bluetooth: &BluetoothDescriptor,
        descriptor: &RequestDescriptor,
    ) -> Result<BluetoothResult, PermissionError> {
        let scanner = self
            .platform
            .bluetooth()
            .ok_or(PermissionError::Unsupported(CapabilityKind::Bluetooth))?;
        let options = RequestDeviceOptions {
            device_id: bluetooth.device_id.clone(),
            filters: bluetooth.filters.clone(),
            optional_services: bluetooth.optional_services.clone(),
        };

        let outcome = scanner.request_device(options).await;
        Ok(match self.settle(policy::BLUETOOTH, descriptor, outcome).await? {
            Settled::Succeeded(state, device) => BluetoothResult::new(state, vec![device]),
            Settled::Declined(state) => BluetoothResult::new(state, Vec::new()),
        })
    }

    async fn persistent_storage(&self) -> Result<PermissionStatus, PermissionError> {
        let kind = CapabilityKind::PersistentStorage;
        let storage = self
            .platform
            .storage()
            .ok_or(PermissionError::Unsupported(kind))?;

        let persisted = storage.persist().await?;
        Ok(PermissionStatus::new(policy::persisted_state(persisted)))
    }
}

impl RequestPermission for Dispatcher {
    fn request(&self, descriptor: RequestDescriptor) -> Result<PendingRequest, PermissionError> {
        descriptor.validate()?;
        debug!("requesting {} permission", descriptor.kind());

        let dispatcher = self.clone();
        let pending = async move { dispatcher.dispatch(&descriptor).await };
        Ok(PendingRequest::new(pending))
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query = match self.query {
            QuerySource::Absent => "absent",
            QuerySource::Fixed(_) => "fixed",
            QuerySource::Registry(_) => "registry",
        };
        f.debug_struct("Dispatcher")
            .field("platform", &self.platform)
            .field("query", &query)
            .finish()
    }
}

/// Adapts a callback-style primitive to a future. The sender moves into a
/// `FnOnce`, so the primitive can settle at most once.
fn bridge<T, F>(
    kind: CapabilityKind,
    start: F,
) -> impl Future<Output = Result<Result<T, PlatformError>, PermissionError>>
where
    T: Send + 'static,
    F: FnOnce(Callback<T>),
{
    let (sender, receiver) = oneshot::channel();
    let callback: Callback<T> = Box::new(move |outcome| {
        if sender.send(outcome).is_err() {
            warn!("{kind} request settled after its caller went away");
        }
    });
    start(callback);

    let abandoned = move |_: oneshot::Canceled| PermissionError::Abandoned(kind);
    receiver.map(move |outcome| outcome.map_err(abandoned))
}

/// Whether a constraint value would read as "not requested". Such values
/// request the track with default settings instead.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
