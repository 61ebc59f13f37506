//! Normalized permission requests.
//!
//! This crate takes a typed [`RequestDescriptor`] for one of eleven
//! capability kinds, invokes the platform primitive that both requests and
//! exercises that capability, and reduces whatever it reports to
//! `granted`, `denied` or `prompt`.
//!
//! The primitives themselves are supplied by the host through
//! [`Platform`]. The dispatcher is installed onto a host
//! [`Environment`] with [`install`], which never replaces a native
//! implementation.
//!
//! ```ignore
//! use permshim_permission::{polyfill, environment, RequestDescriptor, MidiDescriptor};
//!
//! polyfill(host_platform());
//! let permissions = environment().and_then(|env| env.permissions()).unwrap();
//! let result = permissions
//!     .request(MidiDescriptor { sysex: true, software: false }.into())?
//!     .await?;
//! println!("midi: {}", result.state());
//! ```

#![warn(missing_docs)]

mod descriptor;
mod dispatch;
mod error;
pub mod platform;
mod policy;
mod registry;
mod result;

pub use descriptor::{
    BackgroundSyncDescriptor, BluetoothDescriptor, BluetoothFilter, CapabilityKind,
    GeolocationDescriptor, MediaDescriptor, MidiDescriptor, PushDescriptor, Registration,
    RequestDescriptor,
};
pub use dispatch::{Dispatcher, PendingRequest, RequestPermission};
pub use error::{PermissionError, PlatformError, PositionErrorCode};
pub use platform::Platform;
pub use registry::{
    Environment, InstallOutcome, Permissions, attach, environment, install, polyfill,
};
pub use result::{
    BluetoothDevice, BluetoothResult, Coordinates, GeolocationResult, MediaKind, MediaResult,
    MediaStream, MediaTrack, MidiAccess, MidiPort, MidiResult, PermissionResult, PermissionState,
    PermissionStatus, Position, PushResult, PushSubscription,
};
