//! # permshim
//!
//! A compatibility layer that gives every host the same permission request
//! surface, whatever it natively offers.
//!
//! Hosts describe their platform primitives (position acquisition,
//! notification prompts, media capture, Bluetooth scanning, ...) and
//! permshim dispatches typed requests to them, reducing each outcome to
//! `granted`, `denied` or `prompt`.
//!
//! ## Features
//!
//! - `permission` (default): descriptors, the request dispatcher and the
//!   registry installer.
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! permshim = { version = "0.1", features = ["permission"] }
//! ```
//!
//! ```rust,ignore
//! use permshim::permission::{Dispatcher, RequestDescriptor, RequestPermission};
//!
//! async fn ask(platform: permshim::permission::Platform) {
//!     let dispatcher = Dispatcher::new(platform);
//!     if let Ok(pending) = dispatcher.request(RequestDescriptor::PersistentStorage) {
//!         if let Ok(result) = pending.await {
//!             println!("persistent storage: {}", result.state());
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "permission")]
pub use permshim_permission as permission;
