//! The process-wide permission registry and the installer that fills it.

use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use log::{debug, info};

use crate::dispatch::{Dispatcher, PendingRequest, RequestPermission};
use crate::platform::{Platform, StatusQuery};
use crate::{PermissionError, PermissionStatus, RequestDescriptor};

/// A permission registry exposing optional `query` and `request`
/// capabilities.
#[derive(Default)]
pub struct Permissions {
    query: RwLock<Option<Arc<dyn StatusQuery>>>,
    request: RwLock<Option<Arc<dyn RequestPermission>>>,
}

impl Permissions {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a native status query.
    ///
    /// # Panics
    /// Panics if the query slot lock is poisoned.
    #[must_use]
    pub fn with_query(mut self, query: Arc<dyn StatusQuery>) -> Self {
        *self.query.get_mut().expect("query slot poisoned") = Some(query);
        self
    }

    /// Sets a native request capability. [`install`] leaves it in place.
    ///
    /// # Panics
    /// Panics if the request slot lock is poisoned.
    #[must_use]
    pub fn with_request(mut self, request: Arc<dyn RequestPermission>) -> Self {
        *self.request.get_mut().expect("request slot poisoned") = Some(request);
        self
    }

    /// Whether a status query is present.
    ///
    /// # Panics
    /// Panics if the query slot lock is poisoned.
    #[must_use]
    pub fn has_query(&self) -> bool {
        self.query.read().expect("query slot poisoned").is_some()
    }

    /// Whether a request capability is present.
    ///
    /// # Panics
    /// Panics if the request slot lock is poisoned.
    #[must_use]
    pub fn has_request(&self) -> bool {
        self.request
            .read()
            .expect("request slot poisoned")
            .is_some()
    }

    /// The status query, if any.
    ///
    /// # Panics
    /// Panics if the query slot lock is poisoned.
    #[must_use]
    pub fn query_capability(&self) -> Option<Arc<dyn StatusQuery>> {
        self.query.read().expect("query slot poisoned").clone()
    }

    /// The request capability, if any.
    ///
    /// # Panics
    /// Panics if the request slot lock is poisoned.
    #[must_use]
    pub fn request_capability(&self) -> Option<Arc<dyn RequestPermission>> {
        self.request.read().expect("request slot poisoned").clone()
    }

    /// Queries the current state of `descriptor`.
    ///
    /// # Errors
    /// Returns [`PermissionError::MissingCapability`] without a status
    /// query, or the query's own failure.
    pub async fn query(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<PermissionStatus, PermissionError> {
        let query = self
            .query_capability()
            .ok_or(PermissionError::MissingCapability("query"))?;
        Ok(query.query(descriptor).await?)
    }

    /// Starts a request through the installed request capability.
    ///
    /// # Errors
    /// Returns [`PermissionError::MissingCapability`] when nothing is
    /// installed, otherwise see [`RequestPermission::request`].
    pub fn request(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<PendingRequest, PermissionError> {
        self.request_capability()
            .ok_or(PermissionError::MissingCapability("request"))?
            .request(descriptor)
    }

    /// Check-and-set of the request slot under one write lock.
    fn install_request_with(
        &self,
        make: impl FnOnce() -> Arc<dyn RequestPermission>,
    ) -> InstallOutcome {
        let mut slot = self.request.write().expect("request slot poisoned");
        if slot.is_some() {
            return InstallOutcome::AlreadyPresent;
        }
        *slot = Some(make());
        InstallOutcome::Installed
    }
}

impl fmt::Debug for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permissions")
            .field("query", &self.has_query())
            .field("request", &self.has_request())
            .finish()
    }
}

/// A host environment: its platform primitives and, once created, its
/// permission registry.
#[derive(Debug)]
pub struct Environment {
    platform: Arc<Platform>,
    permissions: OnceLock<Arc<Permissions>>,
}

impl Environment {
    /// An environment with no registry yet.
    pub fn new(platform: impl Into<Arc<Platform>>) -> Self {
        Self {
            platform: platform.into(),
            permissions: OnceLock::new(),
        }
    }

    /// An environment whose host already provides a registry.
    pub fn with_permissions(platform: impl Into<Arc<Platform>>, permissions: Permissions) -> Self {
        Self {
            platform: platform.into(),
            permissions: OnceLock::from(Arc::new(permissions)),
        }
    }

    /// The platform primitives.
    #[must_use]
    pub fn platform(&self) -> &Arc<Platform> {
        &self.platform
    }

    /// The registry, if one exists.
    #[must_use]
    pub fn permissions(&self) -> Option<&Arc<Permissions>> {
        self.permissions.get()
    }
}

/// What [`install`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallOutcome {
    /// The dispatcher is now the registry's request capability.
    Installed,
    /// A request capability already existed and was left alone.
    AlreadyPresent,
}

/// Installs a [`Dispatcher`] as the request capability of `environment`.
///
/// Creates an empty registry if the environment has none, and never
/// replaces an existing request capability. Calling it again has no
/// further effect.
pub fn install(environment: &Environment) -> InstallOutcome {
    let permissions = environment.permissions.get_or_init(|| {
        debug!("creating empty permission registry");
        Arc::new(Permissions::new())
    });

    let outcome = permissions.install_request_with(|| {
        let dispatcher = Dispatcher::new(environment.platform.clone())
            .with_registry(Arc::downgrade(permissions));
        Arc::new(dispatcher)
    });

    match outcome {
        InstallOutcome::Installed => info!("installed permission request dispatcher"),
        InstallOutcome::AlreadyPresent => {
            debug!("permission registry already has a request capability");
        }
    }
    outcome
}

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/// Attaches the process environment. The first call wins; later calls
/// return the existing environment and drop `platform`.
pub fn attach(platform: Platform) -> &'static Environment {
    ENVIRONMENT.get_or_init(|| Environment::new(platform))
}

/// The process environment, if attached.
#[must_use]
pub fn environment() -> Option<&'static Environment> {
    ENVIRONMENT.get()
}

/// Attaches the process environment and installs the dispatcher on it.
pub fn polyfill(platform: Platform) -> InstallOutcome {
    install(attach(platform))
}
