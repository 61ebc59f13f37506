mod common;

use std::sync::Arc;

use common::{FakeGeolocation, FakeStorage, FixedQuery};
use permshim_permission::{
    Environment, GeolocationDescriptor, InstallOutcome, PendingRequest, PermissionError,
    PermissionResult, PermissionState, PermissionStatus, Permissions, Platform, PlatformError,
    PositionErrorCode, RequestDescriptor, RequestPermission, install,
};

/// Stands in for a host that already implements requests natively.
struct NativeRequest;

impl RequestPermission for NativeRequest {
    fn request(&self, _descriptor: RequestDescriptor) -> Result<PendingRequest, PermissionError> {
        let granted = PermissionStatus::new(PermissionState::Granted);
        let result = PermissionResult::Notifications(granted);
        Ok(PendingRequest::new(async move { Ok(result) }))
    }
}

fn storage_platform() -> Platform {
    Platform::new().with_storage(FakeStorage::new(Ok(false)))
}

#[test]
fn install_creates_registry_once() {
    let environment = Environment::new(storage_platform());
    assert!(environment.permissions().is_none());

    assert_eq!(install(&environment), InstallOutcome::Installed);
    let first = environment.permissions().unwrap().clone();
    assert!(first.has_request());
    assert!(!first.has_query());
    let dispatcher = first.request_capability().unwrap();

    assert_eq!(install(&environment), InstallOutcome::AlreadyPresent);
    let second = environment.permissions().unwrap();
    assert!(Arc::ptr_eq(&first, second));
    assert!(Arc::ptr_eq(&dispatcher, &second.request_capability().unwrap()));
}

#[tokio::test]
async fn installed_dispatcher_serves_requests() {
    let environment = Environment::new(storage_platform());
    let platform = format!("{:?}", environment.platform());
    assert!(platform.contains("storage: true"));
    install(&environment);

    let permissions = environment.permissions().unwrap();
    let result = permissions
        .request(RequestDescriptor::PersistentStorage)
        .unwrap()
        .await
        .unwrap();
    assert_eq!(result.state(), PermissionState::Denied);
}

#[tokio::test]
async fn native_request_is_never_replaced() {
    let native: Arc<dyn RequestPermission> = Arc::new(NativeRequest);
    let environment = Environment::with_permissions(
        storage_platform(),
        Permissions::new().with_request(native.clone()),
    );

    assert_eq!(install(&environment), InstallOutcome::AlreadyPresent);
    assert_eq!(install(&environment), InstallOutcome::AlreadyPresent);

    let permissions = environment.permissions().unwrap();
    assert!(Arc::ptr_eq(&native, &permissions.request_capability().unwrap()));

    // The native capability answers, not the storage primitive.
    let result = permissions
        .request(RequestDescriptor::PersistentStorage)
        .unwrap()
        .await
        .unwrap();
    assert_eq!(result.state(), PermissionState::Granted);
}

#[tokio::test]
async fn installed_dispatcher_uses_native_query() {
    let query = FixedQuery::new(PermissionState::Denied);
    let timeout = PlatformError::Position {
        code: PositionErrorCode::Timeout,
        message: "timed out".into(),
    };
    let geolocation = FakeGeolocation::new(Err(timeout));
    let platform = Platform::new().with_geolocation(geolocation.clone());
    let permissions = Permissions::new().with_query(query.clone());
    let environment = Environment::with_permissions(platform, permissions);

    assert_eq!(install(&environment), InstallOutcome::Installed);
    let permissions = environment.permissions().unwrap();
    assert!(permissions.has_query());

    let result = permissions
        .request(GeolocationDescriptor::default().into())
        .unwrap()
        .await
        .unwrap();
    assert_eq!(result.state(), PermissionState::Denied);
    assert_eq!(geolocation.calls.count(), 1);
    assert_eq!(query.calls.count(), 1);

    let status = permissions
        .query(&RequestDescriptor::Notifications)
        .await
        .unwrap();
    assert_eq!(status.state, PermissionState::Denied);
}

#[tokio::test]
async fn empty_registry_reports_missing_capabilities() {
    let permissions = Permissions::new();

    let err = permissions
        .request(RequestDescriptor::Notifications)
        .unwrap_err();
    assert_eq!(err, PermissionError::MissingCapability("request"));

    let err = permissions
        .query(&RequestDescriptor::Notifications)
        .await
        .unwrap_err();
    assert_eq!(err, PermissionError::MissingCapability("query"));
}

#[test]
fn concurrent_installs_settle_on_one_dispatcher() {
    let environment = Arc::new(Environment::new(storage_platform()));

    let outcomes: Vec<InstallOutcome> = (0..8)
        .map(|_| {
            let environment = environment.clone();
            std::thread::spawn(move || install(&environment))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let installed = outcomes
        .iter()
        .filter(|outcome| **outcome == InstallOutcome::Installed)
        .count();
    assert_eq!(installed, 1);
}
