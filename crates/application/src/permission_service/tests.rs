use rolegate_core::AppError;
use rolegate_domain::{Capability, Role};

use crate::role_policy::TransitionDenial;
use crate::test_support::{FakeDirectory, record, shared, user_id};

use super::{PermissionCheck, PermissionDenial, PermissionService, access_denied_message};

fn service(directory: FakeDirectory) -> PermissionService {
    PermissionService::new(shared(directory))
}

fn populated() -> PermissionService {
    let mut retired = record("retired", Role::Admin, 30);
    retired.is_active = false;
    service(FakeDirectory::with_users([
        record("cus", Role::Customer, 20),
        record("ven", Role::Vendor, 15),
        record("adm", Role::Admin, 10),
        retired,
    ]))
}

#[tokio::test]
async fn permissions_follow_stored_role() {
    let service = populated();

    let vendor_creates = service
        .has_permission(&user_id("ven"), Capability::CreateProducts)
        .await
        .unwrap_or_else(|error| panic!("check failed: {error}"));
    let customer_creates = service
        .has_permission(&user_id("cus"), Capability::CreateProducts)
        .await
        .unwrap_or_else(|error| panic!("check failed: {error}"));

    assert!(vendor_creates);
    assert!(!customer_creates);
}

#[tokio::test]
async fn unknown_and_deactivated_users_are_denied() {
    let service = populated();

    for id in ["ghost", "retired"] {
        let user = user_id(id);
        assert!(
            !service
                .has_permission(&user, Capability::ViewAdminPanel)
                .await
                .unwrap_or_else(|error| panic!("check failed: {error}"))
        );
        assert!(
            !service
                .has_any_role(&user, &[Role::Admin])
                .await
                .unwrap_or_else(|error| panic!("check failed: {error}"))
        );
        assert!(
            !service
                .can_access_route(&user, "Home")
                .await
                .unwrap_or_else(|error| panic!("check failed: {error}"))
        );
    }
}

#[tokio::test]
async fn role_membership_and_routes() {
    let service = populated();
    let customer = user_id("cus");

    assert!(
        service
            .has_any_role(&customer, &[Role::Customer, Role::Vendor])
            .await
            .unwrap_or_else(|error| panic!("check failed: {error}"))
    );
    assert!(
        !service
            .has_any_role(&customer, &[])
            .await
            .unwrap_or_else(|error| panic!("check failed: {error}"))
    );
    assert!(
        !service
            .can_access_route(&customer, "VendorDashboard")
            .await
            .unwrap_or_else(|error| panic!("check failed: {error}"))
    );
    assert!(
        service
            .can_access_route(&user_id("ven"), "VendorDashboard")
            .await
            .unwrap_or_else(|error| panic!("check failed: {error}"))
    );
}

#[tokio::test]
async fn api_access_reports_role_before_permission() {
    let service = populated();

    let decision = service
        .validate_api_access(
            &user_id("cus"),
            Some([Role::Vendor, Role::Admin].as_slice()),
            Some(Capability::CreateProducts),
        )
        .await
        .unwrap_or_else(|error| panic!("check failed: {error}"));

    assert_eq!(
        decision,
        PermissionCheck::Denied(PermissionDenial::RoleNotAllowed {
            required: vec![Role::Vendor, Role::Admin],
            current: Role::Customer,
        })
    );
    assert_eq!(
        decision
            .reason()
            .map(ToString::to_string)
            .unwrap_or_default(),
        "Required role: vendor or admin, but user has: customer"
    );
}

#[tokio::test]
async fn api_access_reports_missing_permission() {
    let service = populated();

    let decision = service
        .validate_api_access(&user_id("ven"), None, Some(Capability::ModifyUserRoles))
        .await
        .unwrap_or_else(|error| panic!("check failed: {error}"));

    assert!(matches!(
        decision.reason(),
        Some(PermissionDenial::PermissionMissing {
            capability: Capability::ModifyUserRoles,
            current: Role::Vendor,
        })
    ));
    assert_eq!(
        decision
            .reason()
            .map(ToString::to_string)
            .unwrap_or_default(),
        "Permission 'canModifyUserRoles' required but not granted to vendor"
    );
}

#[tokio::test]
async fn api_access_allows_matching_user_and_denies_unknown() {
    let service = populated();

    let allowed = service
        .validate_api_access(
            &user_id("adm"),
            Some([Role::Admin].as_slice()),
            Some(Capability::ModifyUserRoles),
        )
        .await
        .unwrap_or_else(|error| panic!("check failed: {error}"));
    let unknown = service
        .validate_api_access(&user_id("ghost"), None, None)
        .await
        .unwrap_or_else(|error| panic!("check failed: {error}"));

    assert!(allowed.is_allowed());
    assert!(allowed.reason().is_none());
    assert_eq!(
        unknown,
        PermissionCheck::Denied(PermissionDenial::UserNotFound(user_id("ghost")))
    );
}

#[tokio::test]
async fn role_change_preview_applies_transition_rules() {
    let service = populated();

    let admin_promotes = service
        .can_change_role(&user_id("adm"), &user_id("cus"), Role::Admin)
        .await
        .unwrap_or_else(|error| panic!("check failed: {error}"));
    let vendor_promotes = service
        .can_change_role(&user_id("ven"), &user_id("cus"), Role::Vendor)
        .await
        .unwrap_or_else(|error| panic!("check failed: {error}"));
    let missing_target = service
        .can_change_role(&user_id("adm"), &user_id("ghost"), Role::Vendor)
        .await
        .unwrap_or_else(|error| panic!("check failed: {error}"));
    let retired_requestor = service
        .can_change_role(&user_id("retired"), &user_id("cus"), Role::Vendor)
        .await
        .unwrap_or_else(|error| panic!("check failed: {error}"));

    assert!(admin_promotes.is_allowed());
    assert_eq!(
        vendor_promotes,
        PermissionCheck::Denied(PermissionDenial::Transition(
            TransitionDenial::RoleModificationNotGranted {
                acting_role: Role::Vendor,
            }
        ))
    );
    assert_eq!(
        missing_target,
        PermissionCheck::Denied(PermissionDenial::UserNotFound(user_id("ghost")))
    );
    assert_eq!(
        retired_requestor,
        PermissionCheck::Denied(PermissionDenial::AccountDeactivated(user_id("retired")))
    );
}

#[tokio::test]
async fn role_change_preview_writes_nothing() {
    let directory = shared(FakeDirectory::with_users([
        record("adm", Role::Admin, 10),
        record("cus", Role::Customer, 5),
    ]));
    let service = PermissionService::new(directory.clone());

    let preview = service
        .can_change_role(&user_id("adm"), &user_id("cus"), Role::Vendor)
        .await
        .unwrap_or_else(|error| panic!("check failed: {error}"));

    assert!(preview.is_allowed());
    assert!(directory.role_updates.lock().await.is_empty());
    assert!(matches!(directory.user("cus").await, Some(stored) if stored.role == Role::Customer));
}

#[tokio::test]
async fn directory_failure_propagates() {
    let service = service(FakeDirectory {
        fail_reads: true,
        ..FakeDirectory::default()
    });

    let result = service
        .validate_api_access(&user_id("cus"), None, None)
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[test]
fn denied_message_names_roles_then_permission() {
    assert_eq!(
        access_denied_message(
            Some(Role::Customer),
            Some([Role::Vendor, Role::Admin].as_slice()),
            Some(Capability::CreateProducts),
        ),
        "Access denied. Required role: vendor or admin, current role: customer"
    );
    assert_eq!(
        access_denied_message(Some(Role::Vendor), None, Some(Capability::ViewAdminPanel)),
        "Access denied. Permission 'canViewAdminPanel' required"
    );
    assert_eq!(
        access_denied_message(Some(Role::Vendor), None, None),
        "Access denied. Insufficient permissions"
    );
    assert_eq!(
        access_denied_message(None, Some([Role::Admin].as_slice()), None),
        "Authentication required"
    );
}
