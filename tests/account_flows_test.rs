//! End-to-end use-case flows: real service, in-memory store, real Argon2
//! hashing, built-in risk rules. Only the audit sink is stubbed.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use account_core::domain::Argon2Hasher;
use account_core::errors::AppError;
use account_core::infra::{MemoryAccountStore, MockAuditSink, StaticRiskRules};
use account_core::services::{
    AccountManager, AccountService, ChangePassword, RegisterAccount, UpdateProfile,
};

fn registration(username: &str, email: &str, phone: &str) -> RegisterAccount {
    RegisterAccount {
        username: username.to_string(),
        full_name: "Jane Doe".to_string(),
        email: email.to_string(),
        phone_number: phone.to_string(),
        password: "Str0ngEnough!Pass".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
        terms_version: "v2".to_string(),
        marketing_consent: false,
    }
}

fn service_with_store() -> (AccountManager, Arc<MemoryAccountStore>) {
    let store = Arc::new(MemoryAccountStore::new());
    let mut audit = MockAuditSink::new();
    audit.expect_record().returning(|_, _, _, _| Ok(()));

    let service = AccountManager::new(
        store.clone(),
        Arc::new(Argon2Hasher),
        Arc::new(audit),
        Arc::new(StaticRiskRules),
    );
    (service, store)
}

#[tokio::test]
async fn register_then_authenticate_and_rotate_password() {
    let (service, _) = service_with_store();

    let id = service
        .register(
            registration("jdoe", "jdoe@example.com", "+12025550123"),
            "203.0.113.9",
        )
        .await
        .unwrap();

    // Wrong current password is an auth failure, not a validation one
    let err = service
        .change_password(
            id,
            ChangePassword {
                current_password: "WrongPass123!".to_string(),
                new_password: "NextStrong1!Pass".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));

    service
        .change_password(
            id,
            ChangePassword {
                current_password: "Str0ngEnough!Pass".to_string(),
                new_password: "NextStrong1!Pass".to_string(),
            },
        )
        .await
        .unwrap();

    // The rotated password is the one that verifies now
    service
        .change_password(
            id,
            ChangePassword {
                current_password: "NextStrong1!Pass".to_string(),
                new_password: "YetAn0ther!Pass".to_string(),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn duplicate_identities_are_rejected_in_order() {
    let (service, _) = service_with_store();
    service
        .register(
            registration("jdoe", "jdoe@example.com", "+12025550123"),
            "203.0.113.9",
        )
        .await
        .unwrap();

    // Same email, different casing: collides via normalization
    let err = service
        .register(
            registration("newname", "JDoe@example.com", "+12025550124"),
            "203.0.113.9",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Duplicate(f) if f == "Email"));

    // Same username, different casing
    let err = service
        .register(
            registration("JDOE", "other@example.com", "+12025550125"),
            "203.0.113.9",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Duplicate(f) if f == "Username"));

    // Same phone
    let err = service
        .register(
            registration("fresh", "fresh@example.com", "+12025550123"),
            "203.0.113.9",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Duplicate(f) if f == "Phone number"));
}

#[tokio::test]
async fn risky_registration_is_blocked() {
    let (service, store) = service_with_store();

    let err = service
        .register(
            registration("fraudster", "f@example.com", "+12025550123"),
            "127.0.0.1",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::RiskRejected));

    // Nothing was persisted
    use account_core::infra::{AccountRepository, SearchCriteria};
    let (_, total) = store.search(&SearchCriteria::default()).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn lost_update_is_detected_and_recoverable() {
    let (service, _) = service_with_store();
    let id = service
        .register(
            registration("jdoe", "jdoe@example.com", "+12025550123"),
            "203.0.113.9",
        )
        .await
        .unwrap();

    let snapshot = service.get_profile(id).await.unwrap();
    assert_eq!(snapshot.version, 1);

    // First editor wins
    service
        .update_profile(
            id,
            UpdateProfile {
                full_name: "Janet Doe".to_string(),
                phone_number: "+12025550124".to_string(),
                expected_version: snapshot.version,
            },
        )
        .await
        .unwrap();

    // Second editor still holds the old version token
    let err = service
        .update_profile(
            id,
            UpdateProfile {
                full_name: "June Doe".to_string(),
                phone_number: "+12025550125".to_string(),
                expected_version: snapshot.version,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VersionConflict));

    // Re-fetching yields a fresh token and the retry goes through
    let fresh = service.get_profile(id).await.unwrap();
    assert_eq!(fresh.version, 2);
    service
        .update_profile(
            id,
            UpdateProfile {
                full_name: "June Doe".to_string(),
                phone_number: "+12025550125".to_string(),
                expected_version: fresh.version,
            },
        )
        .await
        .unwrap();

    let final_view = service.get_profile(id).await.unwrap();
    assert_eq!(final_view.version, 3);
    assert_eq!(final_view.full_name, "June Doe");
}

#[tokio::test]
async fn unknown_account_operations_fail_with_not_found() {
    let (service, _) = service_with_store();
    let err = service.get_profile(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}
