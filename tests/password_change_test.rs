//! Self-service password change: re-authentication is all-or-nothing.

use inkpot::session;
use inkpot::web::error::ApiError;
use inkpot::web::users::{check_password_change, UpdateUserForm};

fn form_with_password(password: &str, current: Option<&str>) -> UpdateUserForm {
    UpdateUserForm {
        password: Some(password.to_owned()),
        current_password: current.map(str::to_owned),
        ..Default::default()
    }
}

#[test]
fn missing_current_password_is_rejected() {
    let hash = session::hash_password("old-password-1").unwrap();
    let result = check_password_change(&hash, &form_with_password("new-password-9", None));
    match result {
        Err(ApiError::Field { field, message }) => {
            assert_eq!(field, "current_password");
            assert!(message.contains("required"));
        }
        other => panic!("expected a current_password field error, got {:?}", other),
    }
}

#[test]
fn wrong_current_password_is_rejected_with_distinct_message() {
    let hash = session::hash_password("old-password-1").unwrap();
    let result = check_password_change(
        &hash,
        &form_with_password("new-password-9", Some("not-the-old-password")),
    );
    match result {
        Err(ApiError::Field { field, message }) => {
            assert_eq!(field, "current_password");
            assert!(message.contains("incorrect"));
        }
        other => panic!("expected a current_password field error, got {:?}", other),
    }
}

#[test]
fn correct_current_password_is_accepted() {
    let hash = session::hash_password("old-password-1").unwrap();
    assert!(
        check_password_change(&hash, &form_with_password("new-password-9", Some("old-password-1")))
            .is_ok()
    );
}

#[test]
fn name_only_update_needs_no_current_password() {
    let hash = session::hash_password("old-password-1").unwrap();
    let form = UpdateUserForm {
        first_name: Some("Ada".to_owned()),
        last_name: Some("Lovelace".to_owned()),
        ..Default::default()
    };
    assert!(check_password_change(&hash, &form).is_ok());
}

#[test]
fn rehash_invalidates_the_old_password() {
    let new_hash = session::hash_password("new-password-9").unwrap();
    assert!(session::verify_password(&new_hash, "new-password-9"));
    assert!(!session::verify_password(&new_hash, "old-password-1"));
}
