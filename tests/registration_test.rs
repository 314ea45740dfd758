//! Public registration: validation and password hashing before storage.
mod common;

use common::sample_user;
use inkpot::orm::users::UserType;
use inkpot::web::users::{insert_new_user, RegisterForm};
use sea_orm::{DatabaseBackend, MockDatabase};
use validator::Validate;

fn register_form(password: &str) -> RegisterForm {
    RegisterForm {
        username: "ada".to_owned(),
        password: password.to_owned(),
        email: "Ada@Example.com".to_owned(),
        user_type: UserType::Author,
    }
}

#[test]
fn short_passwords_and_bad_emails_fail_validation() {
    assert!(register_form("pw").validate().is_err());

    let mut form = register_form("long-enough-password");
    form.email = "not-an-email".to_owned();
    assert!(form.validate().is_err());

    assert!(register_form("long-enough-password").validate().is_ok());
}

#[actix_rt::test]
async fn stored_password_is_a_hash_never_the_plaintext() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_user(1, UserType::Author)]])
        .into_connection();

    let form = register_form("plaintext-secret-42");
    let user = insert_new_user(&db, &form).await.unwrap();
    assert_eq!(user.id, 1);

    // Inspect what actually went over the wire in the INSERT.
    let logged = format!("{:?}", db.into_transaction_log());
    assert!(!logged.contains("plaintext-secret-42"));
    assert!(logged.contains("$argon2"));
    // Email is normalized on the way in.
    assert!(logged.contains("ada@example.com"));
}
