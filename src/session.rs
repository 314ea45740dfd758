//! Argon2 credential handling and session identity.
//!
//! Plaintext passwords exist only inside the request that carries them;
//! everything stored or compared goes through the process-wide hasher.

use actix_session::Session;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use once_cell::sync::Lazy;

static ARGON2: Lazy<Argon2<'static>> = Lazy::new(Argon2::default);

pub fn get_argon2() -> &'static Argon2<'static> {
    &ARGON2
}

/// Session key holding the authenticated user id.
pub const SESSION_USER_ID: &str = "uid";

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    Ok(get_argon2()
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))?
        .to_string())
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => get_argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            log::error!("Stored password hash is unreadable: {}", err);
            false
        }
    }
}

pub fn get_session_user_id(session: &Session) -> Option<i32> {
    session.get::<i32>(SESSION_USER_ID).ok().flatten()
}

pub fn remember_user(
    session: &Session,
    user_id: i32,
) -> Result<(), actix_session::SessionInsertError> {
    session.insert(SESSION_USER_ID, user_id)
}

pub fn forget_user(session: &Session) {
    session.purge();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_argon2_and_verifies() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains("correct horse battery"));
        assert!(verify_password(&hash, "correct horse battery"));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(!verify_password(&hash, "incorrect horse battery"));
        assert!(!verify_password("not a hash at all", "anything"));
    }
}
