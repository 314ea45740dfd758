//! Request-scoped client identity.
//!
//! Resolves the session cookie to a user row once per request. Routes
//! take `client: ClientCtx` as a parameter; a guest request carries
//! `None` and only fails when it reaches a `require_*` check.

use crate::db::get_db_pool;
use crate::orm::users;
use crate::web::error::ApiError;
use actix_session::SessionExt;
use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sea_orm::EntityTrait;

/// Client context passed to routes. `client` is None for guests.
#[derive(Clone, Debug, Default)]
pub struct ClientCtx {
    client: Option<users::Model>,
}

impl ClientCtx {
    /// Returns either the user's id or None for a guest.
    pub fn get_id(&self) -> Option<i32> {
        self.client.as_ref().map(|u| u.id)
    }

    pub fn get_user(&self) -> Option<&users::Model> {
        self.client.as_ref()
    }

    pub fn is_user(&self) -> bool {
        self.client.is_some()
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self.client.as_ref().map(|u| u.user_type),
            Some(users::UserType::Admin)
        )
    }

    /// Require a logged-in user. Returns the user id.
    pub fn require_login(&self) -> Result<i32, ApiError> {
        self.get_id().ok_or(ApiError::Unauthorized)
    }

    /// Require the caller to be `user_id` themselves, or an admin.
    pub fn require_self_or_admin(&self, user_id: i32) -> Result<(), ApiError> {
        let caller = self.require_login()?;
        if caller == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "You may only modify your own records.".to_owned(),
            ))
        }
    }
}

/// This implementation is what actually provides the `client: ClientCtx`
/// in the parameters of route functions.
impl FromRequest for ClientCtx {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let session = req.get_session();
        Box::pin(async move {
            let client = match crate::session::get_session_user_id(&session) {
                Some(id) => users::Entity::find_by_id(id)
                    .one(get_db_pool())
                    .await
                    .map_err(|e| {
                        log::error!("Session user lookup failed: {}", e);
                        actix_web::error::ErrorInternalServerError("Couldn't load user.")
                    })?,
                None => None,
            };
            Ok(Self { client })
        })
    }
}
