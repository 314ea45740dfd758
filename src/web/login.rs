use crate::db::get_db_pool;
use crate::orm::users;
use crate::session;
use crate::web::error::ApiError;
use crate::web::users::UserView;
use actix_web::{post, web, HttpResponse};
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_login).service(post_logout);
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Verifies credentials against the stored hash. Does not touch the
/// session; the handler decides what to remember.
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<users::Model, ApiError> {
    let user = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?;

    let user = match user {
        Some(user) => user,
        None => {
            log::debug!("Login attempt for unknown username: {}", username);
            return Err(ApiError::field("username", "Unknown username."));
        }
    };

    if !session::verify_password(&user.password, password) {
        log::warn!("Failed login attempt: user_id={}", user.id);
        return Err(ApiError::field("password", "Incorrect password."));
    }

    Ok(user)
}

#[post("/login")]
pub async fn post_login(
    cookies: actix_session::Session,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(get_db_pool(), &form.username, &form.password).await?;

    session::remember_user(&cookies, user.id)
        .map_err(|e| ApiError::Internal(format!("session write failed: {}", e)))?;
    log::info!("User logged in: user_id={}", user.id);
    Ok(HttpResponse::Ok().json(UserView::from(user)))
}

#[post("/logout")]
pub async fn post_logout(cookies: actix_session::Session) -> HttpResponse {
    session::forget_user(&cookies);
    HttpResponse::NoContent().finish()
}
