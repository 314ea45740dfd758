use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::users;
use crate::session;
use crate::web::error::{map_unique_violation, ApiError};
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::{entity::*, query::*, Condition, DatabaseConnection};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(register)
        .service(view_me)
        .service(list_users)
        .service(view_user)
        .service(update_user_put)
        .service(update_user_patch)
        .service(delete_user);
}

/// Public representation of a user. The password hash never appears here.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: users::UserType,
    pub created_at: chrono::NaiveDateTime,
}

impl From<users::Model> for UserView {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            user_type: user.user_type,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 8, max = 1000))]
    pub password: String,
    #[validate(email)]
    pub email: String,
    pub user_type: users::UserType,
}

pub async fn insert_new_user(
    db: &DatabaseConnection,
    form: &RegisterForm,
) -> Result<users::Model, ApiError> {
    let password_hash = session::hash_password(&form.password).map_err(|e| {
        log::error!("Failed to hash password: {}", e);
        ApiError::Internal("password hashing failed".to_owned())
    })?;

    let user = users::ActiveModel {
        username: Set(form.username.trim().to_owned()),
        password: Set(password_hash),
        email: Set(form.email.trim().to_lowercase()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        user_type: Set(form.user_type),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    user.insert(db)
        .await
        .map_err(|e| map_unique_violation(e, "A user with this username already exists."))
}

/// Public registration. No session required; the role is chosen here and
/// is immutable afterwards.
#[post("/register")]
pub async fn register(form: web::Json<RegisterForm>) -> Result<HttpResponse, ApiError> {
    form.validate()?;
    let user = insert_new_user(get_db_pool(), &form).await?;
    log::info!("New user registered: {} (user_id: {})", user.username, user.id);
    Ok(HttpResponse::Created().json(UserView::from(user)))
}

/// Returns the caller's own record, no identifier needed.
#[get("/me")]
pub async fn view_me(client: ClientCtx) -> Result<HttpResponse, ApiError> {
    client.require_login()?;
    let user = client.get_user().cloned().ok_or(ApiError::Unauthorized)?;
    Ok(HttpResponse::Ok().json(UserView::from(user)))
}

#[derive(Debug, Deserialize)]
pub struct UserFilters {
    pub user_type: Option<users::UserType>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[get("/users")]
pub async fn list_users(query: web::Query<UserFilters>) -> Result<HttpResponse, ApiError> {
    let mut select = users::Entity::find();
    if let Some(user_type) = query.user_type {
        select = select.filter(users::Column::UserType.eq(user_type));
    }
    if let Some(q) = query.search.as_deref().filter(|q| !q.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(users::Column::FirstName.contains(q))
                .add(users::Column::LastName.contains(q)),
        );
    }
    select = match query.ordering.as_deref() {
        Some("-id") => select.order_by_desc(users::Column::Id),
        _ => select.order_by_asc(users::Column::Id),
    };

    let rows = select.all(get_db_pool()).await?;
    Ok(HttpResponse::Ok().json(rows.into_iter().map(UserView::from).collect::<Vec<_>>()))
}

#[get("/users/{id}")]
pub async fn view_user(path: web::Path<(i32,)>) -> Result<HttpResponse, ApiError> {
    let user = users::Entity::find_by_id(path.into_inner().0)
        .one(get_db_pool())
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(HttpResponse::Ok().json(UserView::from(user)))
}

/// The only user fields mutable after registration. Unknown fields are
/// rejected, so attempts to change username/email/user_type through this
/// path fail loudly instead of being silently ignored.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserForm {
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(length(min = 8, max = 1000))]
    pub password: Option<String>,
    pub current_password: Option<String>,
}

/// Re-authentication rule for self-service password changes. A new
/// password requires the current one to be supplied and correct; failing
/// either check rejects the whole update, name changes included.
pub fn check_password_change(stored_hash: &str, form: &UpdateUserForm) -> Result<(), ApiError> {
    if form.password.is_none() {
        return Ok(());
    }
    match form.current_password.as_deref() {
        None => Err(ApiError::field(
            "current_password",
            "Current password is required to set a new password.",
        )),
        Some(current) if !session::verify_password(stored_hash, current) => Err(ApiError::field(
            "current_password",
            "Current password is incorrect.",
        )),
        Some(_) => Ok(()),
    }
}

pub async fn apply_user_update(
    db: &DatabaseConnection,
    user: users::Model,
    form: &UpdateUserForm,
) -> Result<users::Model, ApiError> {
    check_password_change(&user.password, form)?;

    let mut active: users::ActiveModel = user.into();
    if let Some(first_name) = &form.first_name {
        active.first_name = Set(first_name.clone());
    }
    if let Some(last_name) = &form.last_name {
        active.last_name = Set(last_name.clone());
    }
    if let Some(password) = &form.password {
        let hash = session::hash_password(password).map_err(|e| {
            log::error!("Failed to hash password: {}", e);
            ApiError::Internal("password hashing failed".to_owned())
        })?;
        active.password = Set(hash);
    }

    Ok(active.update(db).await?)
}

async fn update_user(
    client: ClientCtx,
    id: i32,
    form: UpdateUserForm,
) -> Result<HttpResponse, ApiError> {
    client.require_self_or_admin(id)?;
    form.validate()?;

    let db = get_db_pool();
    let user = users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    let updated = apply_user_update(db, user, &form).await?;
    Ok(HttpResponse::Ok().json(UserView::from(updated)))
}

#[put("/users/{id}")]
pub async fn update_user_put(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<UpdateUserForm>,
) -> Result<HttpResponse, ApiError> {
    update_user(client, path.into_inner().0, form.into_inner()).await
}

#[patch("/users/{id}")]
pub async fn update_user_patch(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<UpdateUserForm>,
) -> Result<HttpResponse, ApiError> {
    update_user(client, path.into_inner().0, form.into_inner()).await
}

/// Deleting a user cascades to its profiles, comments and points.
#[delete("/users/{id}")]
pub async fn delete_user(
    client: ClientCtx,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner().0;
    client.require_self_or_admin(id)?;

    let result = users::Entity::delete_by_id(id).exec(get_db_pool()).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("User"));
    }
    log::info!("User deleted: user_id={}", id);
    Ok(HttpResponse::NoContent().finish())
}
