use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{reader_profiles, users};
use crate::web::error::{map_unique_violation, ApiError};
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_reader_profiles)
        .service(view_reader_profile)
        .service(create_reader_profile)
        .service(update_reader_profile_put)
        .service(update_reader_profile_patch)
        .service(delete_reader_profile);
}

#[derive(Debug, Serialize)]
pub struct ReaderProfileView {
    pub id: i32,
    pub user_id: i32,
    pub country: String,
}

impl From<reader_profiles::Model> for ReaderProfileView {
    fn from(profile: reader_profiles::Model) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            country: profile.country,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReaderProfileForm {
    /// Admins may create a profile for any reader account; everyone else
    /// creates their own and can leave this out.
    pub user_id: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReaderProfileUpdateForm {
    #[validate(length(min = 1, max = 100))]
    pub country: String,
}

/// Role gate mirroring the author side: only a `reader` account can hold
/// a reader profile, one profile per user.
pub async fn insert_reader_profile(
    db: &DatabaseConnection,
    target: &users::Model,
    form: &ReaderProfileForm,
) -> Result<reader_profiles::Model, ApiError> {
    if target.user_type != users::UserType::Reader {
        return Err(ApiError::field(
            "user_id",
            "Only reader accounts can hold a reader profile.",
        ));
    }

    let profile = reader_profiles::ActiveModel {
        user_id: Set(target.id),
        country: Set(form.country.clone()),
        ..Default::default()
    };
    profile
        .insert(db)
        .await
        .map_err(|e| map_unique_violation(e, "This user already has a reader profile."))
}

async fn resolve_target_user(
    db: &DatabaseConnection,
    client: &ClientCtx,
    user_id: Option<i32>,
) -> Result<users::Model, ApiError> {
    let caller = client.require_login()?;
    let target_id = user_id.unwrap_or(caller);
    if target_id != caller && !client.is_admin() {
        return Err(ApiError::Forbidden(
            "You may only create your own profile.".to_owned(),
        ));
    }
    users::Entity::find_by_id(target_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

#[get("/readerprofiles")]
pub async fn list_reader_profiles() -> Result<HttpResponse, ApiError> {
    let rows = reader_profiles::Entity::find()
        .order_by_asc(reader_profiles::Column::Id)
        .all(get_db_pool())
        .await?;
    Ok(HttpResponse::Ok().json(
        rows.into_iter()
            .map(ReaderProfileView::from)
            .collect::<Vec<_>>(),
    ))
}

#[get("/readerprofiles/{id}")]
pub async fn view_reader_profile(path: web::Path<(i32,)>) -> Result<HttpResponse, ApiError> {
    let profile = reader_profiles::Entity::find_by_id(path.into_inner().0)
        .one(get_db_pool())
        .await?
        .ok_or_else(|| ApiError::not_found("Reader profile"))?;
    Ok(HttpResponse::Ok().json(ReaderProfileView::from(profile)))
}

#[post("/readerprofiles")]
pub async fn create_reader_profile(
    client: ClientCtx,
    form: web::Json<ReaderProfileForm>,
) -> Result<HttpResponse, ApiError> {
    form.validate()?;
    let db = get_db_pool();
    let target = resolve_target_user(db, &client, form.user_id).await?;
    let profile = insert_reader_profile(db, &target, &form).await?;
    log::info!(
        "Reader profile created: profile_id={} user_id={}",
        profile.id,
        profile.user_id
    );
    Ok(HttpResponse::Created().json(ReaderProfileView::from(profile)))
}

async fn update_reader_profile(
    client: ClientCtx,
    id: i32,
    form: ReaderProfileUpdateForm,
) -> Result<HttpResponse, ApiError> {
    form.validate()?;
    let db = get_db_pool();
    let profile = reader_profiles::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Reader profile"))?;
    client.require_self_or_admin(profile.user_id)?;

    let mut active: reader_profiles::ActiveModel = profile.into();
    active.country = Set(form.country);
    let profile = active.update(db).await?;
    Ok(HttpResponse::Ok().json(ReaderProfileView::from(profile)))
}

#[put("/readerprofiles/{id}")]
pub async fn update_reader_profile_put(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<ReaderProfileUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    update_reader_profile(client, path.into_inner().0, form.into_inner()).await
}

#[patch("/readerprofiles/{id}")]
pub async fn update_reader_profile_patch(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<ReaderProfileUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    update_reader_profile(client, path.into_inner().0, form.into_inner()).await
}

#[delete("/readerprofiles/{id}")]
pub async fn delete_reader_profile(
    client: ClientCtx,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner().0;
    let db = get_db_pool();
    let profile = reader_profiles::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Reader profile"))?;
    client.require_self_or_admin(profile.user_id)?;

    reader_profiles::Entity::delete_by_id(id).exec(db).await?;
    Ok(HttpResponse::NoContent().finish())
}
