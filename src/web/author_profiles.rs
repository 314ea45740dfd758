use crate::blog::get_author_blog_count;
use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{author_profiles, blogs, users, ContentStatus};
use crate::web::blogs::{list_views, BlogListView};
use crate::web::error::{map_unique_violation, ApiError};
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use validator::Validate;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10}$").unwrap());

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_author_profiles)
        .service(view_author_profile)
        .service(create_author_profile)
        .service(update_author_profile_put)
        .service(update_author_profile_patch)
        .service(delete_author_profile);
}

/// Flat shape used by list, create and update responses.
#[derive(Debug, Serialize)]
pub struct AuthorProfileView {
    pub id: i32,
    pub user_id: i32,
    pub profile_image: Option<String>,
    pub country: String,
    pub phone_number: String,
    pub status: ContentStatus,
}

impl From<author_profiles::Model> for AuthorProfileView {
    fn from(profile: author_profiles::Model) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            profile_image: profile.profile_image,
            country: profile.country,
            phone_number: profile.phone_number,
            status: profile.status,
        }
    }
}

/// Retrieve additionally nests the author's blogs and their count.
#[derive(Debug, Serialize)]
pub struct AuthorProfileDetailView {
    #[serde(flatten)]
    pub profile: AuthorProfileView,
    pub blog_count: u64,
    pub blogs: Vec<BlogListView>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AuthorProfileForm {
    /// Admins may create a profile for any author account; everyone else
    /// creates their own and can leave this out.
    pub user_id: Option<i32>,
    pub profile_image: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(regex(path = "PHONE_RE", message = "Phone number must be exactly 10 digits."))]
    pub phone_number: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AuthorProfileUpdateForm {
    /// Absent leaves the image alone; an explicit null clears it.
    #[serde(default, deserialize_with = "super::double_option")]
    pub profile_image: Option<Option<String>>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,
    #[validate(regex(path = "PHONE_RE", message = "Phone number must be exactly 10 digits."))]
    pub phone_number: Option<String>,
    /// Moderation field, admin only.
    pub status: Option<ContentStatus>,
}

/// Role gate: only an `author` account can hold an author profile, and a
/// second profile for the same user is a conflict. There is no path that
/// turns one role's profile into the other's.
pub async fn insert_author_profile(
    db: &DatabaseConnection,
    target: &users::Model,
    form: &AuthorProfileForm,
) -> Result<author_profiles::Model, ApiError> {
    if target.user_type != users::UserType::Author {
        return Err(ApiError::field(
            "user_id",
            "Only author accounts can hold an author profile.",
        ));
    }

    let profile = author_profiles::ActiveModel {
        user_id: Set(target.id),
        profile_image: Set(form.profile_image.clone()),
        country: Set(form.country.clone()),
        phone_number: Set(form.phone_number.clone()),
        status: Set(ContentStatus::Awaiting),
        ..Default::default()
    };
    profile
        .insert(db)
        .await
        .map_err(|e| map_unique_violation(e, "This user already has an author profile."))
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

#[derive(Debug, Deserialize)]
pub struct AuthorProfileFilters {
    pub country: Option<String>,
    pub status: Option<ContentStatus>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[get("/authorprofiles")]
pub async fn list_author_profiles(
    query: web::Query<AuthorProfileFilters>,
) -> Result<HttpResponse, ApiError> {
    let mut select = author_profiles::Entity::find();
    if let Some(country) = query.country.as_deref().filter(|c| !c.is_empty()) {
        select = select.filter(author_profiles::Column::Country.eq(country));
    }
    if let Some(status) = query.status {
        select = select.filter(author_profiles::Column::Status.eq(status));
    }
    if let Some(q) = query.search.as_deref().filter(|q| !q.is_empty()) {
        select = select.filter(author_profiles::Column::PhoneNumber.contains(q));
    }
    select = match query.ordering.as_deref() {
        Some("-id") => select.order_by_desc(author_profiles::Column::Id),
        _ => select.order_by_asc(author_profiles::Column::Id),
    };

    let rows = select.all(get_db_pool()).await?;
    Ok(HttpResponse::Ok().json(
        rows.into_iter()
            .map(AuthorProfileView::from)
            .collect::<Vec<_>>(),
    ))
}

#[get("/authorprofiles/{id}")]
pub async fn view_author_profile(path: web::Path<(i32,)>) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let profile = author_profiles::Entity::find_by_id(path.into_inner().0)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Author profile"))?;

    let blog_count = get_author_blog_count(db, profile.id).await?;
    let blog_rows = profile
        .find_related(blogs::Entity)
        .order_by_asc(blogs::Column::Id)
        .all(db)
        .await?;
    let view = AuthorProfileDetailView {
        profile: AuthorProfileView::from(profile),
        blog_count,
        blogs: list_views(db, blog_rows).await?,
    };
    Ok(HttpResponse::Ok().json(view))
}

#[post("/authorprofiles")]
pub async fn create_author_profile(
    client: ClientCtx,
    form: web::Json<AuthorProfileForm>,
) -> Result<HttpResponse, ApiError> {
    form.validate()?;
    let db = get_db_pool();
    let target = resolve_target_user(db, &client, form.user_id).await?;
    let profile = insert_author_profile(db, &target, &form).await?;
    log::info!(
        "Author profile created: profile_id={} user_id={}",
        profile.id,
        profile.user_id
    );
    Ok(HttpResponse::Created().json(AuthorProfileView::from(profile)))
}

async fn update_author_profile(
    client: ClientCtx,
    id: i32,
    form: AuthorProfileUpdateForm,
) -> Result<HttpResponse, ApiError> {
    form.validate()?;
    let db = get_db_pool();
    let profile = author_profiles::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Author profile"))?;
    client.require_self_or_admin(profile.user_id)?;

    if form.status.is_some() && !client.is_admin() {
        return Err(ApiError::Forbidden(
            "Only admins may change a profile's status.".to_owned(),
        ));
    }

    let mut active: author_profiles::ActiveModel = profile.into();
    if let Some(profile_image) = &form.profile_image {
        active.profile_image = Set(profile_image.clone());
    }
    if let Some(country) = &form.country {
        active.country = Set(country.clone());
    }
    if let Some(phone_number) = &form.phone_number {
        active.phone_number = Set(phone_number.clone());
    }
    if let Some(status) = form.status {
        active.status = Set(status);
    }
    let profile = active.update(db).await?;
    Ok(HttpResponse::Ok().json(AuthorProfileView::from(profile)))
}

#[put("/authorprofiles/{id}")]
pub async fn update_author_profile_put(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<AuthorProfileUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    update_author_profile(client, path.into_inner().0, form.into_inner()).await
}

#[patch("/authorprofiles/{id}")]
pub async fn update_author_profile_patch(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<AuthorProfileUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    update_author_profile(client, path.into_inner().0, form.into_inner()).await
}

/// Deleting a profile cascades to the author's blogs.
#[delete("/authorprofiles/{id}")]
pub async fn delete_author_profile(
    client: ClientCtx,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner().0;
    let db = get_db_pool();
    let profile = author_profiles::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Author profile"))?;
    client.require_self_or_admin(profile.user_id)?;

    author_profiles::Entity::delete_by_id(id).exec(db).await?;
    log::info!("Author profile deleted: profile_id={}", id);
    Ok(HttpResponse::NoContent().finish())
}
