use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{blogs, points};
use crate::web::error::{map_unique_violation, ApiError};
use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_points)
        .service(view_point)
        .service(create_point)
        .service(update_point)
        .service(delete_point);
}

#[derive(Debug, Serialize)]
pub struct PointView {
    pub id: i32,
    pub blog_id: i32,
    pub pointer_id: i32,
    pub star: i16,
}

impl From<points::Model> for PointView {
    fn from(point: points::Model) -> Self {
        Self {
            id: point.id,
            blog_id: point.blog_id,
            pointer_id: point.pointer_id,
            star: point.star,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PointForm {
    pub blog_id: i32,
    #[validate(range(min = 1, max = 5))]
    pub star: i16,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PointUpdateForm {
    #[validate(range(min = 1, max = 5))]
    pub star: i16,
}

/// One rating per user per blog. A second submission is a conflict, never
/// an overwrite; clients change their mind through the update route. The
/// pre-check gives a friendly message, the unique index settles races.
pub async fn submit_point(
    db: &DatabaseConnection,
    pointer_id: i32,
    form: &PointForm,
) -> Result<points::Model, ApiError> {
    blogs::Entity::find_by_id(form.blog_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))?;

    let existing = points::Entity::find()
        .filter(points::Column::BlogId.eq(form.blog_id))
        .filter(points::Column::PointerId.eq(pointer_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "You have already rated this blog.".to_owned(),
        ));
    }

    let point = points::ActiveModel {
        blog_id: Set(form.blog_id),
        pointer_id: Set(pointer_id),
        star: Set(form.star),
        ..Default::default()
    };
    point
        .insert(db)
        .await
        .map_err(|e| map_unique_violation(e, "You have already rated this blog."))
}

#[derive(Debug, Deserialize)]
pub struct PointFilters {
    pub blog: Option<i32>,
    pub pointer: Option<i32>,
}

#[get("/points")]
pub async fn list_points(query: web::Query<PointFilters>) -> Result<HttpResponse, ApiError> {
    let mut select = points::Entity::find().order_by_asc(points::Column::Id);
    if let Some(blog_id) = query.blog {
        select = select.filter(points::Column::BlogId.eq(blog_id));
    }
    if let Some(pointer_id) = query.pointer {
        select = select.filter(points::Column::PointerId.eq(pointer_id));
    }
    let rows = select.all(get_db_pool()).await?;
    Ok(HttpResponse::Ok().json(rows.into_iter().map(PointView::from).collect::<Vec<_>>()))
}

#[get("/points/{id}")]
pub async fn view_point(path: web::Path<(i32,)>) -> Result<HttpResponse, ApiError> {
    let point = points::Entity::find_by_id(path.into_inner().0)
        .one(get_db_pool())
        .await?
        .ok_or_else(|| ApiError::not_found("Point"))?;
    Ok(HttpResponse::Ok().json(PointView::from(point)))
}

#[post("/points")]
pub async fn create_point(
    client: ClientCtx,
    form: web::Json<PointForm>,
) -> Result<HttpResponse, ApiError> {
    let pointer_id = client.require_login()?;
    form.validate()?;
    let point = submit_point(get_db_pool(), pointer_id, &form).await?;
    Ok(HttpResponse::Created().json(PointView::from(point)))
}

/// Update-in-place for one's own rating. Only the star moves; the
/// (blog, pointer) pair is fixed for the row's lifetime.
#[put("/points/{id}")]
pub async fn update_point(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<PointUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    form.validate()?;
    let db = get_db_pool();
    let point = points::Entity::find_by_id(path.into_inner().0)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Point"))?;
    client.require_self_or_admin(point.pointer_id)?;

    let mut active: points::ActiveModel = point.into();
    active.star = Set(form.star);
    let point = active.update(db).await?;
    Ok(HttpResponse::Ok().json(PointView::from(point)))
}

#[delete("/points/{id}")]
pub async fn delete_point(
    client: ClientCtx,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner().0;
    let db = get_db_pool();
    let point = points::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Point"))?;
    client.require_self_or_admin(point.pointer_id)?;

    points::Entity::delete_by_id(id).exec(db).await?;
    Ok(HttpResponse::NoContent().finish())
}
