use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{blogs, comments, ContentStatus};
use crate::web::error::ApiError;
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_comments)
        .service(view_comment)
        .service(create_comment)
        .service(update_comment_put)
        .service(update_comment_patch)
        .service(delete_comment);
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub blog_id: i32,
    pub comment_parent_id: Option<i32>,
    pub commenter_id: i32,
    pub body: String,
    pub created_at: chrono::NaiveDateTime,
    pub status: ContentStatus,
}

impl From<comments::Model> for CommentView {
    fn from(comment: comments::Model) -> Self {
        Self {
            id: comment.id,
            blog_id: comment.blog_id,
            comment_parent_id: comment.comment_parent_id,
            commenter_id: comment.commenter_id,
            body: comment.body,
            created_at: comment.created_at,
            status: comment.status,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentForm {
    pub blog_id: i32,
    pub comment_parent_id: Option<i32>,
    #[validate(length(min = 1, max = 1000))]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentUpdateForm {
    #[validate(length(min = 1, max = 1000))]
    pub body: String,
}

/// The commenter is always the caller; the blog must exist and an
/// optional parent must be a comment on the same blog.
pub async fn insert_comment(
    db: &DatabaseConnection,
    commenter_id: i32,
    form: &CommentForm,
) -> Result<comments::Model, ApiError> {
    blogs::Entity::find_by_id(form.blog_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))?;

    if let Some(parent_id) = form.comment_parent_id {
        let parent = comments::Entity::find_by_id(parent_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Parent comment"))?;
        if parent.blog_id != form.blog_id {
            return Err(ApiError::field(
                "comment_parent_id",
                "Parent comment belongs to a different blog.",
            ));
        }
    }

    let comment = comments::ActiveModel {
        blog_id: Set(form.blog_id),
        comment_parent_id: Set(form.comment_parent_id),
        commenter_id: Set(commenter_id),
        body: Set(form.body.clone()),
        created_at: Set(Utc::now().naive_utc()),
        status: Set(ContentStatus::Awaiting),
        ..Default::default()
    };
    Ok(comment.insert(db).await?)
}

#[derive(Debug, Deserialize)]
pub struct CommentFilters {
    pub blog: Option<i32>,
    pub commenter: Option<i32>,
}

#[get("/comments")]
pub async fn list_comments(query: web::Query<CommentFilters>) -> Result<HttpResponse, ApiError> {
    let mut select = comments::Entity::find().order_by_asc(comments::Column::Id);
    if let Some(blog_id) = query.blog {
        select = select.filter(comments::Column::BlogId.eq(blog_id));
    }
    if let Some(commenter_id) = query.commenter {
        select = select.filter(comments::Column::CommenterId.eq(commenter_id));
    }
    let rows = select.all(get_db_pool()).await?;
    Ok(HttpResponse::Ok().json(rows.into_iter().map(CommentView::from).collect::<Vec<_>>()))
}

#[get("/comments/{id}")]
pub async fn view_comment(path: web::Path<(i32,)>) -> Result<HttpResponse, ApiError> {
    let comment = comments::Entity::find_by_id(path.into_inner().0)
        .one(get_db_pool())
        .await?
        .ok_or_else(|| ApiError::not_found("Comment"))?;
    Ok(HttpResponse::Ok().json(CommentView::from(comment)))
}

#[post("/comments")]
pub async fn create_comment(
    client: ClientCtx,
    form: web::Json<CommentForm>,
) -> Result<HttpResponse, ApiError> {
    let commenter_id = client.require_login()?;
    form.validate()?;
    let comment = insert_comment(get_db_pool(), commenter_id, &form).await?;
    Ok(HttpResponse::Created().json(CommentView::from(comment)))
}

async fn update_comment(
    client: ClientCtx,
    id: i32,
    form: CommentUpdateForm,
) -> Result<HttpResponse, ApiError> {
    form.validate()?;
    let db = get_db_pool();
    let comment = comments::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment"))?;
    client.require_self_or_admin(comment.commenter_id)?;

    let mut active: comments::ActiveModel = comment.into();
    active.body = Set(form.body);
    let comment = active.update(db).await?;
    Ok(HttpResponse::Ok().json(CommentView::from(comment)))
}

#[put("/comments/{id}")]
pub async fn update_comment_put(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<CommentUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    update_comment(client, path.into_inner().0, form.into_inner()).await
}

#[patch("/comments/{id}")]
pub async fn update_comment_patch(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<CommentUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    update_comment(client, path.into_inner().0, form.into_inner()).await
}

/// Deleting a comment cascades to its replies.
#[delete("/comments/{id}")]
pub async fn delete_comment(
    client: ClientCtx,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner().0;
    let db = get_db_pool();
    let comment = comments::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment"))?;
    client.require_self_or_admin(comment.commenter_id)?;

    comments::Entity::delete_by_id(id).exec(db).await?;
    Ok(HttpResponse::NoContent().finish())
}
