use crate::blog::get_blog_stats;
use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{author_profiles, blog_sub_categories, blogs, comments, points, sub_categories, ContentStatus};
use crate::slug;
use crate::web::comments::CommentView;
use crate::web::error::{map_unique_violation, ApiError};
use crate::web::points::PointView;
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, Condition, ConnectionTrait, DatabaseConnection, DbErr, JoinType,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Fixed segments before {id} so /blogs/slug/... never hits the id route.
    conf.service(view_blog_by_slug)
        .service(list_blogs)
        .service(view_blog)
        .service(create_blog)
        .service(update_blog_put)
        .service(update_blog_patch)
        .service(delete_blog);
}

/// Flat shape for pagination-friendly lists. No nested comments, points
/// or aggregates.
#[derive(Debug, Serialize)]
pub struct BlogListView {
    pub id: i32,
    pub author_id: i32,
    pub sub_category_ids: Vec<i32>,
    pub cover_image: Option<String>,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
    pub status: ContentStatus,
}

impl BlogListView {
    fn from_parts(blog: blogs::Model, sub_category_ids: Vec<i32>) -> Self {
        Self {
            id: blog.id,
            author_id: blog.author_id,
            sub_category_ids,
            cover_image: blog.cover_image,
            title: blog.title,
            slug: blog.slug,
            body: blog.body,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
            status: blog.status,
        }
    }
}

/// Detail shape: the flat fields plus nested comments, nested points and
/// the read-time aggregates.
#[derive(Debug, Serialize)]
pub struct BlogDetailView {
    #[serde(flatten)]
    pub blog: BlogListView,
    pub comments: Vec<CommentView>,
    pub points: Vec<PointView>,
    pub comment_count: u64,
    pub point_count: u64,
    pub point_average: Option<f64>,
}

/// Batch-loads junction rows so a page of blogs costs one extra query.
pub async fn list_views(
    db: &DatabaseConnection,
    rows: Vec<blogs::Model>,
) -> Result<Vec<BlogListView>, DbErr> {
    let ids: Vec<i32> = rows.iter().map(|b| b.id).collect();
    let mut by_blog: HashMap<i32, Vec<i32>> = HashMap::new();
    if !ids.is_empty() {
        for link in blog_sub_categories::Entity::find()
            .filter(blog_sub_categories::Column::BlogId.is_in(ids))
            .all(db)
            .await?
        {
            by_blog.entry(link.blog_id).or_default().push(link.sub_category_id);
        }
    }
    Ok(rows
        .into_iter()
        .map(|blog| {
            let subs = by_blog.remove(&blog.id).unwrap_or_default();
            BlogListView::from_parts(blog, subs)
        })
        .collect())
}

async fn detail_view(db: &DatabaseConnection, blog: blogs::Model) -> Result<BlogDetailView, ApiError> {
    let blog_id = blog.id;
    let sub_category_ids: Vec<i32> = blog_sub_categories::Entity::find()
        .filter(blog_sub_categories::Column::BlogId.eq(blog_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.sub_category_id)
        .collect();

    let comment_rows = comments::Entity::find()
        .filter(comments::Column::BlogId.eq(blog_id))
        .order_by_asc(comments::Column::Id)
        .all(db)
        .await?;
    let point_rows = points::Entity::find()
        .filter(points::Column::BlogId.eq(blog_id))
        .order_by_asc(points::Column::Id)
        .all(db)
        .await?;
    let stats = get_blog_stats(db, blog_id).await?;

    Ok(BlogDetailView {
        blog: BlogListView::from_parts(blog, sub_category_ids),
        comments: comment_rows.into_iter().map(CommentView::from).collect(),
        points: point_rows.into_iter().map(PointView::from).collect(),
        comment_count: stats.comment_count,
        point_count: stats.point_count,
        point_average: stats.point_average,
    })
}

#[derive(Debug, Deserialize, Validate)]
pub struct BlogForm {
    /// Admins may publish for any author profile; everyone else writes as
    /// themselves and can leave this out.
    pub author_id: Option<i32>,
    #[serde(default)]
    pub sub_category_ids: Vec<i32>,
    pub cover_image: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct BlogUpdateForm {
    pub sub_category_ids: Option<Vec<i32>>,
    /// Absent leaves the image alone; an explicit null clears it.
    #[serde(default, deserialize_with = "super::double_option")]
    pub cover_image: Option<Option<String>>,
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub body: Option<String>,
    /// Moderation field, admin only.
    pub status: Option<ContentStatus>,
}

async fn resolve_author(
    db: &DatabaseConnection,
    client: &ClientCtx,
    author_id: Option<i32>,
) -> Result<author_profiles::Model, ApiError> {
    let caller = client.require_login()?;
    match author_id {
        Some(author_id) => {
            let profile = author_profiles::Entity::find_by_id(author_id)
                .one(db)
                .await?
                .ok_or_else(|| ApiError::not_found("Author profile"))?;
            if profile.user_id != caller && !client.is_admin() {
                return Err(ApiError::Forbidden(
                    "You may only publish blogs as yourself.".to_owned(),
                ));
            }
            Ok(profile)
        }
        None => author_profiles::Entity::find()
            .filter(author_profiles::Column::UserId.eq(caller))
            .one(db)
            .await?
            .ok_or_else(|| {
                ApiError::Forbidden(
                    "Only users with an author profile can publish blogs.".to_owned(),
                )
            }),
    }
}

/// Returns the deduplicated id set, or a field error if any id dangles.
async fn check_sub_categories(
    db: &DatabaseConnection,
    ids: &[i32],
) -> Result<Vec<i32>, ApiError> {
    let mut unique = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();
    if unique.is_empty() {
        return Ok(unique);
    }
    let found = sub_categories::Entity::find()
        .filter(sub_categories::Column::Id.is_in(unique.clone()))
        .count(db)
        .await?;
    if found != unique.len() as u64 {
        return Err(ApiError::field(
            "sub_category_ids",
            "One or more sub-categories do not exist.",
        ));
    }
    Ok(unique)
}

async fn replace_sub_categories<C: ConnectionTrait>(
    db: &C,
    blog_id: i32,
    ids: &[i32],
) -> Result<(), DbErr> {
    blog_sub_categories::Entity::delete_many()
        .filter(blog_sub_categories::Column::BlogId.eq(blog_id))
        .exec(db)
        .await?;
    if !ids.is_empty() {
        let links = ids.iter().map(|&sub_category_id| blog_sub_categories::ActiveModel {
            blog_id: Set(blog_id),
            sub_category_id: Set(sub_category_id),
            ..Default::default()
        });
        blog_sub_categories::Entity::insert_many(links).exec(db).await?;
    }
    Ok(())
}

async fn find_free_slug(db: &DatabaseConnection, base: &str) -> Result<String, DbErr> {
    let taken: Vec<String> = blogs::Entity::find()
        .filter(blogs::Column::Slug.starts_with(base))
        .all(db)
        .await?
        .into_iter()
        .map(|b| b.slug)
        .collect();
    Ok(slug::disambiguate(base, &taken))
}

/// Requires the caller to own the blog's author profile, or be an admin.
async fn require_blog_ownership(
    db: &DatabaseConnection,
    client: &ClientCtx,
    blog: &blogs::Model,
) -> Result<(), ApiError> {
    let caller = client.require_login()?;
    if client.is_admin() {
        return Ok(());
    }
    let profile = author_profiles::Entity::find_by_id(blog.author_id)
        .one(db)
        .await?;
    match profile {
        Some(profile) if profile.user_id == caller => Ok(()),
        _ => Err(ApiError::Forbidden(
            "You may only modify your own blogs.".to_owned(),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct BlogFilters {
    pub status: Option<ContentStatus>,
    pub author: Option<i32>,
    pub sub_category: Option<i32>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

fn apply_ordering(select: Select<blogs::Entity>, ordering: Option<&str>) -> Select<blogs::Entity> {
    match ordering.unwrap_or("id") {
        "created_at" => select.order_by_asc(blogs::Column::CreatedAt),
        "-created_at" => select.order_by_desc(blogs::Column::CreatedAt),
        "updated_at" => select.order_by_asc(blogs::Column::UpdatedAt),
        "-updated_at" => select.order_by_desc(blogs::Column::UpdatedAt),
        "-id" => select.order_by_desc(blogs::Column::Id),
        _ => select.order_by_asc(blogs::Column::Id),
    }
}

#[get("/blogs")]
pub async fn list_blogs(query: web::Query<BlogFilters>) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let mut select = blogs::Entity::find();
    if let Some(status) = query.status {
        select = select.filter(blogs::Column::Status.eq(status));
    }
    if let Some(author) = query.author {
        select = select.filter(blogs::Column::AuthorId.eq(author));
    }
    if let Some(sub_category) = query.sub_category {
        select = select
            .join(
                JoinType::InnerJoin,
                blogs::Relation::BlogSubCategories.def(),
            )
            .filter(blog_sub_categories::Column::SubCategoryId.eq(sub_category));
    }
    if let Some(q) = query.search.as_deref().filter(|q| !q.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(blogs::Column::Title.contains(q))
                .add(blogs::Column::Body.contains(q)),
        );
    }
    select = apply_ordering(select, query.ordering.as_deref());

    let rows = select.all(db).await?;
    Ok(HttpResponse::Ok().json(list_views(db, rows).await?))
}

#[get("/blogs/{id}")]
pub async fn view_blog(path: web::Path<(i32,)>) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let blog = blogs::Entity::find_by_id(path.into_inner().0)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))?;
    Ok(HttpResponse::Ok().json(detail_view(db, blog).await?))
}

/// Slugs are stable lookup identifiers independent of later title edits.
#[get("/blogs/slug/{slug}")]
pub async fn view_blog_by_slug(path: web::Path<(String,)>) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let blog = blogs::Entity::find()
        .filter(blogs::Column::Slug.eq(path.into_inner().0))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))?;
    Ok(HttpResponse::Ok().json(detail_view(db, blog).await?))
}

/// The blog row and its sub-category links land in one transaction, so a
/// failed link write never leaves a half-created blog behind.
pub async fn insert_blog(
    db: &DatabaseConnection,
    author_id: i32,
    sub_category_ids: &[i32],
    form: &BlogForm,
) -> Result<blogs::Model, ApiError> {
    let slug = find_free_slug(db, &slug::slugify(&form.title)).await?;

    let now = Utc::now().naive_utc();
    let blog = blogs::ActiveModel {
        author_id: Set(author_id),
        cover_image: Set(form.cover_image.clone()),
        title: Set(form.title.clone()),
        slug: Set(slug),
        body: Set(form.body.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        status: Set(ContentStatus::Awaiting),
        ..Default::default()
    };

    let txn = db.begin().await?;
    let blog = blog
        .insert(&txn)
        .await
        .map_err(|e| map_unique_violation(e, "A blog with this slug already exists."))?;
    replace_sub_categories(&txn, blog.id, sub_category_ids).await?;
    txn.commit().await?;
    Ok(blog)
}

#[post("/blogs")]
pub async fn create_blog(
    client: ClientCtx,
    form: web::Json<BlogForm>,
) -> Result<HttpResponse, ApiError> {
    form.validate()?;
    let db = get_db_pool();

    let author = resolve_author(db, &client, form.author_id).await?;
    let sub_category_ids = check_sub_categories(db, &form.sub_category_ids).await?;
    let blog = insert_blog(db, author.id, &sub_category_ids, &form).await?;
    log::info!("Blog created: blog_id={} author_id={}", blog.id, blog.author_id);

    let views = list_views(db, vec![blog]).await?;
    Ok(HttpResponse::Created().json(views.into_iter().next()))
}

async fn update_blog(
    client: ClientCtx,
    id: i32,
    form: BlogUpdateForm,
) -> Result<HttpResponse, ApiError> {
    form.validate()?;
    let db = get_db_pool();

    let blog = blogs::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))?;
    require_blog_ownership(db, &client, &blog).await?;

    if form.status.is_some() && !client.is_admin() {
        return Err(ApiError::Forbidden(
            "Only admins may change a blog's status.".to_owned(),
        ));
    }
    let sub_category_ids = match &form.sub_category_ids {
        Some(ids) => Some(check_sub_categories(db, ids).await?),
        None => None,
    };

    // The slug keeps its creation-time value through title edits.
    let mut active: blogs::ActiveModel = blog.into();
    if let Some(title) = &form.title {
        active.title = Set(title.clone());
    }
    if let Some(body) = &form.body {
        active.body = Set(body.clone());
    }
    if let Some(cover_image) = &form.cover_image {
        active.cover_image = Set(cover_image.clone());
    }
    if let Some(status) = form.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    // Row update and link replacement succeed or fail together.
    let txn = db.begin().await?;
    let blog = active.update(&txn).await?;
    if let Some(ids) = &sub_category_ids {
        replace_sub_categories(&txn, blog.id, ids).await?;
    }
    txn.commit().await?;

    Ok(HttpResponse::Ok().json(detail_view(db, blog).await?))
}

#[put("/blogs/{id}")]
pub async fn update_blog_put(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<BlogUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    update_blog(client, path.into_inner().0, form.into_inner()).await
}

#[patch("/blogs/{id}")]
pub async fn update_blog_patch(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<BlogUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    update_blog(client, path.into_inner().0, form.into_inner()).await
}

/// Removes the blog with its comments, points and sub-category links.
#[delete("/blogs/{id}")]
pub async fn delete_blog(
    client: ClientCtx,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner().0;
    let db = get_db_pool();

    let blog = blogs::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))?;
    require_blog_ownership(db, &client, &blog).await?;

    blogs::Entity::delete_by_id(id).exec(db).await?;
    log::info!("Blog deleted: blog_id={}", id);
    Ok(HttpResponse::NoContent().finish())
}
