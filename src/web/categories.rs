use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{categories, sub_categories};
use crate::slug;
use crate::web::error::{map_unique_violation, ApiError};
use crate::web::sub_categories::SubCategoryView;
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_categories)
        .service(view_category)
        .service(create_category)
        .service(update_category_put)
        .service(update_category_patch)
        .service(delete_category);
}

/// Category views nest their sub-categories.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub sub_categories: Vec<SubCategoryView>,
}

impl CategoryView {
    fn from_parts(category: categories::Model, subs: Vec<sub_categories::Model>) -> Self {
        Self {
            id: category.id,
            title: category.title,
            slug: category.slug,
            sub_categories: subs.into_iter().map(SubCategoryView::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
}

/// Scans slugs sharing this prefix and picks the first free suffix.
/// The unique index on `slug` still backs concurrent creations.
async fn find_free_slug(db: &DatabaseConnection, base: &str) -> Result<String, sea_orm::DbErr> {
    let taken: Vec<String> = categories::Entity::find()
        .filter(categories::Column::Slug.starts_with(base))
        .all(db)
        .await?
        .into_iter()
        .map(|c| c.slug)
        .collect();
    Ok(slug::disambiguate(base, &taken))
}

pub async fn insert_category(
    db: &DatabaseConnection,
    form: &CategoryForm,
) -> Result<categories::Model, ApiError> {
    let slug = find_free_slug(db, &slug::slugify(&form.title)).await?;
    let category = categories::ActiveModel {
        title: Set(form.title.clone()),
        slug: Set(slug),
        ..Default::default()
    };
    category
        .insert(db)
        .await
        .map_err(|e| map_unique_violation(e, "A category with this slug already exists."))
}

#[get("/categories")]
pub async fn list_categories() -> Result<HttpResponse, ApiError> {
    let rows = categories::Entity::find()
        .find_with_related(sub_categories::Entity)
        .order_by_asc(categories::Column::Id)
        .all(get_db_pool())
        .await?;
    let views: Vec<CategoryView> = rows
        .into_iter()
        .map(|(category, subs)| CategoryView::from_parts(category, subs))
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

#[get("/categories/{id}")]
pub async fn view_category(path: web::Path<(i32,)>) -> Result<HttpResponse, ApiError> {
    let db = get_db_pool();
    let category = categories::Entity::find_by_id(path.into_inner().0)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Category"))?;
    let subs = category
        .find_related(sub_categories::Entity)
        .all(db)
        .await?;
    Ok(HttpResponse::Ok().json(CategoryView::from_parts(category, subs)))
}

#[post("/categories")]
pub async fn create_category(
    client: ClientCtx,
    form: web::Json<CategoryForm>,
) -> Result<HttpResponse, ApiError> {
    client.require_login()?;
    form.validate()?;
    let category = insert_category(get_db_pool(), &form).await?;
    Ok(HttpResponse::Created().json(CategoryView::from_parts(category, Vec::new())))
}

/// Title edits never touch the slug.
async fn update_category(
    client: ClientCtx,
    id: i32,
    form: CategoryForm,
) -> Result<HttpResponse, ApiError> {
    client.require_login()?;
    form.validate()?;

    let db = get_db_pool();
    let category = categories::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Category"))?;

    let mut active: categories::ActiveModel = category.into();
    active.title = Set(form.title);
    let category = active.update(db).await?;

    let subs = category
        .find_related(sub_categories::Entity)
        .all(db)
        .await?;
    Ok(HttpResponse::Ok().json(CategoryView::from_parts(category, subs)))
}

#[put("/categories/{id}")]
pub async fn update_category_put(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<CategoryForm>,
) -> Result<HttpResponse, ApiError> {
    update_category(client, path.into_inner().0, form.into_inner()).await
}

#[patch("/categories/{id}")]
pub async fn update_category_patch(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<CategoryForm>,
) -> Result<HttpResponse, ApiError> {
    update_category(client, path.into_inner().0, form.into_inner()).await
}

/// Cascades to sub-categories and their blog links; the blogs themselves
/// survive with fewer links.
#[delete("/categories/{id}")]
pub async fn delete_category(
    client: ClientCtx,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, ApiError> {
    client.require_login()?;
    let id = path.into_inner().0;
    let result = categories::Entity::delete_by_id(id)
        .exec(get_db_pool())
        .await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("Category"));
    }
    log::info!("Category deleted: category_id={}", id);
    Ok(HttpResponse::NoContent().finish())
}
