use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{categories, sub_categories};
use crate::slug;
use crate::web::error::{map_unique_violation, ApiError};
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_sub_categories)
        .service(view_sub_category)
        .service(create_sub_category)
        .service(update_sub_category_put)
        .service(update_sub_category_patch)
        .service(delete_sub_category);
}

#[derive(Debug, Serialize)]
pub struct SubCategoryView {
    pub id: i32,
    pub category_id: i32,
    pub title: String,
    pub slug: String,
}

impl From<sub_categories::Model> for SubCategoryView {
    fn from(sub: sub_categories::Model) -> Self {
        Self {
            id: sub.id,
            category_id: sub.category_id,
            title: sub.title,
            slug: sub.slug,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubCategoryForm {
    pub category_id: i32,
    #[validate(length(min = 1, max = 300))]
    pub title: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubCategoryUpdateForm {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
}

async fn find_free_slug(db: &DatabaseConnection, base: &str) -> Result<String, sea_orm::DbErr> {
    let taken: Vec<String> = sub_categories::Entity::find()
        .filter(sub_categories::Column::Slug.starts_with(base))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.slug)
        .collect();
    Ok(slug::disambiguate(base, &taken))
}

pub async fn insert_sub_category(
    db: &DatabaseConnection,
    form: &SubCategoryForm,
) -> Result<sub_categories::Model, ApiError> {
    categories::Entity::find_by_id(form.category_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Category"))?;

    let slug = find_free_slug(db, &slug::slugify(&form.title)).await?;
    let sub = sub_categories::ActiveModel {
        category_id: Set(form.category_id),
        title: Set(form.title.clone()),
        slug: Set(slug),
        ..Default::default()
    };
    sub.insert(db)
        .await
        .map_err(|e| map_unique_violation(e, "A sub-category with this slug already exists."))
}

#[derive(Debug, Deserialize)]
pub struct SubCategoryFilters {
    pub category: Option<i32>,
}

#[get("/subcategories")]
pub async fn list_sub_categories(
    query: web::Query<SubCategoryFilters>,
) -> Result<HttpResponse, ApiError> {
    let mut select = sub_categories::Entity::find().order_by_asc(sub_categories::Column::Id);
    if let Some(category_id) = query.category {
        select = select.filter(sub_categories::Column::CategoryId.eq(category_id));
    }
    let rows = select.all(get_db_pool()).await?;
    Ok(HttpResponse::Ok().json(rows.into_iter().map(SubCategoryView::from).collect::<Vec<_>>()))
}

#[get("/subcategories/{id}")]
pub async fn view_sub_category(path: web::Path<(i32,)>) -> Result<HttpResponse, ApiError> {
    let sub = sub_categories::Entity::find_by_id(path.into_inner().0)
        .one(get_db_pool())
        .await?
        .ok_or_else(|| ApiError::not_found("Sub-category"))?;
    Ok(HttpResponse::Ok().json(SubCategoryView::from(sub)))
}

#[post("/subcategories")]
pub async fn create_sub_category(
    client: ClientCtx,
    form: web::Json<SubCategoryForm>,
) -> Result<HttpResponse, ApiError> {
    client.require_login()?;
    form.validate()?;
    let sub = insert_sub_category(get_db_pool(), &form).await?;
    Ok(HttpResponse::Created().json(SubCategoryView::from(sub)))
}

/// Title edits never touch the slug; the parent category is fixed.
async fn update_sub_category(
    client: ClientCtx,
    id: i32,
    form: SubCategoryUpdateForm,
) -> Result<HttpResponse, ApiError> {
    client.require_login()?;
    form.validate()?;

    let db = get_db_pool();
    let sub = sub_categories::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Sub-category"))?;

    let mut active: sub_categories::ActiveModel = sub.into();
    active.title = Set(form.title);
    let sub = active.update(db).await?;
    Ok(HttpResponse::Ok().json(SubCategoryView::from(sub)))
}

#[put("/subcategories/{id}")]
pub async fn update_sub_category_put(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<SubCategoryUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    update_sub_category(client, path.into_inner().0, form.into_inner()).await
}

#[patch("/subcategories/{id}")]
pub async fn update_sub_category_patch(
    client: ClientCtx,
    path: web::Path<(i32,)>,
    form: web::Json<SubCategoryUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    update_sub_category(client, path.into_inner().0, form.into_inner()).await
}

#[delete("/subcategories/{id}")]
pub async fn delete_sub_category(
    client: ClientCtx,
    path: web::Path<(i32,)>,
) -> Result<HttpResponse, ApiError> {
    client.require_login()?;
    let id = path.into_inner().0;
    let result = sub_categories::Entity::delete_by_id(id)
        .exec(get_db_pool())
        .await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("Sub-category"));
    }
    Ok(HttpResponse::NoContent().finish())
}
