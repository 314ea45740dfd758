//! SeaORM Entity for blogs table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "blogs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub author_id: i32,
    /// Blob-store path of the cover image, if one was uploaded.
    pub cover_image: Option<String>,
    pub title: String,
    /// Derived from the title at creation and immutable afterwards.
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_at: DateTime,
    /// Refreshed on every mutation.
    pub updated_at: DateTime,
    pub status: super::ContentStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::author_profiles::Entity",
        from = "Column::AuthorId",
        to = "super::author_profiles::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::blog_sub_categories::Entity")]
    BlogSubCategories,
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
    #[sea_orm(has_many = "super::points::Entity")]
    Points,
}

impl Related<super::author_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::blog_sub_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BlogSubCategories.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::points::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Points.def()
    }
}

impl Related<super::sub_categories::Entity> for Entity {
    fn to() -> RelationDef {
        super::blog_sub_categories::Relation::SubCategory.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::blog_sub_categories::Relation::Blog.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
