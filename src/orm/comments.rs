//! SeaORM Entity for comments table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub blog_id: i32,
    /// Threading. Deleting a parent cascades to its replies.
    pub comment_parent_id: Option<i32>,
    pub commenter_id: i32,
    pub body: String,
    pub created_at: DateTime,
    pub status: super::ContentStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::blogs::Entity",
        from = "Column::BlogId",
        to = "super::blogs::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Blog,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::CommentParentId",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Parent,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CommenterId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Commenter,
}

impl Related<super::blogs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blog.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commenter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
