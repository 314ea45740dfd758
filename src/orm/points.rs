//! SeaORM Entity for points (star ratings) table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "points")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub blog_id: i32,
    pub pointer_id: i32,
    /// 1..=5. The schema repeats this as a CHECK constraint, and
    /// (blog_id, pointer_id) carries a unique index so a user can
    /// rate a blog at most once.
    pub star: i16,
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
        belongs_to = "super::users::Entity",
        from = "Column::PointerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Pointer,
}

impl Related<super::blogs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blog.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pointer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
