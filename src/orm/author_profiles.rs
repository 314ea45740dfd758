//! SeaORM Entity for author_profiles table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "author_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// One profile per user, enforced by a unique index.
    #[sea_orm(unique)]
    pub user_id: i32,
    /// Blob-store path of the profile image, if one was uploaded.
    pub profile_image: Option<String>,
    pub country: String,
    pub phone_number: String,
    pub status: super::ContentStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::blogs::Entity")]
    Blogs,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::blogs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
