//! SeaORM Entity for users table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account roles. Fixed at registration; no endpoint mutates it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_type")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "author")]
    Author,
    #[sea_orm(string_value = "reader")]
    Reader,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2id hash, never a plaintext password.
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::author_profiles::Entity")]
    AuthorProfile,
    #[sea_orm(has_one = "super::reader_profiles::Entity")]
    ReaderProfile,
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
    #[sea_orm(has_many = "super::points::Entity")]
    Points,
}

impl Related<super::author_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthorProfile.def()
    }
}

impl Related<super::reader_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReaderProfile.def()
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

impl ActiveModelBehavior for ActiveModel {}
