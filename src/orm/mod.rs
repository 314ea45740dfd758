//! SeaORM entities for the blog platform schema.

pub mod author_profiles;
pub mod blog_sub_categories;
pub mod blogs;
pub mod categories;
pub mod comments;
pub mod points;
pub mod reader_profiles;
pub mod sub_categories;
pub mod users;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Moderation status shared by author profiles, blogs and comments.
/// New rows start as `Awaiting` until staff confirm or reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "content_status")]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[sea_orm(string_value = "awaiting")]
    Awaiting,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}
