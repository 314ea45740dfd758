//! SeaORM Entity for sub_categories table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sub_categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub category_id: i32,
    pub title: String,
    /// Derived from the title at creation and immutable afterwards.
    #[sea_orm(unique)]
    pub slug: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(has_many = "super::blog_sub_categories::Entity")]
    BlogSubCategories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::blog_sub_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BlogSubCategories.def()
    }
}

impl Related<super::blogs::Entity> for Entity {
    fn to() -> RelationDef {
        super::blog_sub_categories::Relation::Blog.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::blog_sub_categories::Relation::SubCategory.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
