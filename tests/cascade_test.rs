//! Delete cascades: dependent rows follow their parents, and the junction
//! table shields blogs from category deletion.

use inkpot::orm::{
    author_profiles, blog_sub_categories, blogs, comments, points, reader_profiles, sub_categories,
};
use sea_orm::sea_query::ForeignKeyAction;
use sea_orm::{Iterable, RelationTrait};

fn cascades(def: sea_orm::RelationDef) -> bool {
    matches!(def.on_delete, Some(ForeignKeyAction::Cascade))
}

#[test]
fn deleting_a_category_takes_its_sub_categories() {
    assert!(cascades(sub_categories::Relation::Category.def()));
}

#[test]
fn deleting_a_blog_takes_its_comments_points_and_links() {
    assert!(cascades(comments::Relation::Blog.def()));
    assert!(cascades(points::Relation::Blog.def()));
    assert!(cascades(blog_sub_categories::Relation::Blog.def()));
}

#[test]
fn deleting_a_parent_comment_takes_its_replies() {
    assert!(cascades(comments::Relation::Parent.def()));
}

#[test]
fn deleting_a_user_takes_profiles_comments_and_points() {
    assert!(cascades(author_profiles::Relation::User.def()));
    assert!(cascades(reader_profiles::Relation::User.def()));
    assert!(cascades(comments::Relation::Commenter.def()));
    assert!(cascades(points::Relation::Pointer.def()));
}

#[test]
fn deleting_an_author_profile_takes_its_blogs() {
    assert!(cascades(blogs::Relation::Author.def()));
}

/// Sub-category deletion reaches the junction rows, never the blogs. The
/// only blog-side edge to sub_categories is the junction's own FK; blogs
/// reach sub_categories through `via`, not through a column of their own.
#[test]
fn category_deletion_stops_at_the_junction_table() {
    assert!(cascades(blog_sub_categories::Relation::SubCategory.def()));
    let junction_owns_the_edge = blog_sub_categories::Relation::iter()
        .all(|relation| relation.def().is_owner);
    assert!(junction_owns_the_edge);
}

/// The declared schema carries the same cascade edges the entities do.
#[test]
fn schema_declares_the_cascade_clauses() {
    let schema = include_str!("../schema.sql");
    assert_eq!(schema.matches("ON DELETE CASCADE").count(), 9);
    assert!(schema.contains("REFERENCES categories (id) ON DELETE CASCADE"));
    assert!(schema.contains("REFERENCES blogs (id) ON DELETE CASCADE"));
    assert!(schema.contains("REFERENCES comments (id) ON DELETE CASCADE"));
    assert!(schema.contains("REFERENCES author_profiles (id) ON DELETE CASCADE"));
}
