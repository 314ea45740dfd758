//! Read-time aggregates for blog views.
//!
//! Counts and averages are always computed from the current dependent
//! rows, never stored, so they cannot drift from the data.

use crate::orm::{blogs, comments, points};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter};

#[derive(Debug, Clone, PartialEq)]
pub struct BlogStats {
    pub comment_count: u64,
    pub point_count: u64,
    /// Mean star rating rounded to two decimals. `None` when nothing has
    /// been rated yet; never 0 or NaN for "no ratings".
    pub point_average: Option<f64>,
}

pub fn summarize_points(stars: &[i16]) -> (u64, Option<f64>) {
    if stars.is_empty() {
        return (0, None);
    }
    let sum: i64 = stars.iter().map(|s| i64::from(*s)).sum();
    let mean = sum as f64 / stars.len() as f64;
    (stars.len() as u64, Some((mean * 100.0).round() / 100.0))
}

pub async fn get_blog_stats(db: &DatabaseConnection, blog_id: i32) -> Result<BlogStats, DbErr> {
    // All statuses count; moderation does not hide a comment from the tally.
    let comment_count = comments::Entity::find()
        .filter(comments::Column::BlogId.eq(blog_id))
        .count(db)
        .await?;

    let stars: Vec<i16> = points::Entity::find()
        .filter(points::Column::BlogId.eq(blog_id))
        .all(db)
        .await?
        .iter()
        .map(|p| p.star)
        .collect();
    let (point_count, point_average) = summarize_points(&stars);

    Ok(BlogStats {
        comment_count,
        point_count,
        point_average,
    })
}

pub async fn get_author_blog_count(
    db: &DatabaseConnection,
    author_id: i32,
) -> Result<u64, DbErr> {
    blogs::Entity::find()
        .filter(blogs::Column::AuthorId.eq(author_id))
        .count(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_points_means_no_average() {
        assert_eq!(summarize_points(&[]), (0, None));
    }

    #[test]
    fn average_is_rounded_to_two_decimals() {
        assert_eq!(summarize_points(&[3, 4]), (2, Some(3.5)));
        assert_eq!(summarize_points(&[2, 3, 3]), (3, Some(2.67)));
        assert_eq!(summarize_points(&[1, 1, 2, 5, 5]), (5, Some(2.8)));
    }

    #[test]
    fn single_point_is_its_own_average() {
        assert_eq!(summarize_points(&[5]), (1, Some(5.0)));
    }
}
