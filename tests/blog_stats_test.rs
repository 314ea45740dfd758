//! Read-time aggregate behavior for blog detail views.
mod common;

use common::sample_point;
use inkpot::blog::{get_blog_stats, BlogStats};
use inkpot::orm::points;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use std::collections::BTreeMap;

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

#[actix_rt::test]
async fn blog_with_no_points_reports_null_average() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(0)]])
        .append_query_results([Vec::<points::Model>::new()])
        .into_connection();

    let stats = get_blog_stats(&db, 1).await.unwrap();
    assert_eq!(
        stats,
        BlogStats {
            comment_count: 0,
            point_count: 0,
            point_average: None,
        }
    );
}

#[actix_rt::test]
async fn average_of_three_and_four_stars_is_three_point_five() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(2)]])
        .append_query_results([vec![
            sample_point(1, 1, 10, 3),
            sample_point(2, 1, 11, 4),
        ]])
        .into_connection();

    let stats = get_blog_stats(&db, 1).await.unwrap();
    assert_eq!(stats.comment_count, 2);
    assert_eq!(stats.point_count, 2);
    assert_eq!(stats.point_average, Some(3.5));
}

#[actix_rt::test]
async fn single_point_average_is_that_star() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(0)]])
        .append_query_results([vec![sample_point(1, 1, 10, 5)]])
        .into_connection();

    let stats = get_blog_stats(&db, 1).await.unwrap();
    assert_eq!(stats.point_count, 1);
    assert_eq!(stats.point_average, Some(5.0));
}

#[actix_rt::test]
async fn five_point_average_rounds_to_two_decimals() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(3)]])
        .append_query_results([vec![
            sample_point(1, 1, 10, 1),
            sample_point(2, 1, 11, 1),
            sample_point(3, 1, 12, 2),
            sample_point(4, 1, 13, 5),
            sample_point(5, 1, 14, 5),
        ]])
        .into_connection();

    let stats = get_blog_stats(&db, 1).await.unwrap();
    assert_eq!(stats.point_count, 5);
    assert_eq!(stats.point_average, Some(2.8));
}
