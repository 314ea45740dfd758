//! Star-rating rules: range validation and one-point-per-user enforcement.
mod common;

use common::{sample_blog, sample_point};
use inkpot::orm::points;
use inkpot::web::error::{map_unique_violation, ApiError};
use inkpot::web::points::{submit_point, PointForm};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, RuntimeErr};
use validator::Validate;

#[test]
fn star_outside_one_to_five_fails_validation() {
    assert!(PointForm { blog_id: 1, star: 0 }.validate().is_err());
    assert!(PointForm { blog_id: 1, star: 6 }.validate().is_err());
    for star in 1..=5 {
        assert!(PointForm { blog_id: 1, star }.validate().is_ok());
    }
}

#[actix_rt::test]
async fn second_rating_for_same_blog_is_a_conflict() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_blog(1, 1)]])
        .append_query_results([vec![sample_point(1, 1, 7, 4)]])
        .into_connection();

    let result = submit_point(&db, 7, &PointForm { blog_id: 1, star: 2 }).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));
}

#[actix_rt::test]
async fn rating_a_missing_blog_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<inkpot::orm::blogs::Model>::new()])
        .into_connection();

    let result = submit_point(&db, 7, &PointForm { blog_id: 99, star: 3 }).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[actix_rt::test]
async fn fresh_rating_is_inserted() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_blog(1, 1)]])
        .append_query_results([Vec::<points::Model>::new()])
        .append_query_results([vec![sample_point(1, 1, 7, 4)]])
        .into_connection();

    let point = submit_point(&db, 7, &PointForm { blog_id: 1, star: 4 })
        .await
        .unwrap();
    assert_eq!(point.star, 4);
    assert_eq!(point.pointer_id, 7);
}

#[test]
fn unique_violation_maps_to_conflict() {
    let err = DbErr::Query(RuntimeErr::Internal(
        "duplicate key value violates unique constraint \"unique_point_per_user\"".to_owned(),
    ));
    assert!(matches!(
        map_unique_violation(err, "You have already rated this blog."),
        ApiError::Conflict(_)
    ));
}

#[test]
fn other_database_errors_stay_database_errors() {
    let err = DbErr::Query(RuntimeErr::Internal("connection reset".to_owned()));
    assert!(matches!(
        map_unique_violation(err, "irrelevant"),
        ApiError::Database(_)
    ));
}
