//! Blog creation writes the row and its links as one unit of work.
mod common;

use common::sample_blog;
use inkpot::orm::blogs;
use inkpot::web::blogs::{insert_blog, BlogForm};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

fn blog_form(title: &str) -> BlogForm {
    BlogForm {
        author_id: None,
        sub_category_ids: Vec::new(),
        cover_image: None,
        title: title.to_owned(),
        body: "Body text.".to_owned(),
    }
}

#[actix_rt::test]
async fn blog_row_and_links_share_one_transaction() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // slug scan, then the insert, then the junction rewrite
        .append_query_results([Vec::<blogs::Model>::new()])
        .append_query_results([vec![sample_blog(1, 1)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let blog = insert_blog(&db, 1, &[], &blog_form("Sample blog")).await.unwrap();
    assert_eq!(blog.id, 1);

    let logged = format!("{:?}", db.into_transaction_log());
    assert!(logged.contains("BEGIN"));
    assert!(logged.contains("COMMIT"));
}

#[actix_rt::test]
async fn failed_link_write_surfaces_instead_of_half_committing() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<blogs::Model>::new()])
        .append_query_results([vec![sample_blog(1, 1)]])
        .append_exec_errors([sea_orm::DbErr::Exec(sea_orm::RuntimeErr::Internal(
            "connection reset".to_owned(),
        ))])
        .into_connection();

    let result = insert_blog(&db, 1, &[], &blog_form("Sample blog")).await;
    assert!(result.is_err());

    // The transaction never reached its commit.
    let logged = format!("{:?}", db.into_transaction_log());
    assert!(logged.contains("BEGIN"));
    assert!(!logged.contains("COMMIT"));
}
