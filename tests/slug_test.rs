//! Slug derivation on insert, including collision suffixing.
mod common;

use common::sample_category;
use inkpot::slug::{disambiguate, slugify};
use inkpot::web::categories::{insert_category, CategoryForm};
use sea_orm::{DatabaseBackend, MockDatabase};

#[test]
fn slugify_normalizes_titles() {
    assert_eq!(slugify("Rust & Web Services!"), "rust-web-services");
    assert_eq!(slugify("  ---  "), "untitled");
}

#[test]
fn disambiguate_appends_numeric_suffixes() {
    let taken = vec!["news".to_owned(), "news-2".to_owned()];
    assert_eq!(disambiguate("news", &taken), "news-3");
    assert_eq!(disambiguate("sport", &taken), "sport");
}

#[actix_rt::test]
async fn colliding_category_title_gets_a_suffixed_slug() {
    // One category already owns "news", so the insert must pick "news-2".
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            vec![sample_category(1, "News", "news")],
            vec![sample_category(2, "News", "news-2")],
        ])
        .into_connection();

    let created = insert_category(
        &db,
        &CategoryForm {
            title: "News".to_owned(),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.slug, "news-2");

    let logged = format!("{:?}", db.into_transaction_log());
    assert!(logged.contains("news-2"));
}

#[actix_rt::test]
async fn fresh_title_keeps_its_plain_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            Vec::<inkpot::orm::categories::Model>::new(),
            vec![sample_category(1, "Culture", "culture")],
        ])
        .into_connection();

    let created = insert_category(
        &db,
        &CategoryForm {
            title: "Culture".to_owned(),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.slug, "culture");
}
