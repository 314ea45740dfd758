//! Shared fixtures for the integration tests. Everything runs against
//! sea-orm's MockDatabase, so no live Postgres is required.
#![allow(dead_code)]

use chrono::NaiveDateTime;
use inkpot::orm::{blogs, categories, points, users, ContentStatus};

pub fn timestamp() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2026, 1, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn sample_user(id: i32, user_type: users::UserType) -> users::Model {
    users::Model {
        id,
        username: format!("user{}", id),
        password: "$argon2id$v=19$m=4096,t=3,p=1$c2FsdHNhbHQ$AAAAAAAAAAA".to_owned(),
        email: format!("user{}@example.com", id),
        first_name: String::new(),
        last_name: String::new(),
        user_type,
        created_at: timestamp(),
    }
}

pub fn sample_blog(id: i32, author_id: i32) -> blogs::Model {
    blogs::Model {
        id,
        author_id,
        cover_image: None,
        title: "Sample blog".to_owned(),
        slug: format!("sample-blog-{}", id),
        body: "Body text.".to_owned(),
        created_at: timestamp(),
        updated_at: timestamp(),
        status: ContentStatus::Confirmed,
    }
}

pub fn sample_point(id: i32, blog_id: i32, pointer_id: i32, star: i16) -> points::Model {
    points::Model {
        id,
        blog_id,
        pointer_id,
        star,
    }
}

pub fn sample_category(id: i32, title: &str, slug: &str) -> categories::Model {
    categories::Model {
        id,
        title: title.to_owned(),
        slug: slug.to_owned(),
    }
}
