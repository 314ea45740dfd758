pub mod author_profiles;
pub mod blogs;
pub mod categories;
pub mod comments;
pub mod error;
pub mod login;
pub mod points;
pub mod reader_profiles;
pub mod sub_categories;
pub mod users;

/// Distinguishes an absent JSON field from an explicit null on nullable
/// update fields: absent deserializes to `None` through `#[serde(default)]`,
/// null to `Some(None)`, a value to `Some(Some(v))`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Route resolution stops at the first match, so modules with fixed
    // path segments that shadow an {id} sibling register first.
    users::configure(conf);
    login::configure(conf);
    author_profiles::configure(conf);
    reader_profiles::configure(conf);
    categories::configure(conf);
    sub_categories::configure(conf);
    blogs::configure(conf);
    comments::configure(conf);
    points::configure(conf);
}
