//! Nullable image fields on update forms: absent, null and value are
//! three distinct inputs.

use inkpot::web::author_profiles::AuthorProfileUpdateForm;
use inkpot::web::blogs::BlogUpdateForm;
use serde_json::json;

#[test]
fn absent_cover_image_leaves_it_untouched() {
    let form: BlogUpdateForm = serde_json::from_value(json!({ "title": "New title" })).unwrap();
    assert_eq!(form.cover_image, None);
}

#[test]
fn null_cover_image_clears_it() {
    let form: BlogUpdateForm = serde_json::from_value(json!({ "cover_image": null })).unwrap();
    assert_eq!(form.cover_image, Some(None));
}

#[test]
fn cover_image_value_replaces_it() {
    let form: BlogUpdateForm =
        serde_json::from_value(json!({ "cover_image": "covers/7.png" })).unwrap();
    assert_eq!(form.cover_image, Some(Some("covers/7.png".to_owned())));
}

#[test]
fn profile_image_distinguishes_null_from_absent() {
    let absent: AuthorProfileUpdateForm =
        serde_json::from_value(json!({ "country": "Iceland" })).unwrap();
    assert_eq!(absent.profile_image, None);

    let cleared: AuthorProfileUpdateForm =
        serde_json::from_value(json!({ "profile_image": null })).unwrap();
    assert_eq!(cleared.profile_image, Some(None));

    let replaced: AuthorProfileUpdateForm =
        serde_json::from_value(json!({ "profile_image": "avatars/3.png" })).unwrap();
    assert_eq!(replaced.profile_image, Some(Some("avatars/3.png".to_owned())));
}
