//! `303 See Other` responses used after form-style POSTs.

use actix_web::HttpResponse;
use actix_web::http::header;

use crate::domain::Username;

/// Location of the sign-in page.
pub const LOGIN_PATH: &str = "/login";
/// Location of the index redirect.
pub const INDEX_PATH: &str = "/";

/// Redirect to `location` with `303 See Other`.
pub fn see_other(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

/// Path of a user's dashboard.
pub fn dashboard_path(username: &Username) -> String {
    format!("/user/{username}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use rstest::rstest;

    #[rstest]
    fn see_other_sets_location() {
        let response = see_other("/login");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/login")
        );
    }

    #[rstest]
    fn dashboard_path_uses_username() {
        let username = Username::new("ada").expect("valid");
        assert_eq!(dashboard_path(&username), "/user/ada");
    }
}
