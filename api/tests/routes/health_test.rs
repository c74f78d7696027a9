#[cfg(test)]
mod tests {
    use crate::helpers::{get_json, make_test_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn health_check_returns_ok_json() {
        let (test_app, _) = make_test_app();

        let (status, _, json) = get_json(&test_app.app, "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "OK");
        assert_eq!(json["message"], "Health check passed");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (test_app, _) = make_test_app();

        let (status, _, _) = get_json(&test_app.app, "/api/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
