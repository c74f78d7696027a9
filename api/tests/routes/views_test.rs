#[cfg(test)]
mod tests {
    use crate::helpers::{get_json, make_test_app};
    use api::{routes::app, state::AppState};
    use axum::http::StatusCode;
    use serde_json::json;
    use serial_test::serial;
    use util::{config::AppConfig, test_helpers::setup_test_data_dir};

    #[tokio::test]
    async fn first_visit_counts_and_burst_is_throttled() {
        let (test_app, _) = make_test_app();

        let (status, _, json) = get_json(&test_app.app, "/api/views", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "views": 1 }));

        for _ in 0..5 {
            let (status, _, json) = get_json(&test_app.app, "/api/views", None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json, json!({ "views": 1 }));
        }

        let raw = std::fs::read_to_string(test_app.data.path().join("views.json")).unwrap();
        assert_eq!(raw, r#"{"views":1}"#);
    }

    #[tokio::test]
    async fn continues_from_persisted_count() {
        let (test_app, _) = make_test_app();
        std::fs::write(test_app.data.path().join("views.json"), r#"{"views":41}"#).unwrap();

        let (status, _, json) = get_json(&test_app.app, "/api/views", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "views": 42 }));
    }

    #[tokio::test]
    async fn corrupt_counter_is_internal_error() {
        let (test_app, _) = make_test_app();
        std::fs::write(test_app.data.path().join("views.json"), "garbage").unwrap();

        let (status, _, json) = get_json(&test_app.app, "/api/views", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": "Error handling views" }));
    }

    #[tokio::test]
    #[serial]
    async fn zero_throttle_counts_every_visit() {
        let tmp = setup_test_data_dir();
        let servers = tmp.path().join("config.json");
        std::fs::write(&servers, r#"{ "servers": [] }"#).unwrap();
        AppConfig::set_servers_config(servers.to_string_lossy());
        AppConfig::set_views_throttle_ms(0);

        let app = app(AppState::init().expect("state from config"));
        AppConfig::reset();

        for expected in 1..=3 {
            let (status, _, json) = get_json(&app, "/api/views", None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json, json!({ "views": expected }));
        }
        let raw = std::fs::read_to_string(tmp.path().join("views.json")).unwrap();
        assert_eq!(raw, r#"{"views":3}"#);
    }
}
