#[cfg(test)]
mod tests {
    use crate::helpers::{get_json, make_test_app};
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use telemetry::{HistoryEntry, HistoryStore, history::sanitize_key};

    #[tokio::test]
    async fn missing_ip_is_bad_request() {
        let (test_app, _) = make_test_app();

        for uri in ["/api/server-history", "/api/server-history?ip="] {
            let (status, _, json) = get_json(&test_app.app, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json, json!({ "error": "IP address is required" }));
        }
    }

    #[tokio::test]
    async fn host_without_history_is_empty() {
        let (test_app, _) = make_test_app();

        let (status, _, json) =
            get_json(&test_app.app, "/api/server-history?ip=10.0.0.77", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!([]));
    }

    #[tokio::test]
    async fn aggregates_recent_entries_oldest_first() {
        let (test_app, _) = make_test_app();
        let history = test_app.state.history();
        let now = Utc::now();

        let samples = [
            (now - Duration::days(8), vec![99, 99]),
            (now - Duration::hours(2), vec![10, 31]),
            (now - Duration::minutes(10), vec![0, 0, 100]),
        ];
        for (timestamp, util) in samples {
            history
                .append("10.0.0.1", HistoryEntry::new(timestamp, util).unwrap())
                .await
                .unwrap();
        }

        let (status, _, json) =
            get_json(&test_app.app, "/api/server-history?ip=10.0.0.1", None).await;
        assert_eq!(status, StatusCode::OK);

        let entries = json.as_array().expect("array body");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["averageUtilization"], 21);
        assert_eq!(entries[0]["maxUtilization"], 31);
        assert_eq!(entries[1]["averageUtilization"], 33);
        assert_eq!(entries[1]["maxUtilization"], 100);
        assert!(entries[0]["timestamp"].as_str().unwrap() < entries[1]["timestamp"].as_str().unwrap());
    }

    #[tokio::test]
    async fn corrupt_history_file_reads_as_empty() {
        let (test_app, _) = make_test_app();
        let file = test_app
            .data
            .path()
            .join(format!("{}_history.json", sanitize_key("10.0.0.1")));
        assert_eq!(file, test_app.data.path().join("10_0_0_1_history.json"));
        std::fs::write(&file, "{not json").unwrap();

        let (status, _, json) =
            get_json(&test_app.app, "/api/server-history?ip=10.0.0.1", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!([]));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "{not json");
    }

    #[tokio::test]
    async fn corrupt_history_is_replaced_by_next_sample() {
        let (test_app, _) = make_test_app();
        let file = test_app.data.path().join("10_0_0_1_history.json");
        std::fs::write(&file, "[{\"timestamp\": ").unwrap();

        test_app
            .state
            .history()
            .append("10.0.0.1", HistoryEntry::new(Utc::now(), vec![64]).unwrap())
            .await
            .unwrap();

        let (status, _, json) =
            get_json(&test_app.app, "/api/server-history?ip=10.0.0.1", None).await;
        assert_eq!(status, StatusCode::OK);
        let entries = json.as_array().expect("array body");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["averageUtilization"], 64);
        assert_eq!(entries[0]["maxUtilization"], 64);
    }
}
