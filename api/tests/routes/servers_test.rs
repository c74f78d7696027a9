#[cfg(test)]
mod tests {
    use crate::helpers::{StubSampler, get_json, make_test_app, make_test_app_with};
    use api::{routes::app, state::AppState};
    use axum::http::StatusCode;
    use serde_json::json;
    use serial_test::serial;
    use std::sync::Arc;
    use telemetry::HostRegistry;
    use util::{config::AppConfig, test_helpers::setup_test_data_dir};

    #[tokio::test]
    async fn lists_hosts_in_configuration_order() {
        let (test_app, _) = make_test_app();

        let (status, _, json) = get_json(&test_app.app, "/api/servers", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!([
                { "name": "gpu-a", "ip": "10.0.0.1" },
                { "name": "gpu-b", "ip": "10.0.0.2" }
            ])
        );
    }

    #[tokio::test]
    async fn keeps_extra_keys_and_hides_credentials() {
        let registry = HostRegistry::from_json(
            r#"{
                "servers": [
                    {
                        "name": "lab-1",
                        "ip": "192.168.1.20",
                        "username": "ops",
                        "privateKeyPath": "/home/ops/.ssh/id_ed25519",
                        "rack": "B4"
                    },
                    { "name": "lab-2", "ip": "192.168.1.21", "proxyURL": "http://proxy:3000/gpu-data" }
                ]
            }"#,
        )
        .unwrap();
        let test_app =
            make_test_app_with(registry.hosts().to_vec(), Arc::new(StubSampler::default()));

        let (status, _, json) = get_json(&test_app.app, "/api/servers", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!([
                { "name": "lab-1", "ip": "192.168.1.20", "rack": "B4" },
                { "name": "lab-2", "ip": "192.168.1.21", "proxy": "http://proxy:3000/gpu-data" }
            ])
        );
    }

    #[tokio::test]
    #[serial]
    async fn init_loads_hosts_from_configured_file() {
        let tmp = setup_test_data_dir();
        let servers = tmp.path().join("config.json");
        std::fs::write(
            &servers,
            r#"{ "servers": [ { "name": "only", "ip": "10.1.0.1" } ] }"#,
        )
        .unwrap();
        AppConfig::set_servers_config(servers.to_string_lossy());

        let state = AppState::init().expect("state from config");
        let (status, _, json) = get_json(&app(state), "/api/servers", None).await;

        AppConfig::reset();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!([{ "name": "only", "ip": "10.1.0.1" }]));
    }

    #[tokio::test]
    #[serial]
    async fn init_fails_without_host_file() {
        let tmp = setup_test_data_dir();
        AppConfig::set_servers_config(tmp.path().join("missing.json").to_string_lossy());

        let result = AppState::init();

        AppConfig::reset();
        assert!(result.is_err());
    }
}
