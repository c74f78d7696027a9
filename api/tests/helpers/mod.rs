pub mod app;
pub mod proxy;

pub use app::{StubSampler, TestApp, get_json, make_test_app, make_test_app_with};
pub use proxy::spawn_proxy;
