//! Test utilities for building the application in handler tests.

use axum_test::TestServer;

use crate::config::Config;

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    }
}

pub fn create_test_app() -> TestServer {
    create_test_app_with_config(create_test_config())
}

pub fn create_test_app_with_config(config: Config) -> TestServer {
    crate::Application::new(config)
        .expect("Failed to create application")
        .into_test_server()
}
