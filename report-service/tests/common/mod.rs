//! Shared helpers for report-service integration tests.

use report_service::config::{ModelConfig, OpenAiSettings, ReportConfig};
use report_service::services::providers::CompletionProvider;
use report_service::startup::Application;
use service_core::config::Config;
use std::sync::Arc;
use std::time::Duration;

/// Build a test configuration bound to a random port. The base URL is
/// unroutable on purpose: nothing in these tests may reach the network.
pub fn test_config(api_key: &str) -> ReportConfig {
    ReportConfig {
        common: Config {
            port: 0,
            log_level: "info".to_string(),
        },
        openai: OpenAiSettings {
            api_key: api_key.to_string(),
            base_url: "http://localhost:1/v1".to_string(),
        },
        models: ModelConfig {
            text_model: "gpt-4".to_string(),
        },
    }
}

/// Spawn the application with the given provider and return the port
/// it listens on.
pub async fn spawn_app(api_key: &str, provider: Arc<dyn CompletionProvider>) -> u16 {
    let app = Application::build_with_provider(test_config(api_key), provider)
        .await
        .expect("Failed to build application");

    let port = app.port();

    // Spawn the server in the background
    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    port
}
