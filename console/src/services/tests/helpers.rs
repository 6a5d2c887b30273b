//! Service test helpers

use std::sync::Arc;

use wiremock::MockServer;

use crate::core::config_store::ConfigStore;
use crate::services::api_gateway::RealApiGateway;

/// Gateway pointed at a fresh mock server, with in-memory config
pub async fn gateway_with_server() -> (RealApiGateway, MockServer, Arc<ConfigStore>) {
    let server = MockServer::start().await;
    let config = Arc::new(ConfigStore::in_memory());
    let gateway = RealApiGateway::new(&server.uri(), config.clone()).expect("valid mock server URI");
    (gateway, server, config)
}
