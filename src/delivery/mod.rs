pub mod direct;
pub mod relay;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

/// One delivery attempt's input: the fixed ingestion URL plus the
/// configured credentials and the mapped payload.
#[derive(Debug, Clone)]
pub struct DeliveryRequest<'a> {
    pub target_url: &'a str,
    pub api_key: &'a str,
    pub environment: &'a str,
    pub body: &'a serde_json::Value,
}

/// Raw reply from one route. Classification (2xx = success) is the sync
/// engine's job, not the route's.
#[derive(Debug, Clone)]
pub struct RouteReply {
    pub status: u16,
    pub body: String,
}

/// One network path to the ingestion endpoint: the direct call, or a relay
/// that wraps the target URL. Routes are tried in order until one replies
/// with a 2xx.
#[async_trait]
pub trait DeliveryRoute: Send + Sync {
    fn name(&self) -> &str;
    async fn deliver(
        &self,
        client: &Client,
        request: &DeliveryRequest<'_>,
    ) -> anyhow::Result<RouteReply>;
}

/// The default ordered path list: direct first, then the relay tunnels.
pub fn build_route_list() -> Vec<Arc<dyn DeliveryRoute>> {
    vec![
        Arc::new(direct::DirectRoute),
        Arc::new(relay::RelayRoute::prefix(
            "corsproxy",
            "https://corsproxy.io/?",
        )),
        Arc::new(relay::RelayRoute::encoded_query(
            "allorigins",
            "https://api.allorigins.win/raw",
        )),
        Arc::new(relay::RelayRoute::prefix(
            "thingproxy",
            "https://thingproxy.freeboard.io/fetch/",
        )),
    ]
}

/// Shared POST helper: all routes use the same method, headers and body,
/// only the URL differs.
pub(crate) async fn post_json(
    client: &Client,
    url: &str,
    request: &DeliveryRequest<'_>,
) -> anyhow::Result<RouteReply> {
    let resp = client
        .post(url)
        .header("Content-Type", "application/json")
        .header("api-key", request.api_key)
        .header("env", request.environment)
        .json(request.body)
        .send()
        .await?;

    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Ok(RouteReply { status, body })
}
