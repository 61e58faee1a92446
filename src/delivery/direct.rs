use async_trait::async_trait;
use reqwest::Client;

use super::{DeliveryRequest, DeliveryRoute, RouteReply, post_json};

/// Plain POST to the ingestion endpoint, no intermediary.
pub struct DirectRoute;

#[async_trait]
impl DeliveryRoute for DirectRoute {
    fn name(&self) -> &str {
        "direct"
    }

    async fn deliver(
        &self,
        client: &Client,
        request: &DeliveryRequest<'_>,
    ) -> anyhow::Result<RouteReply> {
        post_json(client, request.target_url, request).await
    }
}
