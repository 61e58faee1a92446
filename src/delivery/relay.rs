use async_trait::async_trait;
use reqwest::Client;

use super::{DeliveryRequest, DeliveryRoute, RouteReply, post_json};

/// How a relay expects the target URL to be embedded.
#[derive(Debug, Clone, Copy)]
enum WrapStyle {
    /// Target appended verbatim: `https://relay/?https://target`.
    Prefix,
    /// Target percent-encoded into a `url` query parameter.
    EncodedQuery,
}

/// A relay tunnel that forwards the request to the real endpoint. Headers
/// and body pass through untouched; only the URL is wrapped.
pub struct RelayRoute {
    name: String,
    base: String,
    style: WrapStyle,
}

impl RelayRoute {
    pub fn prefix(name: &str, base: &str) -> Self {
        Self {
            name: name.to_string(),
            base: base.to_string(),
            style: WrapStyle::Prefix,
        }
    }

    pub fn encoded_query(name: &str, base: &str) -> Self {
        Self {
            name: name.to_string(),
            base: base.to_string(),
            style: WrapStyle::EncodedQuery,
        }
    }

    pub fn wrapped_url(&self, target: &str) -> anyhow::Result<String> {
        match self.style {
            WrapStyle::Prefix => Ok(format!("{}{}", self.base, target)),
            WrapStyle::EncodedQuery => {
                let mut url = reqwest::Url::parse(&self.base)?;
                url.query_pairs_mut().append_pair("url", target);
                Ok(url.to_string())
            }
        }
    }
}

#[async_trait]
impl DeliveryRoute for RelayRoute {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(
        &self,
        client: &Client,
        request: &DeliveryRequest<'_>,
    ) -> anyhow::Result<RouteReply> {
        let url = self.wrapped_url(request.target_url)?;
        post_json(client, &url, request).await
    }
}
