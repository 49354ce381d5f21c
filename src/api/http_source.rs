use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{error, info};

use super::types::{PageQuery, ProductPage, ProductSource};
use crate::error::Error;

/// Fetches product pages over http, `GET <base>?limit=..&skip=..`.
pub struct HttpProductSource {
  client: Client,
  base_url: Url,
}

impl HttpProductSource {
  pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<HttpProductSource, Error> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }
    HttpProductSource::with_client(base_url, builder.build()?)
  }

  fn with_client(base_url: &str, client: Client) -> Result<HttpProductSource, Error> {
    Ok(HttpProductSource { client, base_url: Url::parse(base_url)? })
  }

  pub fn page_url(&self, query: &PageQuery) -> Url {
    let mut url = self.base_url.clone();
    url.query_pairs_mut().append_pair("limit", &query.limit.to_string()).append_pair("skip", &query.skip.to_string());
    url
  }
}

#[async_trait]
impl ProductSource for HttpProductSource {
  async fn fetch_page(&self, query: PageQuery) -> Result<ProductPage, Error> {
    let url = self.page_url(&query);
    info!("Fetching page {} from {}", query.page, url);

    let response = self.client.get(url.clone()).send().await.inspect_err(|err| {
      error!("Request to {} failed: {}", url, err);
    })?;

    let status = response.status();
    if !status.is_success() {
      error!("Request to {} returned {}", url, status);
      return Err(Error::UnexpectedStatus(status));
    }

    let body = response.bytes().await?;
    let page: ProductPage = serde_json::from_slice(&body).inspect_err(|err| {
      error!("Failed to decode page {}: {}", query.page, err);
    })?;
    info!("Received {} products for page {} (total {})", page.products.len(), query.page, page.total);
    Ok(page)
  }
}
