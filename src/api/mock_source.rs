use std::{collections::HashSet, sync::Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;

use super::types::{PageQuery, Product, ProductPage, ProductSource};
use crate::error::Error;

/// Serves `total` synthetic products, failing with a 500 for any page listed in `failing_pages`.
#[derive(Debug, Default)]
pub struct MockProductSource {
  total: u64,
  failing_pages: Mutex<HashSet<u32>>,
  requests: Mutex<Vec<PageQuery>>,
}

impl MockProductSource {
  pub fn with_total(total: u64) -> Self {
    MockProductSource { total, ..Default::default() }
  }

  pub fn fail_page(&self, page: u32) {
    self.failing_pages.lock().unwrap().insert(page);
  }

  pub fn recover_page(&self, page: u32) {
    self.failing_pages.lock().unwrap().remove(&page);
  }

  pub fn requests(&self) -> Vec<PageQuery> {
    self.requests.lock().unwrap().clone()
  }
}

#[async_trait]
impl ProductSource for MockProductSource {
  async fn fetch_page(&self, query: PageQuery) -> Result<ProductPage, Error> {
    self.requests.lock().unwrap().push(query);
    if self.failing_pages.lock().unwrap().contains(&query.page) {
      return Err(Error::UnexpectedStatus(StatusCode::INTERNAL_SERVER_ERROR));
    }

    let start = u64::from(query.skip);
    let end = (start + u64::from(query.limit)).min(self.total);
    let products = (start..end)
      .map(|index| {
        let id = index + 1;
        Product::new(id, format!("Product {id}"), format!("https://cdn.example/products/{id}/thumbnail.png"))
      })
      .collect();

    Ok(ProductPage { products, total: self.total })
  }
}
