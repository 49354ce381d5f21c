use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// Number of products requested per page.
pub const PAGE_SIZE: u32 = 10;

/// A single product as returned by the api. Nothing is validated: the id is kept as whatever json the server sent,
/// the text fields fall back to empty, and everything else is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  #[serde(default)]
  pub id: Value,
  #[serde(default, deserialize_with = "lenient_text")]
  pub title: String,
  #[serde(default, deserialize_with = "lenient_text")]
  pub thumbnail: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Product {
  pub fn new(id: impl Into<Value>, title: String, thumbnail: String) -> Self {
    Product { id: id.into(), title, thumbnail, extra: Map::new() }
  }
}

/// Strings pass through, `null` becomes empty, any other json value is shown in its json form.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  let text = match Value::deserialize(deserializer)? {
    Value::String(text) => text,
    Value::Null => String::new(),
    other => other.to_string(),
  };
  Ok(text)
}

/// The part of a paginated response the feed cares about. `skip` and `limit` are echoed back by the server but
/// ignored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
  pub products: Vec<Product>,
  pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
  pub page: u32,
  pub limit: u32,
  pub skip: u32,
}

impl PageQuery {
  pub fn for_page(page: u32) -> Result<Self, Error> {
    if page == 0 {
      return Err(Error::InvalidPage(page));
    }
    let skip = PAGE_SIZE.checked_mul(page - 1).ok_or(Error::InvalidPage(page))?;
    Ok(PageQuery { page, limit: PAGE_SIZE, skip })
  }
}

#[async_trait]
pub trait ProductSource: Send + Sync {
  async fn fetch_page(&self, query: PageQuery) -> Result<ProductPage, Error>;
}
