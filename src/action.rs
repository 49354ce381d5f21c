use serde::{Deserialize, Serialize};
use strum::Display;

use crate::api::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Display, Deserialize)]
pub enum Action {
  Error(String),
  PageDown,
  PageFailed { generation: u64, page: u32, message: String },
  PageLoaded { generation: u64, page: u32, products: Vec<Product>, total: u64 },
  PageUp,
  Quit,
  Reload,
  Render,
  Resize(u16, u16),
  Resume,
  ScrollDown,
  ScrollToBottom,
  ScrollToTop,
  ScrollUp,
  Suspend,
  Tick,
}
