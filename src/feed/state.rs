use std::time::SystemTime;

use tracing::debug;

use crate::api::{PAGE_SIZE, Product};

/// The request currently in flight, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
  pub page: u32,
  pub generation: u64,
  pub started_at: SystemTime,
}

/// Transitions of the feed. Every change to [`FeedState`] goes through one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
  FetchStarted { page: u32, generation: u64 },
  FetchSucceeded { page: u32, generation: u64, products: Vec<Product>, total: u64 },
  FetchFailed { page: u32, generation: u64, message: String },
}

impl FeedEvent {
  fn generation(&self) -> u64 {
    match self {
      FeedEvent::FetchStarted { generation, .. }
      | FeedEvent::FetchSucceeded { generation, .. }
      | FeedEvent::FetchFailed { generation, .. } => *generation,
    }
  }
}

/// Accumulated pages of the infinite list.
///
/// Items are kept in fetch order. They are not de-duplicated by id, so a page that completes twice shows up twice.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
  items: Vec<Product>,
  next_page: u32,
  total: Option<u64>,
  loading: Option<InFlight>,
  last_error: Option<String>,
  generation: u64,
}

impl Default for FeedState {
  fn default() -> Self {
    FeedState { items: Vec::new(), next_page: 1, total: None, loading: None, last_error: None, generation: 0 }
  }
}

impl FeedState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn items(&self) -> &[Product] {
    &self.items
  }

  pub fn next_page(&self) -> u32 {
    self.next_page
  }

  /// The last total reported by the server, 0 until the first page arrives.
  pub fn total(&self) -> u64 {
    self.total.unwrap_or(0)
  }

  pub fn loading(&self) -> Option<InFlight> {
    self.loading
  }

  pub fn is_loading(&self) -> bool {
    self.loading.is_some()
  }

  pub fn last_error(&self) -> Option<&str> {
    self.last_error.as_deref()
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// `ceil(total / PAGE_SIZE)`
  pub fn page_count(&self) -> u64 {
    self.total().div_ceil(u64::from(PAGE_SIZE))
  }

  /// True until the server has reported a total, then while `next_page <= page_count`.
  pub fn has_more_pages(&self) -> bool {
    match self.total {
      None => true,
      Some(_) => u64::from(self.next_page) <= self.page_count(),
    }
  }

  pub fn is_exhausted(&self) -> bool {
    !self.is_loading() && !self.has_more_pages()
  }

  /// Applies `event`, returning false when it belongs to an older generation and was dropped.
  pub fn apply(&mut self, event: FeedEvent) -> bool {
    if event.generation() != self.generation {
      debug!("Discarding stale feed event from generation {}: {:?}", event.generation(), event);
      return false;
    }

    match event {
      FeedEvent::FetchStarted { page, generation } => {
        self.loading = Some(InFlight { page, generation, started_at: SystemTime::now() });
        self.last_error = None;
      },
      FeedEvent::FetchSucceeded { page, products, total, .. } => {
        self.items.extend(products);
        self.total = Some(total);
        self.next_page = page.saturating_add(1);
        self.loading = None;
      },
      FeedEvent::FetchFailed { message, .. } => {
        self.last_error = Some(message);
        self.loading = None;
      },
    }
    true
  }

  /// Drops everything loaded so far and starts a new generation, returning it.
  pub fn reload(&mut self) -> u64 {
    let generation = self.generation + 1;
    *self = FeedState { generation, ..FeedState::default() };
    generation
  }
}
