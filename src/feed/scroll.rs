use super::state::FeedState;

/// Default distance from the bottom, in rows, at which the next page is requested.
pub const DEFAULT_THRESHOLD: u32 = 10;

/// Where the viewport sits within the scrolled content. All values share one unit, rows in the terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
  pub scroll_top: u32,
  pub viewport_height: u32,
  pub document_height: u32,
}

impl ScrollMetrics {
  pub fn near_bottom(&self, threshold: u32) -> bool {
    u64::from(self.scroll_top) + u64::from(self.viewport_height) + u64::from(threshold)
      > u64::from(self.document_height)
  }
}

/// Decides on every scroll event whether the next page should be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMonitor {
  threshold: u32,
}

impl Default for ScrollMonitor {
  fn default() -> Self {
    ScrollMonitor { threshold: DEFAULT_THRESHOLD }
  }
}

impl ScrollMonitor {
  pub fn new(threshold: u32) -> Self {
    ScrollMonitor { threshold }
  }

  /// The page to fetch, if the viewport is near the bottom, nothing is loading and pages remain.
  pub fn page_to_fetch(&self, metrics: ScrollMetrics, feed: &FeedState) -> Option<u32> {
    if metrics.near_bottom(self.threshold) && !feed.is_loading() && feed.has_more_pages() {
      Some(feed.next_page())
    } else {
      None
    }
  }
}
