use std::{sync::Arc, time::SystemTime};

use color_eyre::eyre::Result;
use crossterm::event::{MouseEvent, MouseEventKind};
use ratatui::{
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::Line,
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use tokio::{sync::mpsc::UnboundedSender, task::spawn};
use tracing::{debug, error, info, warn};

use super::{
  Component,
  instruction_footer::InstructionFooter,
  product_item::{self, ITEM_HEIGHT},
};
use crate::{
  action::Action,
  api::{PageQuery, ProductPage, ProductSource},
  feed::{FeedEvent, FeedState, ScrollMetrics, ScrollMonitor},
  tui::Frame,
};

const NO_MORE_ITEMS: &str = "No more items to load";

/// The infinite product list. Loads page 1 once an action handler is registered and the next page whenever a
/// scroll leaves the viewport close enough to the bottom.
pub struct ProductList {
  source: Arc<dyn ProductSource>,
  feed: FeedState,
  monitor: ScrollMonitor,
  // Index of the first visible product.
  offset: usize,
  // Inner height of the list block at the last draw.
  viewport_height: u16,
  instruction_footer: InstructionFooter,
  action_tx: Option<UnboundedSender<Action>>,
}

impl ProductList {
  pub fn new(source: Arc<dyn ProductSource>, monitor: ScrollMonitor) -> Self {
    ProductList {
      source,
      feed: FeedState::new(),
      monitor,
      offset: 0,
      viewport_height: 0,
      instruction_footer: InstructionFooter::default(),
      action_tx: None,
    }
  }

  pub fn feed(&self) -> &FeedState {
    &self.feed
  }

  /// Marks `page` as loading and requests it on a background task. The outcome comes back through the action
  /// channel as [`Action::PageLoaded`] or [`Action::PageFailed`].
  pub fn fetch_page(&mut self, page: u32) {
    let query = match PageQuery::for_page(page) {
      Ok(query) => query,
      Err(err) => {
        error!("Refusing to fetch: {}", err);
        return;
      },
    };
    let Some(tx) = self.action_tx.clone() else {
      warn!("No action handler registered, not fetching page {}", page);
      return;
    };

    let generation = self.feed.generation();
    self.feed.apply(FeedEvent::FetchStarted { page, generation });
    info!("Fetching page {} (generation {})", page, generation);

    let source = self.source.clone();
    spawn(async move {
      let action = match source.fetch_page(query).await {
        Ok(ProductPage { products, total }) => Action::PageLoaded { generation, page, products, total },
        Err(err) => {
          error!("Error fetching data: {}", err);
          Action::PageFailed { generation, page, message: err.user_message() }
        },
      };
      if let Err(err) = tx.send(action) {
        error!("Failed to send result for page {}: {}", page, err);
      }
    });
  }

  pub fn reload(&mut self) {
    let generation = self.feed.reload();
    info!("Reloading products, generation {}", generation);
    self.offset = 0;
    self.fetch_page(self.feed.next_page());
  }

  fn visible_items(&self) -> usize {
    usize::from(self.viewport_height / ITEM_HEIGHT)
  }

  fn max_offset(&self) -> usize {
    self.feed.items().len().saturating_sub(self.visible_items())
  }

  pub fn scroll_metrics(&self) -> ScrollMetrics {
    let rows = |items: usize| u32::try_from(items.saturating_mul(usize::from(ITEM_HEIGHT))).unwrap_or(u32::MAX);
    ScrollMetrics {
      scroll_top: rows(self.offset),
      viewport_height: u32::from(self.viewport_height),
      document_height: rows(self.feed.items().len()),
    }
  }

  fn scroll_to(&mut self, offset: usize) {
    self.offset = offset.min(self.max_offset());
    if let Some(page) = self.monitor.page_to_fetch(self.scroll_metrics(), &self.feed) {
      self.fetch_page(page);
    }
  }

  fn title(&self) -> String {
    let mut title = format!("Products {}/{}", self.feed.items().len(), self.feed.total());
    if let Some(in_flight) = self.feed.loading() {
      title = format!("{} - Loading page {}...({})", title, in_flight.page, format_time_elapsed(in_flight.started_at));
    }
    title
  }

  fn status_line(&self) -> Option<Line<'_>> {
    if self.feed.is_loading() {
      Some(Line::styled("Loading...", Style::default().fg(Color::Yellow)))
    } else if let Some(message) = self.feed.last_error() {
      Some(Line::styled(message, Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)))
    } else if self.feed.is_exhausted() {
      Some(Line::styled(NO_MORE_ITEMS, Style::default().fg(Color::DarkGray)))
    } else {
      None
    }
  }

  fn render_list(&mut self, f: &mut Frame<'_>, area: Rect) {
    self.viewport_height = area.height.saturating_sub(2);
    self.offset = self.offset.min(self.max_offset());

    let items: Vec<ListItem> =
      self.feed.items().iter().enumerate().map(|(position, product)| product_item::render(position, product)).collect();
    let list = List::new(items)
      .block(Block::default().title(self.title()).borders(Borders::ALL))
      .style(Style::default().fg(Color::White));

    let mut list_state = ListState::default().with_offset(self.offset);
    f.render_stateful_widget(list, area, &mut list_state);
  }
}

#[async_trait::async_trait]
impl Component for ProductList {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.action_tx = Some(tx);
    self.fetch_page(self.feed.next_page());
    Ok(())
  }

  async fn handle_mouse_events(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
    let action = match mouse.kind {
      MouseEventKind::ScrollDown => Some(Action::ScrollDown),
      MouseEventKind::ScrollUp => Some(Action::ScrollUp),
      _ => None,
    };
    Ok(action)
  }

  async fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::ScrollDown => self.scroll_to(self.offset.saturating_add(1)),
      Action::ScrollUp => self.scroll_to(self.offset.saturating_sub(1)),
      Action::PageDown => self.scroll_to(self.offset.saturating_add(self.visible_items().max(1))),
      Action::PageUp => self.scroll_to(self.offset.saturating_sub(self.visible_items().max(1))),
      Action::ScrollToTop => self.scroll_to(0),
      Action::ScrollToBottom => self.scroll_to(usize::MAX),
      Action::Reload => self.reload(),
      Action::PageLoaded { generation, page, products, total } => {
        let count = products.len();
        if self.feed.apply(FeedEvent::FetchSucceeded { page, generation, products, total }) {
          info!("Loaded page {} with {} products, {} of {}", page, count, self.feed.items().len(), total);
        }
      },
      Action::PageFailed { generation, page, message } => {
        if self.feed.apply(FeedEvent::FetchFailed { page, generation, message }) {
          debug!("Page {} failed, next page stays {}", page, self.feed.next_page());
        }
      },
      _ => return Ok(None),
    }
    Ok(Some(Action::Render))
  }

  fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(1), Constraint::Length(1), Constraint::Length(3)])
      .split(area);

    self.render_list(frame, chunks[0]);
    if let Some(status) = self.status_line() {
      frame.render_widget(Paragraph::new(status), chunks[1]);
    }
    self.instruction_footer.render(frame, chunks[2], &self.feed);

    Ok(())
  }
}

fn format_time_elapsed(time: SystemTime) -> String {
  match time.elapsed() {
    Ok(elapsed) => format!("{:.1}s", elapsed.as_secs_f64()),
    Err(err) => {
      warn!("Failed to get system time {}", err);
      String::from("xs")
    },
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use ratatui::{Terminal, backend::TestBackend};
  use tokio::sync::mpsc::{self, UnboundedReceiver};

  use super::*;
  use crate::{api::mock_source::MockProductSource, error::FETCH_FAILED_MESSAGE};

  fn product_list(source: Arc<MockProductSource>) -> (ProductList, UnboundedReceiver<Action>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut list = ProductList::new(source, ScrollMonitor::new(10));
    // Room for five products.
    list.viewport_height = 10;
    list.register_action_handler(tx).unwrap();
    (list, rx)
  }

  /// Feeds the next fetch outcome back into the list, the way the app loop does.
  async fn complete_fetch(list: &mut ProductList, rx: &mut UnboundedReceiver<Action>) {
    let action = rx.recv().await.unwrap();
    assert!(matches!(action, Action::PageLoaded { .. } | Action::PageFailed { .. }), "unexpected {action:?}");
    list.update(action).await.unwrap();
  }

  fn render(list: &mut ProductList) -> String {
    let mut terminal = Terminal::new(TestBackend::new(90, 16)).unwrap();
    terminal
      .draw(|f| {
        let area = f.area();
        list.draw(f, area).unwrap();
      })
      .unwrap();
    terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
  }

  #[tokio::test]
  async fn test_loads_first_page_on_register() {
    let source = Arc::new(MockProductSource::with_total(194));
    let (mut list, mut rx) = product_list(source.clone());
    assert!(list.feed().is_loading());

    complete_fetch(&mut list, &mut rx).await;

    assert_eq!(list.feed().items().len(), 10);
    assert_eq!(list.feed().next_page(), 2);
    assert_eq!(list.feed().total(), 194);
    assert_eq!(source.requests(), vec![PageQuery { page: 1, limit: 10, skip: 0 }]);
  }

  #[tokio::test]
  async fn test_no_fetch_away_from_bottom() {
    let source = Arc::new(MockProductSource::with_total(194));
    let (mut list, mut rx) = product_list(source.clone());
    complete_fetch(&mut list, &mut rx).await;

    // 10 products are 20 rows, a 10 row viewport at the top plus a 10 row threshold is not past them.
    list.update(Action::ScrollToTop).await.unwrap();

    assert!(!list.feed().is_loading());
    assert_eq!(source.requests().len(), 1);
  }

  #[tokio::test]
  async fn test_pages_until_exhausted() {
    let source = Arc::new(MockProductSource::with_total(25));
    let (mut list, mut rx) = product_list(source.clone());
    complete_fetch(&mut list, &mut rx).await;

    list.update(Action::ScrollToBottom).await.unwrap();
    complete_fetch(&mut list, &mut rx).await;
    assert_eq!(list.feed().items().len(), 20);
    assert_eq!(list.feed().next_page(), 3);

    list.update(Action::ScrollToBottom).await.unwrap();
    complete_fetch(&mut list, &mut rx).await;
    assert_eq!(list.feed().items().len(), 25);
    assert_eq!(list.feed().next_page(), 4);

    for _ in 0..5 {
      list.update(Action::ScrollDown).await.unwrap();
      list.update(Action::ScrollToBottom).await.unwrap();
    }

    assert!(list.feed().is_exhausted());
    assert!(rx.try_recv().is_err());
    let skips: Vec<u32> = source.requests().iter().map(|query| query.skip).collect();
    assert_eq!(skips, vec![0, 10, 20]);
    assert!(render(&mut list).contains(NO_MORE_ITEMS));
  }

  #[tokio::test]
  async fn test_scroll_while_loading_does_not_fetch_again() {
    let source = Arc::new(MockProductSource::with_total(194));
    let (mut list, mut rx) = product_list(source.clone());

    for _ in 0..3 {
      list.update(Action::ScrollDown).await.unwrap();
      list.update(Action::ScrollToBottom).await.unwrap();
    }
    complete_fetch(&mut list, &mut rx).await;

    assert_eq!(source.requests().len(), 1);
    assert_eq!(list.feed().items().len(), 10);
  }

  #[tokio::test]
  async fn test_first_page_failure() {
    let source = Arc::new(MockProductSource::with_total(25));
    source.fail_page(1);
    let (mut list, mut rx) = product_list(source.clone());

    complete_fetch(&mut list, &mut rx).await;

    assert_eq!(list.feed().last_error(), Some(FETCH_FAILED_MESSAGE));
    assert!(list.feed().items().is_empty());
    assert_eq!(list.feed().next_page(), 1);
    let screen = render(&mut list);
    assert!(screen.contains(FETCH_FAILED_MESSAGE));
    assert!(!screen.contains(NO_MORE_ITEMS));
  }

  #[tokio::test]
  async fn test_end_retries_failed_first_page() {
    let source = Arc::new(MockProductSource::with_total(25));
    source.fail_page(1);
    let (mut list, mut rx) = product_list(source.clone());
    complete_fetch(&mut list, &mut rx).await;
    assert!(render(&mut list).contains("End: Retry"));

    source.recover_page(1);
    list.update(Action::ScrollToBottom).await.unwrap();
    complete_fetch(&mut list, &mut rx).await;

    assert_eq!(list.feed().last_error(), None);
    assert_eq!(list.feed().items().len(), 10);
    assert_eq!(list.feed().next_page(), 2);
  }

  #[tokio::test]
  async fn test_scroll_retries_failed_page() {
    let source = Arc::new(MockProductSource::with_total(25));
    let (mut list, mut rx) = product_list(source.clone());
    complete_fetch(&mut list, &mut rx).await;

    source.fail_page(2);
    list.update(Action::ScrollToBottom).await.unwrap();
    complete_fetch(&mut list, &mut rx).await;
    assert_eq!(list.feed().last_error(), Some(FETCH_FAILED_MESSAGE));
    assert_eq!(list.feed().next_page(), 2);
    assert_eq!(list.feed().items().len(), 10);

    source.recover_page(2);
    list.update(Action::ScrollDown).await.unwrap();
    assert_eq!(list.feed().last_error(), None);
    complete_fetch(&mut list, &mut rx).await;

    assert_eq!(list.feed().items().len(), 20);
    assert_eq!(list.feed().next_page(), 3);
    let pages: Vec<u32> = source.requests().iter().map(|query| query.page).collect();
    assert_eq!(pages, vec![1, 2, 2]);
  }

  #[tokio::test]
  async fn test_reload_discards_in_flight_page() {
    let source = Arc::new(MockProductSource::with_total(25));
    let (mut list, mut rx) = product_list(source.clone());

    list.update(Action::Reload).await.unwrap();
    complete_fetch(&mut list, &mut rx).await;
    complete_fetch(&mut list, &mut rx).await;

    assert_eq!(list.feed().generation(), 1);
    assert_eq!(list.feed().items().len(), 10);
    assert_eq!(list.feed().next_page(), 2);
    assert_eq!(source.requests().len(), 2);
  }

  #[tokio::test]
  async fn test_loading_indicator_renders() {
    let source = Arc::new(MockProductSource::with_total(25));
    let (mut list, _rx) = product_list(source);

    let screen = render(&mut list);

    assert!(screen.contains("Loading..."));
    assert!(screen.contains("Loading page 1"));
  }

  #[tokio::test]
  async fn test_products_render() {
    let source = Arc::new(MockProductSource::with_total(25));
    let (mut list, mut rx) = product_list(source);
    complete_fetch(&mut list, &mut rx).await;

    let screen = render(&mut list);

    assert!(screen.contains("Products 10/25"));
    assert!(screen.contains("Product 1"));
    assert!(screen.contains("https://cdn.example/products/1/thumbnail.png"));
  }

  #[tokio::test]
  async fn test_mouse_wheel_maps_to_scroll() {
    let source = Arc::new(MockProductSource::with_total(25));
    let mut list = ProductList::new(source, ScrollMonitor::default());
    let wheel = |kind| MouseEvent { kind, column: 0, row: 0, modifiers: crossterm::event::KeyModifiers::NONE };

    assert_eq!(list.handle_mouse_events(wheel(MouseEventKind::ScrollDown)).await.unwrap(), Some(Action::ScrollDown));
    assert_eq!(list.handle_mouse_events(wheel(MouseEventKind::ScrollUp)).await.unwrap(), Some(Action::ScrollUp));
    assert_eq!(list.handle_mouse_events(wheel(MouseEventKind::Moved)).await.unwrap(), None);
  }

  #[test]
  fn test_fetch_without_handler_is_ignored() {
    let source = Arc::new(MockProductSource::with_total(25));
    let mut list = ProductList::new(source.clone(), ScrollMonitor::default());

    list.fetch_page(1);

    assert!(!list.feed().is_loading());
    assert!(source.requests().is_empty());
  }
}
