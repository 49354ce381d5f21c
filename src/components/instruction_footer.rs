use ratatui::{
  layout::Rect,
  style::{Color, Style},
  widgets::{Block, Borders, Paragraph},
};

use crate::{feed::FeedState, tui::Frame};

#[derive(Default)]
pub struct InstructionFooter {}

impl InstructionFooter {
  pub fn instructions(&self, feed: &FeedState) -> &'static str {
    if feed.last_error().is_some() {
      "End: Retry | ↑/k: Up | R: Reload | Q: Quit"
    } else if feed.is_exhausted() {
      "↑/k: Up | Home/g: Top | R: Reload | Q: Quit"
    } else {
      "↓/j: Down | ↑/k: Up | PgDn/PgUp: Page | End: Bottom | R: Reload | Q: Quit"
    }
  }

  pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect, feed: &FeedState) {
    let paragraph = Paragraph::new(self.instructions(feed))
      .block(Block::default().borders(Borders::ALL))
      .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
  }
}
