use ratatui::{
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::ListItem,
};

use crate::api::Product;

/// Rows taken by one rendered product: the title line and the thumbnail line.
pub const ITEM_HEIGHT: u16 = 2;

pub fn render(position: usize, product: &Product) -> ListItem<'_> {
  let title = Line::from(vec![
    Span::styled(format!("{:>4}. ", position + 1), Style::default().fg(Color::DarkGray)),
    Span::styled(product.title.as_str(), Style::default().add_modifier(Modifier::BOLD)),
  ]);
  let thumbnail = Line::from(vec![
    Span::raw("      "),
    Span::styled(product.thumbnail.as_str(), Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)),
  ]);
  ListItem::new(vec![title, thumbnail])
}
