use std::sync::Arc;

use color_eyre::eyre::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;
use tracing::error;

use crate::{
  action::Action,
  api::HttpProductSource,
  components::{Component, product_list::ProductList},
  config::Config,
  feed::ScrollMonitor,
  tui,
  tui::Tui,
};

pub struct App {
  pub config: Config,
  pub product_list: Box<dyn Component>,
  pub should_quit: bool,
  pub should_suspend: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let source = HttpProductSource::new(&config.api_url, config.request_timeout())?;
    let monitor = ScrollMonitor::new(config.scroll_threshold);
    let product_list = Box::new(ProductList::new(Arc::new(source), monitor));
    Ok(Self { config, product_list, should_quit: false, should_suspend: false })
  }

  fn new_tui(&self) -> Result<Tui> {
    Ok(Tui::new()?.tick_rate(self.config.tick_rate).frame_rate(self.config.frame_rate).mouse(true))
  }

  pub async fn run(&mut self) -> Result<()> {
    // Terminal events, keybindings and fetch results all land on this queue and are handled in order.
    let (action_tx, mut action_rx) = mpsc::unbounded_channel();

    let mut tui = self.new_tui()?;
    tui.enter()?;

    self.product_list.register_action_handler(action_tx.clone())?;

    loop {
      if let Some(e) = tui.next().await {
        match e {
          tui::Event::Tick => action_tx.send(Action::Tick)?,
          tui::Event::Render => action_tx.send(Action::Render)?,
          tui::Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
          tui::Event::Key(key) => {
            if let Some(action) = self.config.keybindings.get(&key) {
              action_tx.send(action.clone())?;
            }
          },
          _ => {},
        }

        if let Some(action) = self.product_list.handle_events(Some(e.clone())).await? {
          action_tx.send(action)?;
        }
      }

      while let Ok(action) = action_rx.try_recv() {
        if action != Action::Tick && action != Action::Render {
          log::debug!("{action}");
        }

        match action {
          Action::Quit => self.should_quit = true,
          Action::Suspend => self.should_suspend = true,
          Action::Resume => self.should_suspend = false,
          Action::Error(ref message) => error!("{message}"),
          Action::Resize(w, h) => {
            tui.resize(Rect::new(0, 0, w, h))?;
            self.render(&mut tui, &action_tx)?;
          },
          Action::Render => self.render(&mut tui, &action_tx)?,
          _ => {},
        }
        if let Some(action) = self.product_list.update(action.clone()).await? {
          action_tx.send(action)?
        };
      }

      if self.should_suspend {
        tui.suspend()?;
        action_tx.send(Action::Resume)?;
        tui = self.new_tui()?;
        tui.enter()?;
      } else if self.should_quit {
        tui.stop()?;
        break;
      }
    }
    tui.exit()?;
    Ok(())
  }

  fn render(&mut self, tui: &mut Tui, action_tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
    let component = &mut self.product_list;
    tui.draw(|f| {
      let area = f.area();
      if let Err(e) = component.draw(f, area) {
        let _ = action_tx.send(Action::Error(format!("Failed to draw: {:?}", e)));
      }
    })?;
    Ok(())
  }
}
