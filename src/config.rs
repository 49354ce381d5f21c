use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  time::Duration,
};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use derive_deref::{Deref, DerefMut};
use serde::{Deserialize, de::Deserializer};

use crate::{
  action::Action,
  cli::Cli,
  utils::{get_config_dir, get_data_dir},
};

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub _data_dir: PathBuf,
  #[serde(default)]
  pub _config_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
  #[serde(default, flatten)]
  pub config: AppConfig,
  pub api_url: String,
  pub scroll_threshold: u32,
  #[serde(default)]
  pub request_timeout_secs: Option<u64>,
  pub tick_rate: f64,
  pub frame_rate: f64,
  #[serde(default)]
  pub keybindings: KeyBindings,
}

impl Config {
  /// Embedded defaults, then any `config.*` file in the config directory, then `PRODUCT_SCROLLER_*` variables.
  pub fn new() -> Result<Self, config::ConfigError> {
    let env = config::Environment::with_prefix(&crate::utils::PROJECT_NAME)
      .try_parsing(true)
      .ignore_empty(true)
      .keep_prefix(false);
    Config::load(&get_data_dir(), &get_config_dir(), Some(env))
  }

  fn load(data_dir: &Path, config_dir: &Path, env: Option<config::Environment>) -> Result<Self, config::ConfigError> {
    let mut builder = config::Config::builder()
      .set_default("_data_dir", data_dir.to_string_lossy().to_string())?
      .set_default("_config_dir", config_dir.to_string_lossy().to_string())?
      .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));

    let config_files = [
      ("config.json5", config::FileFormat::Json5),
      ("config.json", config::FileFormat::Json),
      ("config.yaml", config::FileFormat::Yaml),
      ("config.toml", config::FileFormat::Toml),
      ("config.ini", config::FileFormat::Ini),
    ];
    for (file, format) in &config_files {
      builder = builder.add_source(config::File::from(config_dir.join(file)).format(*format).required(false));
    }
    if let Some(env) = env {
      builder = builder.add_source(env);
    }

    let config: Config = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
  }

  /// Rates drive the tick and render intervals, so they must be positive and finite.
  pub fn validate(&self) -> Result<(), config::ConfigError> {
    for (key, rate) in [("tick_rate", self.tick_rate), ("frame_rate", self.frame_rate)] {
      if !is_valid_rate(rate) {
        return Err(config::ConfigError::Message(format!("{key} must be a positive number, got {rate}")));
      }
    }
    Ok(())
  }

  pub fn apply_cli(&mut self, cli: &Cli) {
    if let Some(api_url) = &cli.api_url {
      self.api_url = api_url.clone();
    }
    if let Some(tick_rate) = cli.tick_rate {
      self.tick_rate = tick_rate;
    }
    if let Some(frame_rate) = cli.frame_rate {
      self.frame_rate = frame_rate;
    }
    if let Some(threshold) = cli.threshold {
      self.scroll_threshold = threshold;
    }
    if cli.timeout.is_some() {
      self.request_timeout_secs = cli.timeout;
    }
  }

  pub fn request_timeout(&self) -> Option<Duration> {
    self.request_timeout_secs.map(Duration::from_secs)
  }
}

pub fn is_valid_rate(rate: f64) -> bool {
  rate.is_finite() && rate > 0.0
}

#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct KeyBindings(pub HashMap<KeyEvent, Action>);

impl<'de> Deserialize<'de> for KeyBindings {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let parsed_map = HashMap::<String, Action>::deserialize(deserializer)?;

    let keybindings = parsed_map
      .into_iter()
      .map(|(key_str, action)| parse_key_event(&key_str).map(|key| (key, action)))
      .collect::<Result<HashMap<_, _>, _>>()
      .map_err(serde::de::Error::custom)?;

    Ok(KeyBindings(keybindings))
  }
}

/// Parses a binding such as `<q>`, `<Ctrl-d>` or `<PageDown>`. Case is ignored apart from single characters.
pub fn parse_key_event(raw: &str) -> Result<KeyEvent, String> {
  let inner = raw.strip_prefix('<').and_then(|s| s.strip_suffix('>')).unwrap_or(raw);
  if inner.is_empty() {
    return Err(format!("Empty key binding: {raw}"));
  }

  // A lone `-` is a key, not a separator.
  let (modifier_part, key_part) = match inner.rfind('-') {
    Some(idx) if idx + 1 < inner.len() => (&inner[..idx], &inner[idx + 1..]),
    _ => ("", inner),
  };

  let mut modifiers = KeyModifiers::empty();
  for modifier in modifier_part.split('-').filter(|m| !m.is_empty()) {
    match modifier.to_lowercase().as_str() {
      "ctrl" | "control" => modifiers.insert(KeyModifiers::CONTROL),
      "alt" => modifiers.insert(KeyModifiers::ALT),
      "shift" => modifiers.insert(KeyModifiers::SHIFT),
      other => return Err(format!("Unknown modifier `{other}` in key binding: {raw}")),
    }
  }

  let code = parse_key_code(key_part).ok_or_else(|| format!("Unknown key `{key_part}` in key binding: {raw}"))?;
  Ok(KeyEvent::new(code, modifiers))
}

fn parse_key_code(raw: &str) -> Option<KeyCode> {
  let mut chars = raw.chars();
  if let (Some(c), None) = (chars.next(), chars.next()) {
    return Some(KeyCode::Char(c));
  }

  let code = match raw.to_lowercase().as_str() {
    "esc" => KeyCode::Esc,
    "enter" => KeyCode::Enter,
    "left" => KeyCode::Left,
    "right" => KeyCode::Right,
    "up" => KeyCode::Up,
    "down" => KeyCode::Down,
    "home" => KeyCode::Home,
    "end" => KeyCode::End,
    "pageup" => KeyCode::PageUp,
    "pagedown" => KeyCode::PageDown,
    "backtab" => KeyCode::BackTab,
    "backspace" => KeyCode::Backspace,
    "delete" => KeyCode::Delete,
    "insert" => KeyCode::Insert,
    "tab" => KeyCode::Tab,
    "space" => KeyCode::Char(' '),
    "minus" => KeyCode::Char('-'),
    other => {
      let number = other.strip_prefix('f')?.parse::<u8>().ok()?;
      if (1..=12).contains(&number) {
        KeyCode::F(number)
      } else {
        return None;
      }
    },
  };
  Some(code)
}
