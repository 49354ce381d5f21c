use clap::Parser;

use crate::{config::is_valid_rate, utils::version};

#[derive(Parser, Debug, Default)]
#[command(author, version = version(), about)]
pub struct Cli {
  #[arg(short, long, value_name = "URL", help = "Products endpoint, queried with limit and skip parameters")]
  pub api_url: Option<String>,

  #[arg(short, long, value_name = "FLOAT", value_parser = parse_rate, help = "Tick rate, i.e. number of ticks per second")]
  pub tick_rate: Option<f64>,

  #[arg(
    short,
    long,
    value_name = "FLOAT",
    value_parser = parse_rate,
    help = "Frame rate, i.e. number of frames per second"
  )]
  pub frame_rate: Option<f64>,

  #[arg(long, value_name = "ROWS", help = "Distance from the bottom, in rows, at which the next page is loaded")]
  pub threshold: Option<u32>,

  #[arg(long, value_name = "SECONDS", help = "Request timeout, requests never time out when unset")]
  pub timeout: Option<u64>,
}

fn parse_rate(raw: &str) -> Result<f64, String> {
  let rate = raw.parse::<f64>().map_err(|err| err.to_string())?;
  if is_valid_rate(rate) { Ok(rate) } else { Err(format!("expected a positive number, got {raw}")) }
}
