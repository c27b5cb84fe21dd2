use anyhow::{Result, bail};
use clap::{CommandFactory, Parser};
use tracing::debug;

mod branches;
mod cli;
mod ext;
mod figma;
mod metadata;
mod model;
mod pipeline;
mod render;
mod reports;
mod util;
mod versions;
mod window;

use crate::cli::{Cli, EffectiveConfig, normalize};
use crate::figma::api::HttpFigmaApi;

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  util::init_logging();

  let Some(command) = cli.command else {
    Cli::command().print_help()?;
    bail!("no subcommand given: use fetch-versions, fetch-branches or generate");
  };

  // Phase 1: normalize CLI
  let cfg = normalize(command)?;
  debug!(config = %serde_json::to_string(&cfg)?, "effective config");

  // Phase 2: run the selected flow against the live API
  match cfg {
    EffectiveConfig::FetchVersions { connection, config } => {
      let api = HttpFigmaApi::new(connection.token, connection.api_base);
      versions::run(&api, &config)
    }
    EffectiveConfig::FetchBranches { connection, config } => {
      let api = HttpFigmaApi::new(connection.token, connection.api_base);
      branches::run(&api, &config).map(|_| ())
    }
    EffectiveConfig::Generate { connection, config } => {
      let api = HttpFigmaApi::new(connection.token, connection.api_base);
      pipeline::run(&api, &config).map(|_| ())
    }
  }
}
