use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

#[derive(Debug, Parser)]
#[command(version, about = "Relay contactless tag contents to a delivery target")]
pub(crate) struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "tagrelay.toml")]
    pub(crate) config: PathBuf,

    /// Debug level output
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// POST tag contents to this URL instead of logging them
    #[arg(long)]
    pub(crate) target_url: Option<Url>,

    /// Extra header sent with every POST, as `Name: value` (repeatable)
    #[arg(long = "header", value_parser = parse_header)]
    pub(crate) headers: Vec<(String, String)>,

    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Default, Subcommand)]
pub(crate) enum Command {
    /// Select a reader and relay every tag read on it (default)
    #[default]
    Run,

    /// List available readers
    List,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in {raw:?}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
