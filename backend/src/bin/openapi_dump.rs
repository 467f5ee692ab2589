//! Print the OpenAPI document as JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::Write;
use std::path::PathBuf;

use admission_queue::doc::ApiDoc;
use clap::Parser;
use color_eyre::eyre::{Context, Result};
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "openapi-dump",
    about = "Write the admission queue OpenAPI document as pretty JSON",
    version
)]
struct CliArgs {
    /// Destination file. Writes to stdout when omitted.
    #[arg(long = "output", short = 'o', value_name = "path")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let document = ApiDoc::openapi()
        .to_pretty_json()
        .wrap_err("serialise OpenAPI document")?;
    match args.output {
        Some(path) => std::fs::write(&path, format!("{document}\n"))
            .wrap_err_with(|| format!("write OpenAPI document to {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{document}").wrap_err("write OpenAPI document")?;
        }
    }
    Ok(())
}
