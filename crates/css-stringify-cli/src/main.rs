//! css-stringify CLI - Main entry point

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Parser;
use css_stringify::{SourceMap, Stringified, stringify_json};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::{Overrides, load_options};

#[derive(Parser)]
#[command(name = "css-stringify")]
#[command(version)]
#[command(about = "Turn a CSS syntax tree (JSON) back into CSS", long_about = None)]
struct Cli {
    /// JSON AST file ('-' or absent for stdin)
    input: Option<String>,

    /// Write CSS to FILE instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Omit optional whitespace and comments
    #[arg(long)]
    compress: bool,

    /// Emit a source map (inline without --output, FILE.map with it)
    #[arg(long)]
    sourcemap: bool,

    /// Indentation unit for uncompressed output
    #[arg(long, value_name = "STR")]
    indent: Option<String>,

    /// Do not chain source maps referenced by the original sources
    #[arg(long)]
    no_input_sourcemaps: bool,

    /// TOML file with stringify options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn read_input(input: Option<&str>) -> Result<String> {
    match input {
        None | Some("-") => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read AST from stdin")?;
            Ok(text)
        }
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read AST from {}", path))
        }
    }
}

/// Name of the map file written next to `output`
fn map_path(output: &Path) -> PathBuf {
    let mut path = output.as_os_str().to_owned();
    path.push(".map");
    PathBuf::from(path)
}

fn encode_map(map: &SourceMap) -> Result<String> {
    let raw = map.to_json().context("Failed to encode source map")?;
    serde_json::to_string(&raw).context("Failed to encode source map")
}

fn write_output(out: Stringified, output: Option<&Path>) -> Result<()> {
    let css = match (out, output) {
        (Stringified::Code(code), _) => code,
        (Stringified::WithMap { code, map }, None) => {
            let encoded = STANDARD.encode(encode_map(&map)?);
            format!(
                "{}\n/*# sourceMappingURL=data:application/json;base64,{} */",
                code, encoded
            )
        }
        (Stringified::WithMap { code, map }, Some(output)) => {
            let map_file = map_path(output);
            fs::write(&map_file, encode_map(&map)?)
                .with_context(|| format!("Failed to write {}", map_file.display()))?;
            tracing::info!(map = %map_file.display(), "Wrote source map");

            let map_name = map_file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("{}\n/*# sourceMappingURL={} */", code, map_name)
        }
    };

    match output {
        Some(output) => fs::write(output, format!("{}\n", css))
            .with_context(|| format!("Failed to write {}", output.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", css).context("Failed to write CSS to stdout")
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let options = Overrides {
        compress: cli.compress,
        sourcemap: cli.sourcemap,
        indent: cli.indent,
        no_input_sourcemaps: cli.no_input_sourcemaps,
    }
    .apply(load_options(cli.config.as_deref())?);

    let text = read_input(cli.input.as_deref())?;
    let ast: serde_json::Value = serde_json::from_str(&text).context("Input is not valid JSON")?;

    let out = stringify_json(&ast, &options).context("Failed to stringify AST")?;
    write_output(out, cli.output.as_deref())
}

fn main() -> Result<()> {
    // Initialize logging; stdout carries the CSS
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "css_stringify=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    run(Cli::parse())
}
