//! fieldcheck CLI - parse inspection spreadsheets into JSON

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fieldcheck::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "fieldcheck")]
#[command(
    author,
    version,
    about = "Parse field inspection spreadsheets into service-check records"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a form and print the result as JSON
    Parse {
        /// Input spreadsheet file (xlsx, xlsm, csv, tsv, txt)
        input: PathBuf,

        /// Built-in schema name
        #[arg(
            short = 'S',
            long,
            default_value = "daily-inspection",
            conflicts_with = "schema_file"
        )]
        schema: String,

        /// JSON schema document to use instead of a built-in schema
        #[arg(long)]
        schema_file: Option<PathBuf>,

        /// Sheet index to parse (0-based, default: 0)
        #[arg(short, long, default_value = "0")]
        sheet: usize,

        /// Prefix for generated record ids
        #[arg(long, default_value = "check")]
        id_prefix: String,

        /// Include header and column diagnostics in the output
        #[arg(long)]
        debug_info: bool,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the decoded grid as delimited text
    Grid {
        /// Input spreadsheet file
        input: PathBuf,

        /// Sheet index to print (0-based, default: 0)
        #[arg(short, long, default_value = "0")]
        sheet: usize,

        /// Field delimiter (default: tab)
        #[arg(short, long, default_value = "\t")]
        delimiter: char,
    },

    /// Print a built-in schema as JSON
    Schema {
        /// Schema name (daily-inspection, out-of-section-ticket)
        name: String,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse {
            input,
            schema,
            schema_file,
            sheet,
            id_prefix,
            debug_info,
            pretty,
        } => {
            let options = ParseOptions::new()
                .with_id_prefix(id_prefix)
                .with_debug(debug_info);
            parse(&input, &schema, schema_file.as_deref(), sheet, &options, pretty)
        }
        Commands::Grid {
            input,
            sheet,
            delimiter,
        } => print_grid(&input, sheet, delimiter).map(|_| ExitCode::SUCCESS),
        Commands::Schema { name } => print_schema(&name).map(|_| ExitCode::SUCCESS),
    }
}

/// Log to stderr; `RUST_LOG` overrides the verbosity flag
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn load_schema(name: &str, file: Option<&Path>) -> Result<Schema> {
    match file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read schema '{}'", path.display()))?;
            Schema::from_json(&json)
                .with_context(|| format!("Invalid schema '{}'", path.display()))
        }
        None => match Schema::builtin(name) {
            Some(schema) => Ok(schema.clone()),
            None => bail!(
                "Unknown schema '{}' (available: {})",
                name,
                Schema::builtin_names().join(", ")
            ),
        },
    }
}

fn parse(
    input: &Path,
    schema_name: &str,
    schema_file: Option<&Path>,
    sheet: usize,
    options: &ParseOptions,
    pretty: bool,
) -> Result<ExitCode> {
    let schema = load_schema(schema_name, schema_file)?;
    info!("parsing '{}' as {}", input.display(), schema.name());

    let result = match fieldcheck::open_with(input, &OpenOptions::default().with_sheet(sheet)) {
        Ok(grid) => {
            debug!("decoded {} rows", grid.len());
            Ingestor::new(&schema)
                .with_options(options.clone())
                .parse(&grid)
        }
        Err(e) => ParseResult::failure(format!("Could not read spreadsheet: {}", e)),
    };

    let json = result.to_json(pretty).context("Failed to serialize result")?;
    writeln!(io::stdout(), "{}", json).context("Failed to write to stdout")?;

    if result.success {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{}", result.message);
        Ok(ExitCode::from(2))
    }
}

fn print_grid(input: &Path, sheet: usize, delimiter: char) -> Result<()> {
    let grid = fieldcheck::open_with(input, &OpenOptions::default().with_sheet(sheet))
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    let mut output = String::new();
    for row in grid.rows() {
        let line: Vec<String> = row
            .iter()
            .map(|cell| quote_field(&cell.to_string(), delimiter))
            .collect();
        output.push_str(&line.join(&delimiter.to_string()));
        output.push('\n');
    }

    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write to stdout")?;
    Ok(())
}

/// Quote a field if it contains the delimiter, a quote or a line break
fn quote_field(text: &str, delimiter: char) -> String {
    if text.contains(delimiter) || text.contains('"') || text.contains('\n') || text.contains('\r')
    {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

fn print_schema(name: &str) -> Result<()> {
    let schema = load_schema(name, None)?;
    let json = serde_json::to_string_pretty(schema.config()).context("Failed to serialize schema")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_field() {
        assert_eq!(quote_field("plain", ','), "plain");
        assert_eq!(quote_field("a,b", ','), "\"a,b\"");
        assert_eq!(quote_field("say \"hi\"", '\t'), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field("a,b", '\t'), "a,b");
    }

    #[test]
    fn test_load_builtin_schema() {
        assert_eq!(load_schema("ticket", None).unwrap().name(), "out-of-section-ticket");
        assert!(load_schema("payroll", None).is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "fieldcheck",
            "-v",
            "parse",
            "form.xlsx",
            "--schema",
            "ticket",
            "--sheet",
            "1",
            "--debug-info",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(
            cli.command,
            Commands::Parse { sheet: 1, debug_info: true, .. }
        ));
    }
}
