//! cellflow CLI - evaluate CSV sheets from the command line

use anyhow::{bail, Context, Result};
use cellflow::prelude::*;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cellflow")]
#[command(author, version, about = "Evaluate spreadsheet formulas in CSV files")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a sheet and print its computed values as CSV
    Eval {
        /// Input CSV file; cells starting with `=` are formulas
        input: PathBuf,

        /// Set a value cell before printing, e.g. `--set A1=5` (repeatable)
        #[arg(
            short = 's',
            long = "set",
            value_name = "CELL=VALUE",
            value_parser = parse_assignment
        )]
        assignments: Vec<(String, String)>,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter for input and output
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },

    /// Print the computed value of individual cells
    Get {
        /// Input CSV file
        input: PathBuf,

        /// Cells in A1 notation
        #[arg(required = true)]
        cells: Vec<String>,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },

    /// Show graph and timing statistics for a sheet
    Stats {
        /// Input CSV file
        input: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },

    /// List the functions formulas can call
    Functions,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Eval {
            input,
            assignments,
            output,
            delimiter,
        } => eval(&input, &assignments, output.as_deref(), delimiter),
        Commands::Get {
            input,
            cells,
            delimiter,
        } => get(&input, &cells, delimiter),
        Commands::Stats { input, delimiter } => stats(&input, delimiter),
        Commands::Functions => list_functions(),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Parse `A1=5` into its cell and content
fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((cell, content)) if !cell.trim().is_empty() => {
            Ok((cell.trim().to_string(), content.to_string()))
        }
        _ => Err(format!("expected CELL=VALUE, got '{}'", s)),
    }
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }
    Ok(delimiter as u8)
}

fn load(input: &Path, delimiter: char) -> Result<Engine> {
    let options = CsvReadOptions::default().with_delimiter(delimiter_byte(delimiter)?);
    let mut engine = Engine::with_config(EngineConfig::default().with_csv_options(options));
    engine
        .load_csv_file(input)
        .with_context(|| format!("Failed to load '{}'", input.display()))?;

    let (width, height) = engine.dimensions();
    info!(path = %input.display(), width, height, "sheet loaded");
    Ok(engine)
}

fn eval(
    input: &Path,
    assignments: &[(String, String)],
    output: Option<&Path>,
    delimiter: char,
) -> Result<()> {
    let mut engine = load(input, delimiter)?;

    for (cell, content) in assignments {
        engine
            .set_cell_content(cell, content)
            .with_context(|| format!("Failed to set {} to '{}'", cell, content))?;
    }

    let values = engine.values()?;
    let options = CsvWriteOptions::default().with_delimiter(delimiter_byte(delimiter)?);

    if let Some(output_path) = output {
        CsvWriter::write_file(&values, output_path, &options)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        eprintln!("Wrote {} rows to '{}'", values.len(), output_path.display());
    } else {
        let csv_output =
            CsvWriter::write_string(&values, &options).context("Failed to render CSV")?;
        io::stdout()
            .write_all(csv_output.as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

fn get(input: &Path, cells: &[String], delimiter: char) -> Result<()> {
    let engine = load(input, delimiter)?;

    for cell in cells {
        let value = engine
            .get_cell_value(cell)
            .with_context(|| format!("Failed to read {}", cell))?;
        println!("{}\t{}", cell, value);
    }

    Ok(())
}

fn stats(input: &Path, delimiter: char) -> Result<()> {
    let engine = load(input, delimiter)?;
    let (width, height) = engine.dimensions();

    println!("File: {}", input.display());
    println!("Size: {} columns x {} rows", width, height);
    println!("{}", engine.get_stats());

    Ok(())
}

fn list_functions() -> Result<()> {
    let engine = Engine::new();

    for def in engine.functions().definitions() {
        println!("{}\t{}", def.name, def.translation_key);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("A1=5").unwrap(),
            ("A1".to_string(), "5".to_string())
        );
        assert_eq!(
            parse_assignment(" B2 =a=b").unwrap(),
            ("B2".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_assignment("C3=").unwrap(), ("C3".to_string(), String::new()));
        assert!(parse_assignment("A1").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[test]
    fn test_delimiter_byte() {
        assert_eq!(delimiter_byte(';').unwrap(), b';');
        assert!(delimiter_byte('é').is_err());
    }

    #[test]
    fn test_cli_parses_eval() {
        let cli = Cli::parse_from([
            "cellflow", "-vv", "eval", "sheet.csv", "--set", "A1=5", "-s", "B1=x", "-d", ";",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Eval {
                input,
                assignments,
                output,
                delimiter,
            } => {
                assert_eq!(input, PathBuf::from("sheet.csv"));
                assert_eq!(
                    assignments,
                    vec![
                        ("A1".to_string(), "5".to_string()),
                        ("B1".to_string(), "x".to_string())
                    ]
                );
                assert_eq!(output, None);
                assert_eq!(delimiter, ';');
            }
            _ => panic!("expected eval"),
        }
    }

    #[test]
    fn test_load_applies_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        std::fs::write(&path, "2;=A1*3\n").unwrap();

        let engine = load(&path, ';').unwrap();
        assert_eq!(engine.get_cell_value("B1").unwrap(), CellValue::Number(6.0));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.csv"), ',').unwrap_err();
        assert!(err.to_string().contains("missing.csv"));
    }
}
