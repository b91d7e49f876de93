use clap::{ArgAction, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::kmers::SignatureConfig;
use crate::repeats::UnitOrder;

#[derive(Parser)]
#[command(name = "promox",
          version,
          about = "Promoter motif extraction: TATA-box regions, upstream repeats and k-mer signatures",
          long_about = None,
          disable_help_subcommand = true,
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Locate the TATA-box and report repeats in its upstream region")]
    Tata(TataArgs),
    #[clap(about = "Rank the most frequent k-mers of every FASTA file in a directory")]
    Signature(SignatureArgs),
}

#[derive(Parser, Debug)]
#[command(arg_required_else_help(true))]
pub struct TataArgs {
    #[clap(help = "FASTA file with the sequence to search")]
    #[clap(value_name = "FASTA")]
    pub fasta: PathBuf,

    #[clap(long = "unit-order")]
    #[clap(value_name = "ORDER")]
    #[clap(help = "Direct-repeat unit length tried first at each position")]
    #[clap(value_enum, default_value_t = UnitOrder::Shortest)]
    pub unit_order: UnitOrder,
}

#[derive(Parser, Debug)]
#[command(arg_required_else_help(true))]
pub struct SignatureArgs {
    #[clap(help = "Directory of FASTA files")]
    #[clap(value_name = "DIR")]
    pub input_dir: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'k')]
    #[clap(long = "width")]
    #[clap(help = "L-mer window width")]
    #[clap(value_name = "WIDTH")]
    pub width: usize,

    #[clap(long = "min-width")]
    #[clap(help = "Smallest accepted window width")]
    #[clap(default_value = "4")]
    pub min_width: usize,

    #[clap(long = "max-width")]
    #[clap(help = "Largest accepted window width")]
    #[clap(default_value = "8")]
    pub max_width: usize,

    #[clap(short = 'n')]
    #[clap(long = "top")]
    #[clap(help = "Number of top-ranked motifs kept per file")]
    #[clap(default_value = "10")]
    pub top_n: usize,

    #[clap(long = "extension")]
    #[clap(help = "Extension of the FASTA files to read")]
    #[clap(default_value = "fna")]
    pub extension: String,

    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "CSV file to write")]
    #[clap(value_name = "CSV")]
    #[clap(default_value = "Results.csv")]
    #[arg(value_parser = check_output_path)]
    pub output: PathBuf,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = parse_thread_count)]
    pub num_threads: usize,
}

impl SignatureArgs {
    pub fn config(&self) -> SignatureConfig {
        SignatureConfig {
            width: self.width,
            width_bounds: self.min_width..=self.max_width,
            top_n: self.top_n,
            extension: self.extension.clone(),
        }
    }
}

/// Warn by default; each `-v` opens one more level, down to trace.
fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Blue,
        Level::Trace => Color::Cyan,
    }
}

/// `promox::tata` becomes `tata`; the crate root logs as `promox`.
fn log_origin(target: &str) -> &str {
    target
        .strip_prefix(concat!(env!("CARGO_PKG_NAME"), "::"))
        .unwrap_or(target)
}

pub fn init_verbose(args: &Cli) {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let mut style = buf.style();
            style.set_color(level_color(record.level())).set_bold(true);
            writeln!(
                buf,
                "{} {:<5} {:>9} | {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                style.value(record.level()),
                log_origin(record.target()),
                record.args()
            )
        })
        .filter_level(level_for(args.verbosity))
        .init();
}

/// The CSV target must not be a directory and its parent must exist.
fn check_output_path(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_dir() {
        return Err(format!("{} is a directory, expected a CSV file name", path.display()));
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(format!("Output directory does not exist: {}", parent.display()))
        }
        _ => Ok(path),
    }
}

fn parse_thread_count(s: &str) -> Result<usize, String> {
    s.parse::<NonZeroUsize>()
        .map(NonZeroUsize::get)
        .map_err(|_| format!("`{s}` is not a thread count (expected an integer of 1 or more)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_signature_defaults() {
        let cli = Cli::try_parse_from(["promox", "signature", "genomes", "-k", "6"]).unwrap();
        let Command::Signature(args) = cli.command else {
            panic!("expected signature subcommand");
        };
        let config = args.config();
        assert_eq!(config.width, 6);
        assert_eq!(config.width_bounds, 4..=8);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.extension, "fna");
        assert_eq!(args.output, PathBuf::from("Results.csv"));
        assert_eq!(args.num_threads, 1);
    }

    #[test]
    fn test_non_integer_width_is_rejected() {
        assert!(Cli::try_parse_from(["promox", "signature", "genomes", "-k", "six"]).is_err());
        assert!(Cli::try_parse_from(["promox", "signature", "genomes", "-k", "5", "-t", "0"]).is_err());
    }

    #[test]
    fn test_tata_unit_order() {
        let cli = Cli::try_parse_from(["promox", "-vv", "tata", "gene.fna", "--unit-order", "longest"]).unwrap();
        assert_eq!(cli.verbosity, 2);
        let Command::Tata(args) = cli.command else {
            panic!("expected tata subcommand");
        };
        assert_eq!(args.unit_order, UnitOrder::Longest);
        assert_eq!(args.fasta, PathBuf::from("gene.fna"));
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for(0), LevelFilter::Warn);
        assert_eq!(level_for(1), LevelFilter::Info);
        assert_eq!(level_for(2), LevelFilter::Debug);
        assert_eq!(level_for(5), LevelFilter::Trace);
    }

    #[test]
    fn test_log_origin_drops_crate_prefix() {
        assert_eq!(log_origin("promox::kmers"), "kmers");
        assert_eq!(log_origin("promox"), "promox");
        assert_eq!(log_origin("rayon_core::registry"), "rayon_core::registry");
    }

    #[test]
    fn test_output_path_checks() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_output_path("Results.csv").is_ok());
        assert!(check_output_path(dir.path().to_str().unwrap()).is_err());
        let missing = dir.path().join("nope").join("out.csv");
        assert!(check_output_path(missing.to_str().unwrap()).is_err());
        let ok = dir.path().join("out.csv");
        assert_eq!(check_output_path(ok.to_str().unwrap()).unwrap(), ok);
    }

    #[test]
    fn test_thread_count() {
        assert_eq!(parse_thread_count("4"), Ok(4));
        assert!(parse_thread_count("0").is_err());
        assert!(parse_thread_count("-2").is_err());
        assert!(parse_thread_count("many").is_err());
    }
}
