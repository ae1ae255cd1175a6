mod config;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use rom_dedupe::dedupe::RomDedupe;

use crate::config::Config;

#[derive(Parser)]
#[command(author, version, name = env!("CARGO_BIN_NAME"), about = "Find duplicate ROMs and move them to a quarantine directory")]
struct Args {
    /// ROM collection root directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Quarantine directory for duplicates [default: <PATH>/duplicates]
    #[arg(short = 'o', long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    output: Option<PathBuf>,

    /// Only print changes without moving files
    #[arg(short = 'p', long)]
    print: bool,

    /// Keep the best handheld and console versions separately
    #[arg(short = 's', long, conflicts_with = "single")]
    separate: bool,

    /// Let handheld and console versions compete for a single winner
    #[arg(short = 'S', long)]
    single: bool,

    /// Additional file extensions to include
    #[arg(short = 'e', long, num_args = 1, action = clap::ArgAction::Append, name = "EXTENSION")]
    extension: Vec<String>,

    /// Write the run log to this file
    #[arg(short = 'L', long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    log: Option<PathBuf>,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        rom_dedupe::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        let config = Config::from_args(args)?;
        let summary = RomDedupe::new(config.root, config.settings).run()?;
        println!("\n{summary}");
        if summary.is_success() {
            Ok(())
        } else {
            anyhow::bail!("{} duplicate(s) could not be moved", summary.failures.len())
        }
    }
}

#[cfg(test)]
mod cli_args_tests {
    use super::*;

    #[test]
    fn empty_by_default() {
        let args = Args::try_parse_from(["test"]).expect("should parse");
        assert!(args.path.is_none());
        assert!(args.output.is_none());
        assert!(args.extension.is_empty());
        assert!(args.log.is_none());
        assert!(args.completion.is_none());
        assert!(!args.print);
        assert!(!args.separate);
        assert!(!args.single);
        assert!(!args.verbose);
    }

    #[test]
    fn parses_path() {
        let args = Args::try_parse_from(["test", "/userdata/roms"]).expect("should parse");
        assert_eq!(args.path, Some(PathBuf::from("/userdata/roms")));
    }

    #[test]
    fn parses_output_dir() {
        let args = Args::try_parse_from(["test", "-o", "/userdata/duplicates"]).expect("should parse");
        assert_eq!(args.output, Some(PathBuf::from("/userdata/duplicates")));

        let args = Args::try_parse_from(["test", "--output", "dupes"]).expect("should parse");
        assert_eq!(args.output, Some(PathBuf::from("dupes")));
    }

    #[test]
    fn parses_multiple_extension_args() {
        let args = Args::try_parse_from(["test", "-e", "sfc", "-e", "smc", "--extension", "md"]).expect("should parse");
        assert_eq!(args.extension, vec!["sfc", "smc", "md"]);
    }

    #[test]
    fn parses_log_file() {
        let args = Args::try_parse_from(["test", "-L", "run.log"]).expect("should parse");
        assert_eq!(args.log, Some(PathBuf::from("run.log")));
    }

    #[test]
    fn parses_combined_flags() {
        let args = Args::try_parse_from(["test", "-pSv"]).expect("should parse");
        assert!(args.print);
        assert!(args.single);
        assert!(args.verbose);
    }

    #[test]
    fn separate_conflicts_with_single() {
        let result = Args::try_parse_from(["test", "-s", "-S"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_completion_shell() {
        let args = Args::try_parse_from(["test", "-l", "zsh"]).expect("should parse");
        assert_eq!(args.completion, Some(Shell::Zsh));
    }

    #[test]
    fn rejects_unknown_shell() {
        assert!(Args::try_parse_from(["test", "--completion", "cmd"]).is_err());
    }

    #[test]
    fn parses_everything_together() {
        let args = Args::try_parse_from([
            "test", "/roms", "-o", "/dupes", "-e", "chd", "-L", "/tmp/run.log", "-p", "-s", "-v",
        ])
        .expect("should parse");
        assert_eq!(args.path, Some(PathBuf::from("/roms")));
        assert_eq!(args.output, Some(PathBuf::from("/dupes")));
        assert_eq!(args.extension, vec!["chd"]);
        assert_eq!(args.log, Some(PathBuf::from("/tmp/run.log")));
        assert!(args.print);
        assert!(args.separate);
        assert!(args.verbose);
    }
}
