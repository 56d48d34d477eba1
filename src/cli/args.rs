//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Subresource integrity injector for built HTML
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sri.toml, searched upward)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add integrity attributes to the entry HTML files of a build
    #[command(visible_alias = "i")]
    Inject {
        #[command(flatten)]
        args: InjectArgs,
    },

    /// Print the integrity value of files
    #[command(visible_alias = "h")]
    Hash {
        /// Files to hash
        #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },
}

/// Inject command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct InjectArgs {
    /// Build output directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Entry HTML file, relative to the output directory (repeatable)
    #[arg(short, long = "entry", value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub entries: Vec<PathBuf>,

    /// Base path stripped from references before bundle lookup
    #[arg(short, long)]
    pub base: Option<String>,

    /// Print transformed HTML to stdout instead of writing files
    #[arg(short, long)]
    pub dry: bool,
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
    fn test_parse_inject() {
        let cli = Cli::parse_from([
            "html-sri", "-v", "inject", "--base", "/local/", "-e", "a.html", "-e", "b.html",
            "--dry",
        ]);
        assert!(cli.verbose);
        let Commands::Inject { args } = cli.command else {
            panic!("expected inject");
        };
        assert_eq!(args.base.as_deref(), Some("/local/"));
        assert_eq!(args.entries, vec![PathBuf::from("a.html"), PathBuf::from("b.html")]);
        assert!(args.dry);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_parse_empty_base() {
        let cli = Cli::parse_from(["html-sri", "i", "--base", ""]);
        let Commands::Inject { args } = cli.command else {
            panic!("expected inject");
        };
        assert_eq!(args.base.as_deref(), Some(""));
    }

    #[test]
    fn test_parse_hash_alias() {
        let cli = Cli::parse_from(["html-sri", "h", "dist/main.js"]);
        assert!(matches!(cli.command, Commands::Hash { files } if files.len() == 1));
    }
}
