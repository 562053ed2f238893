use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "modbound")]
#[command(about = "Verify module boundaries and architecture rules of an application")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Verify class metadata against the module rules
    Verify(VerifyArgs),

    /// Generate a starter .modbound.toml configuration file
    Init(InitArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct VerifyArgs {
    /// JSON file with the class metadata to verify
    pub classes: PathBuf,

    /// Package whose direct sub-packages are the modules (overrides config)
    #[arg(short, long)]
    pub base_package: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "markdown")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory containing .modbound.toml (defaults to the classes file's directory)
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Path where to create .modbound.toml (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_verify() {
        let cli = Cli::parse_from([
            "modbound",
            "verify",
            "build/classes.json",
            "--base-package",
            "com.acme",
            "--format",
            "json",
            "--log-level",
            "debug",
        ]);

        assert_eq!(cli.log_level, "debug");
        let Command::Verify(args) = cli.command else {
            panic!("expected verify command");
        };
        assert_eq!(args.classes, PathBuf::from("build/classes.json"));
        assert_eq!(args.base_package.as_deref(), Some("com.acme"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_init_defaults_to_current_directory() {
        let cli = Cli::parse_from(["modbound", "init"]);

        let Command::Init(args) = cli.command else {
            panic!("expected init command");
        };
        assert_eq!(args.path, PathBuf::from("."));
        assert_eq!(cli.log_level, "warn");
    }
}
