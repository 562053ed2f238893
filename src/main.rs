use clap::Parser;
use modbound::cli::{Cli, Command};
use modbound::commands::exit_code;
use modbound::{cmd_init, cmd_verify, logging, style};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_level) {
        style::error(&format!("Invalid log level '{}': {}", cli.log_level, e));
        std::process::exit(exit_code::FAILURE);
    }

    let exit_code = match cli.command {
        Command::Verify(args) => cmd_verify(args),
        Command::Init(args) => cmd_init(args),
    };

    std::process::exit(exit_code);
}
