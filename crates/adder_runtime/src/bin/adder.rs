//! Adder CLI entry point.

use std::env;
use std::io;
use std::process::ExitCode;

use adder_foundation::{Error, Result};
use adder_runtime::{Repl, ReplConfig};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "ADDER_LOG";

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    show_help: bool,
    show_version: bool,
    no_color: bool,
    no_auto_indent: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig> {
    let mut config = CliConfig::default();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--no-color" => config.no_color = true,
            "--no-auto-indent" => config.no_auto_indent = true,
            other => return Err(Error::config(format!("unknown option: {other}"))),
        }
    }

    Ok(config)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep the old one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(args: Vec<String>) -> Result<()> {
    let cli = parse_args(args)?;

    if cli.show_help {
        print_help();
        return Ok(());
    }

    if cli.show_version {
        println!("adder {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging();

    let mut config = ReplConfig::from_env();
    if cli.no_color {
        config = config.with_color(false);
    }
    if cli.no_auto_indent {
        config = config.with_auto_indent(false);
    }

    tracing::debug!(?config, "starting repl");
    Repl::new(&config)?.run()
}

fn print_help() {
    println!(
        "\x1b[1mAdder\x1b[0m - Interactive shell for the Adder scripting language

\x1b[1mUSAGE:\x1b[0m
    adder [OPTIONS]

\x1b[1mOPTIONS:\x1b[0m
    -h, --help           Print help information
    -V, --version        Print version information
    --no-color           Disable syntax highlighting
    --no-auto-indent     Do not indent continuation lines

\x1b[1mENVIRONMENT:\x1b[0m
    NO_COLOR             Disable syntax highlighting when set
    {LOG_ENV}            Log filter, e.g. \"debug\" (default: warn)

\x1b[1mKEYS:\x1b[0m
    Enter                Run complete input, or start a new line
    Tab                  Complete names from the session and builtins
    Ctrl+C               Cancel current input
    Ctrl+D               Exit (asks for confirmation)"
    );
}
