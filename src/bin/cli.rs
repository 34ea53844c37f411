use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use depsig::config::Config;
use depsig::output::OutputFormat;
use depsig::verify::SignaturePolicy;
use depsig::VerifyOptions;

#[derive(Parser)]
#[command(
    name = "depsig",
    about = "Verify that installed dependencies carry a signed commit or tag",
    version,
    author
)]
struct Cli {
    /// Log verification steps to stderr (same as RUST_LOG=debug)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify signatures of every installed dependency
    Verify {
        /// Project root (the directory holding composer.json)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Installation mode, overriding composer.json (only "source" can be verified)
        #[arg(long, env = "DEPSIG_INSTALL_MODE")]
        install_mode: Option<String>,

        /// Which signatures are required (any, all)
        #[arg(long)]
        require: Option<String>,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Generate a starter .depsig.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Verify {
            path,
            config,
            install_mode,
            require,
            format,
            output,
        } => cmd_verify(path, config, install_mode, require, format, output),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("depsig=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_verify(
    path: PathBuf,
    config: Option<PathBuf>,
    install_mode: Option<String>,
    require_str: Option<String>,
    format_str: String,
    output_path: Option<PathBuf>,
) -> Result<i32, depsig::error::VerifyError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    let policy = require_str
        .as_deref()
        .map(SignaturePolicy::parse)
        .transpose()?;

    let options = VerifyOptions {
        config_path: config,
        format,
        install_mode_override: install_mode,
        policy_override: policy,
    };

    let run = depsig::verify(&path, &options)?;
    let rendered = depsig::render_report(&run, format)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = all verified, 1 = at least one dependency failed
    Ok(if run.passed() { 0 } else { 1 })
}

fn cmd_init(force: bool) -> Result<i32, depsig::error::VerifyError> {
    let path = PathBuf::from(".depsig.toml");

    if path.exists() && !force {
        eprintln!(".depsig.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created .depsig.toml");

    Ok(0)
}
