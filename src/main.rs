use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use stabforge::config::Config;
use stabforge::error::SfResult;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON profile with search, sampler and noise settings.
    #[arg(global = true, long = "config")]
    config_file: Option<PathBuf>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for a low logical-error-rate stabilizer code.
    Optimize(cmd::optimize::OptimizeArgs),
    /// Logical error rate of one noise model across code distances.
    Simulate(cmd::simulate::SimulateArgs),
    /// Every noise model across code distances.
    Sweep(cmd::sweep::SweepArgs),
}

fn resolve_config(
    file: Option<&PathBuf>,
    cli_config: &Config,
    sub_matches: Option<&ArgMatches>,
) -> SfResult<Config> {
    let config = match (file, sub_matches) {
        (Some(path), Some(matches)) => {
            info!("Loading config from {}", path.display());
            let mut config = Config::load_from_file(path)?;
            config.merge_from_cli(cli_config, matches);
            config
        }
        _ => cli_config.clone(),
    };
    config.validate()?;
    Ok(config)
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let (cli_config, name) = match &cli.command {
        Commands::Optimize(args) => (&args.config, "optimize"),
        Commands::Simulate(args) => (&args.config, "simulate"),
        Commands::Sweep(args) => (&args.config, "sweep"),
    };
    let sub_matches = matches.subcommand_matches(name);

    let config = resolve_config(cli.config_file.as_ref(), cli_config, sub_matches)
        .unwrap_or_else(|e| {
            error!("{}", e);
            process::exit(1);
        });

    let outcome = match cli.command {
        Commands::Optimize(args) => cmd::optimize::run(args, &config),
        Commands::Simulate(args) => cmd::simulate::run(args, &config),
        Commands::Sweep(args) => cmd::sweep::run(args, &config),
    };

    if let Err(e) = outcome {
        error!("{}", e);
        process::exit(1);
    }
}
