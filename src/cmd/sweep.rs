use crate::reports;
use clap::Args;
use stabforge::api;
use stabforge::config::Config;
use stabforge::error::SfResult;

#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short = 'p', long, default_value_t = 0.01)]
    pub error_rate: f64,

    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = vec![3, 5, 7],
        allow_negative_numbers = true
    )]
    pub distances: Vec<i64>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: SweepArgs, config: &Config) -> SfResult<()> {
    let result = api::sweep(args.error_rate, &args.distances, &config.noise)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    reports::print_sweep(&result);
    Ok(())
}
