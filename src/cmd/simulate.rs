use crate::reports;
use clap::Args;
use stabforge::api::{self, SimulateRequest, SimulateResponse};
use stabforge::config::Config;
use stabforge::error::SfResult;

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short = 'm', long, default_value = "Depolarizing")]
    pub model: String,

    #[arg(short = 'p', long, default_value_t = 0.01)]
    pub error_rate: f64,

    /// Comma-separated code distances, e.g. 3,5,7.
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

pub fn run(args: SimulateArgs, config: &Config) -> SfResult<()> {
    let request = SimulateRequest {
        model: args.model,
        error_rate: args.error_rate,
        distances: args.distances,
    };
    let simulation = api::simulate(&request, &config.noise)?;

    if args.json {
        let response = SimulateResponse::from(simulation);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    reports::print_simulation(&simulation);
    Ok(())
}
