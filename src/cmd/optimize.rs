use crate::reports;
use clap::Args;
use stabforge::api::{self, OptimizeRequest, OptimizeResponse};
use stabforge::code::StabilizerCode;
use stabforge::config::Config;
use stabforge::error::SfResult;
use stabforge::optimizer::OptimizationOptions;
use std::fs::File;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub config: Config,

    /// Physical qubits.
    #[arg(short = 'n', long = "qubits", default_value_t = 5, allow_negative_numbers = true)]
    pub n: i64,

    /// Logical qubits.
    #[arg(short = 'k', long = "logical", default_value_t = 1, allow_negative_numbers = true)]
    pub k: i64,

    /// Target code distance.
    #[arg(short = 'd', long = "distance", default_value_t = 3, allow_negative_numbers = true)]
    pub d: i64,

    #[arg(short = 'm', long, default_value = "Depolarizing")]
    pub model: String,

    #[arg(short = 'p', long, default_value_t = api::DEFAULT_OPTIMIZE_ERROR_RATE)]
    pub error_rate: f64,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Start from a codetables-style stabilizer matrix instead of the sampler.
    #[arg(long)]
    pub seed_code: Option<PathBuf>,

    /// Write the per-iteration trace as CSV.
    #[arg(long)]
    pub trace_csv: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: OptimizeArgs, config: &Config) -> SfResult<()> {
    let request = OptimizeRequest {
        n: args.n,
        k: args.k,
        d: args.d,
        model: Some(args.model.clone()),
        error_rate: Some(args.error_rate),
        seed: args.seed,
    };
    let target = request.to_target()?;
    let options = OptimizationOptions::from(config);

    let seed_code = match &args.seed_code {
        Some(path) => {
            info!("Loading seed code from {}", path.display());
            Some(StabilizerCode::load_from_file(path, target.d)?)
        }
        None => None,
    };

    let report_every = (options.max_iterations / 10).max(1);
    let progress = move |iteration: usize, current: f64, best: f64| {
        if iteration % report_every == 0 {
            debug!(
                "It {:5} | Current: {:.6} | Best: {:.6}",
                iteration, current, best
            );
        }
        true
    };

    let result = api::optimize_with(&request, &options, seed_code.as_ref(), &progress)?;

    if let Some(path) = &args.trace_csv {
        result.trace.write_csv(File::create(path)?)?;
        info!("Trace written to {}", path.display());
    }

    if args.json {
        let response = OptimizeResponse::from(&result);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("\n=== OPTIMIZATION RESULT ===");
    reports::print_summary(&result);
    reports::print_code_grid("BEST", &result.best_code);
    reports::print_trace(&result, 25);
    println!("Final Error Rate: {:.6}", result.final_error_rate);
    println!("Improvement: {:.2}%", result.improvement_percent);
    Ok(())
}
