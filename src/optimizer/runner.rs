use crate::code::StabilizerCode;
use crate::config::{Config, NoiseParams, SamplerParams};
use crate::error::{SfResult, StabForgeError};
use crate::optimizer::{OptimizationController, OptimizationResult, ProgressCallback, SearchTarget};
use crate::sampler::StabilizerSampler;
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone)]
pub struct OptimizationOptions {
    pub max_iterations: usize,
    pub patience: usize,
    pub restarts: usize,
    pub sampler: SamplerParams,
    pub noise: NoiseParams,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for OptimizationOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            max_iterations: cfg.search.max_iterations,
            patience: cfg.search.patience,
            restarts: cfg.search.restarts,
            sampler: cfg.sampler.clone(),
            noise: cfg.noise.clone(),
        }
    }
}

pub struct Optimizer {
    options: OptimizationOptions,
}

impl Optimizer {
    pub fn new(options: OptimizationOptions) -> Self {
        Self { options }
    }

    /// Runs `restarts` independent searches in parallel and keeps the one with
    /// the lowest final error rate (earliest restart on ties).
    ///
    /// Restart `i` seeds its sampler with `seed + i`, so a fixed seed gives the
    /// same result regardless of thread scheduling.
    pub fn run<CB: ProgressCallback + ?Sized>(
        &self,
        target: &SearchTarget,
        seed: Option<u64>,
        seed_code: Option<&StabilizerCode>,
        callback: &CB,
    ) -> SfResult<OptimizationResult> {
        let opts = &self.options;
        opts.sampler.validate()?;
        opts.noise.validate()?;

        info!(
            "Optimizing [[{},{},{}]] under {} noise at p = {} ({} restart(s))",
            target.n, target.k, target.d, target.model, target.error_rate, opts.restarts
        );
        let start = Instant::now();

        let best = (0..opts.restarts)
            .into_par_iter()
            .map(|i| {
                let restart_seed = seed.map(|s| s.wrapping_add(i as u64));
                let sampler = StabilizerSampler::new(opts.sampler.clone(), restart_seed);
                OptimizationController::new(
                    target.clone(),
                    opts.noise.clone(),
                    opts.max_iterations,
                    opts.patience,
                    sampler,
                    seed_code.cloned(),
                )?
                .run(i, callback)
            })
            .collect::<SfResult<Vec<_>>>()?
            .into_iter()
            .reduce(|best, r| {
                if r.final_error_rate < best.final_error_rate {
                    r
                } else {
                    best
                }
            })
            .ok_or_else(|| StabForgeError::invalid("restarts", "restarts >= 1", 0))?;

        info!(
            "Finished in {:.2?}: final {:.6} after {} iteration(s), {:.2}% improvement (restart {}, {})",
            start.elapsed(),
            best.final_error_rate,
            best.iterations(),
            best.improvement_percent,
            best.restart,
            best.termination
        );
        Ok(best)
    }
}
