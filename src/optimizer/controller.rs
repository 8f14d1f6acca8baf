use super::{improvement_percent, OptimizationResult, OptimizationTrace, ProgressCallback, Termination};
use crate::code::{self, StabilizerCode};
use crate::config::NoiseParams;
use crate::error::{SfResult, StabForgeError};
use crate::noise::{self, NoiseModelKind};
use crate::sampler::StabilizerSampler;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What a single search is aiming for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTarget {
    pub n: usize,
    pub k: usize,
    pub d: usize,
    pub model: NoiseModelKind,
    pub error_rate: f64,
}

/// Greedy hill climber over stabilizer codes.
///
/// Construction performs the init step (first candidate and first trace
/// entry); [`step`](Self::step) performs one perturb/score/accept round.
pub struct OptimizationController {
    pub target: SearchTarget,
    pub noise: NoiseParams,
    pub max_iterations: usize,
    pub patience: usize,
    pub sampler: StabilizerSampler,

    pub current: StabilizerCode,
    pub current_rate: f64,
    pub best: StabilizerCode,
    pub best_rate: f64,
    pub trace: OptimizationTrace,
    /// Consecutive steps without a strictly better best.
    pub stale_steps: usize,
}

impl OptimizationController {
    pub fn new(
        target: SearchTarget,
        noise: NoiseParams,
        max_iterations: usize,
        patience: usize,
        mut sampler: StabilizerSampler,
        seed_code: Option<StabilizerCode>,
    ) -> SfResult<Self> {
        code::validate_params(target.n, target.k, target.d)?;
        if max_iterations < 1 {
            return Err(StabForgeError::invalid(
                "max_iterations",
                "max_iterations >= 1",
                max_iterations,
            ));
        }

        let current = match seed_code {
            Some(mut seed) => {
                if seed.n != target.n || seed.k != target.k {
                    return Err(StabForgeError::invalid(
                        "seed_code",
                        format!("a [[{},{}]] code", target.n, target.k),
                        format!("[[{},{}]]", seed.n, seed.k),
                    ));
                }
                seed.d = target.d;
                seed.validate()?;
                seed
            }
            None => sampler.initial(target.n, target.k, target.d)?,
        };

        let current_rate = noise::evaluate(
            target.model,
            target.error_rate,
            target.d,
            Some(&current),
            &noise,
        )?;

        let mut trace = OptimizationTrace::default();
        trace.push(1, current_rate);

        Ok(Self {
            target,
            noise,
            max_iterations,
            patience,
            sampler,
            best: current.clone(),
            best_rate: current_rate,
            current,
            current_rate,
            trace,
            stale_steps: 0,
        })
    }

    /// One perturb/score/accept round recorded as `iteration`.
    pub fn step(&mut self, iteration: usize) -> SfResult<()> {
        let candidate = self.sampler.perturb(&self.current);
        let candidate_rate = noise::evaluate(
            self.target.model,
            self.target.error_rate,
            self.target.d,
            Some(&candidate),
            &self.noise,
        )?;

        if candidate_rate < self.best_rate {
            self.best = candidate.clone();
            self.best_rate = candidate_rate;
            self.stale_steps = 0;
        } else {
            self.stale_steps += 1;
        }

        if candidate_rate <= self.current_rate {
            self.current = candidate;
            self.current_rate = candidate_rate;
        }

        self.trace.push(iteration, self.current_rate);
        Ok(())
    }

    fn converged(&self) -> bool {
        self.patience > 0 && self.stale_steps >= self.patience
    }

    pub fn run<CB: ProgressCallback + ?Sized>(
        mut self,
        restart: usize,
        callback: &CB,
    ) -> SfResult<OptimizationResult> {
        let mut termination = Termination::MaxIterations;

        for iteration in 2..=self.max_iterations {
            if !callback.on_progress(iteration - 1, self.current_rate, self.best_rate) {
                termination = Termination::Cancelled;
                break;
            }

            self.step(iteration)?;

            if self.converged() {
                debug!(
                    "Restart {}: converged at iteration {} (best {:.6})",
                    restart, iteration, self.best_rate
                );
                termination = Termination::Converged;
                break;
            }
        }

        let initial_error_rate = self.trace.first_rate().unwrap_or(self.best_rate);

        Ok(OptimizationResult {
            n: self.target.n,
            k: self.target.k,
            d: self.target.d,
            model: self.target.model,
            physical_error_rate: self.target.error_rate,
            best_code: self.best,
            initial_error_rate,
            final_error_rate: self.best_rate,
            improvement_percent: improvement_percent(initial_error_rate, self.best_rate),
            trace: self.trace,
            termination,
            restart,
        })
    }
}
