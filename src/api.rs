//! Request/response services behind the "optimize" and "simulate" contracts.
//!
//! Requests arrive exactly as the transport layer decoded them (signed
//! integers, free-form model names), so every field is validated here before
//! anything reaches the core.

use crate::code::{BinaryMatrix, GateCounts, StabilizerCode};
use crate::config::NoiseParams;
use crate::error::{SfResult, StabForgeError};
use crate::noise::{self, NoiseModelKind};
use crate::optimizer::{
    NoProgress, OptimizationOptions, OptimizationResult, Optimizer, ProgressCallback, SearchTarget,
    Termination,
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

pub const DEFAULT_OPTIMIZE_ERROR_RATE: f64 = 0.01;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OptimizeRequest {
    pub n: i64,
    pub k: i64,
    pub d: i64,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, alias = "errorRate")]
    pub error_rate: Option<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl OptimizeRequest {
    pub fn new(n: i64, k: i64, d: i64) -> Self {
        Self {
            n,
            k,
            d,
            model: None,
            error_rate: None,
            seed: None,
        }
    }

    pub fn to_target(&self) -> SfResult<SearchTarget> {
        let n = positive("n", self.n)?;
        let k = positive("k", self.k)?;
        let d = positive("d", self.d)?;
        crate::code::validate_params(n, k, d)?;

        let model = match &self.model {
            Some(name) => NoiseModelKind::parse(name)?,
            None => NoiseModelKind::Depolarizing,
        };
        let error_rate = self.error_rate.unwrap_or(DEFAULT_OPTIMIZE_ERROR_RATE);
        check_rate(error_rate)?;

        Ok(SearchTarget {
            n,
            k,
            d,
            model,
            error_rate,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OptimizeResponse {
    pub n: usize,
    pub k: usize,
    pub d: usize,
    pub best_x_part: BinaryMatrix,
    pub best_z_part: BinaryMatrix,
    pub error_rates: Vec<f64>,
    pub final_error_rate: f64,
    pub improvement: f64,
    pub iterations: usize,
    pub initial_error_rate: f64,
    pub model: NoiseModelKind,
    pub physical_error_rate: f64,
    pub termination: Termination,
    pub stabilizers: Vec<String>,
    pub gate_counts: GateCounts,
    pub generator_weights: Vec<usize>,
    pub qubit_usage: Vec<usize>,
}

impl From<&OptimizationResult> for OptimizeResponse {
    fn from(r: &OptimizationResult) -> Self {
        Self {
            n: r.n,
            k: r.k,
            d: r.d,
            best_x_part: r.best_code.x_part.clone(),
            best_z_part: r.best_code.z_part.clone(),
            error_rates: r.trace.error_rates(),
            final_error_rate: r.final_error_rate,
            improvement: r.improvement_percent,
            iterations: r.iterations(),
            initial_error_rate: r.initial_error_rate,
            model: r.model,
            physical_error_rate: r.physical_error_rate,
            termination: r.termination,
            stabilizers: r.best_code.pauli_strings(),
            gate_counts: r.best_code.gate_counts(),
            generator_weights: r.best_code.generator_weights(),
            qubit_usage: r.best_code.qubit_usage(),
        }
    }
}

/// Service: search for the best code for `req` and return the full result.
pub fn optimize_with<CB: ProgressCallback + ?Sized>(
    req: &OptimizeRequest,
    options: &OptimizationOptions,
    seed_code: Option<&StabilizerCode>,
    callback: &CB,
) -> SfResult<OptimizationResult> {
    let target = req.to_target()?;
    Optimizer::new(options.clone()).run(&target, req.seed, seed_code, callback)
}

/// Service: the "optimize" contract.
pub fn optimize(req: &OptimizeRequest, options: &OptimizationOptions) -> SfResult<OptimizeResponse> {
    let result = optimize_with(req, options, None, &NoProgress)?;
    Ok(OptimizeResponse::from(&result))
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SimulateRequest {
    pub model: String,
    #[serde(alias = "errorRate")]
    pub error_rate: f64,
    pub distances: Vec<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DistanceRate {
    pub distance: usize,
    pub logical_error_rate: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SimulationResult {
    pub model: NoiseModelKind,
    pub error_rate: f64,
    /// One entry per requested distance, in request order.
    pub per_distance: Vec<DistanceRate>,
    pub optimal_distance: usize,
    pub minimal_error_rate: f64,
}

impl SimulationResult {
    pub fn logical_error_rates(&self) -> Vec<f64> {
        self.per_distance
            .iter()
            .map(|r| r.logical_error_rate)
            .collect()
    }

    /// Plain-text report: one line per distance, then the optimum.
    pub fn report(&self) -> String {
        let mut lines = vec![format!("Model: {} (p = {})", self.model, self.error_rate)];
        lines.extend(
            self.per_distance
                .iter()
                .map(|r| format!("Distance {}: {:.6e}", r.distance, r.logical_error_rate)),
        );
        lines.push(format!("Optimal Code Distance: {}", self.optimal_distance));
        lines.push(format!(
            "Minimal Logical Error Rate: {:.6}",
            self.minimal_error_rate
        ));
        lines.join("\n") + "\n"
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SimulateResponse {
    #[serde(flatten)]
    pub simulation: SimulationResult,
    pub result: String,
}

impl From<SimulationResult> for SimulateResponse {
    fn from(simulation: SimulationResult) -> Self {
        let result = simulation.report();
        Self { simulation, result }
    }
}

/// Service: the "simulate" contract.
pub fn simulate(req: &SimulateRequest, params: &NoiseParams) -> SfResult<SimulationResult> {
    let model = NoiseModelKind::parse(&req.model)?;
    check_rate(req.error_rate)?;
    let distances = check_distances(&req.distances)?;
    simulate_model(model, req.error_rate, &distances, params)
}

fn simulate_model(
    model: NoiseModelKind,
    error_rate: f64,
    distances: &[usize],
    params: &NoiseParams,
) -> SfResult<SimulationResult> {
    let per_distance = distances
        .iter()
        .map(|&distance| {
            Ok(DistanceRate {
                distance,
                logical_error_rate: noise::evaluate(model, error_rate, distance, None, params)?,
            })
        })
        .collect::<SfResult<Vec<_>>>()?;

    let optimal = per_distance
        .iter()
        .copied()
        .reduce(|best, r| {
            if r.logical_error_rate < best.logical_error_rate {
                r
            } else {
                best
            }
        })
        .ok_or_else(|| StabForgeError::invalid("distances", "at least one distance", "[]"))?;

    Ok(SimulationResult {
        model,
        error_rate,
        per_distance,
        optimal_distance: optimal.distance,
        minimal_error_rate: optimal.logical_error_rate,
    })
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SweepResult {
    pub error_rate: f64,
    pub models: Vec<SimulationResult>,
    pub best_model: NoiseModelKind,
    pub best_distance: usize,
    pub best_error_rate: f64,
}

/// Service: every noise model over the same distances, plus the best pairing.
pub fn sweep(error_rate: f64, distances: &[i64], params: &NoiseParams) -> SfResult<SweepResult> {
    check_rate(error_rate)?;
    let distances = check_distances(distances)?;

    let models = NoiseModelKind::iter()
        .map(|m| simulate_model(m, error_rate, &distances, params))
        .collect::<SfResult<Vec<_>>>()?;

    let mut best: Option<(NoiseModelKind, usize, f64)> = None;
    for (i, &distance) in distances.iter().enumerate() {
        for sim in &models {
            let rate = sim.per_distance[i].logical_error_rate;
            if best.map_or(true, |(_, _, b)| rate < b) {
                best = Some((sim.model, distance, rate));
            }
        }
    }
    let (best_model, best_distance, best_error_rate) =
        best.ok_or_else(|| StabForgeError::invalid("distances", "at least one distance", "[]"))?;

    Ok(SweepResult {
        error_rate,
        models,
        best_model,
        best_distance,
        best_error_rate,
    })
}

fn positive(field: &str, value: i64) -> SfResult<usize> {
    if value < 1 {
        return Err(StabForgeError::invalid(field, format!("{} >= 1", field), value));
    }
    usize::try_from(value).map_err(|_| StabForgeError::invalid(field, "a machine-sized integer", value))
}

fn check_rate(rate: f64) -> SfResult<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(StabForgeError::invalid(
            "error_rate",
            "a probability in [0, 1]",
            rate,
        ));
    }
    Ok(())
}

fn check_distances(distances: &[i64]) -> SfResult<Vec<usize>> {
    if distances.is_empty() {
        return Err(StabForgeError::invalid("distances", "at least one distance", "[]"));
    }
    distances
        .iter()
        .enumerate()
        .map(|(i, &d)| positive(&format!("distances[{}]", i), d))
        .collect()
}
