pub mod controller;
pub mod runner;

pub use self::controller::{OptimizationController, SearchTarget};
pub use self::runner::{OptimizationOptions, Optimizer};

use crate::code::StabilizerCode;
use crate::error::SfResult;
use crate::noise::NoiseModelKind;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use strum_macros::Display;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub iteration: usize,
    pub error_rate: f64,
}

/// Per-iteration error rate of the current code, in iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptimizationTrace {
    points: Vec<TracePoint>,
}

impl OptimizationTrace {
    pub(crate) fn push(&mut self, iteration: usize, error_rate: f64) {
        debug_assert!(self.points.last().map_or(true, |p| p.iteration < iteration));
        self.points.push(TracePoint {
            iteration,
            error_rate,
        });
    }

    pub fn points(&self) -> &[TracePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_rate(&self) -> Option<f64> {
        self.points.first().map(|p| p.error_rate)
    }

    pub fn error_rates(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.error_rate).collect()
    }

    /// Running minimum of the recorded rates.
    pub fn best_so_far(&self) -> Vec<f64> {
        let mut best = f64::INFINITY;
        self.points
            .iter()
            .map(|p| {
                best = best.min(p.error_rate);
                best
            })
            .collect()
    }

    /// Writes `iteration,error_rate` rows with a header.
    pub fn write_csv<W: Write>(&self, writer: W) -> SfResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for p in &self.points {
            wtr.serialize(p)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Termination {
    MaxIterations,
    Converged,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub n: usize,
    pub k: usize,
    pub d: usize,
    pub model: NoiseModelKind,
    pub physical_error_rate: f64,
    pub best_code: StabilizerCode,
    pub initial_error_rate: f64,
    pub final_error_rate: f64,
    pub improvement_percent: f64,
    pub trace: OptimizationTrace,
    pub termination: Termination,
    /// Index of the restart that produced this result.
    pub restart: usize,
}

impl OptimizationResult {
    pub fn iterations(&self) -> usize {
        self.trace.len()
    }
}

/// Relative drop from `initial` to `final_rate` in percent; `0.0` when `initial` is zero.
pub fn improvement_percent(initial: f64, final_rate: f64) -> f64 {
    if initial == 0.0 {
        debug!("Initial error rate is exactly 0, reporting 0% improvement");
        return 0.0;
    }
    100.0 * (initial - final_rate) / initial
}

/// A trait for receiving updates during optimization.
/// Boolean return value indicates if the search should continue (true) or abort (false).
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, iteration: usize, current_rate: f64, best_rate: f64) -> bool;
}

impl<F> ProgressCallback for F
where
    F: Fn(usize, f64, f64) -> bool + Send + Sync,
{
    fn on_progress(&self, iteration: usize, current_rate: f64, best_rate: f64) -> bool {
        self(iteration, current_rate, best_rate)
    }
}

pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_progress(&self, _: usize, _: f64, _: f64) -> bool {
        true
    }
}

/// Shared stop switch; clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl ProgressCallback for CancelFlag {
    fn on_progress(&self, _: usize, _: f64, _: f64) -> bool {
        !self.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_improvement_zero_initial() {
        assert_eq!(improvement_percent(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_improvement_halved() {
        assert!((improvement_percent(0.2, 0.1) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_trace_csv() {
        let mut trace = OptimizationTrace::default();
        trace.push(1, 0.5);
        trace.push(2, 0.25);
        let mut out = Vec::new();
        trace.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "iteration,error_rate\n1,0.5\n2,0.25\n");
    }

    #[test]
    fn test_best_so_far_is_running_min() {
        let mut trace = OptimizationTrace::default();
        for (i, r) in [0.4, 0.5, 0.3, 0.35].iter().enumerate() {
            trace.push(i + 1, *r);
        }
        assert_eq!(trace.best_so_far(), vec![0.4, 0.4, 0.3, 0.3]);
    }

    #[test]
    fn test_cancel_flag_shared() {
        let flag = CancelFlag::new();
        let observer = flag.clone();
        assert!(observer.on_progress(1, 0.1, 0.1));
        flag.cancel();
        assert!(!observer.on_progress(2, 0.1, 0.1));
    }
}
