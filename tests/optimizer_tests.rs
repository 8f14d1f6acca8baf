use rstest::rstest;
use stabforge::api::{self, OptimizeRequest};
use stabforge::config::{InitStrategy, SamplerParams};
use stabforge::error::StabForgeError;
use stabforge::optimizer::{
    CancelFlag, NoProgress, OptimizationOptions, Optimizer, SearchTarget, Termination,
};
use stabforge::noise::NoiseModelKind;
use stabforge::sampler::paired_base;
use std::sync::atomic::{AtomicUsize, Ordering};

fn options(max_iterations: usize, patience: usize) -> OptimizationOptions {
    OptimizationOptions {
        max_iterations,
        patience,
        ..OptimizationOptions::default()
    }
}

fn request(n: i64, k: i64, d: i64, seed: u64) -> OptimizeRequest {
    let mut req = OptimizeRequest::new(n, k, d);
    req.seed = Some(seed);
    req
}

#[test]
fn test_five_qubit_search_fifty_iterations() {
    let resp = api::optimize(&request(5, 1, 3, 11), &options(50, 0)).unwrap();

    assert_eq!(resp.best_x_part.shape(), (4, 5));
    assert_eq!(resp.best_z_part.shape(), (4, 5));
    assert_eq!(resp.error_rates.len(), 50);
    assert_eq!(resp.iterations, 50);
    assert!(resp.final_error_rate <= resp.error_rates[0]);
    assert!(resp.improvement >= 0.0);
    assert_eq!(resp.termination, Termination::MaxIterations);
}

#[test]
fn test_current_trace_never_increases() {
    let resp = api::optimize(&request(7, 1, 3, 5), &options(80, 0)).unwrap();
    for pair in resp.error_rates.windows(2) {
        assert!(pair[1] <= pair[0], "trace went up: {:?}", pair);
    }
    let min = resp.error_rates.iter().cloned().fold(f64::INFINITY, f64::min);
    assert_eq!(resp.final_error_rate, min);
}

#[test]
fn test_smallest_code_has_one_generator() {
    let resp = api::optimize(&request(2, 1, 1, 3), &options(10, 0)).unwrap();
    assert_eq!(resp.best_x_part.shape(), (1, 2));
    assert_eq!(resp.best_z_part.shape(), (1, 2));
    assert_eq!(resp.stabilizers.len(), 1);
}

#[rstest]
#[case(3, 3, 1, "k")]
#[case(3, 0, 1, "k")]
#[case(0, 1, 1, "n")]
#[case(5, 1, 0, "d")]
#[case(5, 1, -2, "d")]
fn test_invalid_parameters_name_the_field(
    #[case] n: i64,
    #[case] k: i64,
    #[case] d: i64,
    #[case] field: &str,
) {
    let err = api::optimize(&request(n, k, d, 1), &options(5, 0)).unwrap_err();
    assert!(matches!(err, StabForgeError::InvalidParameter { .. }));
    assert_eq!(err.field(), Some(field));
}

#[rstest]
#[case("Depolarizing")]
#[case("Amplitude Damping")]
#[case("Biased Noise")]
fn test_zero_error_rate_reports_no_improvement(#[case] model: &str) {
    let mut req = request(5, 1, 3, 9);
    req.model = Some(model.to_string());
    req.error_rate = Some(0.0);
    let resp = api::optimize(&req, &options(20, 0)).unwrap();
    assert_eq!(resp.final_error_rate, 0.0);
    assert_eq!(resp.improvement, 0.0);
}

#[test]
fn test_unknown_model_rejected() {
    let mut req = request(5, 1, 3, 1);
    req.model = Some("Thermal".into());
    let err = api::optimize(&req, &options(5, 0)).unwrap_err();
    assert_eq!(err.field(), Some("model"));
}

#[test]
fn test_fixed_seed_is_reproducible_across_restarts() {
    let mut opts = options(40, 0);
    opts.restarts = 4;
    let a = api::optimize(&request(6, 2, 3, 1234), &opts).unwrap();
    let b = api::optimize(&request(6, 2, 3, 1234), &opts).unwrap();
    assert_eq!(a.best_x_part, b.best_x_part);
    assert_eq!(a.best_z_part, b.best_z_part);
    assert_eq!(a.error_rates, b.error_rates);
}

#[test]
fn test_best_restart_is_not_worse_than_single_run() {
    let single = api::optimize(&request(6, 1, 3, 77), &options(30, 0)).unwrap();
    let mut opts = options(30, 0);
    opts.restarts = 3;
    let many = api::optimize(&request(6, 1, 3, 77), &opts).unwrap();
    // Restart 0 reuses the same seed as the single run.
    assert!(many.final_error_rate <= single.final_error_rate);
}

#[test]
fn test_patience_stops_early() {
    let mut opts = options(500, 1);
    opts.sampler.perturb_retries = 0;
    let resp = api::optimize(&request(5, 1, 3, 2), &opts).unwrap();
    assert_eq!(resp.termination, Termination::Converged);
    assert_eq!(resp.iterations, 2);
}

#[test]
fn test_cancel_flag_stops_search() {
    let flag = CancelFlag::new();
    flag.cancel();
    let target = SearchTarget {
        n: 5,
        k: 1,
        d: 3,
        model: NoiseModelKind::Depolarizing,
        error_rate: 0.01,
    };
    let result = Optimizer::new(options(100, 0))
        .run(&target, Some(1), None, &flag)
        .unwrap();
    assert_eq!(result.termination, Termination::Cancelled);
    assert_eq!(result.iterations(), 1);
}

#[test]
fn test_callback_sees_every_step() {
    let calls = AtomicUsize::new(0);
    let count = |_: usize, current: f64, best: f64| {
        assert!(best <= current);
        calls.fetch_add(1, Ordering::Relaxed);
        true
    };
    let req = request(5, 1, 3, 8);
    api::optimize_with(&req, &options(25, 0), None, &count).unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 24);
}

#[test]
fn test_seed_code_starts_the_search() {
    let seed = paired_base(5, 1, 1).unwrap();
    let req = request(5, 1, 3, 4);
    let result = api::optimize_with(&req, &options(1, 0), Some(&seed), &NoProgress).unwrap();
    assert_eq!(result.best_code.x_part, seed.x_part);
    assert_eq!(result.best_code.z_part, seed.z_part);
    assert_eq!(result.best_code.d, 3);
}

#[test]
fn test_random_init_reports_no_feasible_code() {
    let mut opts = options(10, 0);
    opts.sampler = SamplerParams {
        init_strategy: InitStrategy::Random,
        init_attempts: 1,
        ..SamplerParams::default()
    };
    let err = api::optimize(&request(40, 1, 3, 99), &opts).unwrap_err();
    assert!(
        matches!(err, StabForgeError::NoFeasibleCode { n: 40, k: 1, .. }),
        "unexpected error: {}",
        err
    );
}

#[test]
fn test_invalid_options_rejected_before_search() {
    let mut opts = options(10, 0);
    opts.sampler.flips_min = 0;
    let err = api::optimize(&request(5, 1, 3, 1), &opts).unwrap_err();
    assert_eq!(err.field(), Some("flips_min"));

    let mut opts = options(10, 0);
    opts.noise.threshold_amplitude_damping = -0.04;
    let err = api::optimize(&request(5, 1, 3, 1), &opts).unwrap_err();
    assert_eq!(err.field(), Some("threshold_amplitude_damping"));

    let mut opts = options(10, 0);
    opts.restarts = 0;
    let err = api::optimize(&request(5, 1, 3, 1), &opts).unwrap_err();
    assert_eq!(err.field(), Some("restarts"));
}
