use rstest::rstest;
use stabforge::api::{self, SimulateRequest, SimulateResponse};
use stabforge::code::{BinaryMatrix, StabilizerCode};
use stabforge::config::NoiseParams;
use stabforge::error::StabForgeError;
use stabforge::noise::{self, failure_order, NoiseModelKind};
use stabforge::sampler::paired_base;

fn sim(model: &str, error_rate: f64, distances: Vec<i64>) -> SimulateRequest {
    SimulateRequest {
        model: model.to_string(),
        error_rate,
        distances,
    }
}

#[rstest]
#[case(1, 1)]
#[case(2, 2)]
#[case(3, 2)]
#[case(4, 3)]
#[case(5, 3)]
#[case(7, 4)]
fn test_failure_order(#[case] d: usize, #[case] t: i32) {
    assert_eq!(failure_order(d), t);
}

#[test]
fn test_depolarizing_three_distances() {
    let result = api::simulate(&sim("Depolarizing", 0.01, vec![3, 5, 7]), &NoiseParams::default())
        .unwrap();
    let rates = result.logical_error_rates();
    assert_eq!(rates.len(), 3);
    let expected = [0.1 / 9.0, 0.1 / 27.0, 0.1 / 81.0];
    for (got, want) in rates.iter().zip(expected) {
        assert!((got - want).abs() < 1e-12, "{} vs {}", got, want);
    }
    assert!(rates[0] >= rates[1] && rates[1] >= rates[2]);
    assert_eq!(result.optimal_distance, 7);
    assert_eq!(result.minimal_error_rate, rates[2]);
}

#[rstest]
#[case("Depolarizing", 0.03)]
#[case("Biased Noise", 0.05)]
fn test_at_threshold_every_distance_ties(#[case] model: &str, #[case] p: f64) {
    let result = api::simulate(&sim(model, p, vec![5, 3, 9]), &NoiseParams::default()).unwrap();
    for rate in result.logical_error_rates() {
        assert!((rate - 0.1).abs() < 1e-12);
    }
    assert_eq!(result.optimal_distance, 5);
}

#[rstest]
#[case(NoiseModelKind::Depolarizing)]
#[case(NoiseModelKind::AmplitudeDamping)]
#[case(NoiseModelKind::BiasedNoise)]
fn test_rates_clamped_to_probability(#[case] model: NoiseModelKind) {
    let params = NoiseParams::default();
    for d in [1, 3, 11] {
        let rate = noise::evaluate(model, 1.0, d, None, &params).unwrap();
        assert!((0.0..=1.0).contains(&rate));
    }
    assert_eq!(noise::evaluate(model, 0.0, 3, None, &params).unwrap(), 0.0);
}

#[rstest]
#[case(-0.1)]
#[case(1.5)]
#[case(f64::NAN)]
fn test_out_of_range_error_rate(#[case] p: f64) {
    let err = api::simulate(&sim("Depolarizing", p, vec![3]), &NoiseParams::default()).unwrap_err();
    assert_eq!(err.field(), Some("error_rate"));
}

#[test]
fn test_empty_distance_list_rejected() {
    let err = api::simulate(&sim("Depolarizing", 0.01, vec![]), &NoiseParams::default()).unwrap_err();
    assert_eq!(err.field(), Some("distances"));
}

#[test]
fn test_code_aware_rate_is_not_below_code_free_rate() {
    let params = NoiseParams::default();
    let code = paired_base(5, 1, 3).unwrap();
    for model in [
        NoiseModelKind::Depolarizing,
        NoiseModelKind::AmplitudeDamping,
        NoiseModelKind::BiasedNoise,
    ] {
        let bare = noise::evaluate(model, 0.01, 3, None, &params).unwrap();
        let with_code = noise::evaluate(model, 0.01, 3, Some(&code), &params).unwrap();
        assert!(with_code >= bare, "{}: {} < {}", model, with_code, bare);
    }
}

#[test]
fn test_response_carries_text_report() {
    let result = api::simulate(&sim("depolarizing", 0.01, vec![3, 5]), &NoiseParams::default())
        .unwrap();
    let resp = SimulateResponse::from(result);
    assert!(resp.result.contains("Distance 3:"));
    assert!(resp.result.contains("Optimal Code Distance: 5"));

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["model"], "Depolarizing");
    assert_eq!(json["optimal_distance"], 5);
    assert!(json["per_distance"].is_array());
}

#[test]
fn test_sweep_picks_lowest_model_and_distance() {
    let sweep = api::sweep(0.01, &[3, 5, 7], &NoiseParams::default()).unwrap();
    assert_eq!(sweep.models.len(), 3);
    assert_eq!(sweep.best_model, NoiseModelKind::AmplitudeDamping);
    assert_eq!(sweep.best_distance, 7);

    let min = sweep
        .models
        .iter()
        .flat_map(|m| m.logical_error_rates())
        .fold(f64::INFINITY, f64::min);
    assert_eq!(sweep.best_error_rate, min);
}

#[test]
fn test_custom_threshold_changes_rate() {
    let params = NoiseParams {
        threshold_depolarizing: 0.01,
        ..NoiseParams::default()
    };
    let rate = noise::evaluate(NoiseModelKind::Depolarizing, 0.01, 7, None, &params).unwrap();
    assert!((rate - 0.1).abs() < 1e-12);
}

#[test]
fn test_huge_distance_keeps_rates_non_increasing() {
    let result = api::simulate(
        &sim("Depolarizing", 0.01, vec![3, 4_294_967_296, i64::MAX]),
        &NoiseParams::default(),
    )
    .unwrap();
    let rates = result.logical_error_rates();
    assert!(rates[1] <= rates[0], "{:?}", rates);
    assert!(rates[2] <= rates[1], "{:?}", rates);
    assert_eq!(rates[1], 0.0);
    assert_eq!(result.optimal_distance, 4_294_967_296);
}

#[rstest]
#[case("threshold_depolarizing", NoiseParams { threshold_depolarizing: 0.0, ..NoiseParams::default() })]
#[case("bias_ratio", NoiseParams { bias_ratio: -1.0, ..NoiseParams::default() })]
#[case("prefactor", NoiseParams { prefactor: f64::NAN, ..NoiseParams::default() })]
#[case("weight_penalty", NoiseParams { weight_penalty: -0.5, ..NoiseParams::default() })]
fn test_bad_noise_params_rejected_by_services(#[case] field: &str, #[case] params: NoiseParams) {
    let err = api::simulate(&sim("Depolarizing", 0.0, vec![3]), &params).unwrap_err();
    assert_eq!(err.field(), Some(field));

    let err = api::sweep(0.0, &[3, 5], &params).unwrap_err();
    assert_eq!(err.field(), Some(field));
}

#[test]
fn test_anticommuting_code_rejected_by_evaluate() {
    let code = StabilizerCode {
        n: 3,
        k: 1,
        d: 1,
        x_part: BinaryMatrix::from_rows(vec![vec![1, 0, 0], vec![0, 0, 0]]).unwrap(),
        z_part: BinaryMatrix::from_rows(vec![vec![0, 0, 0], vec![1, 0, 0]]).unwrap(),
    };
    let err = noise::evaluate(
        NoiseModelKind::Depolarizing,
        0.01,
        3,
        Some(&code),
        &NoiseParams::default(),
    )
    .unwrap_err();
    assert!(matches!(err, StabForgeError::InvalidParameter { .. }));
    assert_eq!(err.field(), Some("code"));
}

#[test]
fn test_deserialized_code_is_checked_by_evaluate() {
    let code: StabilizerCode = serde_json::from_str(
        r#"{"n": 2, "k": 1, "d": 1, "x_part": [[1, 0]], "z_part": [[0, 0], [1, 0]]}"#,
    )
    .unwrap();
    let err = noise::evaluate(NoiseModelKind::BiasedNoise, 0.01, 1, Some(&code), &NoiseParams::default())
        .unwrap_err();
    assert_eq!(err.field(), Some("z_part"));
}
