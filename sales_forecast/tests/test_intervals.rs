use approx::assert_abs_diff_eq;
use rstest::rstest;
use sales_forecast::config::IntervalSettings;
use sales_forecast::intervals::{IntervalEstimator, StepEstimate, ZBreakpoint, ZScoreTable};
use sales_forecast::models::ModelForecast;

#[rstest]
#[case(0.99, 2.576)]
#[case(0.97, 1.96)]
#[case(0.95, 1.96)]
#[case(0.93, 1.645)]
#[case(0.90, 1.645)]
#[case(0.89, 1.28)]
#[case(0.50, 1.28)]
fn test_z_score_breakpoints(#[case] confidence: f64, #[case] expected: f64) {
    let table = ZScoreTable::default();
    assert_eq!(table.z_for(confidence), expected);
}

#[test]
fn test_z_table_order_does_not_matter() {
    let table = ZScoreTable {
        breakpoints: vec![
            ZBreakpoint { level: 0.90, z: 1.645 },
            ZBreakpoint { level: 0.99, z: 2.576 },
            ZBreakpoint { level: 0.95, z: 1.96 },
        ],
        floor: 1.28,
    };
    assert_eq!(table.z_for(0.96), 1.96);
    assert!(table.validate().is_ok());
}

#[test]
fn test_z_table_validation() {
    let table = ZScoreTable {
        breakpoints: vec![ZBreakpoint { level: 1.5, z: 2.0 }],
        floor: 1.28,
    };
    assert!(table.validate().is_err());
}

#[test]
fn test_fallback_margins_grow_linearly() {
    let settings = IntervalSettings::default();
    let estimator = IntervalEstimator::new(&settings);

    let margins = estimator.fallback_margins(5.0, 0.95, 4);

    assert_abs_diff_eq!(margins[0], 9.8, epsilon = 1e-9);
    assert_abs_diff_eq!(margins[1], 10.78, epsilon = 1e-9);
    assert_abs_diff_eq!(margins[2], 11.76, epsilon = 1e-9);
    assert_abs_diff_eq!(margins[3], 12.74, epsilon = 1e-9);
    for pair in margins.windows(2) {
        assert!(pair[1] >= pair[0]);
    }
}

#[test]
fn test_fallback_bounds_clamp_lower_only() {
    let settings = IntervalSettings::default();
    let estimator = IntervalEstimator::new(&settings);
    let forecast = ModelForecast::new(vec![2.0, 2.0], 2).unwrap();

    // std dev of history is 5, margin far exceeds the base
    let steps = estimator.estimate(&forecast, &[10.0, 20.0, 15.0], 0.95).unwrap();

    assert_eq!(steps[0].predicted, 2.0);
    assert_eq!(steps[0].lower, 0.0);
    assert_abs_diff_eq!(steps[0].upper, 11.8, epsilon = 1e-9);
    assert_abs_diff_eq!(steps[1].upper, 12.78, epsilon = 1e-9);
}

#[test]
fn test_native_intervals_used_directly() {
    let settings = IntervalSettings::default();
    let estimator = IntervalEstimator::new(&settings);
    let forecast =
        ModelForecast::new_with_intervals(vec![3.0, 4.0], 2, vec![(-1.0, 7.0), (1.0, 9.0)])
            .unwrap();

    let steps = estimator.estimate(&forecast, &[1.0, 2.0, 3.0], 0.95).unwrap();

    assert_eq!(
        steps,
        vec![
            StepEstimate { predicted: 3.0, lower: 0.0, upper: 7.0 },
            StepEstimate { predicted: 4.0, lower: 1.0, upper: 9.0 },
        ]
    );
}

#[test]
fn test_clamp_keeps_ordering_below_zero() {
    let step = StepEstimate::clamped(-5.0, -8.0, -2.0);

    assert_eq!(step.predicted, 0.0);
    assert_eq!(step.lower, 0.0);
    assert_eq!(step.upper, 0.0);
}

#[test]
fn test_clamp_never_lowers_upper() {
    let step = StepEstimate::clamped(-1.0, -4.0, 2.5);

    assert_eq!(step.predicted, 0.0);
    assert_eq!(step.lower, 0.0);
    assert_eq!(step.upper, 2.5);
}
