use roast_core::goals::{OnFailure, OnMissing};
use roast_core::metrics::{ComputedMetrics, MetricId, Source};
use roast_core::{GoalDefinition, ParameterGoal, Status, check_goals, compare_to_reference};
use rstest::rstest;

fn one(id: MetricId, v: f64) -> ComputedMetrics {
    ComputedMetrics::new().with(id, Some(v), Source::Telemetry)
}

#[rstest]
#[case::centre(600.0, Status::Green)]
#[case::green_edge(615.0, Status::Green)]
#[case::yellow(630.0, Status::Yellow)]
#[case::yellow_edge(570.0, Status::Yellow)]
#[case::red(640.0, Status::Red)]
fn total_time_bands(#[case] actual: f64, #[case] expected: Status) {
    // green within ±15 s, yellow within ±30 s
    let goal = GoalDefinition::new(
        "development",
        vec![ParameterGoal::new(MetricId::TotalTime, 30.0).with_warning(60.0)],
    );
    let r = compare_to_reference(
        &one(MetricId::TotalTime, actual),
        &one(MetricId::TotalTime, 600.0),
        &goal,
    );
    assert_eq!(r.status, expected);
    assert_eq!(r.parameters[0].reference, Some(600.0));
}

#[test]
fn explicit_target_overrides_reference() {
    let goal = GoalDefinition::new(
        "drop",
        vec![ParameterGoal::new(MetricId::DropBt, 2.0).with_target(210.0)],
    );
    let r = compare_to_reference(&one(MetricId::DropBt, 210.5), &one(MetricId::DropBt, 180.0), &goal);
    assert_eq!(r.status, Status::Green);
    assert_eq!(r.parameters[0].reference, Some(210.0));
}

#[test]
fn disabled_parameters_are_not_evaluated() {
    let mut p = ParameterGoal::new(MetricId::ChargeBt, 1.0).with_target(200.0);
    p.enabled = false;
    let goal = GoalDefinition::new("charge", vec![p]);
    let r = compare_to_reference(&one(MetricId::ChargeBt, 100.0), &ComputedMetrics::new(), &goal);
    assert!(r.parameters.is_empty());
    assert_eq!(r.status, Status::Unknown);
}

#[rstest]
#[case(OnMissing::Skip, Status::Unknown)]
#[case(OnMissing::Yellow, Status::Yellow)]
#[case(OnMissing::Red, Status::Red)]
fn missing_actual_follows_policy(#[case] policy: OnMissing, #[case] expected: Status) {
    let mut goal = GoalDefinition::new("auc", vec![ParameterGoal::new(MetricId::Auc, 10.0)]);
    goal.on_missing = policy;
    let r = compare_to_reference(&ComputedMetrics::new(), &one(MetricId::Auc, 300.0), &goal);
    assert_eq!(r.parameters[0].status, expected);
}

#[test]
fn report_aggregates_worst_of_active_goals() {
    let actual = ComputedMetrics::new()
        .with(MetricId::ChargeBt, Some(200.0), Source::Telemetry)
        .with(MetricId::DropBt, Some(230.0), Source::Telemetry);
    let green = GoalDefinition::new(
        "charge",
        vec![ParameterGoal::new(MetricId::ChargeBt, 4.0).with_target(200.0)],
    );
    let mut soft = GoalDefinition::new(
        "drop",
        vec![ParameterGoal::new(MetricId::DropBt, 4.0).with_target(210.0)],
    );
    soft.on_failure = OnFailure::Yellow;
    let mut inactive = GoalDefinition::new(
        "ignored",
        vec![ParameterGoal::new(MetricId::DropBt, 0.0).with_target(0.0)],
    );
    inactive.active = false;

    let report = check_goals(&actual, &ComputedMetrics::new(), &[green, soft, inactive]);
    assert_eq!(report.goals.len(), 2);
    assert_eq!(report.goals[0].status, Status::Green);
    assert_eq!(report.goals[1].status, Status::Yellow);
    assert_eq!(report.status, Status::Yellow);
}

#[test]
fn no_goals_is_unknown() {
    let report = check_goals(&ComputedMetrics::new(), &ComputedMetrics::new(), &[]);
    assert_eq!(report.status, Status::Unknown);
}
