//! Wall-clock scenarios, scaled down (100ms stands in for one second)

use super::helpers::{ms, targets, FakeRefresh, Step};
use refresher::config::RunConfig;
use refresher::dispatch::{run_all, OperationError};
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn test_slow_node_times_out_while_others_finish() {
    // 3 nodes, timeout 5s, limit 2, B takes 10s and the rest 1s
    let op = FakeRefresh::new(Step::confirmed(ms(100))).step("B", Step::confirmed(ms(1_000)));
    let instruments = op.instruments();
    let config = RunConfig::default()
        .with_timeout(ms(500))
        .with_concurrency_limit(2);

    let report = run_all(&targets(&["A", "B", "C"]), Arc::new(op), &config).unwrap();

    assert!(!report.all_succeeded());
    assert_eq!(report.results().len(), 3);

    for result in report.in_dispatch_order() {
        match result.target.address() {
            "A" | "C" => {
                assert!(result.succeeded(), "{} should succeed", result.target);
                assert!(result.outcome.duration >= ms(100));
                assert!(result.outcome.duration < ms(450));
            }
            "B" => {
                assert_eq!(
                    result.outcome.error,
                    Some(OperationError::Timeout { timeout: ms(500) })
                );
                assert!(result.outcome.duration >= ms(500));
                assert!(result.outcome.duration < ms(900));
            }
            other => panic!("unexpected target {other}"),
        }
    }

    // C ran in the slot A freed while B was still stuck
    assert_eq!(instruments.peak(), 2);
    assert_eq!(instruments.terminated(), vec!["B".to_string()]);

    // Bounded by the timeout, nowhere near 3 x 10s run back to back
    assert!(report.elapsed() >= ms(500));
    assert!(report.elapsed() < ms(1_000));
}

#[test]
#[serial]
fn test_unbounded_run_finishes_in_one_operation_time() {
    // 5 nodes, no limit, each takes 1s and succeeds
    let op = FakeRefresh::new(Step::confirmed(ms(200)));
    let instruments = op.instruments();
    let config = RunConfig::default().with_concurrency_limit(0);

    let report = run_all(
        &targets(&["n1", "n2", "n3", "n4", "n5"]),
        Arc::new(op),
        &config,
    )
    .unwrap();

    assert!(report.all_succeeded());
    assert_eq!(report.passed_count(), 5);
    assert_eq!(instruments.peak(), 5);
    assert!(report.elapsed() < ms(600), "took {:?}", report.elapsed());
}

#[test]
#[serial]
fn test_window_rolls_instead_of_batching() {
    // limit 2: "long" holds one slot the whole time while the short ones
    // cycle through the other; batching would wait for "long" after each pair
    let op = FakeRefresh::new(Step::confirmed(ms(100))).step("long", Step::confirmed(ms(450)));
    let config = RunConfig::default()
        .with_timeout(ms(5_000))
        .with_concurrency_limit(2);

    let report = run_all(
        &targets(&["long", "s1", "s2", "s3", "s4"]),
        Arc::new(op),
        &config,
    )
    .unwrap();

    assert!(report.all_succeeded());
    // Rolling: max(450, 4 x 100) ≈ 450ms. Batches of two would need ≈ 650ms.
    assert!(report.elapsed() < ms(620), "took {:?}", report.elapsed());
}
