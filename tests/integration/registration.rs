//! Integration tests for the registration phase
//! Tests that registration order and scoping survive into execution

use specrun_builder::SuiteBuilder;
use specrun_runner::{RecordingSink, run_blocking};
use specrun_tree::Runnable;

fn noop() -> Runnable {
    Runnable::from_fn(|| Ok(()))
}

#[test]
fn test_mixed_registration_order_is_execution_order() {
    let mut builder = SuiteBuilder::new();
    builder.case("a", noop());
    builder
        .group("g1", |g| {
            g.case("b", noop());
            Ok(())
        })
        .unwrap();
    builder.case("c", noop());
    builder
        .group("g2", |g| {
            g.case("d", noop());
            Ok(())
        })
        .unwrap();
    let suite = builder.finish();

    let mut sink = RecordingSink::new();
    run_blocking(&suite, &mut sink);

    assert_eq!(sink.registered(), ["a", "g1 > b", "c", "g2 > d"]);
}

#[test]
fn test_duplicate_names_yield_duplicate_path_segments() {
    let mut builder = SuiteBuilder::new();
    builder
        .group("twin", |g| {
            g.case("t", noop());
            Ok(())
        })
        .unwrap();
    builder
        .group("twin", |g| {
            g.case("t", noop());
            Ok(())
        })
        .unwrap();
    let suite = builder.finish();

    let mut sink = RecordingSink::new();
    run_blocking(&suite, &mut sink);

    assert_eq!(sink.registered(), ["twin > t", "twin > t"]);
}

#[test]
fn test_registration_failure_propagates_to_the_caller() {
    let mut builder = SuiteBuilder::new();
    let result = builder.group("outer", |outer| {
        outer.group("inner", |_| anyhow::bail!("registration exploded"))
    });

    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "registration exploded");
}

#[test]
fn test_registrations_before_a_failure_still_execute() {
    let mut builder = SuiteBuilder::new();
    builder.case("kept", noop());
    let _ = builder.group("broken", |g| {
        g.case("also kept", noop());
        anyhow::bail!("late failure")
    });
    let suite = builder.finish();

    let mut sink = RecordingSink::new();
    run_blocking(&suite, &mut sink);

    assert_eq!(sink.registered(), ["kept", "broken > also kept"]);
}

#[test]
fn test_deeply_nested_groups_compose_full_paths() {
    let mut builder = SuiteBuilder::new();
    builder
        .group("l1", |a| {
            a.group("l2", |b| {
                b.group("l3", |c| {
                    c.it("leaf", noop());
                    Ok(())
                })
            })
        })
        .unwrap();
    let suite = builder.finish();

    let mut sink = RecordingSink::new();
    run_blocking(&suite, &mut sink);

    assert_eq!(sink.registered(), ["l1 > l2 > l3 > leaf"]);
}
