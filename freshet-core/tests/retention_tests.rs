// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Retention policies as pure data structures, exercised directly.

use freshet_core::retention::{
    KeepAll, KeepLast, KeepLastWithin, KeepNone, KeepWithin, RetentionConfig, RetentionPolicy,
    UntilFirstReplay,
};
use std::thread;
use std::time::Duration;

fn record_all<P: RetentionPolicy<u32>>(policy: &mut P, values: impl IntoIterator<Item = u32>) {
    for value in values {
        policy.record(value);
    }
}

#[test]
fn keep_all_retains_everything() {
    let mut policy = KeepAll::new();
    record_all(&mut policy, 1..=4);
    assert_eq!(policy.replay(), vec![1, 2, 3, 4]);
    // Replay does not consume
    assert_eq!(policy.replay(), vec![1, 2, 3, 4]);
}

#[test]
fn keep_none_retains_nothing() {
    let mut policy = KeepNone;
    record_all(&mut policy, 1..=4);
    assert!(RetentionPolicy::<u32>::replay(&mut policy).is_empty());
}

#[test]
fn keep_last_evicts_oldest_first() {
    let mut policy = KeepLast::new(2);
    record_all(&mut policy, 1..=5);
    assert_eq!(policy.replay(), vec![4, 5]);
}

#[test]
fn keep_within_expires_by_age() {
    let mut policy = KeepWithin::new(Duration::from_millis(30));
    policy.record(1);
    thread::sleep(Duration::from_millis(50));
    policy.record(2);
    assert_eq!(policy.replay(), vec![2]);
}

#[test]
fn keep_last_within_applies_both_bounds() {
    let mut policy = KeepLastWithin::new(2, Duration::from_secs(60));
    record_all(&mut policy, 1..=5);
    // Count bound evicts long before the age bound in this test
    assert_eq!(policy.replay(), vec![4, 5]);

    let mut policy = KeepLastWithin::new(100, Duration::from_millis(30));
    policy.record(1);
    thread::sleep(Duration::from_millis(50));
    policy.record(2);
    assert_eq!(policy.replay(), vec![2]);
}

#[test]
fn clear_forgets_retained_values() {
    let mut policy = KeepAll::new();
    record_all(&mut policy, 1..=3);
    policy.clear();
    assert!(policy.replay().is_empty());
}

#[test]
fn until_first_replay_swaps_after_the_first_subscriber() {
    let mut policy = UntilFirstReplay::new(Box::new(KeepAll::new()), Box::new(KeepNone));
    record_all(&mut policy, 1..=3);

    // First attacher gets the buffered history
    assert_eq!(policy.replay(), vec![1, 2, 3]);
    // Everyone after that gets the terminal policy's answer
    assert!(policy.replay().is_empty());

    policy.record(4);
    assert!(policy.replay().is_empty());
}

#[test]
fn config_defaults_to_unbounded_retention() {
    let mut policy = RetentionConfig::default().into_policy::<u32>();
    for value in 1..=3 {
        policy.record(value);
    }
    assert_eq!(policy.replay(), vec![1, 2, 3]);
}

#[test]
fn config_with_count_bound_keeps_last() {
    let config: RetentionConfig = serde_json::from_str(r#"{ "max_count": 2 }"#).unwrap();
    let mut policy = config.into_policy::<u32>();
    for value in 1..=5 {
        policy.record(value);
    }
    assert_eq!(policy.replay(), vec![4, 5]);
}

#[test]
fn config_with_drop_after_first_replay_is_one_shot() {
    let config: RetentionConfig =
        serde_json::from_str(r#"{ "drop_after_first_replay": true }"#).unwrap();
    let mut policy = config.into_policy::<u32>();
    policy.record(1);
    assert_eq!(policy.replay(), vec![1]);
    assert!(policy.replay().is_empty());
}

#[test]
fn config_roundtrips_through_json() {
    let config = RetentionConfig {
        max_count: Some(16),
        max_age_ms: Some(5000),
        drop_after_first_replay: false,
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: RetentionConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.max_count, Some(16));
    assert_eq!(parsed.max_age_ms, Some(5000));
    assert!(!parsed.drop_after_first_replay);
}
