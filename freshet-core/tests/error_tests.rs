// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::{FreshetError, IntoFreshetError, Result, ResultExt};
use std::fmt;

#[derive(Debug)]
struct AppError(&'static str);

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for AppError {}

#[test]
fn classification_helpers() {
    assert!(FreshetError::Cancelled.is_cancellation());
    assert!(!FreshetError::Cancelled.is_timeout());
    assert!(FreshetError::timeout("50ms elapsed").is_timeout());
    assert!(!FreshetError::upstream("boom").is_cancellation());
}

#[test]
fn display_carries_context() {
    let err = FreshetError::upstream("producer went away");
    assert_eq!(err.to_string(), "Upstream failure: producer went away");

    let err = FreshetError::InvalidIndex { index: -3 };
    assert_eq!(err.to_string(), "Invalid index: -3");
}

#[test]
fn arbitrary_errors_convert_to_user_errors() {
    let err = AppError("bad input").into_freshet();
    assert!(matches!(err, FreshetError::User(_)));
    assert_eq!(err.to_string(), "User error: bad input");
}

#[test]
fn context_turns_user_errors_into_upstream_failures() {
    let result: Result<()> = Err(FreshetError::user(AppError("bad input")));
    let err = result.context("delivering value").unwrap_err();
    match err {
        FreshetError::Upstream { context } => {
            assert_eq!(context, "delivering value: bad input");
        }
        other => panic!("expected upstream failure, got {other}"),
    }
}

#[test]
fn context_leaves_structured_variants_alone() {
    let result: Result<()> = Err(FreshetError::Cancelled);
    assert!(result.context("ignored").unwrap_err().is_cancellation());
}

#[test]
fn clone_degrades_user_errors_to_their_rendered_form() {
    let original = FreshetError::user(AppError("bad input"));
    let cloned = original.clone();
    match cloned {
        FreshetError::Upstream { context } => {
            assert_eq!(context, "User error: bad input");
        }
        other => panic!("expected upstream failure, got {other}"),
    }
}
