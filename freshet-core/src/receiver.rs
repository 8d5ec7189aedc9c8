// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{FreshetError, Result};
use crate::log_error;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RECEIVER_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of an attached receiver.
///
/// Registering the same receiver twice is a no-op; identity is assigned per
/// registration handle, not per value delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReceiverId(u64);

impl ReceiverId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_RECEIVER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Push contract for stream subscribers.
///
/// All methods are invoked from within the stream's serialized writer slot,
/// in registration order. A receiver that returns an error from `set`,
/// `set_bulk` or `close` has the failure routed to its own
/// [`on_receiver_error`](Receiver::on_receiver_error) hook and is then
/// unconditionally unsubscribed; delivery to other receivers is unaffected.
pub trait Receiver<T>: Send + Sync {
    /// A new value was set on the stream.
    fn set(&self, value: T) -> Result<()>;

    /// A batch of values was set on the stream, in order.
    fn set_bulk(&self, values: Vec<T>) -> Result<()> {
        for value in values {
            self.set(value)?;
        }
        Ok(())
    }

    /// The stream terminated with a failure or cancellation.
    ///
    /// Returns `true` if the receiver accepted the failure.
    fn fail(&self, error: FreshetError) -> bool;

    /// The stream completed normally. Nothing follows this call.
    fn close(&self) -> Result<()>;

    /// Called with the failure a receiver itself raised while being
    /// notified. The default logs and moves on.
    fn on_receiver_error(&self, error: &FreshetError) {
        log_error!("receiver raised while being notified: {error}");
    }
}
