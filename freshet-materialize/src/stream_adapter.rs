// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bridge from a [`StreamFuture`] to the materializer world.

use crate::immaterial::{DeferredListMaterializer, ResolveCtx};
use crate::materialized::MaterializedList;
use crate::materializer::ListMaterializer;
use freshet_core::{FreshetError, Receiver, Result, StreamFuture};
use std::sync::Arc;

/// Materialize a stream's terminal snapshot as a list.
///
/// The materializer stays pending until the stream terminates: a normal
/// close resolves to the latest-value snapshot (one element once anything
/// was set, empty otherwise), a failure or cancellation resolves to the
/// matching terminal view. Nothing is subscribed until the first caller
/// arrives; cancelling the materializer cancels the stream.
pub fn from_stream<T>(stream: &StreamFuture<T>) -> Arc<dyn ListMaterializer<T>>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let subscribe_target = stream.clone();
    let cancel_target = stream.clone();
    Arc::new(DeferredListMaterializer::new(
        move |ctx| {
            let receiver: Arc<dyn Receiver<T>> = Arc::new(TerminalReceiver {
                ctx,
                stream: subscribe_target.clone(),
            });
            // Live values are ignored; only the terminal transition counts.
            // Detached so the registration outlives this scope.
            subscribe_target.subscribe_next(receiver).detach();
        },
        move |_error| cancel_target.cancel(),
    ))
}

struct TerminalReceiver<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    ctx: ResolveCtx<T>,
    stream: StreamFuture<T>,
}

impl<T> Receiver<T> for TerminalReceiver<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn set(&self, _value: T) -> Result<()> {
        Ok(())
    }

    fn fail(&self, error: FreshetError) -> bool {
        self.ctx.fail(error);
        true
    }

    fn close(&self) -> Result<()> {
        let snapshot = match self.stream.current() {
            Ok(value) => vec![value],
            Err(_) => Vec::new(),
        };
        self.ctx.complete(Arc::new(MaterializedList::new(snapshot)));
        Ok(())
    }
}
