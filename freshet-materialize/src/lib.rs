// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lazy, cancellable list materializers over Freshet streams.
//!
//! A [`ListMaterializer`] answers questions about a sequence (its elements,
//! size, emptiness, membership) through one-shot consumer callbacks. Until
//! the first question arrives nothing is computed; the first caller triggers
//! exactly one resolution, concurrent callers share its outcome, and once
//! terminal every answer is synchronous.
//!
//! Decorator operators ([`drop_while`], [`exists`]) wrap a materializer
//! without forcing it, and [`from_stream`] bridges a
//! [`StreamFuture`](freshet_core::StreamFuture) into this world.

mod logging;

pub mod consumer;
pub mod drop_while;
pub mod exists;
pub mod immaterial;
pub mod materialized;
pub mod materializer;
pub mod stream_adapter;

pub use consumer::{FnIndexedConsumer, FnResultConsumer, IndexedConsumer, ResultConsumer};
pub use drop_while::drop_while;
pub use exists::exists;
pub use immaterial::{DeferredListMaterializer, ResolveCtx};
pub use materialized::{CancelledMaterializer, FailedMaterializer, MaterializedList};
pub use materializer::ListMaterializer;
pub use stream_adapter::from_stream;

use std::sync::Arc;

/// Chaining sugar over boxed materializers.
pub trait ListMaterializerExt<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// See [`drop_while`].
    fn drop_while<P>(&self, predicate: P) -> Arc<dyn ListMaterializer<T>>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static;

    /// See [`exists`].
    fn exists<P>(&self, predicate: P) -> Arc<dyn ListMaterializer<bool>>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static;
}

impl<T> ListMaterializerExt<T> for Arc<dyn ListMaterializer<T>>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn drop_while<P>(&self, predicate: P) -> Arc<dyn ListMaterializer<T>>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        drop_while::drop_while(Arc::clone(self), predicate)
    }

    fn exists<P>(&self, predicate: P) -> Arc<dyn ListMaterializer<bool>>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        exists::exists(Arc::clone(self), predicate)
    }
}
