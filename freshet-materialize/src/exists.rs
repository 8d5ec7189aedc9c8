// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Short-circuiting existence test over a materializer.

use crate::consumer::{IndexedConsumer, ResultConsumer};
use crate::immaterial::{DeferredListMaterializer, ResolveCtx};
use crate::materialized::MaterializedList;
use crate::materializer::ListMaterializer;
use freshet_core::{FreshetError, Result};
use std::sync::Arc;

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Lazily resolve whether any element of `source` satisfies `predicate`.
///
/// The answer is a single-element boolean list. An empty source is decided
/// by one `materialize_empty` probe, with zero element pulls. Otherwise
/// elements are probed in order and the walk stops at the first match, so
/// elements past it are never pulled.
pub fn exists<T, P>(
    source: Arc<dyn ListMaterializer<T>>,
    predicate: P,
) -> Arc<dyn ListMaterializer<bool>>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    let predicate: Predicate<T> = Arc::new(predicate);
    let cancel_source = Arc::clone(&source);
    Arc::new(DeferredListMaterializer::new(
        move |ctx| {
            let scheduler = ctx.clone();
            scheduler.schedule(move || {
                let target = Arc::clone(&source);
                let probe = EmptyProbe {
                    ctx,
                    source,
                    predicate,
                };
                target.materialize_empty(Box::new(probe));
            });
        },
        move |error| cancel_source.materialize_cancel(error.clone()),
    ))
}

fn answer(ctx: &ResolveCtx<bool>, found: bool) {
    ctx.complete(Arc::new(MaterializedList::new(vec![found])));
}

/// Decides the empty case before any element is pulled.
struct EmptyProbe<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    ctx: ResolveCtx<bool>,
    source: Arc<dyn ListMaterializer<T>>,
    predicate: Predicate<T>,
}

impl<T> ResultConsumer<bool> for EmptyProbe<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn resolved(&mut self, is_empty: bool) {
        if is_empty {
            answer(&self.ctx, false);
        } else {
            probe_element(
                self.ctx.clone(),
                Arc::clone(&self.source),
                Arc::clone(&self.predicate),
                0,
            );
        }
    }

    fn failed(&mut self, error: FreshetError) {
        self.ctx.fail(error);
    }
}

fn probe_element<T>(
    ctx: ResolveCtx<bool>,
    source: Arc<dyn ListMaterializer<T>>,
    predicate: Predicate<T>,
    index: isize,
) where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let scheduler = ctx.clone();
    scheduler.schedule(move || {
        let target = Arc::clone(&source);
        let probe = ElementProbe {
            ctx,
            source,
            predicate,
        };
        target.materialize_element(index, Box::new(probe));
    });
}

/// Probes one element; short-circuits on the first match.
struct ElementProbe<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    ctx: ResolveCtx<bool>,
    source: Arc<dyn ListMaterializer<T>>,
    predicate: Predicate<T>,
}

impl<T> IndexedConsumer<T> for ElementProbe<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn accept(&mut self, _size: isize, index: usize, element: &T) -> Result<()> {
        if (self.predicate)(element) {
            answer(&self.ctx, true);
        } else {
            probe_element(
                self.ctx.clone(),
                Arc::clone(&self.source),
                Arc::clone(&self.predicate),
                index as isize + 1,
            );
        }
        Ok(())
    }

    fn complete(&mut self, _size: usize) -> Result<()> {
        answer(&self.ctx, false);
        Ok(())
    }

    fn error(&mut self, _index: Option<usize>, error: &FreshetError) {
        self.ctx.fail(error.clone());
    }
}
