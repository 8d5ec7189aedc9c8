// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Drop the longest matching prefix of a materializer.

use crate::consumer::IndexedConsumer;
use crate::immaterial::{DeferredListMaterializer, ResolveCtx};
use crate::materialized::MaterializedList;
use crate::materializer::ListMaterializer;
use freshet_core::{FreshetError, Result};
use std::sync::Arc;

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Lazily drop elements from the front of `source` while `predicate` holds.
///
/// Nothing is pulled from `source` until the first caller arrives. The
/// prefix is probed one element at a time on the engine's serial queue; the
/// first element the predicate rejects fixes the boundary, after which the
/// suffix (boundary included) is collected in a single pass. Dropping every
/// element resolves to the empty list. Probing stops at the boundary, so a
/// source failure past it is never observed.
pub fn drop_while<T, P>(
    source: Arc<dyn ListMaterializer<T>>,
    predicate: P,
) -> Arc<dyn ListMaterializer<T>>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    let predicate: Predicate<T> = Arc::new(predicate);
    let cancel_source = Arc::clone(&source);
    Arc::new(DeferredListMaterializer::new(
        move |ctx| probe_prefix(ctx, source, predicate, 0),
        move |error| cancel_source.materialize_cancel(error.clone()),
    ))
}

fn probe_prefix<T>(
    ctx: ResolveCtx<T>,
    source: Arc<dyn ListMaterializer<T>>,
    predicate: Predicate<T>,
    index: isize,
) where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let scheduler = ctx.clone();
    scheduler.schedule(move || {
        let target = Arc::clone(&source);
        let probe = PrefixProbe {
            ctx,
            source,
            predicate,
        };
        target.materialize_element(index, Box::new(probe));
    });
}

/// Probes one prefix element; advances or fixes the boundary.
struct PrefixProbe<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    ctx: ResolveCtx<T>,
    source: Arc<dyn ListMaterializer<T>>,
    predicate: Predicate<T>,
}

impl<T> IndexedConsumer<T> for PrefixProbe<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn accept(&mut self, _size: isize, index: usize, element: &T) -> Result<()> {
        if (self.predicate)(element) {
            probe_prefix(
                self.ctx.clone(),
                Arc::clone(&self.source),
                Arc::clone(&self.predicate),
                index as isize + 1,
            );
        } else {
            collect_suffix(self.ctx.clone(), Arc::clone(&self.source), index);
        }
        Ok(())
    }

    fn complete(&mut self, _size: usize) -> Result<()> {
        // The predicate consumed the whole sequence
        self.ctx.complete(Arc::new(MaterializedList::empty()));
        Ok(())
    }

    fn error(&mut self, _index: Option<usize>, error: &FreshetError) {
        self.ctx.fail(error.clone());
    }
}

fn collect_suffix<T>(ctx: ResolveCtx<T>, source: Arc<dyn ListMaterializer<T>>, boundary: usize)
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let scheduler = ctx.clone();
    scheduler.schedule(move || {
        let target = Arc::clone(&source);
        let collector = SuffixCollector {
            ctx,
            boundary,
            kept: Vec::new(),
        };
        target.materialize_elements(Box::new(collector));
    });
}

/// Collects every element from the boundary onwards into the result list.
struct SuffixCollector<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    ctx: ResolveCtx<T>,
    boundary: usize,
    kept: Vec<T>,
}

impl<T> IndexedConsumer<T> for SuffixCollector<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn accept(&mut self, _size: isize, index: usize, element: &T) -> Result<()> {
        if index >= self.boundary {
            self.kept.push(element.clone());
        }
        Ok(())
    }

    fn complete(&mut self, _size: usize) -> Result<()> {
        let kept = std::mem::take(&mut self.kept);
        self.ctx.complete(Arc::new(MaterializedList::new(kept)));
        Ok(())
    }

    fn error(&mut self, _index: Option<usize>, error: &FreshetError) {
        self.ctx.fail(error.clone());
    }
}
