// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::RetentionPolicy;

/// Delegates to an initial policy until the first replay, then permanently
/// swaps to a terminal policy (typically [`KeepNone`](super::KeepNone)).
///
/// This bounds memory for streams whose only subscriber attaches once:
/// history accumulates under the initial policy, is handed out exactly once,
/// and nothing is retained afterward.
///
/// All replay calls run inside the stream's single-writer slot, so "first"
/// is well defined even under concurrent attachers: the first serialized
/// replay wins, later attachers observe the terminal policy.
pub struct UntilFirstReplay<T: Clone> {
    current: Box<dyn RetentionPolicy<T>>,
    terminal: Option<Box<dyn RetentionPolicy<T>>>,
}

impl<T: Clone> UntilFirstReplay<T> {
    #[must_use]
    pub fn new(
        initial: Box<dyn RetentionPolicy<T>>,
        terminal: Box<dyn RetentionPolicy<T>>,
    ) -> Self {
        Self {
            current: initial,
            terminal: Some(terminal),
        }
    }
}

impl<T: Clone + Send> RetentionPolicy<T> for UntilFirstReplay<T> {
    fn record(&mut self, value: T) {
        self.current.record(value);
    }

    fn record_bulk(&mut self, values: Vec<T>) {
        self.current.record_bulk(values);
    }

    fn clear(&mut self) {
        self.current.clear();
    }

    fn close(&mut self) {
        self.current.close();
    }

    fn replay(&mut self) -> Vec<T> {
        let replayed = self.current.replay();
        if let Some(terminal) = self.terminal.take() {
            self.current = terminal;
        }
        replayed
    }
}
