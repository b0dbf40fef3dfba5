// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The consumer boundary: sinks and the budget-gated emitter.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::channel::mpsc;

use crate::scan::budget::CancellationGate;

/// The query engine's row-streaming interface. Items pass through unchanged;
/// schema mapping happens on the consumer side.
///
/// Sinks are shared by all branches of a scan and must tolerate concurrent
/// emission.
pub trait RecordSink<T>: Send + Sync {
    fn emit(&self, item: T);
}

/// Delivers items to the sink, admitting each row through the
/// [`CancellationGate`] first so that no branch can overrun the query budget.
pub struct RecordEmitter<'a, T> {
    sink: &'a dyn RecordSink<T>,
    gate: &'a CancellationGate,
    delivered: AtomicU64,
}

impl<'a, T> RecordEmitter<'a, T> {
    pub fn new(sink: &'a dyn RecordSink<T>, gate: &'a CancellationGate) -> Self {
        RecordEmitter {
            sink,
            gate,
            delivered: AtomicU64::new(0),
        }
    }

    pub fn gate(&self) -> &CancellationGate {
        self.gate
    }

    /// Deliver one item if the budget admits it. Returns `false` once the
    /// budget is exhausted or the caller aborted; the rejected item is
    /// dropped, and the calling loop must stop emitting.
    pub fn emit(&self, item: T) -> bool {
        if self.gate.admit(1) == 0 {
            return false;
        }
        self.sink.emit(item);
        self.delivered.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Items this emitter has delivered to the sink.
    pub fn rows_delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

/// A sink that collects items into a vector.
#[derive(Debug, Default)]
pub struct VecSink<T> {
    items: Mutex<Vec<T>>,
}

impl<T> VecSink<T> {
    pub fn new() -> Self {
        VecSink {
            items: Mutex::new(Vec::new()),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self.items.into_inner() {
            Ok(items) => items,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn len(&self) -> usize {
        match self.items.lock() {
            Ok(items) => items.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> VecSink<T> {
    pub fn items(&self) -> Vec<T> {
        match self.items.lock() {
            Ok(items) => items.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl<T: Send> RecordSink<T> for VecSink<T> {
    fn emit(&self, item: T) {
        match self.items.lock() {
            Ok(mut items) => items.push(item),
            Err(poisoned) => poisoned.into_inner().push(item),
        }
    }
}

/// A sink that forwards items into an unbounded channel, for consumers that
/// stream rows as they arrive.
#[derive(Clone, Debug)]
pub struct ChannelSink<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> ChannelSink<T> {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded();
        (ChannelSink { tx }, rx)
    }
}

impl<T: Send> RecordSink<T> for ChannelSink<T> {
    fn emit(&self, item: T) {
        // A dropped receiver means the consumer stopped reading; the row is
        // discarded and the scan winds down through its abort signal.
        let _ = self.tx.unbounded_send(item);
    }
}
