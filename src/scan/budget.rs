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

//! The shared row budget and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// The query-wide count of rows already emitted to the consumer, shared by
/// every concurrently running region and parent branch of one logical query.
///
/// Updates go through a compare-and-swap loop so that concurrent branches can
/// never admit more rows in total than the requested limit. Once the limit is
/// reached the budget is exhausted and stays exhausted.
#[derive(Debug)]
pub struct QueryBudget {
    limit: Option<u64>,
    emitted: AtomicU64,
}

impl QueryBudget {
    pub fn new(limit: Option<u64>) -> Self {
        QueryBudget {
            limit,
            emitted: AtomicU64::new(0),
        }
    }

    pub fn unbounded() -> Self {
        QueryBudget::new(None)
    }

    pub fn with_limit(limit: u64) -> Self {
        QueryBudget::new(Some(limit))
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Atomically admit up to `n` rows about to be emitted, returning how
    /// many of them may actually be delivered. With no limit set, all `n` are
    /// admitted; otherwise at most the remainder of the budget, which may be
    /// zero.
    pub fn try_admit(&self, n: usize) -> usize {
        let Some(limit) = self.limit else {
            self.emitted.fetch_add(n as u64, Ordering::AcqRel);
            return n;
        };

        let mut current = self.emitted.load(Ordering::Acquire);
        loop {
            let remaining = limit.saturating_sub(current);
            let admitted = (n as u64).min(remaining);
            if admitted == 0 {
                return 0;
            }
            match self.emitted.compare_exchange_weak(
                current,
                current + admitted,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return admitted as usize,
                Err(observed) => current = observed,
            }
        }
    }

    pub fn rows_emitted(&self) -> u64 {
        self.emitted.load(Ordering::Acquire)
    }

    /// Rows the budget will still admit; `None` when unbounded.
    pub fn rows_remaining(&self) -> Option<u64> {
        self.limit
            .map(|limit| limit.saturating_sub(self.rows_emitted()))
    }

    pub fn is_exhausted(&self) -> bool {
        match self.limit {
            Some(limit) => self.rows_emitted() >= limit,
            None => false,
        }
    }
}

/// A caller-owned cancellation flag, checked cooperatively after every
/// emitted item and every fetched page. Raising it is idempotent.
#[derive(Clone, Debug, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        AbortSignal::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Couples the shared [`QueryBudget`] with the caller's [`AbortSignal`] into
/// the single stop-check every enumeration loop consults.
#[derive(Clone, Debug)]
pub struct CancellationGate {
    budget: Arc<QueryBudget>,
    abort: AbortSignal,
}

impl CancellationGate {
    pub fn new(budget: Arc<QueryBudget>, abort: AbortSignal) -> Self {
        CancellationGate { budget, abort }
    }

    pub fn budget(&self) -> &QueryBudget {
        &self.budget
    }

    /// Admit up to `n` rows, or nothing once the caller has aborted.
    pub fn admit(&self, n: usize) -> usize {
        if self.abort.is_raised() {
            return 0;
        }
        self.budget.try_admit(n)
    }

    /// Idempotent: once this reports `true` it reports `true` forever.
    pub fn should_stop(&self) -> bool {
        self.abort.is_raised() || self.budget.is_exhausted()
    }
}
