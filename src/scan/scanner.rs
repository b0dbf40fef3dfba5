// AWSweep Rust Library for AWS Resource Enumeration
// Copyright 2025 AWSweep, Inc.
//
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

//! The per-query scanner and the flat (single-level) list scan.

use std::marker::PhantomData;
use std::sync::Arc;

use typed_builder::TypedBuilder;

use crate::scan::budget::{AbortSignal, CancellationGate, QueryBudget};
use crate::scan::error::{Error, IgnoreConfig};
use crate::scan::fanout::{ScanSummary, branch_regions, run_branches, summarize};
use crate::scan::limit::plan_page_size;
use crate::scan::pager::PageFetcher;
use crate::scan::region::{Partition, Region};
use crate::scan::request::{ListRequest, ResourceScope};
use crate::scan::sink::{RecordEmitter, RecordSink};
use crate::scan::types::PageSource;

/// Default bound on concurrently running branches, conservative enough for
/// default AWS API rate limits.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Everything about one logical query execution that the enumeration engine
/// needs: the account identity, the resolved query regions, the optional row
/// limit, the concurrency bound, the caller's abort signal, and the error
/// codes the caller wants suppressed.
///
/// Account, partition and regions travel explicitly on the context; nothing
/// in the engine reads ambient global state.
#[derive(Clone, Debug, TypedBuilder)]
pub struct ScanContext {
    #[builder(setter(into))]
    account_id: String,
    partition: Partition,
    /// Regions this query enumerates, already resolved against the account's
    /// catalog (see [`RegionSelector`](crate::scan::region::RegionSelector)).
    regions: Vec<Region>,
    #[builder(default, setter(strip_option))]
    limit: Option<u64>,
    #[builder(default = DEFAULT_CONCURRENCY)]
    concurrency: usize,
    #[builder(default)]
    abort: AbortSignal,
    #[builder(default)]
    ignore: IgnoreConfig,
}

impl ScanContext {
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn abort(&self) -> &AbortSignal {
        &self.abort
    }

    pub fn ignore(&self) -> &IgnoreConfig {
        &self.ignore
    }
}

/// Runs list scans for one logical query.
///
/// The scanner owns the query-wide [`QueryBudget`]; every scan started from
/// the same scanner draws rows from the same budget, and cloning the scanner
/// shares it.
#[derive(Clone, Debug)]
pub struct Scanner {
    ctx: ScanContext,
    budget: Arc<QueryBudget>,
}

impl Scanner {
    pub fn new(ctx: ScanContext) -> Self {
        let budget = Arc::new(QueryBudget::new(ctx.limit()));
        Scanner { ctx, budget }
    }

    pub fn context(&self) -> &ScanContext {
        &self.ctx
    }

    pub fn budget(&self) -> &QueryBudget {
        &self.budget
    }

    pub(crate) fn gate(&self) -> CancellationGate {
        CancellationGate::new(Arc::clone(&self.budget), self.ctx.abort().clone())
    }

    /// Creates a [`ListScan`] for one resource kind.
    ///
    /// `source_for` is called once per region branch with the branch-scoped
    /// request. It acquires (or reuses) the service client for that region
    /// and returns the page source wrapping the list call, `Ok(None)` when
    /// the service does not operate in the region, or an error.
    pub fn list<S, F>(&self, request: ListRequest, source_for: F) -> ListScan<'_, S, F>
    where
        S: PageSource,
        F: Fn(&ListRequest) -> Result<Option<S>, Error> + Send + Sync,
    {
        let request = match request.limit() {
            Some(_) => request,
            None => request.with_limit(self.ctx.limit()),
        };
        ListScan {
            scanner: self,
            request,
            scope: ResourceScope::Regional,
            supported_regions: None,
            source_for,
            _source: PhantomData,
        }
    }
}

/// A single-level scan of one resource kind across the query regions,
/// created by [`Scanner::list`].
///
/// Defaults to [`ResourceScope::Regional`]; use [`scope`](ListScan::scope)
/// for global resources and [`supported_regions`](ListScan::supported_regions)
/// for services absent from part of the partition.
pub struct ListScan<'a, S, F> {
    scanner: &'a Scanner,
    request: ListRequest,
    scope: ResourceScope,
    supported_regions: Option<Vec<Region>>,
    source_for: F,
    _source: PhantomData<fn() -> S>,
}

impl<'a, S, F> ListScan<'a, S, F>
where
    S: PageSource,
    F: Fn(&ListRequest) -> Result<Option<S>, Error> + Send + Sync,
{
    pub fn scope(mut self, scope: ResourceScope) -> Self {
        self.scope = scope;
        self
    }

    /// Restrict the fanout to regions where the service actually operates.
    pub fn supported_regions(mut self, regions: Vec<Region>) -> Self {
        self.supported_regions = Some(regions);
        self
    }

    /// Drive every region branch to completion and report per-branch
    /// outcomes. Branch failures never abort sibling branches.
    pub async fn run(self, sink: &dyn RecordSink<S::Item>) -> ScanSummary {
        let ctx = self.scanner.context();
        let gate = self.scanner.gate();
        let regions = branch_regions(self.scope, ctx.regions(), self.supported_regions.as_deref());
        log::trace!(
            "{}: fanning out to {} branch(es)",
            self.request.resource(),
            regions.len()
        );

        let request = &self.request;
        let source_for = &self.source_for;
        let gate_ref = &gate;
        let outcomes = run_branches(regions, ctx.concurrency(), |region| async move {
            list_branch::<S, F>(request, region, source_for, sink, gate_ref).await
        })
        .await;

        summarize(outcomes, self.scanner.budget(), ctx.ignore())
    }
}

/// One region branch of a flat scan: acquire the source, plan the page size
/// once, and drain pages through the emitter.
async fn list_branch<S, F>(
    template: &ListRequest,
    region: Region,
    source_for: &F,
    sink: &dyn RecordSink<S::Item>,
    gate: &CancellationGate,
) -> Result<(), Error>
where
    S: PageSource,
    F: Fn(&ListRequest) -> Result<Option<S>, Error> + Send + Sync,
{
    if gate.should_stop() {
        return Ok(());
    }
    let request = template.clone().with_region(region);
    let Some(source) = source_for(&request)? else {
        log::trace!(
            "{}: {} has no client in {}, skipping",
            request.resource(),
            request.service(),
            request.region()
        );
        return Ok(());
    };
    let page_size = plan_page_size(gate.budget().rows_remaining(), request.page_limits());
    let mut fetcher = PageFetcher::new(source, page_size);
    let emitter = RecordEmitter::new(sink, gate);
    fetcher.drain(&emitter).await
}
