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

//! Dependent (parent→child) enumeration.
//!
//! Some resource kinds can only be listed per parent resource: stream
//! consumers per stream, subnets per VPC, findings per analyzer. A
//! [`DependentScan`] runs the parent listing and, for every parent item,
//! builds and drains a child listing scoped to that parent. Parent items are
//! held only long enough to build the child request.

use futures_util::TryStreamExt;
use futures_util::pin_mut;

use crate::scan::budget::CancellationGate;
use crate::scan::error::Error;
use crate::scan::fanout::{ScanSummary, branch_regions, run_branches, summarize};
use crate::scan::limit::plan_page_size;
use crate::scan::pager::PageFetcher;
use crate::scan::region::Region;
use crate::scan::request::{ListRequest, ResourceScope};
use crate::scan::scanner::Scanner;
use crate::scan::sink::{RecordEmitter, RecordSink};
use crate::scan::types::PageSource;

/// Skip rule applied when an equality qual pins the child listing to one
/// known parent: every other parent item is dropped before its child request
/// is even built, avoiding wasted API calls.
struct ParentPin<P> {
    column: String,
    key: Box<dyn Fn(&P) -> Option<String> + Send + Sync>,
}

/// A two-level scan created by [`Scanner::list_dependent`].
///
/// Cancellation propagates downward: stopping a region branch stops its
/// remaining children, while one child's exhaustion never stops sibling
/// children. A parent branch failure abandons that branch's not-yet-started
/// children and surfaces as [`Error::ParentEnumeration`]; rows already
/// streamed stay streamed.
pub struct DependentScan<'a, P, PF, CB, CF> {
    scanner: &'a Scanner,
    parent_request: ListRequest,
    child_request: ListRequest,
    scope: ResourceScope,
    supported_regions: Option<Vec<Region>>,
    parent_source_for: PF,
    child_request_for: CB,
    child_source_for: CF,
    parent_pin: Option<ParentPin<P>>,
}

impl Scanner {
    /// Creates a [`DependentScan`].
    ///
    /// `parent_source_for` and `child_source_for` play the same role as the
    /// factory of [`Scanner::list`]. `child_request_for` receives the
    /// region-scoped child template and one parent item and returns the
    /// request for that parent's children, or `None` to skip the parent.
    pub fn list_dependent<P, PS, PF, CB, CS, CF>(
        &self,
        parent_request: ListRequest,
        child_request: ListRequest,
        parent_source_for: PF,
        child_request_for: CB,
        child_source_for: CF,
    ) -> DependentScan<'_, P, PF, CB, CF>
    where
        P: Send,
        PS: PageSource<Item = P>,
        PF: Fn(&ListRequest) -> Result<Option<PS>, Error> + Send + Sync,
        CB: Fn(&ListRequest, &P) -> Option<ListRequest> + Send + Sync,
        CS: PageSource,
        CF: Fn(&ListRequest) -> Result<Option<CS>, Error> + Send + Sync,
    {
        let child_request = match child_request.limit() {
            Some(_) => child_request,
            None => child_request.with_limit(self.context().limit()),
        };
        DependentScan {
            scanner: self,
            parent_request,
            child_request,
            scope: ResourceScope::Regional,
            supported_regions: None,
            parent_source_for,
            child_request_for,
            child_source_for,
            parent_pin: None,
        }
    }
}

impl<'a, P, PF, CB, CF> DependentScan<'a, P, PF, CB, CF>
where
    P: Send,
{
    pub fn scope(mut self, scope: ResourceScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn supported_regions(mut self, regions: Vec<Region>) -> Self {
        self.supported_regions = Some(regions);
        self
    }

    /// Declare that `column` on the child table is the parent's key, with
    /// `key` extracting that key from a parent item. When the query supplies
    /// an equality qual on `column`, parents with a different key are skipped
    /// without building their child requests.
    pub fn pin_parent<K>(mut self, column: impl Into<String>, key: K) -> Self
    where
        K: Fn(&P) -> Option<String> + Send + Sync + 'static,
    {
        self.parent_pin = Some(ParentPin {
            column: column.into(),
            key: Box::new(key),
        });
        self
    }

    /// Drive the parent listing per region branch, and a child listing per
    /// parent item, bounded by the context's concurrency limit at both
    /// levels.
    pub async fn run<PS, CS>(self, sink: &dyn RecordSink<CS::Item>) -> ScanSummary
    where
        PS: PageSource<Item = P>,
        PF: Fn(&ListRequest) -> Result<Option<PS>, Error> + Send + Sync,
        CB: Fn(&ListRequest, &P) -> Option<ListRequest> + Send + Sync,
        CS: PageSource,
        CF: Fn(&ListRequest) -> Result<Option<CS>, Error> + Send + Sync,
    {
        let ctx = self.scanner.context();
        let gate = self.scanner.gate();
        let regions = branch_regions(self.scope, ctx.regions(), self.supported_regions.as_deref());
        log::trace!(
            "{} -> {}: fanning out to {} branch(es)",
            self.parent_request.resource(),
            self.child_request.resource(),
            regions.len()
        );

        let this = &self;
        let gate_ref = &gate;
        let outcomes = run_branches(regions, ctx.concurrency(), |region| async move {
            this.region_branch::<PS, CS>(region, sink, gate_ref).await
        })
        .await;

        summarize(outcomes, self.scanner.budget(), ctx.ignore())
    }

    /// One region branch: run the parent pager to completion, spawning a
    /// child enumeration per parent item.
    async fn region_branch<PS, CS>(
        &self,
        region: Region,
        sink: &dyn RecordSink<CS::Item>,
        gate: &CancellationGate,
    ) -> Result<(), Error>
    where
        PS: PageSource<Item = P>,
        PF: Fn(&ListRequest) -> Result<Option<PS>, Error> + Send + Sync,
        CB: Fn(&ListRequest, &P) -> Option<ListRequest> + Send + Sync,
        CS: PageSource,
        CF: Fn(&ListRequest) -> Result<Option<CS>, Error> + Send + Sync,
    {
        if gate.should_stop() {
            return Ok(());
        }

        let parent_req = self.parent_request.clone().with_region(region.clone());
        let child_template = self.child_request.clone().with_region(region.clone());

        let parent_source = match (self.parent_source_for)(&parent_req) {
            Ok(Some(source)) => source,
            Ok(None) => {
                log::trace!(
                    "{}: {} has no client in {}, skipping",
                    parent_req.resource(),
                    parent_req.service(),
                    region
                );
                return Ok(());
            }
            Err(err) => return Err(parent_failure(&parent_req, err)),
        };

        let page_size = plan_page_size(gate.budget().rows_remaining(), parent_req.page_limits());
        let mut parent_fetcher = PageFetcher::new(parent_source, page_size);
        let emitter = RecordEmitter::new(sink, gate);

        let parent_resource = parent_req.resource().to_string();
        let parent_region = region.clone();
        let stream_gate = gate.clone();
        let parents = async_stream::try_stream! {
            while let Some(page) = parent_fetcher.next_page().await {
                let items = page.map_err(|err| Error::ParentEnumeration {
                    resource: parent_resource.clone(),
                    region: parent_region.clone(),
                    source: Box::new(err),
                })?;
                for item in items {
                    yield item;
                }
                if stream_gate.should_stop() {
                    break;
                }
            }
        };
        pin_mut!(parents);

        let child_template = &child_template;
        let emitter = &emitter;
        let region = &region;
        parents
            .try_for_each_concurrent(
                self.scanner.context().concurrency().max(1),
                |parent| async move {
                    self.child_branch::<CS>(child_template, region, parent, emitter)
                        .await
                },
            )
            .await
    }

    /// One parent item's child enumeration.
    async fn child_branch<CS>(
        &self,
        child_template: &ListRequest,
        region: &Region,
        parent: P,
        emitter: &RecordEmitter<'_, CS::Item>,
    ) -> Result<(), Error>
    where
        CB: Fn(&ListRequest, &P) -> Option<ListRequest> + Send + Sync,
        CS: PageSource,
        CF: Fn(&ListRequest) -> Result<Option<CS>, Error> + Send + Sync,
    {
        // Global exhaustion stops the branch before any further child work,
        // not merely before the next page.
        if emitter.gate().should_stop() {
            return Ok(());
        }

        if let Some(pin) = &self.parent_pin {
            if let Some(pinned) = child_template.quals().equals_string(&pin.column) {
                match (pin.key)(&parent) {
                    Some(ref key) if key == pinned => {}
                    _ => return Ok(()),
                }
            }
        }

        let Some(child_req) = (self.child_request_for)(child_template, &parent) else {
            return Ok(());
        };
        let child_req = child_req.with_region(region.clone());

        match self.drive_child::<CS>(&child_req, emitter).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_benign(self.scanner.context().ignore()) => {
                log::debug!("{}: suppressed {err}", child_req.resource());
                Ok(())
            }
            Err(err) => Err(match child_req.parent() {
                Some(parent_ref) => err.with_parent(parent_ref.id()),
                None => err,
            }),
        }
    }

    async fn drive_child<CS>(
        &self,
        child_req: &ListRequest,
        emitter: &RecordEmitter<'_, CS::Item>,
    ) -> Result<(), Error>
    where
        CS: PageSource,
        CF: Fn(&ListRequest) -> Result<Option<CS>, Error> + Send + Sync,
    {
        let Some(source) = (self.child_source_for)(child_req)? else {
            log::trace!(
                "{}: {} has no client in {}, skipping",
                child_req.resource(),
                child_req.service(),
                child_req.region()
            );
            return Ok(());
        };
        let page_size = plan_page_size(
            emitter.gate().budget().rows_remaining(),
            child_req.page_limits(),
        );
        let mut fetcher = PageFetcher::new(source, page_size);
        fetcher.drain(emitter).await
    }
}

fn parent_failure(parent_req: &ListRequest, err: Error) -> Error {
    Error::ParentEnumeration {
        resource: parent_req.resource().to_string(),
        region: parent_req.region().clone(),
        source: Box::new(err),
    }
}
