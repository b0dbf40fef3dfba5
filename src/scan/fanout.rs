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

//! Region fanout: branch computation, the bounded-concurrency driver, and
//! per-branch outcome reporting.

use std::future::Future;

use futures_util::StreamExt;
use futures_util::lock::Mutex;
use futures_util::stream;

use crate::scan::budget::QueryBudget;
use crate::scan::error::{Error, IgnoreConfig};
use crate::scan::region::Region;
use crate::scan::request::ResourceScope;

/// The regions one logical list operation expands into.
///
/// Globally-scoped resources get the single `global` sentinel; regional
/// resources get one branch per query region. Branch order follows the query
/// region order, but nothing downstream depends on it.
pub fn regions_for(scope: ResourceScope, query_regions: &[Region]) -> Vec<Region> {
    match scope {
        ResourceScope::Global => vec![Region::global()],
        ResourceScope::Regional => query_regions.to_vec(),
        ResourceScope::RegionalAndGlobal => {
            let mut regions = Vec::with_capacity(query_regions.len() + 1);
            regions.push(Region::global());
            regions.extend(query_regions.iter().cloned());
            regions
        }
    }
}

/// Branch regions after intersecting with a service's supported-region list,
/// when the resource kind is not available everywhere.
pub(crate) fn branch_regions(
    scope: ResourceScope,
    query_regions: &[Region],
    supported: Option<&[Region]>,
) -> Vec<Region> {
    let mut regions = regions_for(scope, query_regions);
    if let Some(supported) = supported {
        regions.retain(|r| r.is_global() || supported.contains(r));
    }
    regions
}

/// Drive one future per region, at most `concurrency` at a time, collecting
/// every branch's outcome. Branches are independent: a failure is recorded,
/// never propagated to siblings.
pub(crate) async fn run_branches<F, Fut>(
    regions: Vec<Region>,
    concurrency: usize,
    branch: F,
) -> Vec<(Region, Result<(), Error>)>
where
    F: Fn(Region) -> Fut,
    Fut: Future<Output = Result<(), Error>>,
{
    let outcomes = Mutex::new(Vec::with_capacity(regions.len()));
    stream::iter(regions)
        .for_each_concurrent(concurrency.max(1), |region| {
            let branch = &branch;
            let outcomes = &outcomes;
            async move {
                let result = branch(region.clone()).await;
                outcomes.lock().await.push((region, result));
            }
        })
        .await;
    outcomes.into_inner()
}

/// What happened to each branch of a scan, so a partially completed
/// multi-region query can report "no resources exist" apart from "half the
/// regions were unreachable".
#[derive(Debug, Default)]
pub struct ScanSummary {
    completed: Vec<Region>,
    failed: Vec<(Region, Error)>,
    rows_emitted: u64,
}

impl ScanSummary {
    /// Branches that ran to completion, including those that produced zero
    /// rows because the service is absent from the region or every error was
    /// declared ignorable.
    pub fn completed(&self) -> &[Region] {
        &self.completed
    }

    pub fn failed(&self) -> &[(Region, Error)] {
        &self.failed
    }

    /// Rows the whole query has emitted, across every scan sharing the
    /// budget.
    pub fn rows_emitted(&self) -> u64 {
        self.rows_emitted
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn first_error(&self) -> Option<&Error> {
        self.failed.first().map(|(_, err)| err)
    }
}

/// Classify branch outcomes into a [`ScanSummary`], suppressing only what the
/// caller's ignore configuration names.
pub(crate) fn summarize(
    outcomes: Vec<(Region, Result<(), Error>)>,
    budget: &QueryBudget,
    ignore: &IgnoreConfig,
) -> ScanSummary {
    let mut summary = ScanSummary {
        rows_emitted: budget.rows_emitted(),
        ..ScanSummary::default()
    };
    for (region, result) in outcomes {
        match result {
            Ok(()) => summary.completed.push(region),
            Err(err) if err.is_benign(ignore) => {
                log::debug!("{region}: suppressed {err}");
                summary.completed.push(region);
            }
            Err(err) => {
                log::error!("{region}: {err}");
                summary.failed.push((region, err));
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions(names: &[&str]) -> Vec<Region> {
        names.iter().map(|n| Region::new(*n)).collect()
    }

    #[test]
    fn global_scope_is_a_single_sentinel() {
        let branches = regions_for(ResourceScope::Global, &regions(&["us-east-1", "eu-west-1"]));
        assert_eq!(branches, vec![Region::global()]);
    }

    #[test]
    fn regional_scope_follows_query_regions() {
        let query = regions(&["us-east-1", "eu-west-1"]);
        assert_eq!(regions_for(ResourceScope::Regional, &query), query);
    }

    #[test]
    fn regional_and_global_prepends_the_sentinel() {
        let query = regions(&["us-east-1"]);
        let branches = regions_for(ResourceScope::RegionalAndGlobal, &query);
        assert_eq!(branches.len(), 2);
        assert!(branches[0].is_global());
        assert_eq!(branches[1], query[0]);
    }

    #[test]
    fn supported_region_intersection_keeps_the_sentinel() {
        let query = regions(&["us-east-1", "eu-west-1", "ap-south-1"]);
        let supported = regions(&["us-east-1"]);
        let branches = branch_regions(
            ResourceScope::RegionalAndGlobal,
            &query,
            Some(&supported),
        );
        assert_eq!(branches.len(), 2);
        assert!(branches[0].is_global());
        assert_eq!(branches[1].as_str(), "us-east-1");
    }
}
