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

//! Page-size planning.

use serde::{Deserialize, Serialize};

/// The page-size bounds a list API documents.
///
/// Most AWS list calls accept up to 100 or 1000 items per page; a few reject
/// page sizes below a service-specific floor (typically 1–20). Both bounds
/// are per-call configuration supplied by the adapter, not engine constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizeLimits {
    max: u32,
    min: u32,
}

impl PageSizeLimits {
    pub fn new(max: u32, min: u32) -> Self {
        PageSizeLimits { max, min }
    }

    /// Bounds for APIs without a documented floor.
    pub fn up_to(max: u32) -> Self {
        PageSizeLimits { max, min: 1 }
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn min(&self) -> u32 {
        self.min
    }
}

impl Default for PageSizeLimits {
    fn default() -> Self {
        // The most common shape across AWS list APIs.
        PageSizeLimits { max: 100, min: 1 }
    }
}

/// Choose the page size to request for one enumeration cursor.
///
/// Without a row limit the service maximum is used, minimizing round trips.
/// With a limit, the request is shrunk so no more rows than could possibly be
/// needed are fetched, while still respecting the service floor. The result
/// is fixed for the life of one cursor; it is not re-planned per page.
pub fn plan_page_size(requested_limit: Option<u64>, limits: PageSizeLimits) -> u32 {
    match requested_limit {
        None => limits.max,
        Some(requested) => {
            let capped = requested.min(u64::from(limits.max)) as u32;
            capped.max(limits.min)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_service_max_when_unbounded() {
        assert_eq!(plan_page_size(None, PageSizeLimits::new(100, 1)), 100);
    }

    #[test]
    fn shrinks_to_small_limits() {
        assert_eq!(plan_page_size(Some(5), PageSizeLimits::new(100, 1)), 5);
    }

    #[test]
    fn respects_service_floor() {
        assert_eq!(plan_page_size(Some(3), PageSizeLimits::new(1000, 20)), 20);
        assert_eq!(plan_page_size(Some(0), PageSizeLimits::new(1000, 20)), 20);
    }

    #[test]
    fn never_exceeds_service_max() {
        assert_eq!(plan_page_size(Some(10_000), PageSizeLimits::new(1000, 5)), 1000);
        assert_eq!(plan_page_size(Some(1000), PageSizeLimits::new(1000, 5)), 1000);
    }

    quickcheck! {
        fn planned_size_stays_within_bounds(requested: Option<u64>, max: u32, min: u32) -> bool {
            let max = max.max(1);
            let min = min.clamp(1, max);
            let limits = PageSizeLimits::new(max, min);
            let planned = plan_page_size(requested, limits);
            planned >= min && planned <= max
        }

        fn large_limits_collapse_to_service_max(extra: u32, max: u32) -> bool {
            let max = max.max(1);
            let limits = PageSizeLimits::new(max, 1);
            plan_page_size(Some(u64::from(max) + u64::from(extra)), limits) == max
        }
    }
}
