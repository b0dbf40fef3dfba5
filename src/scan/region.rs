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

//! Regions, partitions and region selection.
//!
//! Every account lives in exactly one partition (commercial, GovCloud,
//! China, or one of the isolated partitions), and each partition carries its
//! own region catalog. The hard-coded catalogs below are the fallback used
//! when the enabled-region list cannot be retrieved from the account; they
//! must be updated manually as new regions are announced.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scan::error::Error;

/// Region name used for resources that have no region dimension.
const GLOBAL_REGION: &str = "global";

/// An AWS region identifier, or the `global` sentinel for resources that are
/// not regional.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Region(name.into())
    }

    /// The sentinel region for globally-scoped resources.
    pub fn global() -> Self {
        Region(GLOBAL_REGION.to_string())
    }

    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL_REGION
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn partition(&self) -> Partition {
        Partition::from_region(&self.0)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Region {
    fn from(name: &str) -> Self {
        Region::new(name)
    }
}

impl From<String> for Region {
    fn from(name: String) -> Self {
        Region(name)
    }
}

/// An AWS partition. Partitions have disjoint region catalogs and their own
/// default region for API calls that must target a base endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partition {
    Commercial,
    UsGov,
    China,
    UsIso,
    UsIsoB,
}

impl Partition {
    /// Infer the partition from a region name prefix.
    ///
    /// `us-isob` must be tested before `us-iso`, which must be tested before
    /// the commercial fallback.
    pub fn from_region(region: &str) -> Partition {
        if region.starts_with("us-gov") {
            Partition::UsGov
        } else if region.starts_with("cn") {
            Partition::China
        } else if region.starts_with("us-isob") {
            Partition::UsIsoB
        } else if region.starts_with("us-iso") {
            Partition::UsIso
        } else {
            Partition::Commercial
        }
    }

    /// The primary region of the partition, targeted by global services such
    /// as IAM and Route 53.
    pub fn default_region(self) -> Region {
        Region::new(match self {
            Partition::Commercial => "us-east-1",
            Partition::UsGov => "us-gov-west-1",
            Partition::China => "cn-northwest-1",
            Partition::UsIso => "us-iso-east-1",
            Partition::UsIsoB => "us-isob-east-1",
        })
    }

    /// All regions available in the partition.
    pub fn regions(self) -> &'static [&'static str] {
        match self {
            Partition::Commercial => COMMERCIAL_REGIONS,
            Partition::UsGov => US_GOV_REGIONS,
            Partition::China => CHINA_REGIONS,
            Partition::UsIso => US_ISO_REGIONS,
            Partition::UsIsoB => US_ISOB_REGIONS,
        }
    }
}

// Source: https://docs.aws.amazon.com/general/latest/gr/rande.html#regional-endpoints
const COMMERCIAL_REGIONS: &[&str] = &[
    "af-south-1",
    "ap-east-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ca-central-1",
    "eu-central-1",
    "eu-central-2",
    "eu-north-1",
    "eu-south-1",
    "eu-south-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "me-central-1",
    "me-south-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
];

const US_GOV_REGIONS: &[&str] = &["us-gov-east-1", "us-gov-west-1"];

const CHINA_REGIONS: &[&str] = &["cn-north-1", "cn-northwest-1"];

const US_ISO_REGIONS: &[&str] = &["us-iso-east-1", "us-iso-west-1"];

const US_ISOB_REGIONS: &[&str] = &["us-isob-east-1"];

/// Region data for one account.
///
/// Accounts may opt in and out of regions at any time, so the accurate
/// catalog comes from a region-list API call; when that call is not possible
/// the full partition catalog stands in for both the available and active
/// sets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionCatalog {
    all: Vec<Region>,
    active: Vec<Region>,
    not_opted: Vec<Region>,
    from_api: bool,
}

impl RegionCatalog {
    /// The static partition catalog, used when the enabled-region list could
    /// not be retrieved from the account.
    pub fn fallback(partition: Partition) -> Self {
        let all: Vec<Region> = partition.regions().iter().map(|r| Region::new(*r)).collect();
        RegionCatalog {
            active: all.clone(),
            all,
            not_opted: Vec::new(),
            from_api: false,
        }
    }

    /// A catalog built from the account's region-list API response.
    pub fn from_api(active: Vec<Region>, not_opted: Vec<Region>) -> Self {
        let mut all = active.clone();
        all.extend(not_opted.iter().cloned());
        RegionCatalog {
            all,
            active,
            not_opted,
            from_api: true,
        }
    }

    pub fn all(&self) -> &[Region] {
        &self.all
    }

    /// Regions enabled (opted in) for the account.
    pub fn active(&self) -> &[Region] {
        &self.active
    }

    pub fn not_opted(&self) -> &[Region] {
        &self.not_opted
    }

    pub fn is_from_api(&self) -> bool {
        self.from_api
    }
}

/// A connection-level region selection, supporting wildcard patterns such as
/// `us-*` or `ap-south-?`.
///
/// Patterns are expanded against the account's active regions when the
/// catalog came from the API, and against the full partition catalog
/// otherwise, so a stale opt-in list never silently drops an explicitly
/// spelled-out region.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSelector {
    patterns: Vec<String>,
}

impl RegionSelector {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RegionSelector {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Selects every active region.
    pub fn all() -> Self {
        RegionSelector::new(["*"])
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Expand the patterns against the catalog. Order follows the pattern
    /// list, duplicates are dropped, and an empty selector resolves to the
    /// given client region.
    pub fn resolve(
        &self,
        catalog: &RegionCatalog,
        client_region: &Region,
    ) -> Result<Vec<Region>, Error> {
        if self.patterns.is_empty() {
            return Ok(vec![client_region.clone()]);
        }

        let candidates = if catalog.is_from_api() {
            catalog.active()
        } else {
            catalog.all()
        };

        let mut selected: Vec<Region> = Vec::new();
        for pattern in &self.patterns {
            let matcher =
                glob::Pattern::new(pattern).map_err(|source| Error::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            for region in candidates {
                if matcher.matches(region.as_str()) && !selected.contains(region) {
                    selected.push(region.clone());
                }
            }
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_from_region_prefix() {
        assert_eq!(Partition::from_region("us-east-1"), Partition::Commercial);
        assert_eq!(Partition::from_region("eu-west-3"), Partition::Commercial);
        assert_eq!(Partition::from_region("us-gov-east-1"), Partition::UsGov);
        assert_eq!(Partition::from_region("cn-north-1"), Partition::China);
        assert_eq!(Partition::from_region("us-iso-east-1"), Partition::UsIso);
        assert_eq!(Partition::from_region("us-isob-east-1"), Partition::UsIsoB);
    }

    #[test]
    fn default_region_per_partition() {
        assert_eq!(Partition::Commercial.default_region().as_str(), "us-east-1");
        assert_eq!(Partition::UsGov.default_region().as_str(), "us-gov-west-1");
        assert_eq!(Partition::China.default_region().as_str(), "cn-northwest-1");
    }

    #[test]
    fn global_sentinel() {
        assert!(Region::global().is_global());
        assert!(!Region::new("us-east-1").is_global());
        assert_eq!(Region::global().partition(), Partition::Commercial);
    }

    #[test]
    fn fallback_catalog_treats_all_regions_as_active() {
        let catalog = RegionCatalog::fallback(Partition::China);
        assert_eq!(catalog.all().len(), 2);
        assert_eq!(catalog.active(), catalog.all());
        assert!(!catalog.is_from_api());
    }

    #[test]
    fn api_catalog_splits_opted_regions() {
        let catalog = RegionCatalog::from_api(
            vec![Region::new("us-east-1"), Region::new("eu-west-1")],
            vec![Region::new("af-south-1")],
        );
        assert_eq!(catalog.active().len(), 2);
        assert_eq!(catalog.not_opted().len(), 1);
        assert_eq!(catalog.all().len(), 3);
        assert!(catalog.is_from_api());
    }

    #[test]
    fn selector_expands_wildcards_in_order_without_duplicates() {
        let catalog = RegionCatalog::fallback(Partition::Commercial);
        let client = Region::new("us-east-1");
        let selector = RegionSelector::new(["me-*", "us-*", "us-east-1"]);
        let regions = selector.resolve(&catalog, &client).unwrap();
        let names: Vec<&str> = regions.iter().map(Region::as_str).collect();
        assert_eq!(
            names,
            [
                "me-central-1",
                "me-south-1",
                "us-east-1",
                "us-east-2",
                "us-west-1",
                "us-west-2"
            ]
        );
    }

    #[test]
    fn selector_prefers_active_regions_from_api_catalogs() {
        let catalog = RegionCatalog::from_api(
            vec![Region::new("us-east-1")],
            vec![Region::new("us-west-2")],
        );
        let client = Region::new("us-east-1");
        let regions = RegionSelector::all().resolve(&catalog, &client).unwrap();
        assert_eq!(regions, vec![Region::new("us-east-1")]);
    }

    #[test]
    fn empty_selector_falls_back_to_client_region() {
        let catalog = RegionCatalog::fallback(Partition::Commercial);
        let client = Region::new("ap-south-1");
        let regions = RegionSelector::default().resolve(&catalog, &client).unwrap();
        assert_eq!(regions, vec![client]);
    }

    #[test]
    fn selector_rejects_malformed_patterns() {
        let catalog = RegionCatalog::fallback(Partition::Commercial);
        let client = Region::new("us-east-1");
        let err = RegionSelector::new(["[us-"])
            .resolve(&catalog, &client)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
