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

//! Implementation of the resource enumeration engine.

pub mod budget;
pub mod dependent;
pub mod error;
pub mod fanout;
pub mod limit;
pub mod pager;
pub mod region;
pub mod request;
pub mod scanner;
pub mod sink;
pub mod types;

pub use budget::{AbortSignal, CancellationGate, QueryBudget};
pub use dependent::DependentScan;
pub use error::{ApiError, ApiErrorKind, Error, IgnoreConfig};
pub use fanout::ScanSummary;
pub use limit::{PageSizeLimits, plan_page_size};
pub use pager::{PageCursor, PageFetcher};
pub use region::{Partition, Region, RegionCatalog, RegionSelector};
pub use request::{ListRequest, ParentRef, Qual, QualOperator, QualValue, Quals, ResourceScope};
pub use scanner::{DEFAULT_CONCURRENCY, ListScan, ScanContext, Scanner};
pub use sink::{RecordEmitter, RecordSink};
pub use types::{Page, PageSource};
