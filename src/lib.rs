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

//! # AWSweep Rust Library (`awsweep`)
//!
//! This crate provides the enumeration core shared by AWS "table" adapters of
//! a relational query engine: a region-aware, pagination-aware,
//! limit-propagating, cancellable listing protocol. Adapters supply only the
//! AWS-call glue (a client factory and a raw page call); the engine supplies
//! region fanout, page-size planning, budget-driven early stop, and
//! parent→child dependent listing.
//!
//! The engine never touches a concrete AWS API shape. Each resource kind
//! implements [`scan::types::PageSource`] for its list call and hands the
//! engine a factory that produces one source per region branch.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use awsweep::scan::{ListRequest, Partition, Region, ScanContext, Scanner};
//! use awsweep::scan::sink::VecSink;
//! use awsweep::scan::types::EmptySource;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = ScanContext::builder()
//!         .account_id("111122223333")
//!         .partition(Partition::Commercial)
//!         .regions(vec![Region::new("us-east-1"), Region::new("eu-west-1")])
//!         .limit(500)
//!         .build();
//!     let scanner = Scanner::new(ctx);
//!
//!     let sink = VecSink::new();
//!     let summary = scanner
//!         .list(ListRequest::new("aws_vpc", "ec2"), |_req| {
//!             // A real adapter acquires an EC2 client for _req.region() here
//!             // and returns a PageSource wrapping DescribeVpcs.
//!             Ok(Some(EmptySource::<String>::new()))
//!         })
//!         .run(&sink)
//!         .await;
//!
//!     println!(
//!         "{} rows from {} regions",
//!         summary.rows_emitted(),
//!         summary.completed().len()
//!     );
//! }
//! ```
//!
//! ## Design
//! - Request state is immutable once enumeration starts; per-branch cursors
//!   are never shared
//! - The only cross-branch mutable state is the atomic
//!   [`scan::budget::QueryBudget`]
//! - Errors are propagated, never retried; retry/backoff belongs to the
//!   caller

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod scan;
