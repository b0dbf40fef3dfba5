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

//! Shared mock plumbing for the enumeration engine tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use awsweep::scan::pager::PageCursor;
use awsweep::scan::types::{Page, PageSource};
use awsweep::scan::{Error, Region};

#[allow(dead_code)]
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub fn regions(names: &[&str]) -> Vec<Region> {
    names.iter().map(|n| Region::new(*n)).collect()
}

#[allow(dead_code)]
pub fn rows(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A page source scripted with a fixed sequence of pages. All but the last
/// page carry a continuation token; an optional trailing error replaces the
/// final page.
pub struct ScriptedSource {
    pages: VecDeque<Result<Page<String>, Error>>,
    fetches: Option<Arc<AtomicUsize>>,
    page_sizes: Option<Arc<Mutex<Vec<u32>>>>,
}

impl ScriptedSource {
    pub fn new(pages: Vec<Vec<String>>) -> Self {
        let total = pages.len();
        let scripted = pages
            .into_iter()
            .enumerate()
            .map(|(i, items)| {
                let token = (i + 1 < total).then(|| format!("token-{}", i + 1));
                Ok(Page::new(items, token))
            })
            .collect();
        ScriptedSource {
            pages: scripted,
            fetches: None,
            page_sizes: None,
        }
    }

    /// Pages followed by a failing fetch.
    #[allow(dead_code)]
    pub fn failing_after(pages: Vec<Vec<String>>, err: Error) -> Self {
        let mut source = ScriptedSource::new(pages);
        for page in source.pages.iter_mut() {
            if let Ok(page) = page {
                if page.next_token.is_none() {
                    page.next_token = Some("token-err".to_string());
                }
            }
        }
        source.pages.push_back(Err(err));
        source
    }

    /// A source whose very first fetch fails.
    #[allow(dead_code)]
    pub fn failing(err: Error) -> Self {
        ScriptedSource::failing_after(Vec::new(), err)
    }

    /// Count every fetch in the shared counter.
    #[allow(dead_code)]
    pub fn counting(mut self, fetches: &Arc<AtomicUsize>) -> Self {
        self.fetches = Some(Arc::clone(fetches));
        self
    }

    /// Record the page size each fetch was asked for.
    #[allow(dead_code)]
    pub fn recording(mut self, page_sizes: &Arc<Mutex<Vec<u32>>>) -> Self {
        self.page_sizes = Some(Arc::clone(page_sizes));
        self
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    type Item = String;

    async fn fetch_page(&mut self, cursor: &PageCursor) -> Result<Page<String>, Error> {
        if let Some(fetches) = &self.fetches {
            fetches.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(page_sizes) = &self.page_sizes {
            page_sizes.lock().unwrap().push(cursor.page_size());
        }
        match self.pages.pop_front() {
            Some(result) => result,
            None => Ok(Page::last(Vec::new())),
        }
    }
}
