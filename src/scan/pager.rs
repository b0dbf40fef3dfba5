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

//! The page-fetching loop driving one enumeration branch.

use crate::scan::error::Error;
use crate::scan::sink::RecordEmitter;
use crate::scan::types::{Page, PageSource};

/// Pagination state for one enumeration branch: the continuation token, the
/// page size planned once at creation, and progress counters.
///
/// A cursor is owned exclusively by the [`PageFetcher`] that created it and
/// is discarded when the branch finishes; it is never shared across branches.
#[derive(Clone, Debug)]
pub struct PageCursor {
    token: Option<String>,
    page_size: u32,
    rows_emitted: u64,
    pages_fetched: u64,
}

impl PageCursor {
    fn new(page_size: u32) -> Self {
        PageCursor {
            token: None,
            page_size,
            rows_emitted: 0,
            pages_fetched: 0,
        }
    }

    /// The continuation token to send with the next page request; `None` on
    /// the first call.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The effective page size, fixed for the life of this cursor.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows emitted by this branch so far.
    pub fn rows_emitted(&self) -> u64 {
        self.rows_emitted
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }
}

/// Drives a [`PageSource`] one page at a time until the service reports no
/// further pages, the budget is exhausted, or the caller aborts.
///
/// There is no assumed maximum number of pages. The fetcher never retries;
/// an error latches the branch done and is returned to the caller.
pub struct PageFetcher<S: PageSource> {
    source: S,
    cursor: PageCursor,
    is_done: bool,
}

impl<S: PageSource> PageFetcher<S> {
    /// `page_size` comes from [`plan_page_size`](crate::scan::limit::plan_page_size),
    /// evaluated once here and not re-planned per page.
    pub fn new(source: S, page_size: u32) -> Self {
        PageFetcher {
            source,
            cursor: PageCursor::new(page_size),
            is_done: false,
        }
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn is_done(&self) -> bool {
        self.is_done
    }

    /// Fetch the next page of items, or `None` when the branch is done.
    pub async fn next_page(&mut self) -> Option<Result<Vec<S::Item>, Error>> {
        if self.is_done {
            return None;
        }
        match self.source.fetch_page(&self.cursor).await {
            Ok(Page { items, next_token }) => {
                self.cursor.pages_fetched += 1;
                self.is_done = next_token.is_none();
                self.cursor.token = next_token;
                log::trace!(
                    "fetched page {} ({} items, done={})",
                    self.cursor.pages_fetched,
                    items.len(),
                    self.is_done
                );
                Some(Ok(items))
            }
            Err(err) => {
                self.is_done = true;
                Some(Err(err))
            }
        }
    }

    /// Run the branch to completion, emitting every item through `emitter`.
    ///
    /// The stop conditions are checked after every item, not just at page
    /// boundaries, because a single page may hold more items than the
    /// remaining budget permits.
    pub async fn drain(&mut self, emitter: &RecordEmitter<'_, S::Item>) -> Result<(), Error> {
        while !emitter.gate().should_stop() {
            let Some(page) = self.next_page().await else {
                break;
            };
            for item in page? {
                if !emitter.emit(item) {
                    // The budget refused the row; the branch stops mid-page.
                    return Ok(());
                }
                self.cursor.rows_emitted += 1;
                if emitter.gate().should_stop() {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}
