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

//! Core types for page-based enumeration.

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::scan::error::Error;
use crate::scan::pager::PageCursor;

/// One bounded batch of items returned by a paginated list call, plus the
/// opaque token that continues the listing.
///
/// A page is accepted whole; the engine never consumes it partially and never
/// resumes from the middle of one.
#[derive(Clone, Debug, Default)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Page { items, next_token }
    }

    /// A page with no continuation; the service reported no further pages.
    pub fn last(items: Vec<T>) -> Self {
        Page {
            items,
            next_token: None,
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The raw page call: the one point where the engine touches a concrete AWS
/// API shape.
///
/// An implementation wraps one list call for one resource kind in one region,
/// holding whatever client and request state it needs. The cursor carries the
/// continuation token of the previous page (`None` on the first call) and the
/// page size planned for this enumeration; the implementation passes both
/// through to the service.
///
/// Implementations do not retry. A transient failure is reported as a
/// [`Throttled`](crate::scan::error::ApiErrorKind::Throttled)
/// [`ApiError`](crate::scan::error::ApiError) and the caller's rate-limit
/// layer decides what to do with it.
#[async_trait]
pub trait PageSource: Send {
    type Item: Send;

    async fn fetch_page(&mut self, cursor: &PageCursor) -> Result<Page<Self::Item>, Error>;
}

/// A source that is always exhausted. Useful for resource kinds that exist
/// only in specific configurations, and in examples.
#[derive(Clone, Debug, Default)]
pub struct EmptySource<T> {
    _item: PhantomData<T>,
}

impl<T> EmptySource<T> {
    pub fn new() -> Self {
        EmptySource { _item: PhantomData }
    }
}

#[async_trait]
impl<T: Send + 'static> PageSource for EmptySource<T> {
    type Item = T;

    async fn fetch_page(&mut self, _cursor: &PageCursor) -> Result<Page<T>, Error> {
        Ok(Page::last(Vec::new()))
    }
}
