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

//! Error definitions for enumeration operations.

use std::fmt;

use thiserror::Error;

use crate::scan::region::Region;

/// Classification of an API failure as reported by the raw page call.
///
/// The engine never retries either class; a [`Throttled`](ApiErrorKind::Throttled)
/// error is propagated so the caller's rate-limit layer can decide when to
/// retry, and a [`Permanent`](ApiErrorKind::Permanent) error either matches
/// the caller's [`IgnoreConfig`] or fails the branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Transient throttling or rate-limit rejection.
    Throttled,
    /// Access denied, resource not found, invalid parameter combinations and
    /// other non-transient failures.
    Permanent,
}

/// A failure surfaced by a raw page call, with enough context to tell which
/// branch of a multi-region or parent/child enumeration it came from.
#[derive(Clone, Debug)]
pub struct ApiError {
    /// Service-assigned error code, e.g. `ThrottlingException`.
    pub code: String,
    pub message: String,
    pub kind: ApiErrorKind,
    /// AWS service the call targeted, e.g. `ec2`.
    pub service: String,
    pub region: Region,
    /// Identity of the parent item when the failing call was a child listing.
    pub parent: Option<String>,
}

impl ApiError {
    pub fn throttled(
        service: impl Into<String>,
        region: Region,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            kind: ApiErrorKind::Throttled,
            service: service.into(),
            region,
            parent: None,
        }
    }

    pub fn permanent(
        service: impl Into<String>,
        region: Region,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            kind: ApiErrorKind::Permanent,
            service: service.into(),
            region,
            parent: None,
        }
    }

    /// Whether the caller's retry layer may usefully retry this call.
    pub fn is_retryable(&self) -> bool {
        self.kind == ApiErrorKind::Throttled
    }
}

impl std::error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed with {} in {}: {}",
            self.service, self.code, self.region, self.message
        )?;
        if let Some(parent) = &self.parent {
            write!(f, " (parent {})", parent)?;
        }
        Ok(())
    }
}

/// Error definitions
#[derive(Debug, Error)]
pub enum Error {
    /// The service does not operate in this region for the account's
    /// partition. Treated as zero results, never as a query failure.
    #[error("{service} is not supported in region {region}")]
    UnsupportedRegion { service: String, region: Region },

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The parent branch of a dependent enumeration failed; all of its
    /// not-yet-started child branches were abandoned.
    #[error("parent listing for {resource} failed in {region}: {source}")]
    ParentEnumeration {
        resource: String,
        region: Region,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

impl Error {
    /// The service error code, when one exists.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Api(api) => Some(&api.code),
            Error::ParentEnumeration { source, .. } => source.code(),
            _ => None,
        }
    }

    /// True when this error means "no rows here" rather than a failed branch:
    /// unsupported regions always, permanent API errors when their code
    /// matches the caller's ignore configuration, throttling never.
    pub fn is_benign(&self, ignore: &IgnoreConfig) -> bool {
        match self {
            Error::UnsupportedRegion { .. } => true,
            Error::Api(api) => api.kind == ApiErrorKind::Permanent && ignore.should_ignore(&api.code),
            Error::ParentEnumeration { source, .. } => source.is_benign(ignore),
            Error::InvalidPattern { .. } => false,
        }
    }

    /// Attach the parent item's identity to an API error that does not
    /// already carry one.
    pub(crate) fn with_parent(self, parent: &str) -> Self {
        match self {
            Error::Api(mut api) => {
                if api.parent.is_none() {
                    api.parent = Some(parent.to_string());
                }
                Error::Api(api)
            }
            other => other,
        }
    }
}

/// Error codes a caller has declared ignorable for a resource kind, e.g.
/// `ResourceNotFoundException` for services that report missing optional
/// features that way. Codes support glob wildcards (`AccessDenied*`).
///
/// Suppression applies to permanent API errors only; throttling errors always
/// propagate so the caller's retry layer can see them.
#[derive(Clone, Debug, Default)]
pub struct IgnoreConfig {
    patterns: Vec<glob::Pattern>,
}

impl IgnoreConfig {
    pub fn new<I, S>(codes: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = Vec::new();
        for code in codes {
            let code = code.as_ref();
            let pattern = glob::Pattern::new(code).map_err(|source| Error::InvalidPattern {
                pattern: code.to_string(),
                source,
            })?;
            patterns.push(pattern);
        }
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn should_ignore(&self, code: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(code))
    }
}
