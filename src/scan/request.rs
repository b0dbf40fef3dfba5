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

//! List requests and query-supplied filters.

use serde::{Deserialize, Serialize};

use crate::scan::limit::PageSizeLimits;
use crate::scan::region::Region;

/// A filter value pushed down from the query planner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum QualValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl QualValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QualValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            QualValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            QualValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for QualValue {
    fn from(value: &str) -> Self {
        QualValue::String(value.to_string())
    }
}

impl From<String> for QualValue {
    fn from(value: String) -> Self {
        QualValue::String(value)
    }
}

impl From<i64> for QualValue {
    fn from(value: i64) -> Self {
        QualValue::Int(value)
    }
}

impl From<bool> for QualValue {
    fn from(value: bool) -> Self {
        QualValue::Bool(value)
    }
}

/// Comparison operators supported on indexed columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

/// One filter on an indexed column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Qual {
    column: String,
    operator: QualOperator,
    value: QualValue,
}

impl Qual {
    pub fn new(
        column: impl Into<String>,
        operator: QualOperator,
        value: impl Into<QualValue>,
    ) -> Self {
        Qual {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn equal(column: impl Into<String>, value: impl Into<QualValue>) -> Self {
        Qual::new(column, QualOperator::Equal, value)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> QualOperator {
        self.operator
    }

    pub fn value(&self) -> &QualValue {
        &self.value
    }
}

/// The filters pushed down for one table invocation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quals(Vec<Qual>);

impl Quals {
    pub fn new() -> Self {
        Quals::default()
    }

    pub fn push(&mut self, qual: Qual) {
        self.0.push(qual);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Qual> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value of an equality filter on `column`, if one was supplied.
    pub fn equals(&self, column: &str) -> Option<&QualValue> {
        self.0
            .iter()
            .find(|q| q.column == column && q.operator == QualOperator::Equal)
            .map(|q| &q.value)
    }

    /// The string value of an equality filter on `column`, if one was
    /// supplied as a string.
    pub fn equals_string(&self, column: &str) -> Option<&str> {
        self.equals(column).and_then(QualValue::as_str)
    }
}

impl FromIterator<Qual> for Quals {
    fn from_iter<I: IntoIterator<Item = Qual>>(iter: I) -> Self {
        Quals(iter.into_iter().collect())
    }
}

/// Identity of the parent item a child request is scoped to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    resource: String,
    id: String,
}

impl ParentRef {
    pub fn new(resource: impl Into<String>, id: impl Into<String>) -> Self {
        ParentRef {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Resource kind of the parent table, e.g. `aws_kinesis_stream`.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// How a resource kind relates to the region dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceScope {
    /// No region dimension; enumerated once under the `global` sentinel.
    Global,
    /// Enumerated once per query region.
    Regional,
    /// Enumerated per query region plus once under the `global` sentinel
    /// (the WAF shape, where global-scope resources always appear).
    RegionalAndGlobal,
}

/// One table invocation's listing parameters. Immutable once enumeration
/// starts; the engine clones the request per (region, parent) branch.
#[derive(Clone, Debug)]
pub struct ListRequest {
    resource: String,
    service: String,
    region: Region,
    quals: Quals,
    parent: Option<ParentRef>,
    limit: Option<u64>,
    page_limits: PageSizeLimits,
}

impl ListRequest {
    /// A request for `resource` (table name) served by `service` (the AWS
    /// service the client factory resolves). The region defaults to the
    /// global sentinel until the fanout scopes the request to a branch.
    pub fn new(resource: impl Into<String>, service: impl Into<String>) -> Self {
        ListRequest {
            resource: resource.into(),
            service: service.into(),
            region: Region::global(),
            quals: Quals::default(),
            parent: None,
            limit: None,
            page_limits: PageSizeLimits::default(),
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_quals(mut self, quals: Quals) -> Self {
        self.quals = quals;
        self
    }

    pub fn with_qual(mut self, qual: Qual) -> Self {
        self.quals.push(qual);
        self
    }

    pub fn with_parent(mut self, parent: ParentRef) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_page_limits(mut self, page_limits: PageSizeLimits) -> Self {
        self.page_limits = page_limits;
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn quals(&self) -> &Quals {
        &self.quals
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn page_limits(&self) -> PageSizeLimits {
        self.page_limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_qual_lookup() {
        let quals: Quals = [
            Qual::equal("vpc_id", "vpc-123"),
            Qual::new("size", QualOperator::GreaterThan, 5),
        ]
        .into_iter()
        .collect();

        assert_eq!(quals.equals_string("vpc_id"), Some("vpc-123"));
        assert_eq!(quals.equals("size"), None); // not an equality filter
        assert_eq!(quals.equals("missing"), None);
    }

    #[test]
    fn request_builder_round_trip() {
        let req = ListRequest::new("aws_vpc_subnet", "ec2")
            .with_region(Region::new("eu-west-2"))
            .with_qual(Qual::equal("vpc_id", "vpc-123"))
            .with_parent(ParentRef::new("aws_vpc", "vpc-123"))
            .with_limit(Some(25))
            .with_page_limits(PageSizeLimits::new(1000, 5));

        assert_eq!(req.resource(), "aws_vpc_subnet");
        assert_eq!(req.service(), "ec2");
        assert_eq!(req.region().as_str(), "eu-west-2");
        assert_eq!(req.quals().equals_string("vpc_id"), Some("vpc-123"));
        assert_eq!(req.parent().map(ParentRef::id), Some("vpc-123"));
        assert_eq!(req.limit(), Some(25));
        assert_eq!(req.page_limits().min(), 5);
    }

    #[test]
    fn new_requests_default_to_the_global_sentinel() {
        let req = ListRequest::new("aws_iam_role", "iam");
        assert!(req.region().is_global());
        assert!(req.quals().is_empty());
        assert_eq!(req.limit(), None);
    }
}
