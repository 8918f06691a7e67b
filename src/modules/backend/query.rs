//! Wire representation of document-store queries.
//!
//! The document database accepts a list of JSON-encoded query objects
//! (`{"method":"equal","attribute":"owner","values":[...]}`), with `and`
//! and `or` nesting whole query objects inside `values`.

use serde_json::{json, Value};

/// A single predicate or order clause understood by the document store.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryClause {
    /// Attribute equals one of the given values
    Equal(String, Vec<String>),
    /// String attribute contains the substring, or array attribute
    /// contains one of the values (backend-defined semantics)
    Contains(String, Vec<String>),
    /// All nested clauses must match
    And(Vec<QueryClause>),
    /// At least one nested clause must match
    Or(Vec<QueryClause>),
    /// Ascending order by attribute
    OrderAsc(String),
    /// Descending order by attribute
    OrderDesc(String),
}

impl QueryClause {
    pub fn equal(attribute: &str, values: &[&str]) -> Self {
        QueryClause::Equal(
            attribute.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    pub fn contains(attribute: &str, values: &[&str]) -> Self {
        QueryClause::Contains(
            attribute.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    /// True for order clauses, false for predicates
    pub fn is_order(&self) -> bool {
        matches!(self, QueryClause::OrderAsc(_) | QueryClause::OrderDesc(_))
    }

    /// Encode the clause as a backend query object
    pub fn to_json(&self) -> Value {
        match self {
            QueryClause::Equal(attribute, values) => json!({
                "method": "equal",
                "attribute": attribute,
                "values": values,
            }),
            QueryClause::Contains(attribute, values) => json!({
                "method": "contains",
                "attribute": attribute,
                "values": values,
            }),
            QueryClause::And(clauses) => json!({
                "method": "and",
                "values": clauses.iter().map(|c| c.to_json()).collect::<Vec<_>>(),
            }),
            QueryClause::Or(clauses) => json!({
                "method": "or",
                "values": clauses.iter().map(|c| c.to_json()).collect::<Vec<_>>(),
            }),
            QueryClause::OrderAsc(attribute) => json!({
                "method": "orderAsc",
                "attribute": attribute,
            }),
            QueryClause::OrderDesc(attribute) => json!({
                "method": "orderDesc",
                "attribute": attribute,
            }),
        }
    }

    /// Encode the clause as the string form sent in `queries[]` parameters
    pub fn encode(&self) -> String {
        self.to_json().to_string()
    }
}
