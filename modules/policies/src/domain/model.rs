//! Request-scoped policy data and the filters applied to upstream results.
//!
//! Upstream records are kept as raw JSON and passed through untouched; only
//! the fields the filters read are inspected.

use serde_json::Value;

use super::error::DomainError;

/// Lifecycle stage a policy record must be in to appear in search results.
pub const CONTRACT_STAGE: &str = "CONTRACT";

/// Storage type of documents that are never returned.
pub const LOCAL_STORAGE_TYPE: &str = "L";

/// Validated search input. Holds only non-empty values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    external_policy_number: Option<String>,
    last_name: Option<String>,
    first_name: Option<String>,
}

impl SearchCriteria {
    /// Build criteria from raw query values.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidSearchParameters`] unless
    /// `external_policy_number` or `last_name` is present and non-empty.
    pub fn new(
        external_policy_number: Option<String>,
        last_name: Option<String>,
        first_name: Option<String>,
    ) -> Result<Self, DomainError> {
        let criteria = Self {
            external_policy_number: non_empty(external_policy_number),
            last_name: non_empty(last_name),
            first_name: non_empty(first_name),
        };
        if criteria.external_policy_number.is_none() && criteria.last_name.is_none() {
            return Err(DomainError::InvalidSearchParameters);
        }
        Ok(criteria)
    }

    /// Upstream query parameters in their fixed order:
    /// `externalPolicyNumber`, `lastName`, `firstName`.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("externalPolicyNumber", &self.external_policy_number),
            ("lastName", &self.last_name),
            ("firstName", &self.first_name),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Whether a search record is in the `CONTRACT` stage (exact, case-sensitive).
#[must_use]
pub fn is_contract(record: &Value) -> bool {
    record.get("stadium").and_then(Value::as_str) == Some(CONTRACT_STAGE)
}

/// The `documentId` of a document reference, rendered as text.
///
/// Strings are used as-is and numbers are formatted. Anything else yields
/// `None`.
#[must_use]
pub fn document_id(reference: &Value) -> Option<String> {
    match reference.get("documentId")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Whether fetched document content is returned to the caller.
///
/// Kept iff `documentStorageType != "L"` (absent counts as not `L`) and
/// `data` is present and non-null.
#[must_use]
pub fn is_retained_document(content: &Value) -> bool {
    let storage_type = content.get("documentStorageType").and_then(Value::as_str);
    let has_data = content.get("data").is_some_and(|d| !d.is_null());
    storage_type != Some(LOCAL_STORAGE_TYPE) && has_data
}

/// Result of one document fetch within a fan-out.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Fetched(Value),
    Failed(String),
}

impl DocumentOutcome {
    /// The content when it was fetched and passes [`is_retained_document`].
    #[must_use]
    pub fn into_retained(self) -> Option<Value> {
        match self {
            DocumentOutcome::Fetched(content) if is_retained_document(&content) => Some(content),
            DocumentOutcome::Fetched(_) | DocumentOutcome::Failed(_) => None,
        }
    }
}
