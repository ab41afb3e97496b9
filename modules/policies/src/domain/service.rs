//! Domain service for policy lookups.
//!
//! Every operation acquires a fresh token first, then talks to the upstream
//! policy API. Document retrieval fans out one task per document and joins
//! the results back in list order.

use std::sync::Arc;
use std::time::Instant;

use gateway_auth::AccessToken;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{Instrument, instrument};

use super::error::DomainError;
use super::model::{DocumentOutcome, SearchCriteria, document_id, is_contract};
use super::ports::PolicyUpstream;

/// Domain service for policy operations.
pub struct Service {
    upstream: Arc<dyn PolicyUpstream>,
}

impl Service {
    pub fn new(upstream: Arc<dyn PolicyUpstream>) -> Self {
        Self { upstream }
    }

    /// Search policies and keep only records in the `CONTRACT` stage.
    ///
    /// # Errors
    ///
    /// Propagates token and search failures unchanged.
    #[instrument(skip(self, criteria))]
    pub async fn search_policies(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Value>, DomainError> {
        let start = Instant::now();
        let token = self.upstream.acquire_token().await?;
        let records = self.upstream.search_policies(&token, criteria).await?;

        let received = records.len();
        let contracts: Vec<Value> = records.into_iter().filter(is_contract).collect();

        tracing::info!(
            received,
            returned = contracts.len(),
            duration_ms = elapsed_ms(start),
            "Policy search completed"
        );
        Ok(contracts)
    }

    /// Policy details, unwrapped from the upstream `policy` field.
    ///
    /// Returns `Value::Null` when the upstream object has no `policy`.
    ///
    /// # Errors
    ///
    /// Propagates token and details failures unchanged.
    #[instrument(skip(self), fields(policy_id = %policy_id))]
    pub async fn get_policy(&self, policy_id: &str) -> Result<Value, DomainError> {
        let token = self.upstream.acquire_token().await?;
        let details = self.upstream.policy_details(&token, policy_id).await?;

        let policy = match details {
            Value::Object(mut map) => map.remove("policy").unwrap_or(Value::Null),
            _ => Value::Null,
        };
        if policy.is_null() {
            tracing::warn!("upstream details carried no policy");
        }
        Ok(policy)
    }

    /// Documents of a policy with their content.
    ///
    /// An empty list returns immediately. Otherwise every reference is fetched
    /// concurrently; failed fetches are dropped, as are documents stored
    /// locally (`documentStorageType == "L"`) or without `data`. Order follows
    /// the upstream list.
    ///
    /// # Errors
    ///
    /// Propagates token and document-list failures. Individual document
    /// failures are absorbed.
    #[instrument(skip(self), fields(policy_id = %policy_id))]
    pub async fn get_policy_documents(&self, policy_id: &str) -> Result<Vec<Value>, DomainError> {
        let start = Instant::now();
        let token = self.upstream.acquire_token().await?;
        let references = self.upstream.list_documents(&token, policy_id).await?;

        if references.is_empty() {
            tracing::debug!("policy has no documents");
            return Ok(Vec::new());
        }

        let outcomes = self.fetch_documents(&token, policy_id, &references).await;
        let requested = outcomes.len();
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, DocumentOutcome::Failed(_)))
            .count();

        let documents: Vec<Value> = outcomes
            .into_iter()
            .filter_map(DocumentOutcome::into_retained)
            .collect();

        tracing::info!(
            requested,
            failed,
            returned = documents.len(),
            duration_ms = elapsed_ms(start),
            "Policy documents completed"
        );
        Ok(documents)
    }

    /// Fetch every referenced document concurrently.
    ///
    /// The returned outcomes line up index-for-index with `references`.
    async fn fetch_documents(
        &self,
        token: &AccessToken,
        policy_id: &str,
        references: &[Value],
    ) -> Vec<DocumentOutcome> {
        let mut slots: Vec<Option<DocumentOutcome>> = vec![None; references.len()];
        let mut tasks = JoinSet::new();

        for (index, reference) in references.iter().enumerate() {
            let Some(doc_id) = document_id(reference) else {
                tracing::warn!(index, "document reference without documentId skipped");
                slots[index] = Some(DocumentOutcome::Failed(
                    "document reference has no documentId".to_owned(),
                ));
                continue;
            };

            let upstream = Arc::clone(&self.upstream);
            let token = token.clone();
            let policy_id = policy_id.to_owned();
            tasks.spawn(
                async move {
                    let outcome = match upstream.fetch_document(&token, &policy_id, &doc_id).await
                    {
                        Ok(content) => DocumentOutcome::Fetched(content),
                        Err(e) => {
                            tracing::warn!(document_id = %doc_id, error = %e, "document fetch failed");
                            DocumentOutcome::Failed(e.to_string())
                        }
                    };
                    (index, outcome)
                }
                .instrument(tracing::Span::current()),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(outcome);
                    }
                }
                Err(e) => tracing::error!(error = %e, "document fetch task aborted"),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| DocumentOutcome::Failed("document fetch task aborted".to_owned()))
            })
            .collect()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::error::UpstreamStage;
    use async_trait::async_trait;
    use bytes::Bytes;
    use http::StatusCode;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory upstream with per-document delays and failures.
    #[derive(Default)]
    struct FakeUpstream {
        token_status: Option<StatusCode>,
        search_results: Vec<Value>,
        details: Value,
        references: Vec<Value>,
        documents: HashMap<String, (Duration, Result<Value, StatusCode>)>,
        token_calls: AtomicUsize,
        list_calls: AtomicUsize,
        fetched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PolicyUpstream for FakeUpstream {
        async fn acquire_token(&self) -> Result<AccessToken, DomainError> {
            self.token_calls.fetch_add(1, Ordering::SeqCst);
            match self.token_status {
                Some(status) => Err(DomainError::UpstreamAuth {
                    status,
                    body: Bytes::from_static(b"{\"error\":\"denied\"}"),
                    content_type: None,
                }),
                None => Ok(AccessToken::new("tok")),
            }
        }

        async fn search_policies(
            &self,
            _token: &AccessToken,
            _criteria: &SearchCriteria,
        ) -> Result<Vec<Value>, DomainError> {
            Ok(self.search_results.clone())
        }

        async fn policy_details(
            &self,
            _token: &AccessToken,
            _policy_id: &str,
        ) -> Result<Value, DomainError> {
            Ok(self.details.clone())
        }

        async fn list_documents(
            &self,
            _token: &AccessToken,
            _policy_id: &str,
        ) -> Result<Vec<Value>, DomainError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.references.clone())
        }

        async fn fetch_document(
            &self,
            _token: &AccessToken,
            _policy_id: &str,
            document_id: &str,
        ) -> Result<Value, DomainError> {
            self.fetched.lock().unwrap().push(document_id.to_owned());
            let (delay, result) = self.documents.get(document_id).cloned().unwrap();
            tokio::time::sleep(delay).await;
            result.map_err(|status| DomainError::UpstreamApi {
                stage: UpstreamStage::Document,
                status,
                body: Bytes::new(),
                content_type: None,
            })
        }
    }

    fn doc(id: &str, storage: &str, data: Value) -> Value {
        json!({"documentId": id, "documentStorageType": storage, "data": data})
    }

    #[tokio::test]
    async fn search_keeps_only_contracts() {
        let upstream = Arc::new(FakeUpstream {
            search_results: vec![
                json!({"id": 1, "stadium": "CONTRACT"}),
                json!({"id": 2, "stadium": "OFFER"}),
                json!({"id": 3, "stadium": "contract"}),
                json!({"id": 4, "stadium": "CONTRACT"}),
            ],
            ..FakeUpstream::default()
        });
        let svc = Service::new(upstream);
        let criteria = SearchCriteria::new(None, Some("Doe".into()), None).unwrap();

        let result = svc.search_policies(&criteria).await.unwrap();

        let ids: Vec<_> = result.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn get_policy_unwraps_policy_field() {
        let upstream = Arc::new(FakeUpstream {
            details: json!({"policy": {"number": "P-1"}, "meta": {"x": 1}}),
            ..FakeUpstream::default()
        });
        let svc = Service::new(upstream);

        let policy = svc.get_policy("P-1").await.unwrap();
        assert_eq!(policy, json!({"number": "P-1"}));
    }

    #[tokio::test]
    async fn get_policy_without_policy_field_is_null() {
        let upstream = Arc::new(FakeUpstream {
            details: json!({"meta": {}}),
            ..FakeUpstream::default()
        });
        let svc = Service::new(upstream);

        assert_eq!(svc.get_policy("P-1").await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn empty_document_list_makes_no_fetches() {
        let upstream = Arc::new(FakeUpstream::default());
        let svc = Service::new(upstream.clone());

        let docs = svc.get_policy_documents("P-1").await.unwrap();

        assert!(docs.is_empty());
        assert_eq!(upstream.list_calls.load(Ordering::SeqCst), 1);
        assert!(upstream.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn documents_keep_list_order_and_absorb_failures() {
        let mut documents = HashMap::new();
        // first finishes last, so completion order differs from list order
        documents.insert(
            "a".to_owned(),
            (Duration::from_millis(60), Ok(doc("a", "R", json!("A")))),
        );
        documents.insert(
            "b".to_owned(),
            (Duration::from_millis(5), Err(StatusCode::INTERNAL_SERVER_ERROR)),
        );
        documents.insert(
            "c".to_owned(),
            (Duration::from_millis(1), Ok(doc("c", "R", json!("C")))),
        );
        documents.insert(
            "d".to_owned(),
            (Duration::from_millis(1), Ok(doc("d", "L", json!("D")))),
        );
        documents.insert(
            "e".to_owned(),
            (Duration::from_millis(1), Ok(doc("e", "R", Value::Null))),
        );

        let upstream = Arc::new(FakeUpstream {
            references: ["a", "b", "c", "d", "e"]
                .iter()
                .map(|id| json!({"documentId": id}))
                .collect(),
            documents,
            ..FakeUpstream::default()
        });
        let svc = Service::new(upstream.clone());

        let docs = svc.get_policy_documents("P-1").await.unwrap();

        let ids: Vec<_> = docs
            .iter()
            .map(|d| d["documentId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(upstream.fetched.lock().unwrap().len(), 5);
        assert_eq!(upstream.token_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetches_run_concurrently() {
        let mut documents = HashMap::new();
        let mut references = Vec::new();
        for i in 0..10 {
            let id = format!("doc-{i}");
            documents.insert(
                id.clone(),
                (Duration::from_millis(100), Ok(doc(&id, "R", json!(i)))),
            );
            references.push(json!({"documentId": id}));
        }
        let upstream = Arc::new(FakeUpstream {
            references,
            documents,
            ..FakeUpstream::default()
        });
        let svc = Service::new(upstream);

        let start = Instant::now();
        let docs = svc.get_policy_documents("P-1").await.unwrap();

        assert_eq!(docs.len(), 10);
        // sequential fetching would take at least one second
        assert!(start.elapsed() < Duration::from_millis(900));
    }

    #[tokio::test]
    async fn reference_without_id_is_skipped() {
        let mut documents = HashMap::new();
        documents.insert(
            "a".to_owned(),
            (Duration::ZERO, Ok(doc("a", "R", json!("A")))),
        );
        let upstream = Arc::new(FakeUpstream {
            references: vec![json!({"name": "orphan"}), json!({"documentId": "a"})],
            documents,
            ..FakeUpstream::default()
        });
        let svc = Service::new(upstream.clone());

        let docs = svc.get_policy_documents("P-1").await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(*upstream.fetched.lock().unwrap(), vec!["a".to_owned()]);
    }

    #[tokio::test]
    async fn token_failure_stops_before_upstream_calls() {
        let upstream = Arc::new(FakeUpstream {
            token_status: Some(StatusCode::UNAUTHORIZED),
            ..FakeUpstream::default()
        });
        let svc = Service::new(upstream.clone());

        let err = svc.get_policy_documents("P-1").await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::UpstreamAuth { status, .. } if status == StatusCode::UNAUTHORIZED
        ));
        assert_eq!(upstream.list_calls.load(Ordering::SeqCst), 0);
    }
}
