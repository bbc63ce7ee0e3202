//! HTTP gateway transport for the ledger.
//!
//! Gateway routes, relative to the configured base URL:
//!
//! ```text
//! POST records               {contentRef, title, author} -> {pendingId}
//! GET  records/pending/{id}  -> {status: pending|finalized|rejected, sequenceIndex?, reason?}
//! GET  records/count         -> {count}
//! GET  records/{i}           -> {contentRef, title, timestamp (seconds), author}
//! ```

use super::traits::*;
use crate::model::{Address, ContentRef, IndexRecord};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

/// Ledger transport speaking to an HTTP gateway.
pub struct HttpLedgerTransport {
    client: reqwest::Client,
    base: Url,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteRequest<'a> {
    content_ref: &'a str,
    title: &'a str,
    author: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteResponse {
    pending_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinalizationResponse {
    status: String,
    sequence_index: Option<u64>,
    reason: Option<String>,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    content_ref: String,
    title: String,
    /// Block time in seconds.
    timestamp: u64,
    author: String,
}

impl HttpLedgerTransport {
    pub fn new(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }

    fn endpoint(&self, segments: &[&str]) -> LedgerResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| LedgerError::Unavailable(format!("invalid ledger url: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Pending ids travel as one path segment; dot segments would be dropped by `url`.
fn checked_pending_id(id: &str) -> LedgerResult<&str> {
    if matches!(id, "" | "." | "..") {
        return Err(LedgerError::Unavailable(format!(
            "malformed pending id '{}'",
            id
        )));
    }
    Ok(id)
}

fn transport_error(e: reqwest::Error) -> LedgerError {
    LedgerError::Unavailable(e.to_string())
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> LedgerResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| LedgerError::Unavailable(format!("malformed ledger response: {}", e)))
}

#[async_trait]
impl LedgerTransport for HttpLedgerTransport {
    async fn write_index_record(
        &self,
        content_ref: &ContentRef,
        title: &str,
        author: &Address,
    ) -> LedgerResult<PendingWrite> {
        let body = WriteRequest {
            content_ref: content_ref.as_str(),
            title,
            author: author.as_str(),
        };
        let response = self
            .client
            .post(self.endpoint(&["records"])?)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_client_error() {
            let reason = response.text().await.unwrap_or_default();
            return Err(LedgerError::Rejected(format!("{}: {}", status, reason)));
        }
        if !status.is_success() {
            return Err(LedgerError::Unavailable(format!("ledger returned {}", status)));
        }

        let written: WriteResponse = decode(response).await?;
        checked_pending_id(&written.pending_id)?;
        Ok(PendingWrite {
            id: written.pending_id,
        })
    }

    async fn finalization(&self, pending: &PendingWrite) -> LedgerResult<Finalization> {
        let id = checked_pending_id(&pending.id)?;
        let response = self
            .client
            .get(self.endpoint(&["records", "pending", id])?)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(LedgerError::Unavailable(format!(
                "ledger returned {}",
                response.status()
            )));
        }

        let state: FinalizationResponse = decode(response).await?;
        match (state.status.as_str(), state.sequence_index) {
            ("pending", _) => Ok(Finalization::Pending),
            ("finalized", Some(sequence_index)) => Ok(Finalization::Finalized { sequence_index }),
            ("rejected", _) => Ok(Finalization::Rejected(
                state.reason.unwrap_or_else(|| "rejected by ledger".to_string()),
            )),
            (other, _) => Err(LedgerError::Unavailable(format!(
                "unexpected finalization status '{}'",
                other
            ))),
        }
    }

    async fn read_count(&self) -> LedgerResult<u64> {
        let response = self
            .client
            .get(self.endpoint(&["records", "count"])?)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(LedgerError::Unavailable(format!(
                "ledger returned {}",
                response.status()
            )));
        }
        let count: CountResponse = decode(response).await?;
        Ok(count.count)
    }

    async fn read_index_record(&self, index: u64) -> LedgerResult<IndexRecord> {
        let response = self
            .client
            .get(self.endpoint(&["records", index.to_string().as_str()])?)
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(LedgerError::NotFound { index }),
            status if !status.is_success() => {
                return Err(LedgerError::Unavailable(format!("ledger returned {}", status)))
            }
            _ => {}
        }

        let wire: WireRecord = decode(response).await?;
        Ok(IndexRecord {
            content_ref: ContentRef::new(wire.content_ref),
            title: wire.title,
            timestamp: wire.timestamp.saturating_mul(1000),
            author: Address::new(wire.author),
            sequence_index: index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn transport(server: &MockServer) -> HttpLedgerTransport {
        let base = Url::parse(&format!("{}/ledger", server.uri())).unwrap();
        HttpLedgerTransport::new(reqwest::Client::new(), base)
    }

    #[tokio::test]
    async fn test_write_submits_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ledger/records"))
            .and(body_json(serde_json::json!({
                "contentRef": "ipfs://abc",
                "title": "A",
                "author": "0xabc"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"pendingId": "tx1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let pending = transport(&server)
            .await
            .write_index_record(&ContentRef::new("ipfs://abc"), "A", &Address::new("0xabc"))
            .await
            .unwrap();
        assert_eq!(pending.id, "tx1");
    }

    #[tokio::test]
    async fn test_write_refused_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ledger/records"))
            .respond_with(ResponseTemplate::new(409).set_body_string("cancelled"))
            .mount(&server)
            .await;

        let result = transport(&server)
            .await
            .write_index_record(&ContentRef::new("ipfs://abc"), "A", &Address::new("0xabc"))
            .await;
        assert!(matches!(result, Err(LedgerError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_finalization_states() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ledger/records/pending/tx1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"status": "finalized", "sequenceIndex": 4}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ledger/records/pending/tx2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "pending"})),
            )
            .mount(&server)
            .await;

        let transport = transport(&server).await;
        let done = transport
            .finalization(&PendingWrite { id: "tx1".to_string() })
            .await
            .unwrap();
        assert_eq!(done, Finalization::Finalized { sequence_index: 4 });

        let waiting = transport
            .finalization(&PendingWrite { id: "tx2".to_string() })
            .await
            .unwrap();
        assert_eq!(waiting, Finalization::Pending);
    }

    #[tokio::test]
    async fn test_pending_id_is_a_single_encoded_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ledger/records/pending/a%2Fb%3Fc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "pending"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let state = transport(&server)
            .await
            .finalization(&PendingWrite { id: "a/b?c".to_string() })
            .await
            .unwrap();
        assert_eq!(state, Finalization::Pending);
    }

    #[tokio::test]
    async fn test_dot_segment_pending_id_is_refused() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ledger/records"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"pendingId": ".."})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let transport = transport(&server).await;
        let written = transport
            .write_index_record(&ContentRef::new("ipfs://abc"), "A", &Address::new("0xabc"))
            .await;
        assert!(matches!(written, Err(LedgerError::Unavailable(_))));

        let polled = transport
            .finalization(&PendingWrite { id: ".".to_string() })
            .await;
        assert!(matches!(polled, Err(LedgerError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_read_record_converts_seconds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ledger/records/count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"count": 1})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ledger/records/0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "contentRef": "ipfs://abc/0",
                "title": "A",
                "timestamp": 1_700_000_000u64,
                "author": "0xabc"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ledger/records/1"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let transport = transport(&server).await;
        assert_eq!(transport.read_count().await.unwrap(), 1);

        let record = transport.read_index_record(0).await.unwrap();
        assert_eq!(record.timestamp, 1_700_000_000_000);
        assert_eq!(record.content_ref.key(), "abc");
        assert_eq!(record.sequence_index, 0);

        assert_eq!(
            transport.read_index_record(1).await,
            Err(LedgerError::NotFound { index: 1 })
        );
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_unavailable() {
        let base = Url::parse("http://127.0.0.1:9/ledger").unwrap();
        let transport = HttpLedgerTransport::new(reqwest::Client::new(), base);
        assert!(matches!(
            transport.read_count().await,
            Err(LedgerError::Unavailable(_))
        ));
    }
}
