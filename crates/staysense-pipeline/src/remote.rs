//! Oracle backed by an external model server over HTTP

use crate::oracle::ScoringOracle;
use crate::vectorizer::EncodedSequence;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use staysense_core::{Error, Result};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    sequence: &'a [u32],
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    probability: f32,
}

/// Posts `{"sequence": [...]}` to `url` and reads `{"probability": p}` back
pub struct RemoteOracle {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl RemoteOracle {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    /// Use a preconfigured client (timeouts, TLS) owned by the host service
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: "remote".to_string(),
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ScoringOracle for RemoteOracle {
    async fn score(&self, sequence: &EncodedSequence) -> Result<f32> {
        let response = self
            .client
            .post(&self.url)
            .json(&ScoreRequest {
                sequence: sequence.ids(),
            })
            .send()
            .await
            .map_err(|e| Error::scoring(format!("model server unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::scoring(format!("model server returned {status}")));
        }

        let body: ScoreResponse = response
            .json()
            .await
            .map_err(|e| Error::scoring(format!("invalid model server response: {e}")))?;
        debug!(probability = body.probability, "Remote oracle scored sequence");

        Ok(body.probability)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_is_scoring_failure() {
        // Port 9 (discard) on localhost is not expected to speak HTTP
        let oracle = RemoteOracle::new("http://127.0.0.1:9/score");
        let err = oracle
            .score(&EncodedSequence::from(vec![2, 1, 1]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "scoring_failure");
    }

    #[test]
    fn test_request_shape() {
        let ids = [4u32, 1, 1];
        let json = serde_json::to_string(&ScoreRequest { sequence: &ids }).unwrap();
        assert_eq!(json, r#"{"sequence":[4,1,1]}"#);
    }
}
