//! HTTP submitter — POSTs a completed answer set to the submission API.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` to avoid
//! blocking the async runtime. Non-2xx statuses map onto the engine's
//! submission error taxonomy so the session can distinguish retryable
//! from terminal rejections.

use async_trait::async_trait;
use intake_engine::{answers_to_json, SubmitError, SubmitReceipt, Submitter};
use intake_schema::AnswerSet;

pub(crate) struct HttpSubmitter {
    base_url: String,
}

impl HttpSubmitter {
    pub(crate) fn new(base_url: &str) -> Self {
        HttpSubmitter {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(
        &self,
        form_id: &str,
        token: &str,
        answers: &AnswerSet,
    ) -> Result<SubmitReceipt, SubmitError> {
        let url = format!("{}/forms/{}/submissions", self.base_url, form_id);
        let body = serde_json::json!({
            "token": token,
            "answers": answers_to_json(answers),
        });

        tokio::task::spawn_blocking(move || {
            let agent = ureq::Agent::new_with_defaults();
            match agent.post(&url).send_json(&body) {
                Ok(response) => {
                    let value: serde_json::Value =
                        response
                            .into_body()
                            .read_json()
                            .map_err(|e| SubmitError::Internal {
                                message: format!("failed to parse response as JSON: {}", e),
                            })?;
                    let record_id = value
                        .get("record_id")
                        .and_then(|v| v.as_str())
                        .ok_or_else(|| SubmitError::Internal {
                            message: "response missing record_id".to_string(),
                        })?;
                    Ok(SubmitReceipt {
                        record_id: record_id.to_string(),
                    })
                }
                Err(ureq::Error::StatusCode(code)) => Err(classify_status(code)),
                Err(e) => Err(SubmitError::Network {
                    message: e.to_string(),
                }),
            }
        })
        .await
        .map_err(|e| SubmitError::Internal {
            message: format!("task join error: {}", e),
        })?
    }
}

/// Map an HTTP rejection status onto the submission error taxonomy.
fn classify_status(code: u16) -> SubmitError {
    match code {
        400 => SubmitError::BadInput {
            message: "the submission was rejected as invalid".to_string(),
            errors: vec![],
        },
        401 | 403 => SubmitError::Unauthorized {
            message: "access token rejected".to_string(),
        },
        404 => SubmitError::Gone {
            message: "form not found".to_string(),
        },
        410 => SubmitError::Gone {
            message: "this form has been deactivated".to_string(),
        },
        429 => SubmitError::RateLimited {
            retry_after_secs: 60,
        },
        500..=599 => SubmitError::Internal {
            message: format!("server error ({})", code),
        },
        other => SubmitError::Internal {
            message: format!("unexpected status {}", other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(classify_status(400), SubmitError::BadInput { .. }));
        assert!(classify_status(401).is_terminal());
        assert!(classify_status(410).is_terminal());
        assert!(!classify_status(429).is_terminal());
        assert!(!classify_status(500).is_terminal());
    }
}
