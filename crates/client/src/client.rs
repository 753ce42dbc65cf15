use daon_work::{ContentHash, Work};
use exn::ResultExt;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{ErrorKind, Result};
use crate::license::{License, LiberationCheck, LiberationUseCase};
use crate::models::{ProtectRequest, ProtectResponse, VerificationResult};
use crate::outcome::{Mode, Receipt, SubmissionOutcome};
use crate::transport::{HttpResponse, HttpTransport, Transport};

const PROTECT_PATH: &str = "/api/v1/protect";
const VERIFY_PATH: &str = "/api/v1/verify";
/// Longest slice of an error response body carried into error messages.
const ERROR_BODY_CHARS: usize = 200;

/// Registry client. Cheap to clone.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Client talking HTTP(S) to `config.api_url`.
    pub fn http(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn content_hash(&self, work: &Work) -> ContentHash {
        work.content_hash(self.config.hash_strategy)
    }

    /// Registers `work` with the registry.
    ///
    /// Transport failures, non-2xx statuses, unparseable bodies and replies
    /// with `success: false` are all errors.
    #[instrument(skip(self, work), fields(title = work.title()))]
    pub async fn protect(&self, work: &Work, license: License) -> Result<Receipt> {
        let content_hash = self.content_hash(work);
        let request = ProtectRequest::new(work, content_hash.clone(), license, self.config.creator.as_str());
        let body = serde_json::to_value(&request).or_raise(|| ErrorKind::Encode)?;
        let response = self.transport.post_json(&self.config.endpoint(PROTECT_PATH), &body).await?;
        let reply: ProtectResponse = parse_success(&response)?;
        if !reply.success {
            let reason = reply.error.unwrap_or_else(|| "registry reported failure".to_string());
            exn::bail!(ErrorKind::Rejected(reason));
        }
        if let Some(returned) = reply.content_hash.as_deref()
            && returned != content_hash.as_str()
        {
            warn!(sent = %content_hash, returned, "Registry echoed a different content hash");
        }
        debug!(hash = %content_hash, tx = reply.tx_hash.as_deref(), "Protected");
        Ok(Receipt {
            content_hash,
            tx_hash: reply.tx_hash,
            verification_url: reply.verification_url,
            simulated: false,
        })
    }

    /// Dry run of [`protect`](Self::protect): computes the hash and fabricates
    /// a receipt without any network traffic.
    pub fn simulate(&self, work: &Work, license: License) -> Receipt {
        let content_hash = self.content_hash(work);
        debug!(hash = %content_hash, %license, "Simulated protection");
        Receipt {
            tx_hash: Some(format!("sim-{}", OffsetDateTime::now_utc().unix_timestamp())),
            verification_url: Some(self.verification_url(&content_hash)),
            content_hash,
            simulated: true,
        }
    }

    /// Never fails: every error becomes [`SubmissionOutcome::Failed`].
    pub async fn submit(&self, work: &Work, license: License, mode: Mode) -> SubmissionOutcome {
        match mode {
            Mode::DryRun => SubmissionOutcome::Protected(self.simulate(work, license)),
            Mode::Live => match self.protect(work, license).await {
                Ok(receipt) => SubmissionOutcome::Protected(receipt),
                Err(e) => {
                    warn!(title = work.title(), error = ?e, "Protection failed");
                    SubmissionOutcome::failed((*e).to_string())
                },
            },
        }
    }

    /// Public verification page for a hash.
    pub fn verification_url(&self, hash: &ContentHash) -> String {
        format!("{}/{hash}", self.config.verify_url.trim_end_matches('/'))
    }

    /// Looks up the registry record for `content_or_hash`: either a full
    /// `sha256:` hash, or content to be hashed first.
    #[instrument(skip(self, content_or_hash))]
    pub async fn verify(&self, content_or_hash: &str) -> Result<VerificationResult> {
        let hash = ContentHash::parse(content_or_hash)
            .unwrap_or_else(|_| ContentHash::with_strategy(content_or_hash, self.config.hash_strategy));
        let url = format!("{}/{hash}", self.config.endpoint(VERIFY_PATH));
        let response = self.transport.get(&url).await?;
        if response.status == 404 {
            return Ok(VerificationResult {
                verified: false,
                content_hash: Some(hash.to_string()),
                ..VerificationResult::default()
            });
        }
        let mut result: VerificationResult = parse_success(&response)?;
        result.content_hash.get_or_insert_with(|| hash.to_string());
        if result.verified && result.verification_url.is_none() {
            result.verification_url = Some(self.verification_url(&hash));
        }
        Ok(result)
    }

    /// Checks a proposed use of a registered work. Works under any license
    /// other than Liberation are always compliant.
    pub async fn check_liberation(&self, content_hash: &ContentHash, use_case: &LiberationUseCase) -> Result<LiberationCheck> {
        let record = self.verify(content_hash.as_str()).await?;
        if !record.is_liberation_licensed() {
            return Ok(LiberationCheck {
                compliant: true,
                reason: "Not a Liberation License work",
            });
        }
        Ok(use_case.evaluate())
    }
}

fn parse_success<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    if !response.is_success() {
        exn::bail!(ErrorKind::Status {
            status: response.status,
            body: response.body.trim().chars().take(ERROR_BODY_CHARS).collect(),
        });
    }
    Ok(serde_json::from_str(&response.body).map_err(|e| ErrorKind::MalformedResponse(e.to_string()))?)
}
