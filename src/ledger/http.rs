use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Context, Identity, Ledger, LedgerError, Receipt, Snapshot};
use crate::config::Config;

pub static SESSION_HEADER: &str = "X-Ledger-Session";

#[derive(Debug, Serialize)]
struct Call<'a> {
    #[serde(rename = "fn")]
    func: &'a str,
    args: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session: String,
}

/// Ledger reached through a REST gateway that holds the wallets.
#[derive(Debug)]
pub struct HttpLedger {
    client: Client,
    base_url: String,
    channel: String,
    chaincode: String,
    generation: AtomicU64,
}

impl HttpLedger {
    pub fn new(
        base_url: impl ToString,
        channel: impl ToString,
        chaincode: impl ToString,
    ) -> HttpLedger {
        HttpLedger {
            client: Client::new(),
            base_url: base_url.to_string().trim_end_matches('/').to_string(),
            channel: channel.to_string(),
            chaincode: chaincode.to_string(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_config(c: &Config) -> Result<HttpLedger, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("academy-backend/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpLedger {
            client,
            ..HttpLedger::new(&c.ledger_url, &c.ledger_channel, &c.ledger_chaincode)
        })
    }

    /// Gateway URL with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, String> {
        let mut url = Url::parse(&self.base_url).map_err(|e| e.to_string())?;
        url.path_segments_mut()
            .map_err(|_| format!("{} cannot take a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn chaincode_url(&self, action: &str) -> Result<Url, String> {
        self.endpoint(&[
            "channels",
            self.channel.as_str(),
            "chaincodes",
            self.chaincode.as_str(),
            action,
        ])
    }

    fn session_url(&self, identity: &Identity) -> Result<Url, String> {
        self.endpoint(&[
            "identities",
            identity.org.as_str(),
            identity.username.as_str(),
            "sessions",
        ])
    }

    async fn call(
        &self,
        ctx: &Context,
        action: &str,
        func: &str,
        args: &[&str],
    ) -> Result<Value, String> {
        let response = self
            .client
            .post(self.chaincode_url(action)?)
            .header(SESSION_HEADER, ctx.session.as_str())
            .json(&Call { func, args })
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{}: {}", status, body));
        }

        // Empty bodies are how the chaincode says "nothing".
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| e.to_string())
    }
}

#[rocket::async_trait]
impl Ledger for HttpLedger {
    async fn connect(&self, identity: &Identity) -> Result<Context, LedgerError> {
        let connect_error = |reason: String| LedgerError::Connect {
            identity: identity.to_string(),
            reason,
        };

        let url = self.session_url(identity).map_err(connect_error)?;
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| connect_error(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(connect_error(format!(
                    "an identity for the user {} does not exist in the wallet",
                    identity.username
                )))
            }
            s if !s.is_success() => return Err(connect_error(s.to_string())),
            _ => {}
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| connect_error(e.to_string()))?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("acquired ledger context #{} for {}", generation, identity);

        Ok(Context {
            identity: identity.clone(),
            session: session.session,
            generation,
        })
    }

    async fn query(
        &self,
        ctx: &Context,
        func: &str,
        args: &[&str],
    ) -> Result<Snapshot, LedgerError> {
        tracing::debug!("query {}({:?}) as {}", func, args, ctx.identity);
        let value = self
            .call(ctx, "query", func, args)
            .await
            .map_err(|reason| LedgerError::Query {
                func: func.to_string(),
                reason,
            })?;
        Ok(Snapshot::new(func, value))
    }

    async fn invoke(
        &self,
        ctx: Context,
        func: &str,
        args: &[&str],
    ) -> Result<Receipt, LedgerError> {
        tracing::debug!("invoke {}({:?}) as {}", func, args, ctx.identity);
        let invoke_error = |reason: String| LedgerError::Invoke {
            func: func.to_string(),
            reason,
        };

        let value = self
            .call(&ctx, "invoke", func, args)
            .await
            .map_err(invoke_error)?;
        if value.is_null() {
            return Ok(Receipt::default());
        }
        serde_json::from_value(value).map_err(|e| invoke_error(e.to_string()))
    }
}
