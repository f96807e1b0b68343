use std::error::Error as _;

use async_trait::async_trait;
use bitcoin::Address;
use hyper::ext::ReasonPhrase;
use reqwest::{redirect, StatusCode, Url};
use tracing::{debug, info, trace};

use crate::config::ApiConfig;
use crate::error::BalanceError;

use super::UnspentSource;

const REDACTED: &str = "<redacted>";

/// Balance-query client for an address-indexed explorer API over HTTP(S).
///
/// Issues `GET <endpoint>?q=unspent&key=<key>&active=<address>`. Redirects are
/// never followed and only `200 OK` counts as success. Connections are closed
/// after every request rather than pooled.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpFetcher {
    pub fn new(config: ApiConfig) -> Result<Self, BalanceError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .redirect(redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .tcp_nodelay(true);
        if let Some(user_agent) = config.user_agent() {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|e| BalanceError::Config(format!("build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn query_url(&self, address: &Address, key: &str) -> Url {
        let mut url = self.config.endpoint().clone();
        url.query_pairs_mut()
            .append_pair("q", "unspent")
            .append_pair("key", key)
            .append_pair("active", &address.to_string());
        url
    }
}

#[async_trait]
impl UnspentSource for HttpFetcher {
    async fn fetch_unspent(&self, address: &Address) -> Result<String, BalanceError> {
        let url = self.query_url(address, self.config.api_key());
        let logged_url = self.query_url(address, REDACTED);
        debug!(url = %logged_url, "requesting unspent outputs");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();

        if status != StatusCode::OK {
            let message = status_message(&response);
            info!(url = %logged_url, %status, "got http error");
            return Err(BalanceError::HttpStatus {
                code: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        let body = String::from_utf8(bytes.to_vec()).map_err(|e| {
            BalanceError::Parse(format!("response body is not valid UTF-8: {e}"))
        })?;
        debug!(url = %logged_url, %status, body_len = body.len(), "fetched unspent outputs");
        trace!(body = %body, "unspent outputs body");

        Ok(body)
    }
}

/// The reason phrase from the status line. hyper only records it when it
/// differs from the standard phrase for the code.
fn status_message(response: &reqwest::Response) -> String {
    match response.extensions().get::<ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_owned(),
    }
}

/// Describe a transport failure without the request URL, which carries the
/// access key.
fn transport_error(err: reqwest::Error) -> BalanceError {
    let err = err.without_url();
    let mut message = if err.is_timeout() {
        format!("timed out: {err}")
    } else {
        err.to_string()
    };
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    BalanceError::NetworkIo(message)
}
