use anyhow::{Context, Result, bail};
use log::{debug, warn};
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;

use super::constants::{self, headers};
use super::retry::TransportFault;
use crate::config::Config;
use crate::survey::PageOutcome;

/// Asked whether to retry after a TLS failure; `Ok(false)` aborts the collection
pub type RetryPrompt = Box<dyn Fn(&str) -> Result<bool> + Send + Sync>;

/// Survey platform Web API client
pub struct SurveyClient {
    http_client: reqwest::Client,
    server: String,
    page_size: usize,
    credentials: Option<(String, Option<String>)>,
    retry_prompt: RetryPrompt,
}

impl SurveyClient {
    /// Build a client from `config`. TLS failures abort without prompting until
    /// [`with_retry_prompt`](Self::with_retry_prompt) installs a prompt.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("survey-export/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy) = &config.proxy {
            debug!("Using HTTPS proxy {}", proxy);
            builder = builder.proxy(
                reqwest::Proxy::https(proxy).with_context(|| format!("Invalid proxy URL: {}", proxy))?,
            );
        }

        let http_client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            server: config.server(),
            page_size: config.page_size,
            credentials: config
                .api_token
                .clone()
                .map(|token| (token, config.api_token_secret.clone())),
            retry_prompt: Box::new(|_| Ok(false)),
        })
    }

    pub fn with_retry_prompt(mut self, prompt: RetryPrompt) -> Self {
        self.retry_prompt = prompt;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// One page of the survey list
    pub async fn surveys_page(&self, page: u32) -> Result<PageOutcome<Value>> {
        self.fetch(&constants::surveys_page_url(&self.server, page, self.page_size)).await
    }

    /// One page of the responses to `survey_id`
    pub async fn responses_page(&self, survey_id: &str, page: u32) -> Result<PageOutcome<Value>> {
        self.fetch(&constants::responses_page_url(&self.server, survey_id, page, self.page_size))
            .await
    }

    /// GET `url` and return its JSON array body.
    ///
    /// TLS failures go to the retry prompt; every other failure is an error.
    pub async fn fetch(&self, url: &str) -> Result<PageOutcome<Value>> {
        loop {
            debug!("GET {}", url);

            let mut request = self.http_client.get(url).header(ACCEPT, headers::ACCEPT_JSON);
            if let Some((token, secret)) = &self.credentials {
                request = request.basic_auth(token, secret.as_ref());
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    if !TransportFault::from_reqwest_error(&err).should_prompt() {
                        return Err(err).with_context(|| format!("Request to {} failed", url));
                    }

                    warn!("TLS error requesting {}: {}", url, err);
                    let message = format!("SSL error, please refresh {}. Continue?", self.server);
                    if (self.retry_prompt)(&message)? {
                        continue;
                    }
                    return Ok(PageOutcome::Aborted);
                }
            };

            let status = response.status();
            debug!("Response status: {}", status);

            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
                bail!("Request to {} failed with {}: {}", url, status, error_text);
            }

            let body: Value = response
                .json()
                .await
                .with_context(|| format!("Response from {} is not valid JSON", url))?;

            return match body {
                Value::Array(items) => Ok(PageOutcome::Page(items)),
                other => bail!("Expected a JSON array from {}, got {}", url, json_kind(&other)),
            };
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
