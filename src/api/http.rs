//! Production transport backed by a blocking `reqwest` client.
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use super::{Transport, TransportError};

const USER_AGENT: &str = "QuranAppDBGenerator/1.0";

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("HTTP client build failed")?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<String, TransportError> {
        let resp = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .map_err(classify)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        resp.text().map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(e.to_string())
            } else {
                TransportError::Body(e.to_string())
            }
        })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if let Some(status) = e.status() {
        TransportError::Status {
            status: status.as_u16(),
        }
    } else {
        TransportError::Connection(e.to_string())
    }
}
