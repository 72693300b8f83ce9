use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

/// Transport seam for the discovery engine. The engine only ever needs the
/// numeric status code of a GET, so that is the whole interface; tests swap
/// in a canned implementation.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn fetch_status(&self, url: &str) -> Result<u16>;
}

/// Real transport backed by reqwest.
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    /// `timeout` of `None` leaves requests unbounded; a probe against a
    /// non-responding target will block its worker until the connection dies.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(HttpProber {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn fetch_status(&self, url: &str) -> Result<u16> {
        let resp = self.client.get(url).send().await?;
        Ok(resp.status().as_u16())
    }
}
