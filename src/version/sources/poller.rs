//! Version-check endpoint poller

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::EndpointSet;
use crate::event::Event;
use crate::schema::ResponseSchema;
use crate::version::dotted::{DottedVersion, normalize};
use crate::version::error::PollError;
use crate::version::source::{VersionReport, VersionSource};

/// Polls each version-check endpoint in turn and validates its answer
pub struct HttpVersionPoller {
    client: Client,
    endpoints: EndpointSet,
    schema: ResponseSchema,
    version_field: String,
}

impl HttpVersionPoller {
    pub fn new(
        client: Client,
        endpoints: EndpointSet,
        schema: ResponseSchema,
        version_field: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoints,
            schema,
            version_field: version_field.into(),
        }
    }

    /// Fetch one endpoint and return its normalized version
    async fn poll_endpoint(&self, url: &str) -> Result<String, PollError> {
        debug!("Polling version endpoint: {}", url);

        // The status code is not checked: an error page simply fails to decode or validate
        let body = self.client.get(url).send().await?.text().await?;
        let document: Value = serde_json::from_str(&body)?;
        self.schema.validate(&document)?;

        match document.get(&self.version_field) {
            Some(Value::String(version)) if DottedVersion::parse(version).is_ok() => {
                Ok(normalize(version).to_string())
            }
            other => Err(PollError::NotAVersion {
                field: self.version_field.clone(),
                value: other.map_or_else(|| "nothing".to_string(), Value::to_string),
            }),
        }
    }
}

fn failure_event(endpoint: &str, url: &str, error: PollError) -> Event {
    let endpoint = endpoint.to_string();
    let url = url.to_string();
    let reason = error.to_string();
    match error {
        PollError::Network(_) => Event::RequestFailed {
            endpoint,
            url,
            reason,
        },
        PollError::NotDecodable(_) => Event::ResponseNotDecodable {
            endpoint,
            url,
            reason,
        },
        PollError::NotValid(_) | PollError::NotAVersion { .. } => Event::ResponseNotValid {
            endpoint,
            url,
            reason,
        },
    }
}

#[async_trait::async_trait]
impl VersionSource for HttpVersionPoller {
    async fn poll(&self) -> VersionReport {
        let mut report = VersionReport::default();

        for (name, url) in &self.endpoints {
            report.attempted.push(name.clone());

            match self.poll_endpoint(url).await {
                Ok(version) => {
                    Event::VersionDecoded {
                        endpoint: name.clone(),
                        url: url.clone(),
                        version: version.clone(),
                    }
                    .emit();
                    report.versions.insert(name.clone(), version);
                }
                Err(e) => failure_event(name, url, e).emit(),
            }
        }

        report
    }
}
