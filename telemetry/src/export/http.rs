//! HTTP exporters.
//!
//! POST one JSON-encoded batch per export call to the configured collector
//! endpoint, with caller-supplied headers and optional gzip compression.

use crate::config::{Compression, ExporterConfig};
use crate::error::TelemetryError;
use crate::export::{Exporter, ExportError};
use crate::models::{LogRecord, SpanData};
use crate::resource::Resource;
use crate::wire::{LogExportRequest, SpanExportRequest};
use async_trait::async_trait;
use flate2::write::GzEncoder;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use std::io::Write;

/// Shared transport used by both HTTP exporters.
#[derive(Debug, Clone)]
struct HttpSender {
    client: reqwest::Client,
    endpoint: String,
    headers: HeaderMap,
    compression: Compression,
}

impl HttpSender {
    fn new(config: &ExporterConfig) -> Result<Self, TelemetryError> {
        let mut headers = HeaderMap::with_capacity(config.headers.len());
        for (name, value) in &config.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| TelemetryError::InvalidHeader {
                    name: name.clone(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| TelemetryError::InvalidHeader {
                    name: name.clone(),
                })?;
            headers.insert(header_name, header_value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            headers,
            compression: config.compression,
        })
    }

    fn encode_body(&self, body: Vec<u8>) -> Result<(Vec<u8>, bool), ExportError> {
        match self.compression {
            Compression::None => Ok((body, false)),
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(&body)?;
                Ok((encoder.finish()?, true))
            }
        }
    }

    async fn send(&self, payload: Vec<u8>) -> Result<(), ExportError> {
        let (body, compressed) = self.encode_body(payload)?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .header(CONTENT_TYPE, "application/json");
        if compressed {
            request = request.header(CONTENT_ENCODING, "gzip");
        }

        let response = request.body(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Exporter that POSTs log batches to a collector endpoint.
#[derive(Debug, Clone)]
pub struct HttpLogExporter {
    sender: HttpSender,
    resource: Resource,
}

impl HttpLogExporter {
    /// Creates a log exporter for the given transport configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured header is not a valid HTTP header
    /// or the HTTP client cannot be constructed.
    pub fn new(config: &ExporterConfig, resource: Resource) -> Result<Self, TelemetryError> {
        Ok(Self {
            sender: HttpSender::new(config)?,
            resource,
        })
    }
}

#[async_trait]
impl Exporter<LogRecord> for HttpLogExporter {
    async fn export(&self, batch: Vec<LogRecord>) -> Result<(), ExportError> {
        let payload = LogExportRequest::from_batch(&self.resource, &batch);
        self.sender.send(serde_json::to_vec(&payload)?).await
    }
}

/// Exporter that POSTs span batches to a collector endpoint.
#[derive(Debug, Clone)]
pub struct HttpSpanExporter {
    sender: HttpSender,
    resource: Resource,
}

impl HttpSpanExporter {
    /// Creates a span exporter for the given transport configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured header is not a valid HTTP header
    /// or the HTTP client cannot be constructed.
    pub fn new(config: &ExporterConfig, resource: Resource) -> Result<Self, TelemetryError> {
        Ok(Self {
            sender: HttpSender::new(config)?,
            resource,
        })
    }
}

#[async_trait]
impl Exporter<SpanData> for HttpSpanExporter {
    async fn export(&self, batch: Vec<SpanData>) -> Result<(), ExportError> {
        let payload = SpanExportRequest::from_batch(&self.resource, &batch);
        self.sender.send(serde_json::to_vec(&payload)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_invalid_header_is_rejected() {
        let config = ExporterConfig::new("http://collector/v1/logs")
            .with_header("bad header name", "value");
        let result = HttpLogExporter::new(&config, Resource::new("svc"));

        assert!(matches!(
            result,
            Err(TelemetryError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_gzip_encoding_roundtrip() {
        let config = ExporterConfig::new("http://collector/v1/logs")
            .with_compression(Compression::Gzip);
        let sender = HttpSender::new(&config).unwrap();

        let (body, compressed) = sender.encode_body(b"hello world".to_vec()).unwrap();
        assert!(compressed);

        let mut decoder = GzDecoder::new(body.as_slice());
        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, "hello world");
    }

    #[test]
    fn test_no_compression_passthrough() {
        let config = ExporterConfig::new("http://collector/v1/logs");
        let sender = HttpSender::new(&config).unwrap();

        let (body, compressed) = sender.encode_body(b"payload".to_vec()).unwrap();
        assert!(!compressed);
        assert_eq!(body, b"payload");
    }
}
