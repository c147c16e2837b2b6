use std::collections::HashMap;

use serde::Deserialize;
use url::Url;

/// Telemetry configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Service name reported in resource attributes
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Additional resource attributes
    #[serde(default)]
    pub resource_attributes: HashMap<String, String>,
    /// Console log format
    #[serde(default)]
    pub log_format: LogFormat,
    /// Default OTLP exporter, shared by traces and metrics
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
    /// Trace-specific settings
    #[serde(default)]
    pub tracing: Option<TracingConfig>,
    /// Metrics-specific settings
    #[serde(default)]
    pub metrics: Option<MetricsConfig>,
}

impl TelemetryConfig {
    /// Exporter for traces, falling back to the shared one
    pub fn trace_exporter(&self) -> Option<&ExporterConfig> {
        self.tracing
            .as_ref()
            .and_then(|t| t.exporter.as_ref())
            .or(self.exporter.as_ref())
    }

    /// Exporter for metrics, falling back to the shared one
    pub fn metrics_exporter(&self) -> Option<&ExporterConfig> {
        self.metrics
            .as_ref()
            .and_then(|m| m.exporter.as_ref())
            .or(self.exporter.as_ref())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// OTLP exporter configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    /// OTLP endpoint URL
    pub endpoint: Url,
    /// Export protocol
    #[serde(default)]
    pub protocol: ExportProtocol,
    /// Export interval in seconds
    #[serde(default = "default_export_interval")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportProtocol {
    /// gRPC (default)
    #[default]
    Grpc,
    /// HTTP/protobuf
    HttpProto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TracingConfig {
    /// Sampling rate (0.0 to 1.0)
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
    /// Respect the parent span's sampling decision
    #[serde(default = "default_true")]
    pub parent_based: bool,
    /// Override the shared exporter
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Override the shared exporter
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
}

fn default_service_name() -> String {
    "launchpad".to_string()
}

const fn default_export_interval() -> u64 {
    30
}

#[allow(clippy::missing_const_for_fn)]
fn default_sampling_rate() -> f64 {
    1.0
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specific_exporter_overrides_shared() {
        let config: TelemetryConfig = toml::from_str(
            r#"
            log_format = "json"

            [exporter]
            endpoint = "http://collector:4317"

            [tracing.exporter]
            endpoint = "http://tempo:4318"
            protocol = "http_proto"
            "#,
        )
        .unwrap();

        assert_eq!(config.service_name, "launchpad");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.trace_exporter().unwrap().endpoint.as_str(), "http://tempo:4318/");
        assert_eq!(config.trace_exporter().unwrap().protocol, ExportProtocol::HttpProto);
        assert_eq!(config.metrics_exporter().unwrap().endpoint.as_str(), "http://collector:4317/");
    }

    #[test]
    fn no_exporters_by_default() {
        let config = TelemetryConfig::default();
        assert!(config.trace_exporter().is_none());
        assert!(config.metrics_exporter().is_none());
    }
}
