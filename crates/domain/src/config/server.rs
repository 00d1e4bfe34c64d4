use serde::{Deserialize, Serialize};

/// How pipeline failures are reported as HTTP status codes.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusMapping {
    /// Distinct 4xx/5xx codes per failure kind.
    #[default]
    Rfc8484,

    /// Only 404 and 504 are distinguished; every other failure is a 500.
    Collapsed,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// PEM certificate chain; together with `tls_key_path` enables HTTPS.
    #[serde(default)]
    pub tls_cert_path: Option<String>,

    #[serde(default)]
    pub tls_key_path: Option<String>,

    #[serde(default)]
    pub status_mapping: StatusMapping,
}

impl ServerConfig {
    pub fn tls_enabled(&self) -> bool {
        self.tls_cert_path.is_some() && self.tls_key_path.is_some()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            http_port: default_http_port(),
            tls_cert_path: None,
            tls_key_path: None,
            status_mapping: StatusMapping::default(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8053
}
