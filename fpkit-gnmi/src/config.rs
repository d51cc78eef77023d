//! gNMI target configuration

use serde::{Deserialize, Serialize};

use crate::gnmi::Encoding;

/// A gNMI target device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GnmiTarget {
    /// Name used in log lines
    pub name: String,

    /// gRPC endpoint (e.g., "192.168.1.1:9339")
    pub address: String,

    /// Authentication credentials
    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// TLS configuration
    #[serde(default)]
    pub tls: TlsConfig,

    /// gNMI encoding for Get and Subscribe requests
    #[serde(default)]
    pub encoding: GnmiEncoding,

    /// Per-RPC deadline in seconds for unary calls (Get, Set)
    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_secs: u64,
}

/// Authentication credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Username for authentication
    pub username: String,

    /// Password for authentication
    pub password: String,
}

/// TLS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Enable TLS
    #[serde(default)]
    pub enabled: bool,

    /// Server name to verify, when it differs from the address host
    #[serde(default)]
    pub domain: Option<String>,

    /// Path to CA certificate file
    #[serde(default)]
    pub ca_cert: Option<String>,

    /// Path to client certificate file
    #[serde(default)]
    pub client_cert: Option<String>,

    /// Path to client key file
    #[serde(default)]
    pub client_key: Option<String>,
}

/// gNMI encoding format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GnmiEncoding {
    /// JSON encoding
    Json,

    /// JSON with IETF formatting
    #[default]
    JsonIetf,

    /// Protocol Buffers
    Proto,

    /// ASCII text
    Ascii,
}

fn default_rpc_timeout() -> u64 {
    30
}

impl GnmiEncoding {
    /// Convert to gNMI proto encoding value
    pub fn to_proto(&self) -> i32 {
        let encoding = match self {
            GnmiEncoding::Json => Encoding::Json,
            GnmiEncoding::JsonIetf => Encoding::JsonIetf,
            GnmiEncoding::Proto => Encoding::Proto,
            GnmiEncoding::Ascii => Encoding::Ascii,
        };
        encoding as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_target() {
        let json = r#"{
            name: "dut",
            address: "192.168.1.1:9339",
            credentials: {
                username: "admin",
                password: "admin",
            },
            tls: {
                enabled: true,
                ca_cert: "/etc/ssl/dut-ca.pem",
            },
        }"#;

        let target: GnmiTarget = json5::from_str(json).unwrap();
        assert_eq!(target.name, "dut");
        assert_eq!(target.address, "192.168.1.1:9339");
        assert_eq!(target.credentials.unwrap().username, "admin");
        assert!(target.tls.enabled);
        assert_eq!(target.encoding, GnmiEncoding::JsonIetf);
        assert_eq!(target.rpc_timeout_secs, 30);
    }

    #[test]
    fn test_encoding_names() {
        let ietf: GnmiEncoding = serde_json::from_str(r#""JSON_IETF""#).unwrap();
        assert_eq!(ietf, GnmiEncoding::JsonIetf);

        let proto: GnmiEncoding = serde_json::from_str(r#""PROTO""#).unwrap();
        assert_eq!(proto, GnmiEncoding::Proto);
    }

    #[test]
    fn test_encoding_to_proto() {
        assert_eq!(GnmiEncoding::Json.to_proto(), 0);
        assert_eq!(GnmiEncoding::Proto.to_proto(), 2);
        assert_eq!(GnmiEncoding::Ascii.to_proto(), 3);
        assert_eq!(GnmiEncoding::JsonIetf.to_proto(), 4);
    }

    #[test]
    fn test_tls_config_defaults() {
        let tls = TlsConfig::default();
        assert!(!tls.enabled);
        assert!(tls.domain.is_none());
        assert!(tls.ca_cert.is_none());
    }
}
