//! gNMI (gRPC Network Management Interface) client for featureprofiles tests
//!
//! Connects to a gNMI-enabled device and exposes it through the
//! [`fpkit_common::Device`] trait: Get for state reads, Set for configuration
//! updates, ON_CHANGE subscriptions for awaits and SAMPLE subscriptions for
//! sample streams.

pub mod client;
pub mod config;
pub mod error;
pub mod path;
pub mod value;

// Include the generated protobuf code
pub mod gnmi {
    tonic::include_proto!("gnmi");
}

pub use client::GnmiClient;
pub use config::{Credentials, GnmiEncoding, GnmiTarget, TlsConfig};
pub use error::{GnmiError, Result};
