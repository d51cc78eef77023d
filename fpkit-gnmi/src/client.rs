//! gNMI client implementing the [`Device`] abstraction

use std::time::Duration;

use tonic::Request;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};
use tracing::{debug, info, warn};

use fpkit_common::{Device, Leaf, SampleStream, TelemetryValue, current_timestamp_millis};

use crate::config::GnmiTarget;
use crate::error::{GnmiError, Result};
use crate::gnmi::{
    self, GetRequest, Notification, SetRequest, SubscribeRequest, SubscriptionList,
    SubscriptionMode, g_nmi_client::GNmiClient, get_request::DataType,
    subscribe_response::Response,
};
use crate::path::{join_paths, parse_path, path_to_string};
use crate::value::{extract_value, telemetry_to_typed_value};

/// A connected gNMI client for one target device
#[derive(Debug, Clone)]
pub struct GnmiClient {
    target: GnmiTarget,
    client: GNmiClient<Channel>,
}

impl GnmiClient {
    /// Connect to the target
    pub async fn connect(target: GnmiTarget) -> Result<Self> {
        info!("Connecting to gNMI target {} at {}", target.name, target.address);
        let channel = Self::channel(&target).await?;
        Ok(Self {
            target,
            client: GNmiClient::new(channel),
        })
    }

    async fn channel(target: &GnmiTarget) -> Result<Channel> {
        let scheme = if target.tls.enabled { "https" } else { "http" };
        let uri = format!("{}://{}", scheme, target.address);

        let mut endpoint = Endpoint::from_shared(uri)?;

        if target.tls.enabled {
            let mut tls_config = ClientTlsConfig::new().with_native_roots();

            if let Some(ref domain) = target.tls.domain {
                tls_config = tls_config.domain_name(domain.clone());
            }

            if let Some(ref ca_cert_path) = target.tls.ca_cert {
                let ca_cert = tokio::fs::read(ca_cert_path).await?;
                tls_config = tls_config.ca_certificate(Certificate::from_pem(ca_cert));
            }

            if let (Some(cert_path), Some(key_path)) =
                (&target.tls.client_cert, &target.tls.client_key)
            {
                let cert = tokio::fs::read(cert_path).await?;
                let key = tokio::fs::read(key_path).await?;
                tls_config = tls_config.identity(Identity::from_pem(cert, key));
            }

            endpoint = endpoint.tls_config(tls_config)?;
        } else if target.credentials.is_some() {
            warn!("Sending credentials to {} without TLS", target.name);
        }

        Ok(endpoint.connect().await?)
    }

    /// Wrap a message in a request carrying credentials metadata
    fn request<T>(&self, message: T) -> Result<Request<T>> {
        let mut req = Request::new(message);
        if let Some(ref creds) = self.target.credentials {
            req.metadata_mut().insert("username", creds.username.parse()?);
            req.metadata_mut().insert("password", creds.password.parse()?);
        }
        Ok(req)
    }

    fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.target.rpc_timeout_secs)
    }

    /// Get the state value of one leaf
    pub async fn get_state(&self, path: &str) -> Result<Option<TelemetryValue>> {
        let get = GetRequest {
            path: vec![parse_path(path)?],
            r#type: DataType::State as i32,
            encoding: self.target.encoding.to_proto(),
            ..Default::default()
        };
        let mut req = self.request(get)?;
        req.set_timeout(self.rpc_timeout());

        let response = self.client.clone().get(req).await?.into_inner();
        if let Some(err) = response.error {
            return Err(GnmiError::Target {
                code: err.code,
                message: err.message,
            });
        }

        Ok(response
            .notification
            .iter()
            .flat_map(|n| n.update.iter())
            .find_map(extract_value))
    }

    /// Merge a value into the configuration
    pub async fn set_update(&self, path: &str, value: &TelemetryValue) -> Result<()> {
        let set = SetRequest {
            update: vec![gnmi::Update {
                path: Some(parse_path(path)?),
                val: Some(telemetry_to_typed_value(value)),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut req = self.request(set)?;
        req.set_timeout(self.rpc_timeout());

        let response = self.client.clone().set(req).await?.into_inner();
        if let Some(err) = response.message {
            return Err(GnmiError::Target {
                code: err.code,
                message: err.message,
            });
        }
        debug!("Set {} = {} on {}", path, value, self.target.name);
        Ok(())
    }

    /// Open a STREAM subscription for one path
    async fn subscribe(
        &self,
        path: &str,
        mode: SubscriptionMode,
        sample_interval: Duration,
    ) -> Result<tonic::Streaming<gnmi::SubscribeResponse>> {
        let subscription_list = SubscriptionList {
            subscription: vec![gnmi::Subscription {
                path: Some(parse_path(path)?),
                mode: mode as i32,
                sample_interval: sample_interval.as_nanos() as u64,
                ..Default::default()
            }],
            mode: gnmi::subscription_list::Mode::Stream as i32,
            encoding: self.target.encoding.to_proto(),
            ..Default::default()
        };

        let subscribe_request = SubscribeRequest {
            request: Some(gnmi::subscribe_request::Request::Subscribe(
                subscription_list,
            )),
        };

        let req = self.request(tokio_stream::once(subscribe_request))?;
        let response = self.client.clone().subscribe(req).await?;
        Ok(response.into_inner())
    }

    async fn wait_for(&self, path: &str, want: &TelemetryValue) -> Result<TelemetryValue> {
        let mut stream = self
            .subscribe(path, SubscriptionMode::OnChange, Duration::ZERO)
            .await?;

        while let Some(msg) = stream.message().await? {
            match msg.response {
                Some(Response::Update(notification)) => {
                    for (_, value) in notification_values(&notification) {
                        if let Some(value) = value {
                            debug!("{} reported {} = {}", self.target.name, path, value);
                            if values_match(&value, want) {
                                return Ok(value);
                            }
                        }
                    }
                }
                Some(Response::SyncResponse(_)) | None => {}
                Some(Response::Error(err)) => {
                    return Err(GnmiError::Target {
                        code: err.code,
                        message: err.message,
                    });
                }
            }
        }

        Err(GnmiError::StreamClosed(path.to_string()))
    }
}

/// Flatten a notification into `(path, value)` pairs; deletes yield `None`.
pub fn notification_values(notification: &Notification) -> Vec<(String, Option<TelemetryValue>)> {
    let prefix = notification.prefix.as_ref();
    let mut values: Vec<(String, Option<TelemetryValue>)> = notification
        .update
        .iter()
        .filter_map(|update| {
            let path = update.path.as_ref()?;
            Some((path_to_string(&join_paths(prefix, path)), extract_value(update)))
        })
        .collect();

    values.extend(
        notification
            .delete
            .iter()
            .map(|path| (path_to_string(&join_paths(prefix, path)), None)),
    );

    values
}

/// Enumerations may come back with a YANG module prefix.
fn values_match(got: &TelemetryValue, want: &TelemetryValue) -> bool {
    match (got, want) {
        (TelemetryValue::Text(got), TelemetryValue::Text(want)) => {
            got == want || got.rsplit_once(':').is_some_and(|(_, name)| name == want)
        }
        _ => got == want,
    }
}

impl Device for GnmiClient {
    fn name(&self) -> &str {
        &self.target.name
    }

    async fn get(&self, path: &str) -> fpkit_common::Result<TelemetryValue> {
        self.get_state(path)
            .await?
            .ok_or_else(|| fpkit_common::Error::NotFound {
                path: path.to_string(),
            })
    }

    async fn update(&self, path: &str, value: TelemetryValue) -> fpkit_common::Result<()> {
        Ok(self.set_update(path, &value).await?)
    }

    async fn await_value(
        &self,
        path: &str,
        want: &TelemetryValue,
        timeout: Duration,
    ) -> fpkit_common::Result<TelemetryValue> {
        match tokio::time::timeout(timeout, self.wait_for(path, want)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(fpkit_common::Error::AwaitTimeout {
                path: path.to_string(),
                want: want.to_string(),
                timeout,
            }),
        }
    }

    async fn sample<T: Leaf + Send + 'static>(
        &self,
        path: &str,
        interval: Duration,
    ) -> fpkit_common::Result<SampleStream<T>> {
        let mut stream = self
            .subscribe(path, SubscriptionMode::Sample, interval)
            .await?;
        let (sink, samples) = SampleStream::channel(path, interval);
        let target = self.target.name.clone();
        let leaf = path.to_string();

        let task = tokio::spawn(async move {
            loop {
                match stream.message().await {
                    Ok(Some(msg)) => {
                        if let Some(Response::Update(notification)) = msg.response {
                            let timestamp = if notification.timestamp > 0 {
                                notification.timestamp / 1_000_000 // ns to ms
                            } else {
                                current_timestamp_millis()
                            };
                            for (_, value) in notification_values(&notification) {
                                if !sink.send(timestamp, value) {
                                    return;
                                }
                            }
                        }
                    }
                    Ok(None) => {
                        info!("Sample subscription for {} on {} ended", leaf, target);
                        return;
                    }
                    Err(e) => {
                        warn!("Sample subscription for {} on {} failed: {}", leaf, target, e);
                        return;
                    }
                }
            }
        });

        Ok(samples.with_task(task))
    }
}
