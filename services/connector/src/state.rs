use std::sync::Arc;

use hmac_auth::{RequestValidator, SignatureLayer};

use crate::config::{ConnectorConfig, ConnectorSettings};
use crate::forwarder::{CloudForwarder, ForwarderError};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<ConnectorSettings>,
    pub forwarder: Arc<CloudForwarder>,
    /// Inbound validation, independent of the outbound signer
    pub signature: SignatureLayer,
}

impl AppState {
    pub fn from_config(config: &ConnectorConfig) -> Result<Self, ForwarderError> {
        let forwarder = CloudForwarder::new(&config.connector, &config.security.outbound_hmac)?;
        let validator = RequestValidator::from_config(&config.security.inbound_hmac);

        Ok(Self {
            settings: Arc::new(config.connector.clone()),
            forwarder: Arc::new(forwarder),
            signature: SignatureLayer::new(Arc::new(validator), config.connector.max_body_bytes),
        })
    }
}
