use coopsync_api::models::{Actuator, ControlResponse};
use serde_json::json;

use crate::errors::StoreError;
use crate::store::SharedStore;

/// Manual switches for the coop actuators.
pub struct ControlService {
    store: SharedStore,
}

impl ControlService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn set(&self, actuator: Actuator, enabled: bool) -> Result<ControlResponse, StoreError> {
        self.store.set(actuator.path(), json!(enabled)).await?;
        tracing::info!("Set {:?} to {}", actuator, enabled);

        Ok(ControlResponse { actuator, enabled })
    }
}
