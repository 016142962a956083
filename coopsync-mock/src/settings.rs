use coopsync_server::configs::{Logger, Store};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mock {
    /// Hours of sample logs written before the live loop starts
    pub seed_hours: u32,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub store: Store,
    pub mock: Mock,
}

impl Settings {
    pub fn new() -> Result<Self, toml::de::Error> {
        toml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/default.toml"
        )))
    }
}
