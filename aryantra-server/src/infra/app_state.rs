use std::{fmt, sync::Arc};

use aryantra_config::Config;

use crate::relay::{RelayError, UpstreamRelay};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relay: Arc<UpstreamRelay>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("upstream_host", &self.relay.upstream().host_str())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, RelayError> {
        let relay = UpstreamRelay::new(&config.relay)?;
        Ok(Self {
            config: Arc::new(config),
            relay: Arc::new(relay),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn relay(&self) -> &UpstreamRelay {
        &self.relay
    }
}
