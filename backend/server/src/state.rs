use std::sync::Arc;

use reqwest::Client;

use super::config::{Config, Credentials, EnvCredentials};

pub struct AppState {
    pub config: Config,
    pub http: Client,
    pub credentials: Box<dyn Credentials>,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let credentials = EnvCredentials::new(config.api_key_name.clone());

        Self::with_credentials(config, credentials)
    }

    pub fn with_credentials(config: Config, credentials: impl Credentials + 'static) -> Arc<Self> {
        Arc::new(Self {
            config,
            http: Client::new(),
            credentials: Box::new(credentials),
        })
    }
}
