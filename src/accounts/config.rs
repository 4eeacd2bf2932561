use std::time::Duration;

use super::types::ApiAddress;

pub const DEFAULT_API_ADDRESS: &str = "http://localhost:8080/user-manager-1.0-SNAPSHOT/api/accounts";
pub const DEFAULT_CLIENT_TIMEOUT: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_address: ApiAddress,
    pub timeout: Duration,
}

impl Config {
    pub fn new(api_address: ApiAddress, timeout: Duration) -> Self {
        let api_address = ApiAddress(api_address.0.trim_end_matches('/').to_string());
        Self {
            api_address,
            timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            ApiAddress(DEFAULT_API_ADDRESS.to_string()),
            Duration::from_secs(DEFAULT_CLIENT_TIMEOUT),
        )
    }
}
