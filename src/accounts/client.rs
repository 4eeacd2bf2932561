use reqwest::{Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

use super::{account::Account, config::Config, types::Login};

/// The remote account storage, addressed by login.
pub trait AccountApi {
    fn create(&self, account: &Account) -> Result<(), Error>;
    fn get(&self, login: &Login) -> Result<Value, Error>;
    /// Update the record known as `login`. The body login may differ (rename).
    fn update(&self, login: &Login, account: &Account) -> Result<(), Error>;
    fn remove(&self, login: &Login) -> Result<(), Error>;
}

#[derive(Clone)]
pub struct Client {
    config: Config,
}

impl Client {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn client(&self) -> Result<reqwest::blocking::Client, reqwest::Error> {
        reqwest::blocking::Client::builder()
            .timeout(self.config.timeout)
            .build()
    }

    fn collection_url(&self) -> String {
        format!("{}/", self.config.api_address.0)
    }

    fn account_url(&self, login: &Login) -> String {
        format!("{}/{}", self.config.api_address.0, login)
    }

    fn send(
        &self,
        method: Method,
        url: String,
        body: Option<&Account>,
        login: Option<&Login>,
    ) -> Result<reqwest::blocking::Response, Error> {
        tracing::debug!("Sending {} {}", method, url);
        let mut request = self.client()?.request(method, url);
        if let Some(account) = body {
            request = request.json(account);
        }
        let response = request.send()?;

        if response.status() == StatusCode::NOT_FOUND {
            if let Some(login) = login {
                return Err(Error::NotFound(login.to_string()));
            }
        }
        Ok(response.error_for_status()?)
    }
}

impl AccountApi for Client {
    fn create(&self, account: &Account) -> Result<(), Error> {
        self.send(Method::POST, self.collection_url(), Some(account), None)?;
        Ok(())
    }

    fn get(&self, login: &Login) -> Result<Value, Error> {
        let value = self
            .send(Method::GET, self.account_url(login), None, Some(login))?
            .json()?;
        Ok(value)
    }

    fn update(&self, login: &Login, account: &Account) -> Result<(), Error> {
        self.send(Method::PUT, self.account_url(login), Some(account), Some(login))?;
        Ok(())
    }

    fn remove(&self, login: &Login) -> Result<(), Error> {
        self.send(Method::DELETE, self.account_url(login), None, Some(login))?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Account {0} does not exist")]
    NotFound(String),
    #[error("Request rejected with status {0}")]
    Rejected(StatusCode),
    #[error("Unexpected error : {0}")]
    UnexpectedError(String),
    #[error("Structure error : {0}")]
    StructureError(String),
    #[error("Network error : {0}")]
    NetWorkError(reqwest::Error),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::NetWorkError(error)
        } else if let Some(status) = error.status() {
            Self::Rejected(status)
        } else if error.is_decode() {
            Self::StructureError(format!("{}", error))
        } else {
            Self::UnexpectedError(format!("{}", error))
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::StructureError(format!("{}", error))
    }
}
