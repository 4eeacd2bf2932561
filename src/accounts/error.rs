use thiserror::Error;

use super::{client::Error as ClientError, session::Intent, session::Screen, types::Login};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid account description: expected a JSON object")]
    NotAnObject,
    #[error("Invalid birthday: {0}; Should be in format YYYY-MM-DD")]
    Birthday(String),
    #[error("Invalid name: {0}; Should be a string")]
    Name(String),
    #[error("Invalid password; Should be a string")]
    Password,
    #[error("Invalid login: {0}; Should contain only letters, digits, and underscores.")]
    Login(String),
    #[error("Invalid sex: {0}; Acceptable values are Male and Female")]
    Sex(String),
}

impl ValidationError {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::NotAnObject => None,
            Self::Birthday(_) => Some("birthday"),
            Self::Name(_) => Some("name"),
            Self::Password => Some("password"),
            Self::Login(_) => Some("login"),
            Self::Sex(_) => Some("sex"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("User {login} not found!")]
    NotFound { login: String },
    #[error("Unable to load user {login} : {source}")]
    Lookup { login: Login, source: ClientError },
    #[error("User {login} is stored in an invalid form : {source}")]
    CorruptedAccount {
        login: Login,
        source: ValidationError,
    },
    #[error("Unable to save account : {0}")]
    Persistence(#[source] ClientError),
    #[error("Unable to delete user {login} : {source}")]
    Deletion { login: Login, source: ClientError },
    #[error("{intent} is not available on the {screen} screen")]
    Unavailable { intent: Intent, screen: Screen },
}

impl SessionError {
    /// Failures which leave the session on the `NotFound` screen.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Lookup { .. } | Self::CorruptedAccount { .. }
        )
    }
}
