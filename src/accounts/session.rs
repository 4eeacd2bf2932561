//! Screen state machine driving the account CRUD operations.
//!
//! The session keeps two copies of the account: the confirmed copy, as last
//! acknowledged by the server, and the working copy (draft) which form inputs
//! mutate. The anchor login addresses update and delete requests; it only
//! moves to a new login once the server has accepted the record under it.

use std::fmt;

use super::{
    account::{Account, AccountDraft, Field},
    client::{AccountApi, Error as ClientError},
    error::SessionError,
    types::Login,
    validator,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Entrance,
    LoggingIn,
    Creating,
    Loading,
    NotFound,
    Viewing,
    Editing,
}

impl Screen {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Entrance => "entrance",
            Self::LoggingIn => "login",
            Self::Creating => "sign up",
            Self::Loading => "loading",
            Self::NotFound => "not found",
            Self::Viewing => "account",
            Self::Editing => "edition",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    LogIn,
    SignUp,
    SubmitLogin,
    FinishLoading,
    Edit,
    Delete,
    Back,
    SetField,
    Save,
}

impl Intent {
    pub fn as_str(&self) -> &str {
        match self {
            Self::LogIn => "Log in",
            Self::SignUp => "Sign up",
            Self::SubmitLogin => "Login submission",
            Self::FinishLoading => "Loading",
            Self::Edit => "Edit",
            Self::Delete => "Delete",
            Self::Back => "Back",
            Self::SetField => "Field edition",
            Self::Save => "Save",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub struct AccountSession<A: AccountApi> {
    api: A,
    screen: Screen,
    draft: AccountDraft,
    confirmed: Option<Account>,
    anchor: Option<Login>,
    pending_login: Option<String>,
}

impl<A: AccountApi> AccountSession<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            screen: Screen::Entrance,
            draft: AccountDraft::default(),
            confirmed: None,
            anchor: None,
            pending_login: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn draft(&self) -> &AccountDraft {
        &self.draft
    }

    pub fn confirmed(&self) -> Option<&Account> {
        self.confirmed.as_ref()
    }

    pub fn anchor(&self) -> Option<&Login> {
        self.anchor.as_ref()
    }

    /// Login typed on the login screen, kept for the loading and not found screens.
    pub fn pending_login(&self) -> Option<&str> {
        self.pending_login.as_deref()
    }

    pub fn request_log_in(&mut self) -> Result<(), SessionError> {
        self.ensure_screen(Intent::LogIn, &[Screen::Entrance])?;
        self.go(Screen::LoggingIn);
        Ok(())
    }

    pub fn request_sign_up(&mut self) -> Result<(), SessionError> {
        self.ensure_screen(Intent::SignUp, &[Screen::Entrance])?;
        self.draft = AccountDraft::default();
        self.go(Screen::Creating);
        Ok(())
    }

    pub fn submit_login(&mut self, login: &str) -> Result<(), SessionError> {
        self.ensure_screen(Intent::SubmitLogin, &[Screen::LoggingIn])?;
        self.pending_login = Some(login.to_string());
        self.go(Screen::Loading);
        Ok(())
    }

    /// Fetch the account named on the login screen. Any failure lands on `NotFound`.
    pub fn finish_loading(&mut self) -> Result<(), SessionError> {
        self.ensure_screen(Intent::FinishLoading, &[Screen::Loading])?;
        let requested = self.pending_login.clone().unwrap_or_default();

        match self.fetch(&requested) {
            Ok(account) => {
                self.draft = AccountDraft::from(&account);
                self.anchor = Some(account.login.clone());
                self.confirmed = Some(account);
                self.go(Screen::Viewing);
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Unable to load account '{}' : {}", requested, error);
                self.go(Screen::NotFound);
                Err(error)
            }
        }
    }

    pub fn request_edit(&mut self) -> Result<(), SessionError> {
        self.ensure_screen(Intent::Edit, &[Screen::Viewing])?;
        self.go(Screen::Editing);
        Ok(())
    }

    pub fn request_delete(&mut self) -> Result<(), SessionError> {
        self.ensure_screen(Intent::Delete, &[Screen::Viewing])?;
        let anchor = self.current_anchor(Intent::Delete)?;

        if let Err(error) = self.api.remove(&anchor) {
            tracing::warn!("Unable to delete account '{}' : {}", anchor, error);
            return Err(SessionError::Deletion {
                login: anchor,
                source: error,
            });
        }

        tracing::info!("Account '{}' deleted", anchor);
        self.discard();
        self.go(Screen::Entrance);
        Ok(())
    }

    pub fn request_back(&mut self) -> Result<(), SessionError> {
        match self.screen {
            Screen::LoggingIn | Screen::NotFound | Screen::Viewing | Screen::Creating => {
                self.discard();
                self.go(Screen::Entrance);
            }
            Screen::Editing => {
                if let Some(confirmed) = &self.confirmed {
                    self.draft = AccountDraft::from(confirmed);
                }
                self.go(Screen::Viewing);
            }
            Screen::Entrance | Screen::Loading => return Err(self.unavailable(Intent::Back)),
        }
        Ok(())
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_screen(Intent::SetField, &[Screen::Creating, Screen::Editing])?;
        self.draft.set(field, value.into());
        Ok(())
    }

    /// Validate the working copy then create or update it on the server.
    ///
    /// On failure the screen is kept and the working copy still holds the
    /// user's edits, so they can be corrected and saved again.
    pub fn request_save(&mut self) -> Result<(), SessionError> {
        self.ensure_screen(Intent::Save, &[Screen::Creating, Screen::Editing])?;
        let account = validator::validate(&mut self.draft)?;

        if self.screen == Screen::Creating {
            self.api
                .create(&account)
                .map_err(SessionError::Persistence)?;
            tracing::info!("Account '{}' created", account.login);
        } else {
            let anchor = self.current_anchor(Intent::Save)?;
            self.api
                .update(&anchor, &account)
                .map_err(SessionError::Persistence)?;
            tracing::info!("Account '{}' updated as '{}'", anchor, account.login);
        }

        self.anchor = Some(account.login.clone());
        self.confirmed = Some(account);
        self.go(Screen::Viewing);
        Ok(())
    }

    fn fetch(&self, requested: &str) -> Result<Account, SessionError> {
        // A malformed login cannot name a stored account.
        let login = validator::check_login(requested).map_err(|_| SessionError::NotFound {
            login: requested.to_string(),
        })?;

        let mut value = self.api.get(&login).map_err(|error| match error {
            ClientError::NotFound(_) => SessionError::NotFound {
                login: requested.to_string(),
            },
            error => SessionError::Lookup {
                login: login.clone(),
                source: error,
            },
        })?;

        validator::validate_json(&mut value)
            .map_err(|error| SessionError::CorruptedAccount { login, source: error })
    }

    fn current_anchor(&self, intent: Intent) -> Result<Login, SessionError> {
        self.anchor.clone().ok_or_else(|| self.unavailable(intent))
    }

    fn discard(&mut self) {
        self.draft = AccountDraft::default();
        self.confirmed = None;
        self.anchor = None;
        self.pending_login = None;
    }

    fn ensure_screen(&self, intent: Intent, screens: &[Screen]) -> Result<(), SessionError> {
        if screens.contains(&self.screen) {
            Ok(())
        } else {
            Err(self.unavailable(intent))
        }
    }

    fn unavailable(&self, intent: Intent) -> SessionError {
        SessionError::Unavailable {
            intent,
            screen: self.screen,
        }
    }

    fn go(&mut self, screen: Screen) {
        tracing::debug!("Screen {} -> {}", self.screen, screen);
        self.screen = screen;
    }
}
