use std::time::Duration;

use pyo3::{create_exception, exceptions::PyValueError, prelude::*, types::PyDict};

use crate::accounts::{
    account::Field,
    client::Client,
    config::{Config, DEFAULT_CLIENT_TIMEOUT},
    error::SessionError,
    session::AccountSession,
    types::ApiAddress,
};

create_exception!(error, AccountError, pyo3::exceptions::PyException);
create_exception!(error, AccountValidationError, AccountError);
create_exception!(error, AccountNotFoundError, AccountError);

impl From<SessionError> for PyErr {
    fn from(error: SessionError) -> Self {
        match &error {
            SessionError::Validation(_) => AccountValidationError::new_err(error.to_string()),
            SessionError::NotFound { .. }
            | SessionError::Lookup { .. }
            | SessionError::CorruptedAccount { .. } => {
                AccountNotFoundError::new_err(error.to_string())
            }
            _ => AccountError::new_err(error.to_string()),
        }
    }
}

#[pyclass(name = "Config")]
#[derive(Clone)]
pub struct PyConfig(Config);

#[pymethods]
impl PyConfig {
    #[new]
    pub fn new(api_address: String, timeout: Option<u64>) -> Self {
        Self(Config::new(
            ApiAddress(api_address),
            Duration::from_secs(timeout.unwrap_or(DEFAULT_CLIENT_TIMEOUT)),
        ))
    }
}

#[pyclass(name = "Session")]
pub struct PySession {
    session: AccountSession<Client>,
}

#[pymethods]
impl PySession {
    #[new]
    pub fn new(config: PyConfig) -> Self {
        Self {
            session: AccountSession::new(Client::new(config.0)),
        }
    }

    pub fn screen(&self) -> String {
        format!("{:?}", self.session.screen())
    }

    pub fn anchor(&self) -> Option<String> {
        self.session.anchor().map(|login| login.to_string())
    }

    pub fn draft<'py>(&self, py: Python<'py>) -> PyResult<&'py PyDict> {
        let draft = PyDict::new(py);
        for field in Field::ALL {
            draft.set_item(field.as_str(), self.session.draft().get(field))?;
        }
        Ok(draft)
    }

    /// Last confirmed account, `None` until one is viewed.
    pub fn account<'py>(&self, py: Python<'py>) -> PyResult<Option<&'py PyDict>> {
        let account = match self.session.confirmed() {
            Some(account) => account,
            None => return Ok(None),
        };
        let fields = PyDict::new(py);
        for (field, value) in account.fields() {
            fields.set_item(field.as_str(), value)?;
        }
        Ok(Some(fields))
    }

    pub fn log_in(&mut self) -> PyResult<()> {
        Ok(self.session.request_log_in()?)
    }

    pub fn sign_up(&mut self) -> PyResult<()> {
        Ok(self.session.request_sign_up()?)
    }

    /// Submit the login and fetch the matching account.
    pub fn submit_login(&mut self, login: &str) -> PyResult<()> {
        self.session.submit_login(login)?;
        Ok(self.session.finish_loading()?)
    }

    pub fn edit(&mut self) -> PyResult<()> {
        Ok(self.session.request_edit()?)
    }

    pub fn delete(&mut self) -> PyResult<()> {
        Ok(self.session.request_delete()?)
    }

    pub fn back(&mut self) -> PyResult<()> {
        Ok(self.session.request_back()?)
    }

    pub fn set_field(&mut self, field: &str, value: String) -> PyResult<()> {
        let field = match Field::from_str(field) {
            Some(field) => field,
            None => return Err(PyValueError::new_err(format!("Unknown field '{}'", field))),
        };
        Ok(self.session.set_field(field, value)?)
    }

    pub fn save(&mut self) -> PyResult<()> {
        Ok(self.session.request_save()?)
    }
}

#[pymodule]
fn user_manager(py: Python, root_module: &PyModule) -> PyResult<()> {
    root_module.add("AccountError", py.get_type::<AccountError>())?;
    root_module.add(
        "AccountValidationError",
        py.get_type::<AccountValidationError>(),
    )?;
    root_module.add("AccountNotFoundError", py.get_type::<AccountNotFoundError>())?;
    root_module.add_class::<PyConfig>()?;
    root_module.add_class::<PySession>()?;

    Ok(())
}
