use chrono::NaiveDate;
use serde_derive::Serialize;

use super::types::{Login, Password, Sex};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A record which passed validation. Field order matches the wire format.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub login: Login,
    pub name: String,
    pub sex: Sex,
    pub birthday: NaiveDate,
    pub password: Password,
}

impl Account {
    pub fn birthday_str(&self) -> String {
        self.birthday.format(DATE_FORMAT).to_string()
    }

    /// Field values as shown to the user, in form order.
    pub fn fields(&self) -> [(Field, String); 5] {
        [
            (Field::Name, self.name.clone()),
            (Field::Birthday, self.birthday_str()),
            (Field::Sex, self.sex.as_str().to_string()),
            (Field::Login, self.login.as_str().to_string()),
            (Field::Password, self.password.0.clone()),
        ]
    }
}

/// Working copy of an account, holding form values exactly as typed.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AccountDraft {
    pub name: String,
    pub birthday: String,
    pub sex: String,
    pub login: String,
    pub password: String,
}

impl Default for AccountDraft {
    fn default() -> Self {
        Self {
            name: "".to_string(),
            birthday: "0001-01-01".to_string(),
            sex: Sex::Male.as_str().to_string(),
            login: "".to_string(),
            password: "".to_string(),
        }
    }
}

impl AccountDraft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Birthday => &self.birthday,
            Field::Sex => &self.sex,
            Field::Login => &self.login,
            Field::Password => &self.password,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Birthday => self.birthday = value,
            Field::Sex => self.sex = value,
            Field::Login => self.login = value,
            Field::Password => self.password = value,
        }
    }
}

impl From<&Account> for AccountDraft {
    fn from(account: &Account) -> Self {
        Self {
            name: account.name.clone(),
            birthday: account.birthday_str(),
            sex: account.sex.as_str().to_string(),
            login: account.login.as_str().to_string(),
            password: account.password.0.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Birthday,
    Sex,
    Login,
    Password,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Birthday,
        Field::Sex,
        Field::Login,
        Field::Password,
    ];

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "birthday" => Some(Self::Birthday),
            "sex" => Some(Self::Sex),
            "login" => Some(Self::Login),
            "password" => Some(Self::Password),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Name => "name",
            Self::Birthday => "birthday",
            Self::Sex => "sex",
            Self::Login => "login",
            Self::Password => "password",
        }
    }
}
