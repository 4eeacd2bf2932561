//! Account validation.
//!
//! Checks run in a fixed order (birthday, name, password, login, sex) and stop
//! at the first failure. A successful check rewrites the birthday of the input
//! to `YYYY-MM-DD`, so validating is a normalize-and-check step.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{
    account::{Account, AccountDraft, DATE_FORMAT},
    error::ValidationError,
    types::{Login, Password, Sex},
};

static LOGIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").expect("login pattern is a valid regex")
});

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn validate(draft: &mut AccountDraft) -> Result<Account, ValidationError> {
    let birthday = check_birthday(&draft.birthday)?;
    draft.birthday = birthday.format(DATE_FORMAT).to_string();
    let login = check_login(&draft.login)?;
    let sex = check_sex(&draft.sex)?;

    Ok(Account {
        login,
        name: draft.name.clone(),
        sex,
        birthday,
        password: Password(draft.password.clone()),
    })
}

/// Validates an account description received as JSON, as the server sends it.
pub fn validate_json(value: &mut Value) -> Result<Account, ValidationError> {
    let object = value.as_object_mut().ok_or(ValidationError::NotAnObject)?;

    let birthday = match object.get("birthday") {
        Some(Value::String(raw)) => check_birthday(raw)?,
        other => return Err(ValidationError::Birthday(describe(other))),
    };
    object.insert(
        "birthday".to_string(),
        Value::String(birthday.format(DATE_FORMAT).to_string()),
    );

    let name = match object.get("name") {
        Some(Value::String(name)) => name.clone(),
        other => return Err(ValidationError::Name(describe(other))),
    };
    let password = match object.get("password") {
        Some(Value::String(password)) => Password(password.clone()),
        _ => return Err(ValidationError::Password),
    };
    let login = match object.get("login") {
        Some(Value::String(login)) => check_login(login)?,
        other => return Err(ValidationError::Login(describe(other))),
    };
    let sex = match object.get("sex") {
        Some(Value::String(sex)) => check_sex(sex)?,
        other => return Err(ValidationError::Sex(describe(other))),
    };

    Ok(Account {
        login,
        name,
        sex,
        birthday,
        password,
    })
}

pub fn check_login(raw: &str) -> Result<Login, ValidationError> {
    if LOGIN_PATTERN.is_match(raw) {
        Ok(Login(raw.to_string()))
    } else {
        Err(ValidationError::Login(raw.to_string()))
    }
}

fn check_sex(raw: &str) -> Result<Sex, ValidationError> {
    Sex::from_str(raw).ok_or_else(|| ValidationError::Sex(raw.to_string()))
}

fn check_birthday(raw: &str) -> Result<NaiveDate, ValidationError> {
    match parse_date(raw) {
        // Years outside 0..=9999 would be written with a sign or a fifth digit.
        Some(date) if (0..=9999).contains(&date.year()) => Ok(date),
        _ => Err(ValidationError::Birthday(raw.to_string())),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        return Some(date_time.with_timezone(&Utc).date_naive());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(date_time.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    None
}

fn describe(value: Option<&Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "undefined".to_string(),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn valid_draft() -> AccountDraft {
        AccountDraft {
            name: "Anonymous".to_string(),
            birthday: "2000-01-01".to_string(),
            sex: "Male".to_string(),
            login: "user1234".to_string(),
            password: "qwerty".to_string(),
        }
    }

    fn valid_json() -> Value {
        json!({
            "name": "Anonymous",
            "login": "user1234",
            "password": "qwerty",
            "sex": "Male",
            "birthday": "2000-01-01",
        })
    }

    #[test]
    fn validate_ok() {
        let mut draft = valid_draft();
        let account = validate(&mut draft).unwrap();
        assert_eq!(account.name, "Anonymous");
        assert_eq!(account.login.as_str(), "user1234");
        assert_eq!(account.password, Password("qwerty".to_string()));
        assert_eq!(account.sex, Sex::Male);
        assert_eq!(account.birthday, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    }

    #[test]
    fn validate_normalizes_birthday_in_place() {
        let mut draft = valid_draft();
        draft.birthday = "2020-1-5".to_string();
        validate(&mut draft).unwrap();
        assert_eq!(draft.birthday, "2020-01-05");
    }

    #[test]
    fn validate_truncates_time_of_day() {
        for raw in [
            "2020-01-05T23:59:59",
            "2020-01-05 08:30",
            "2020-01-05T10:00:00.250",
            "2020-01-05T10:00:00Z",
            "2020-01-05T10:00:00+02:00",
        ] {
            let mut draft = valid_draft();
            draft.birthday = raw.to_string();
            validate(&mut draft).unwrap();
            assert_eq!(draft.birthday, "2020-01-05", "input {}", raw);
        }
    }

    #[test]
    fn rfc3339_offset_is_converted_to_utc_before_truncation() {
        let mut draft = valid_draft();
        draft.birthday = "2020-01-05T01:00:00+03:00".to_string();
        validate(&mut draft).unwrap();
        assert_eq!(draft.birthday, "2020-01-04");
    }

    #[test]
    fn validate_accepts_other_separators() {
        for raw in ["2020/01/05", "2020.1.5", " 2020-01-05 "] {
            let mut draft = valid_draft();
            draft.birthday = raw.to_string();
            validate(&mut draft).unwrap();
            assert_eq!(draft.birthday, "2020-01-05", "input {}", raw);
        }
    }

    #[test]
    fn validate_err_birthday() {
        for raw in ["1.1.2000", "", "yesterday", "2020-02-30", "2020-13-01"] {
            let mut draft = valid_draft();
            draft.birthday = raw.to_string();
            assert_eq!(
                validate(&mut draft),
                Err(ValidationError::Birthday(raw.to_string()))
            );
            assert_eq!(draft.birthday, raw);
        }
    }

    #[test]
    fn validate_err_birthday_year_out_of_range() {
        for raw in ["+10000-01-01", "-0001-01-01", "10000-01-01T00:00:00"] {
            let mut draft = valid_draft();
            draft.birthday = raw.to_string();
            assert_eq!(
                validate(&mut draft),
                Err(ValidationError::Birthday(raw.to_string()))
            );
            assert_eq!(draft.birthday, raw);
        }

        let mut value = valid_json();
        value["birthday"] = json!("-0001-01-01");
        assert_eq!(
            validate_json(&mut value),
            Err(ValidationError::Birthday("-0001-01-01".to_string()))
        );
    }

    #[test]
    fn validate_accepts_four_digit_year_bounds() {
        for (raw, expected) in [("0000-01-01", "0000-01-01"), ("9999-12-31", "9999-12-31")] {
            let mut draft = valid_draft();
            draft.birthday = raw.to_string();
            validate(&mut draft).unwrap();
            assert_eq!(draft.birthday, expected);
        }
    }

    #[test]
    fn validate_err_login() {
        for raw in ["lo g in", "bad login!", "émile", "a-b", ""] {
            let mut draft = valid_draft();
            draft.login = raw.to_string();
            assert_eq!(
                validate(&mut draft),
                Err(ValidationError::Login(raw.to_string()))
            );
        }
    }

    #[test]
    fn validate_err_sex() {
        for raw in ["male", "FEMALE", "Undefined", "", "Male "] {
            let mut draft = valid_draft();
            draft.sex = raw.to_string();
            assert_eq!(
                validate(&mut draft),
                Err(ValidationError::Sex(raw.to_string()))
            );
        }
    }

    #[test]
    fn birthday_is_checked_first() {
        let mut draft = valid_draft();
        draft.birthday = "never".to_string();
        draft.login = "bad login".to_string();
        draft.sex = "other".to_string();
        assert_eq!(validate(&mut draft).unwrap_err().field(), Some("birthday"));
    }

    #[test]
    fn login_is_checked_before_sex() {
        let mut draft = valid_draft();
        draft.login = "bad login".to_string();
        draft.sex = "other".to_string();
        assert_eq!(validate(&mut draft).unwrap_err().field(), Some("login"));
    }

    #[test]
    fn validate_json_ok_and_normalized() {
        let mut value = valid_json();
        value["birthday"] = json!("2000-1-1T12:00:00");
        let account = validate_json(&mut value).unwrap();
        assert_eq!(account.login.as_str(), "user1234");
        assert_eq!(value["birthday"], json!("2000-01-01"));
    }

    #[test]
    fn validate_json_err_not_an_object() {
        assert_eq!(
            validate_json(&mut json!("user1234")),
            Err(ValidationError::NotAnObject)
        );
    }

    #[test]
    fn validate_json_err_non_string_fields() {
        let mut value = valid_json();
        value["name"] = json!(42);
        assert_eq!(
            validate_json(&mut value),
            Err(ValidationError::Name("42".to_string()))
        );

        let mut value = valid_json();
        value["password"] = json!(null);
        assert_eq!(validate_json(&mut value), Err(ValidationError::Password));

        let mut value = valid_json();
        value.as_object_mut().unwrap().remove("login");
        assert_eq!(
            validate_json(&mut value),
            Err(ValidationError::Login("undefined".to_string()))
        );

        let mut value = valid_json();
        value["birthday"] = json!(20000101);
        assert_eq!(
            validate_json(&mut value),
            Err(ValidationError::Birthday("20000101".to_string()))
        );
    }

    #[test]
    fn validate_json_checks_in_order() {
        let mut value = json!({});
        assert_eq!(validate_json(&mut value).unwrap_err().field(), Some("birthday"));

        let mut value = json!({"birthday": "2000-01-01"});
        assert_eq!(validate_json(&mut value).unwrap_err().field(), Some("name"));

        let mut value = json!({"birthday": "2000-01-01", "name": ""});
        assert_eq!(validate_json(&mut value).unwrap_err().field(), Some("password"));

        let mut value = json!({"birthday": "2000-01-01", "name": "", "password": ""});
        assert_eq!(validate_json(&mut value).unwrap_err().field(), Some("login"));

        let mut value =
            json!({"birthday": "2000-01-01", "name": "", "password": "", "login": "a"});
        assert_eq!(validate_json(&mut value).unwrap_err().field(), Some("sex"));
    }

    proptest! {
        #[test]
        fn padded_and_unpadded_dates_normalize_identically(
            year in 1i32..=9999,
            month in 1u32..=12,
            day in 1u32..=28,
        ) {
            let mut padded = valid_draft();
            padded.birthday = format!("{:04}-{:02}-{:02}", year, month, day);
            let mut unpadded = valid_draft();
            unpadded.birthday = format!("{}-{}-{}", year, month, day);

            let expected = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            prop_assert_eq!(validate(&mut padded).unwrap().birthday, expected);
            prop_assert_eq!(validate(&mut unpadded).unwrap().birthday, expected);
            prop_assert_eq!(&padded.birthday, &unpadded.birthday);
            prop_assert_eq!(padded.birthday, expected.format(DATE_FORMAT).to_string());
        }

        #[test]
        fn login_with_foreign_character_is_rejected(
            prefix in "[A-Za-z0-9_]{0,8}",
            foreign in "[^A-Za-z0-9_]",
            suffix in "[A-Za-z0-9_]{0,8}",
        ) {
            let mut draft = valid_draft();
            draft.login = format!("{}{}{}", prefix, foreign, suffix);
            let error = validate(&mut draft).unwrap_err();
            prop_assert_eq!(error, ValidationError::Login(draft.login.clone()));
        }

        #[test]
        fn login_of_word_characters_is_accepted(login in "[A-Za-z0-9_]{1,32}") {
            let mut draft = valid_draft();
            draft.login = login.clone();
            let account = validate(&mut draft).unwrap();
            prop_assert_eq!(account.login.as_str(), login.as_str());
        }

        #[test]
        fn only_exact_sex_literals_are_accepted(sex in "\\PC{0,8}") {
            let mut draft = valid_draft();
            draft.sex = sex.clone();
            let accepted = validate(&mut draft).is_ok();
            prop_assert_eq!(accepted, sex == "Male" || sex == "Female");
        }

        #[test]
        fn validation_is_idempotent(
            name in "\\PC{0,16}",
            password in "\\PC{0,16}",
            login in "[A-Za-z0-9_]{1,16}",
            female in any::<bool>(),
            days in 0i64..3_000_000,
        ) {
            let birthday = NaiveDate::from_ymd_opt(1, 1, 1).unwrap() + chrono::Duration::days(days);
            let mut draft = AccountDraft {
                name,
                birthday: birthday.format(DATE_FORMAT).to_string(),
                sex: if female { "Female" } else { "Male" }.to_string(),
                login,
                password,
            };
            let first = validate(&mut draft).unwrap();
            let normalized = draft.clone();
            let second = validate(&mut draft).unwrap();
            prop_assert_eq!(first, second);
            prop_assert_eq!(draft, normalized);
        }
    }
}
