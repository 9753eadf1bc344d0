use chrono::{Datelike, NaiveDate};

use crate::error::ValidationError;
use crate::models::{LoginForm, RegistrationForm};

pub const MIN_REGISTRATION_AGE: u8 = 5;
pub const MAX_REGISTRATION_AGE: u8 = 18;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Age assumed for demo logins that do not match a registered account.
pub const DEMO_LOGIN_AGE: u8 = 12;

pub fn age_in_years(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Checks the registration form in the same order the product surfaces
/// notices: missing fields, then password confirmation, then password
/// strength, then the age gate. Returns the computed age on success.
pub fn validate_registration(
    form: &RegistrationForm,
    today: NaiveDate,
) -> Result<u8, ValidationError> {
    if form.name.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "name" });
    }
    if form.password.is_empty() {
        return Err(ValidationError::MissingField { field: "password" });
    }
    let Some(birth_date) = form.birth_date else {
        return Err(ValidationError::MissingField { field: "birth_date" });
    };

    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::WeakPassword {
            minimum: MIN_PASSWORD_LEN,
        });
    }

    let age = age_in_years(birth_date, today);
    if age < i32::from(MIN_REGISTRATION_AGE) || age > i32::from(MAX_REGISTRATION_AGE) {
        return Err(ValidationError::AgeOutOfRange { age });
    }

    Ok(age as u8)
}

pub fn validate_login(form: &LoginForm) -> Result<(), ValidationError> {
    if form.name.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "name" });
    }
    if form.password.is_empty() {
        return Err(ValidationError::MissingField { field: "password" });
    }
    Ok(())
}
