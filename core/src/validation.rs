//! Client-side form checks.
//!
//! A form that fails validation never reaches the network. Errors are keyed by
//! field name so the host can render them inline.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::types::{
    Contact, CreateBooking, CreateReview, LoginRequest, PaymentMethod, RegisterRequest, Role,
};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const OTP_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+?88)?01[3-9]\d{8}$").expect("phone pattern compiles"));

/// Field name to message, ordered by field for stable rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", self.first_message())]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records the first error per field; later ones are dropped.
    pub fn add(&mut self, field: &str, message: &str) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Message of the first field in order, for a single-line summary.
    pub fn first_message(&self) -> &str {
        self.fields.values().next().map_or("invalid input", String::as_str)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub fn is_valid_otp(code: &str) -> bool {
    code.len() == OTP_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_valid_rating(rating: u8) -> bool {
    (1..=5).contains(&rating)
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Please enter a valid email address");
    }
}

fn check_phone(errors: &mut ValidationErrors, field: &str, phone: &str) {
    if phone.trim().is_empty() {
        errors.add(field, "Phone number is required");
    } else if !is_valid_phone(phone) {
        errors.add(field, "Please enter a valid phone number");
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// Decodes from the camelCase JSON a native shell sends.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if !is_valid_password(&self.password) {
            errors.add("password", "Password must be at least 6 characters");
        }
        errors.into_result()?;
        Ok(LoginRequest {
            email: self.email.trim().to_lowercase(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        check_email(&mut errors, &self.email);
        check_phone(&mut errors, "phone", &self.phone);
        if !is_valid_password(&self.password) {
            errors.add("password", "Password must be at least 6 characters");
        }
        if self.password != self.confirm_password {
            errors.add("confirmPassword", "Passwords do not match");
        }
        // Admin accounts are provisioned server-side only.
        if self.role == Role::Admin {
            errors.add("role", "Please choose student or owner");
        }
        errors.into_result()?;
        Ok(RegisterRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BookingForm {
    pub mess_id: String,
    pub check_in_date: Option<NaiveDate>,
    pub tenant_name: String,
    pub tenant_phone: String,
    pub emergency_name: String,
    pub emergency_phone: String,
    pub payment_method: PaymentMethod,
    pub notes: String,
}

impl BookingForm {
    pub fn new(mess_id: &str) -> Self {
        Self {
            mess_id: mess_id.to_string(),
            check_in_date: None,
            tenant_name: String::new(),
            tenant_phone: String::new(),
            emergency_name: String::new(),
            emergency_phone: String::new(),
            payment_method: PaymentMethod::Online,
            notes: String::new(),
        }
    }

    /// `today` is the host's local date; check-in may not precede it.
    pub fn validate(&self, today: NaiveDate) -> Result<CreateBooking, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.mess_id.trim().is_empty() {
            errors.add("messId", "No mess selected");
        }
        match self.check_in_date {
            None => errors.add("checkInDate", "Check-in date is required"),
            Some(date) if date < today => {
                errors.add("checkInDate", "Check-in date cannot be in the past")
            }
            Some(_) => {}
        }
        if self.tenant_name.trim().is_empty() {
            errors.add("tenantName", "Name is required");
        }
        check_phone(&mut errors, "tenantPhone", &self.tenant_phone);

        // Emergency contact is optional, but if started it must be complete.
        let has_emergency =
            !self.emergency_name.trim().is_empty() || !self.emergency_phone.trim().is_empty();
        if has_emergency {
            if self.emergency_name.trim().is_empty() {
                errors.add("emergencyName", "Emergency contact name is required");
            }
            check_phone(&mut errors, "emergencyPhone", &self.emergency_phone);
        }
        errors.into_result()?;

        let check_in_date = self
            .check_in_date
            .ok_or_else(|| ValidationErrors::single("checkInDate", "Check-in date is required"))?;
        let notes = self.notes.trim();
        Ok(CreateBooking {
            mess_id: self.mess_id.trim().to_string(),
            check_in_date,
            tenant_contact: Contact {
                name: self.tenant_name.trim().to_string(),
                phone: self.tenant_phone.trim().to_string(),
            },
            emergency_contact: has_emergency.then(|| Contact {
                name: self.emergency_name.trim().to_string(),
                phone: self.emergency_phone.trim().to_string(),
            }),
            payment_method: self.payment_method,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewForm {
    pub mess_id: String,
    pub rating: u8,
    pub comment: String,
}

impl ReviewForm {
    pub fn validate(&self) -> Result<CreateReview, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !is_valid_rating(self.rating) {
            errors.add("rating", "Please select a rating between 1 and 5");
        }
        if self.comment.trim().is_empty() {
            errors.add("comment", "Please write a short comment");
        }
        errors.into_result()?;
        Ok(CreateReview {
            mess_id: self.mess_id.clone(),
            rating: self.rating,
            comment: self.comment.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("student@uni.edu", true)]
    #[case("  padded@mail.com ", true)]
    #[case("no-at-sign.com", false)]
    #[case("two@@signs.com", false)]
    #[case("missing@tld", false)]
    fn email_format(#[case] email: &str, #[case] expected: bool) {
        assert_eq!(is_valid_email(email), expected);
    }

    #[rstest]
    #[case("01712345678", true)]
    #[case("+8801712345678", true)]
    #[case("8801912345678", true)]
    #[case("01212345678", false)]
    #[case("0171234567", false)]
    #[case("phone", false)]
    fn phone_pattern(#[case] phone: &str, #[case] expected: bool) {
        assert_eq!(is_valid_phone(phone), expected);
    }

    #[rstest]
    #[case("123456", true)]
    #[case("12345", false)]
    #[case("1234567", false)]
    #[case("12a456", false)]
    #[case("١٢٣٤٥٦", false)]
    fn otp_must_be_six_ascii_digits(#[case] code: &str, #[case] expected: bool) {
        assert_eq!(is_valid_otp(code), expected);
    }

    #[test]
    fn errors_display_the_first_field_message() {
        let mut errors = ValidationErrors::single("password", "Password is too short");
        errors.add("email", "Enter a valid email");
        assert_eq!(errors.to_string(), "Enter a valid email");
        assert_eq!(ValidationErrors::new().to_string(), "invalid input");

        let boxed: Box<dyn std::error::Error> = Box::new(errors);
        assert_eq!(boxed.to_string(), "Enter a valid email");
    }

    #[test]
    fn login_form_reports_each_field() {
        let errors = LoginForm {
            email: "bad".to_string(),
            password: "123".to_string(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.get("email").is_some());
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 6 characters")
        );
    }

    #[test]
    fn login_form_normalizes_email() {
        let request = LoginForm {
            email: " Student@Uni.EDU ".to_string(),
            password: "secret1".to_string(),
        }
        .validate()
        .unwrap();
        assert_eq!(request.email, "student@uni.edu");
    }

    #[test]
    fn register_form_rejects_mismatched_passwords_and_admin_role() {
        let errors = RegisterForm {
            name: "Rafi".to_string(),
            email: "rafi@mail.com".to_string(),
            phone: "01712345678".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
            role: Role::Admin,
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("confirmPassword").is_some());
        assert!(errors.get("role").is_some());
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn booking_form_rejects_past_check_in() {
        let mut form = BookingForm::new("m1");
        form.check_in_date = NaiveDate::from_ymd_opt(2026, 10, 1);
        form.tenant_name = "Rafi".to_string();
        form.tenant_phone = "01712345678".to_string();
        let errors = form.validate(today()).unwrap_err();
        assert_eq!(
            errors.get("checkInDate"),
            Some("Check-in date cannot be in the past")
        );
    }

    #[test]
    fn booking_form_builds_request_without_emergency_contact() {
        let mut form = BookingForm::new("m1");
        form.check_in_date = NaiveDate::from_ymd_opt(2026, 11, 1);
        form.tenant_name = " Rafi ".to_string();
        form.tenant_phone = "01712345678".to_string();
        let request = form.validate(today()).unwrap();
        assert_eq!(request.mess_id, "m1");
        assert_eq!(request.tenant_contact.name, "Rafi");
        assert!(request.emergency_contact.is_none());
        assert!(request.notes.is_none());
    }

    #[test]
    fn booking_form_requires_complete_emergency_contact() {
        let mut form = BookingForm::new("m1");
        form.check_in_date = Some(today());
        form.tenant_name = "Rafi".to_string();
        form.tenant_phone = "01712345678".to_string();
        form.emergency_name = "Karim".to_string();
        let errors = form.validate(today()).unwrap_err();
        assert_eq!(errors.get("emergencyPhone"), Some("Phone number is required"));
    }

    #[test]
    fn review_form_checks_rating_range() {
        let errors = ReviewForm {
            mess_id: "m1".to_string(),
            rating: 6,
            comment: "Great food".to_string(),
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("rating").is_some());
    }
}
