//! Employee record model and request validation.
//!
//! [`Employee`] is the persisted record as returned to clients.
//! [`EmployeeInput`] is the raw request body for create/update; it is turned
//! into a validated [`NewEmployee`] either from scratch (create, required
//! fields enforced) or by merging over an existing record (update, absent
//! fields keep their stored values).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use staffdesk_core::{Email, EmployeeId, Phone};

/// Maximum length for names, department, and position.
pub const MAX_NAME_LENGTH: usize = 50;

/// A single field-level validation failure, surfaced in 400 responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending request field (camelCase, as sent by the client).
    pub field: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// An optional structured postal address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// Trim all parts, mapping empty strings to `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            street: normalize_optional(self.street),
            city: normalize_optional(self.city),
            state: normalize_optional(self.state),
            zip_code: normalize_optional(self.zip_code),
            country: normalize_optional(self.country),
        }
    }

    /// Whether every part is absent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
            && self.country.is_none()
    }
}

/// A persisted employee record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    #[serde(with = "rust_decimal::serde::float")]
    pub salary: Decimal,
    /// Hire date (exposed as `date` in the API).
    #[serde(rename = "date")]
    pub hired_on: DateTime<Utc>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<Phone>,
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated employee fields, ready to be written to the store.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub salary: Decimal,
    pub hired_on: DateTime<Utc>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<Phone>,
    pub address: Option<Address>,
}

/// Raw create/update request body. Every field is optional at the serde
/// level; create enforces the required set during validation so that all
/// failures are reported together, field by field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub salary: Option<Decimal>,
    /// Hire date, RFC 3339 or plain `YYYY-MM-DD`.
    pub date: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

impl EmployeeInput {
    /// Validate a create request. Missing `date` defaults to now.
    ///
    /// # Errors
    ///
    /// Returns every failed field check at once.
    pub fn into_new(self) -> Result<NewEmployee, Vec<FieldError>> {
        let mut errors = Vec::new();

        let first_name = validate_required_name(self.first_name, "firstName", "First name", &mut errors);
        let last_name = validate_required_name(self.last_name, "lastName", "Last name", &mut errors);
        let email = validate_email(self.email, &mut errors);
        let salary = validate_salary(self.salary, &mut errors);
        let hired_on = match self.date {
            Some(raw) => validate_date(&raw, &mut errors),
            None => Some(Utc::now()),
        };
        let department = validate_optional_name(self.department, "department", "Department name", &mut errors);
        let position = validate_optional_name(self.position, "position", "Position", &mut errors);
        let phone = validate_phone(self.phone, &mut errors);
        let address = normalize_address(self.address);

        if !errors.is_empty() {
            return Err(errors);
        }

        // All Options are Some here: each validator only returns None after
        // pushing an error, and the error set was just checked.
        match (first_name, last_name, email, salary, hired_on) {
            (Some(first_name), Some(last_name), Some(email), Some(salary), Some(hired_on)) => {
                Ok(NewEmployee {
                    first_name,
                    last_name,
                    email,
                    salary,
                    hired_on,
                    department,
                    position,
                    phone,
                    address,
                })
            }
            _ => Err(vec![FieldError::new("body", "Validation failed")]),
        }
    }

    /// Validate an update request by merging over an existing record.
    /// Absent fields keep their stored values; supplied fields are
    /// re-validated exactly as on create.
    ///
    /// # Errors
    ///
    /// Returns every failed field check at once.
    pub fn merge_into(self, existing: &Employee) -> Result<NewEmployee, Vec<FieldError>> {
        let merged = Self {
            first_name: self.first_name.or_else(|| Some(existing.first_name.clone())),
            last_name: self.last_name.or_else(|| Some(existing.last_name.clone())),
            email: self.email.or_else(|| Some(existing.email.to_string())),
            salary: self.salary.or(Some(existing.salary)),
            date: self.date.or_else(|| Some(existing.hired_on.to_rfc3339())),
            department: self.department.or_else(|| existing.department.clone()),
            position: self.position.or_else(|| existing.position.clone()),
            phone: self.phone.or_else(|| existing.phone.clone().map(Phone::into_inner)),
            address: self.address.or_else(|| existing.address.clone()),
        };
        merged.into_new()
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn normalize_address(address: Option<Address>) -> Option<Address> {
    address.map(Address::normalized).filter(|a| !a.is_empty())
}

fn validate_required_name(
    value: Option<String>,
    field: &str,
    label: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let Some(trimmed) = normalize_optional(value) else {
        errors.push(FieldError::new(field, format!("{label} is required")));
        return None;
    };
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        errors.push(FieldError::new(
            field,
            format!("{label} cannot exceed {MAX_NAME_LENGTH} characters"),
        ));
        return None;
    }
    Some(trimmed)
}

fn validate_optional_name(
    value: Option<String>,
    field: &str,
    label: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let trimmed = normalize_optional(value)?;
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        errors.push(FieldError::new(
            field,
            format!("{label} cannot exceed {MAX_NAME_LENGTH} characters"),
        ));
        return None;
    }
    Some(trimmed)
}

fn validate_email(value: Option<String>, errors: &mut Vec<FieldError>) -> Option<Email> {
    let Some(raw) = value.filter(|s| !s.trim().is_empty()) else {
        errors.push(FieldError::new("email", "Email is required"));
        return None;
    };
    match Email::parse(&raw) {
        Ok(email) => Some(email),
        Err(e) => {
            errors.push(FieldError::new("email", e.to_string()));
            None
        }
    }
}

fn validate_salary(value: Option<Decimal>, errors: &mut Vec<FieldError>) -> Option<Decimal> {
    let Some(salary) = value else {
        errors.push(FieldError::new("salary", "Salary is required"));
        return None;
    };
    if salary.is_sign_negative() {
        errors.push(FieldError::new("salary", "Salary cannot be negative"));
        return None;
    }
    Some(salary)
}

fn validate_date(raw: &str, errors: &mut Vec<FieldError>) -> Option<DateTime<Utc>> {
    // Only an absent field defaults to now; a supplied value must parse,
    // including the empty string
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(
            date.and_hms_opt(0, 0, 0)
                .unwrap_or_default()
                .and_utc(),
        );
    }
    errors.push(FieldError::new("date", "Please enter a valid date"));
    None
}

fn validate_phone(value: Option<String>, errors: &mut Vec<FieldError>) -> Option<Phone> {
    let raw = normalize_optional(value)?;
    match Phone::parse(&raw) {
        Ok(phone) => Some(phone),
        Err(_) => {
            errors.push(FieldError::new("phone", "Please enter a valid phone number"));
            None
        }
    }
}
