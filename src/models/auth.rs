//! Authentication request/response DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::UserRole;

/// Registration request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 50, message = "First name must be 2-50 characters"))]
    pub first_name: String,

    #[validate(length(min = 2, max = 50, message = "Last name must be 2-50 characters"))]
    pub last_name: String,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 6, max = 100, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(custom = "validate_birthdate")]
    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(min = 2, max = 100, message = "Country must be 2-100 characters"))]
    pub country: Option<String>,
}

/// Login request body
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password change request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 6, max = 100, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Profile update request body
///
/// Email and password are deliberately absent; the password moves through
/// the dedicated change-password operation.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 50, message = "First name must be 2-50 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 2, max = 50, message = "Last name must be 2-50 characters"))]
    pub last_name: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(custom = "validate_birthdate")]
    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(min = 2, max = 100, message = "Country must be 2-100 characters"))]
    pub country: Option<String>,
}

/// User representation returned by the API
///
/// There is no password field here, so a digest can never leak through
/// serialization.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub country: Option<String>,
    pub role: UserRole,
    pub is_email_verified: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: UserResponse,
    pub token: String,
}

/// Result of a lightweight session check (no user load)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCheck {
    pub valid: bool,
    pub user_id: Uuid,
}

/// Phone numbers: optional leading '+', then 10-15 digits, spaces, dashes
/// or parentheses.
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let rest = phone.strip_prefix('+').unwrap_or(phone);
    let len = rest.chars().count();
    let chars_ok = rest
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));

    if chars_ok && (10..=15).contains(&len) {
        Ok(())
    } else {
        let mut error = ValidationError::new("phone");
        error.message = Some("Please provide a valid phone number".into());
        Err(error)
    }
}

fn validate_birthdate(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date < Utc::now().date_naive() {
        Ok(())
    } else {
        let mut error = ValidationError::new("date_of_birth");
        error.message = Some("Date of birth must be in the past".into());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn valid_register_request() -> RegisterRequest {
        RegisterRequest {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@x.com".to_string(),
            password: "secret1".to_string(),
            phone: None,
            date_of_birth: None,
            country: None,
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(valid_register_request().validate().is_ok());
    }

    #[test]
    fn test_name_length_bounds() {
        let mut req = valid_register_request();
        req.first_name = "J".to_string();
        assert!(req.validate().is_err());

        let mut req = valid_register_request();
        req.last_name = "x".repeat(51);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_password_minimum_length() {
        let mut req = valid_register_request();
        req.password = "short".to_string();
        assert!(req.validate().is_err());

        req.password = "secret".to_string();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_email_format() {
        let mut req = valid_register_request();
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_phone_pattern() {
        assert!(validate_phone("+1 (555) 123-4567").is_ok());
        assert!(validate_phone("0123456789").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("12345678901234567890").is_err());
        assert!(validate_phone("555-ABCD-123").is_err());

        let mut req = valid_register_request();
        req.phone = Some("not a phone".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_birthdate_must_be_past() {
        let mut req = valid_register_request();
        req.date_of_birth = Some(Utc::now().date_naive() - Duration::days(365 * 30));
        assert!(req.validate().is_ok());

        req.date_of_birth = Some(Utc::now().date_naive() + Duration::days(1));
        assert!(req.validate().is_err());

        // Today is not in the past
        req.date_of_birth = Some(Utc::now().date_naive());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_user_response_has_no_password_key() {
        let response = UserResponse {
            id: Uuid::new_v4(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@x.com".to_string(),
            phone: None,
            date_of_birth: None,
            country: None,
            role: UserRole::Applicant,
            is_email_verified: false,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.to_lowercase().contains("password"));
        assert!(json.contains("\"firstName\":\"Jane\""));
    }
}
