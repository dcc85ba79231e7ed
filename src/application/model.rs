//! Application domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Credential evaluation application
#[derive(Debug, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub application_number: String,
    pub user_id: Uuid,
    pub applicant_name: String,
    pub applicant_email: String,
    pub institution_name: String,
    pub institution_country: String,
    pub degree_type: DegreeType,
    pub field_of_study: String,
    pub graduation_year: i32,
    pub evaluation_purpose: EvaluationPurpose,
    pub urgent_processing: bool,
    pub status: ApplicationStatus,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_completion_date: Option<DateTime<Utc>>,
    pub fee_cents: i64,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Degree types
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "degree_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DegreeType {
    HighSchoolDiploma,
    AssociateDegree,
    BachelorsDegree,
    MastersDegree,
    DoctoralDegree,
    ProfessionalDegree,
    Other,
}

/// Evaluation purposes
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "evaluation_purpose", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EvaluationPurpose {
    Immigration,
    Employment,
    FurtherEducation,
    ProfessionalLicensing,
    Other,
}

/// Application status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    UnderReview,
    DocumentsRequired,
    InProgress,
    Completed,
    Cancelled,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::DocumentsRequired => "documents_required",
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Completed => "completed",
            ApplicationStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled applications never change again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Completed | ApplicationStatus::Cancelled
        )
    }

    /// Whether the workflow allows moving from this status to `next`
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;

        match (*self, next) {
            (Draft, Submitted) => true,
            (Submitted, UnderReview) => true,
            (UnderReview, DocumentsRequired | InProgress) => true,
            (DocumentsRequired, UnderReview | InProgress) => true,
            (InProgress, Completed) => true,
            (current, Cancelled) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

/// Request to create a new (draft) application
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    #[validate(length(min = 1, max = 255, message = "Applicant name is required"))]
    pub applicant_name: String,

    #[validate(email(message = "Please provide a valid email"))]
    pub applicant_email: String,

    #[validate(length(min = 1, max = 255, message = "Institution name is required"))]
    pub institution_name: String,

    #[validate(length(min = 1, max = 100, message = "Institution country is required"))]
    pub institution_country: String,

    pub degree_type: DegreeType,

    #[validate(length(min = 1, max = 255, message = "Field of study is required"))]
    pub field_of_study: String,

    #[validate(custom = "validate_graduation_year")]
    pub graduation_year: i32,

    pub evaluation_purpose: EvaluationPurpose,

    #[serde(default)]
    pub urgent_processing: bool,
}

/// Owner edits to a draft application; absent fields keep their value
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationRequest {
    #[validate(length(min = 1, max = 255, message = "Applicant name is required"))]
    pub applicant_name: Option<String>,

    #[validate(email(message = "Please provide a valid email"))]
    pub applicant_email: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Institution name is required"))]
    pub institution_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Institution country is required"))]
    pub institution_country: Option<String>,

    pub degree_type: Option<DegreeType>,

    #[validate(length(min = 1, max = 255, message = "Field of study is required"))]
    pub field_of_study: Option<String>,

    #[validate(custom = "validate_graduation_year")]
    pub graduation_year: Option<i32>,

    pub evaluation_purpose: Option<EvaluationPurpose>,

    pub urgent_processing: Option<bool>,
}

/// Admin status change request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
    pub admin_notes: Option<String>,
    pub estimated_completion_date: Option<DateTime<Utc>>,
}

fn validate_graduation_year(year: i32) -> Result<(), ValidationError> {
    use chrono::Datelike;

    let current_year = Utc::now().year();
    if (1950..=current_year).contains(&year) {
        Ok(())
    } else {
        let mut error = ValidationError::new("graduation_year");
        error.message = Some("Graduation year must be between 1950 and the current year".into());
        Err(error)
    }
}
