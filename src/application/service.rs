//! Application service
//!
//! Persistence and workflow rules for credential evaluation applications.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{PaginatedResponse, UserRole};

use super::model::{
    Application, ApplicationStatus, CreateApplicationRequest, UpdateApplicationRequest,
    UpdateStatusRequest,
};

/// Standard evaluation fee, in cents
const BASE_FEE_CENTS: i64 = 20000;
/// Surcharge for urgent processing, in cents
const URGENT_FEE_CENTS: i64 = 7500;

const APPLICATION_COLUMNS: &str = "id, application_number, user_id, applicant_name, \
     applicant_email, institution_name, institution_country, degree_type, field_of_study, \
     graduation_year, evaluation_purpose, urgent_processing, status, admin_notes, \
     reviewed_by, reviewed_at, completed_at, estimated_completion_date, fee_cents, \
     payment_status, payment_date, created_at, updated_at";

/// Application service errors
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Application not found")]
    NotFound,

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("Only draft applications can be edited")]
    NotEditable,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for ApplicationError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => ApplicationError::NotFound,
            other => ApplicationError::Database(other.to_string()),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound => ApiError::NotFound("Application".to_string()),
            ApplicationError::InvalidTransition { .. } | ApplicationError::NotEditable => {
                ApiError::BadRequest(e.to_string())
            }
            ApplicationError::Database(detail) => ApiError::Database(detail),
        }
    }
}

/// Application service
#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a draft application owned by `user_id`
    pub async fn create(
        &self,
        user_id: Uuid,
        req: CreateApplicationRequest,
    ) -> Result<Application, ApplicationError> {
        let fee_cents = if req.urgent_processing {
            BASE_FEE_CENTS + URGENT_FEE_CENTS
        } else {
            BASE_FEE_CENTS
        };

        let query = format!(
            r#"
            INSERT INTO applications (
                id, application_number, user_id, applicant_name, applicant_email,
                institution_name, institution_country, degree_type, field_of_study,
                graduation_year, evaluation_purpose, urgent_processing, fee_cents
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        let application = sqlx::query_as::<_, Application>(&query)
            .bind(Uuid::new_v4())
            .bind(generate_application_number())
            .bind(user_id)
            .bind(&req.applicant_name)
            .bind(&req.applicant_email)
            .bind(&req.institution_name)
            .bind(&req.institution_country)
            .bind(req.degree_type)
            .bind(&req.field_of_study)
            .bind(req.graduation_year)
            .bind(req.evaluation_purpose)
            .bind(req.urgent_processing)
            .bind(fee_cents)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            application_id = %application.id,
            number = %application.application_number,
            "Application created"
        );

        Ok(application)
    }

    /// List applications: owners see their own, admins see all
    pub async fn list(
        &self,
        user_id: Uuid,
        role: UserRole,
        page: i64,
        limit: i64,
    ) -> Result<PaginatedResponse<Application>, ApplicationError> {
        let offset = (page - 1) * limit;

        let (applications, total) = if role == UserRole::Admin {
            let query = format!(
                "SELECT {APPLICATION_COLUMNS} FROM applications \
                 ORDER BY created_at DESC LIMIT $1 OFFSET $2"
            );
            let rows = sqlx::query_as::<_, Application>(&query)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications")
                .fetch_one(&self.pool)
                .await?;
            (rows, total)
        } else {
            let query = format!(
                "SELECT {APPLICATION_COLUMNS} FROM applications WHERE user_id = $1 \
                 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
            );
            let rows = sqlx::query_as::<_, Application>(&query)
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
            let total: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_one(&self.pool)
                    .await?;
            (rows, total)
        };

        Ok(PaginatedResponse {
            data: applications,
            total,
            page,
            limit,
        })
    }

    /// Fetch a single application
    ///
    /// Non-owners get the same `NotFound` as a missing row, so the endpoint
    /// does not reveal which ids exist.
    pub async fn get(
        &self,
        user_id: Uuid,
        role: UserRole,
        id: Uuid,
    ) -> Result<Application, ApplicationError> {
        let application = self.fetch(id).await?;

        if role != UserRole::Admin && application.user_id != user_id {
            return Err(ApplicationError::NotFound);
        }

        Ok(application)
    }

    /// Owner edit of a draft application
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: UpdateApplicationRequest,
    ) -> Result<Application, ApplicationError> {
        let application = self.fetch_owned(user_id, id).await?;

        if application.status != ApplicationStatus::Draft {
            return Err(ApplicationError::NotEditable);
        }

        let query = format!(
            r#"
            UPDATE applications
            SET applicant_name = COALESCE($1, applicant_name),
                applicant_email = COALESCE($2, applicant_email),
                institution_name = COALESCE($3, institution_name),
                institution_country = COALESCE($4, institution_country),
                degree_type = COALESCE($5, degree_type),
                field_of_study = COALESCE($6, field_of_study),
                graduation_year = COALESCE($7, graduation_year),
                evaluation_purpose = COALESCE($8, evaluation_purpose),
                urgent_processing = COALESCE($9, urgent_processing),
                updated_at = NOW()
            WHERE id = $10
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        let application = sqlx::query_as::<_, Application>(&query)
            .bind(&req.applicant_name)
            .bind(&req.applicant_email)
            .bind(&req.institution_name)
            .bind(&req.institution_country)
            .bind(req.degree_type)
            .bind(&req.field_of_study)
            .bind(req.graduation_year)
            .bind(req.evaluation_purpose)
            .bind(req.urgent_processing)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(application)
    }

    /// Owner submits a draft for review
    pub async fn submit(&self, user_id: Uuid, id: Uuid) -> Result<Application, ApplicationError> {
        let application = self.fetch_owned(user_id, id).await?;
        self.transition(application, ApplicationStatus::Submitted)
            .await
    }

    /// Owner cancels an application that has not reached a terminal status
    pub async fn cancel(&self, user_id: Uuid, id: Uuid) -> Result<Application, ApplicationError> {
        let application = self.fetch_owned(user_id, id).await?;
        self.transition(application, ApplicationStatus::Cancelled)
            .await
    }

    /// Admin status change with review bookkeeping
    pub async fn update_status(
        &self,
        admin_id: Uuid,
        id: Uuid,
        req: UpdateStatusRequest,
    ) -> Result<Application, ApplicationError> {
        let application = self.fetch(id).await?;

        if !application.status.can_transition_to(req.status) {
            return Err(ApplicationError::InvalidTransition {
                from: application.status,
                to: req.status,
            });
        }

        let completed_at = if req.status == ApplicationStatus::Completed {
            Some(Utc::now())
        } else {
            application.completed_at
        };

        let query = format!(
            r#"
            UPDATE applications
            SET status = $1,
                admin_notes = COALESCE($2, admin_notes),
                estimated_completion_date = COALESCE($3, estimated_completion_date),
                reviewed_by = $4,
                reviewed_at = NOW(),
                completed_at = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Application>(&query)
            .bind(req.status)
            .bind(&req.admin_notes)
            .bind(req.estimated_completion_date)
            .bind(admin_id)
            .bind(completed_at)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            application_id = %updated.id,
            from = %application.status,
            to = %updated.status,
            "Application status changed"
        );

        Ok(updated)
    }

    async fn fetch(&self, id: Uuid) -> Result<Application, ApplicationError> {
        let query = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1");

        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApplicationError::NotFound)
    }

    async fn fetch_owned(&self, user_id: Uuid, id: Uuid) -> Result<Application, ApplicationError> {
        let query =
            format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1 AND user_id = $2");

        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApplicationError::NotFound)
    }

    async fn transition(
        &self,
        application: Application,
        next: ApplicationStatus,
    ) -> Result<Application, ApplicationError> {
        if !application.status.can_transition_to(next) {
            return Err(ApplicationError::InvalidTransition {
                from: application.status,
                to: next,
            });
        }

        let query = format!(
            "UPDATE applications SET status = $1, updated_at = NOW() \
             WHERE id = $2 RETURNING {APPLICATION_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Application>(&query)
            .bind(next)
            .bind(application.id)
            .fetch_one(&self.pool)
            .await?;

        Ok(updated)
    }
}

/// Generate a human-readable application number
fn generate_application_number() -> String {
    use rand::Rng;

    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("WES-{}-{:03}", millis, suffix)
}
