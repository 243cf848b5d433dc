//! # Job Board
//!
//! Postings by employers and applications by job seekers.
//!
//! ## Lifecycle
//! ```text
//!   Job:          open ──close()──► closed
//!                  │
//!                  │ apply()  (open, before deadline, not own job)
//!                  ▼
//!   Application:  pending ──accept()──► accepted
//!                    │
//!                    └──────reject()──► rejected
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::roles::Capability;
use crate::types::User;
use crate::validation::{validate_amount, validate_required};

const TITLE_MAX_LENGTH: usize = 200;

stored_enum! {
    /// Employment arrangement.
    pub enum JobType as "job_type" {
        FullTime => "Full-time",
        PartTime => "Part-time",
        Contract => "Contract",
        Temporary => "Temporary",
        Internship => "Internship",
        ProjectBased => "Project-based",
    }
}

stored_enum! {
    pub enum JobStatus as "status" {
        Open => "open",
        Closed => "closed",
    }
}

stored_enum! {
    pub enum ApplicationStatus as "status" {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

/// Input for [`Job::post`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewJob {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary: Option<f64>,
    pub job_type: Option<JobType>,
    pub requirements: Option<String>,
    /// Last day applications are accepted, inclusive.
    pub deadline: Option<NaiveDate>,
}

/// A job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub employer_id: String,
    pub location: Option<String>,
    pub salary: Option<f64>,
    pub job_type: Option<JobType>,
    pub requirements: Option<String>,
    pub status: JobStatus,
    pub posted_date: NaiveDateTime,
    pub deadline: Option<NaiveDate>,
}

impl Job {
    /// Posts a job on behalf of `employer`.
    ///
    /// The employer's role must grant `job_posting`.
    pub fn post(employer: &User, new: NewJob, now: NaiveDateTime) -> CoreResult<Self> {
        employer.role.require(Capability::JobPosting)?;
        validate_required("title", &new.title, TITLE_MAX_LENGTH)?;
        if let Some(salary) = new.salary {
            validate_amount("salary", salary)?;
        }
        if new.deadline.is_some_and(|deadline| deadline < now.date()) {
            return Err(ValidationError::invalid("deadline", "must not be in the past").into());
        }

        Ok(Job {
            id: Uuid::new_v4().to_string(),
            title: new.title.trim().to_string(),
            description: new.description,
            employer_id: employer.id.clone(),
            location: new.location,
            salary: new.salary,
            job_type: new.job_type,
            requirements: new.requirements,
            status: JobStatus::Open,
            posted_date: now,
            deadline: new.deadline,
        })
    }

    /// Open and, if there is a deadline, not past it.
    pub fn accepts_applications(&self, now: NaiveDateTime) -> bool {
        self.status == JobStatus::Open && !self.is_past_deadline(now)
    }

    fn is_past_deadline(&self, now: NaiveDateTime) -> bool {
        self.deadline.is_some_and(|deadline| now.date() > deadline)
    }

    /// Submits an application from `applicant`.
    pub fn apply(
        &self,
        applicant: &User,
        cover_letter: Option<String>,
        resume_path: Option<String>,
        now: NaiveDateTime,
    ) -> CoreResult<JobApplication> {
        applicant.role.require(Capability::ApplyJobs)?;

        if applicant.id == self.employer_id {
            return Err(ValidationError::invalid(
                "applicant_id",
                "employers cannot apply to their own job",
            )
            .into());
        }

        if self.status != JobStatus::Open {
            return Err(self.invalid_status(self.status.as_str(), "accept applications"));
        }
        if self.is_past_deadline(now) {
            return Err(self.invalid_status("past its deadline", "accept applications"));
        }

        Ok(JobApplication {
            id: Uuid::new_v4().to_string(),
            job_id: self.id.clone(),
            applicant_id: applicant.id.clone(),
            application_date: now,
            status: ApplicationStatus::Pending,
            cover_letter,
            resume_path,
        })
    }

    /// Closes an open job.
    pub fn close(&mut self) -> CoreResult<()> {
        if self.status != JobStatus::Open {
            return Err(self.invalid_status(self.status.as_str(), "close"));
        }
        self.status = JobStatus::Closed;
        Ok(())
    }

    fn invalid_status(&self, current: &str, action: &str) -> CoreError {
        CoreError::InvalidStatus {
            entity: "job".to_string(),
            id: self.id.clone(),
            current_status: current.to_string(),
            action: action.to_string(),
        }
    }
}

/// An application to a [`Job`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct JobApplication {
    pub id: String,
    pub job_id: String,
    pub applicant_id: String,
    pub application_date: NaiveDateTime,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub resume_path: Option<String>,
}

impl JobApplication {
    pub fn accept(&mut self) -> CoreResult<()> {
        self.decide(ApplicationStatus::Accepted, "accept")
    }

    pub fn reject(&mut self) -> CoreResult<()> {
        self.decide(ApplicationStatus::Rejected, "reject")
    }

    fn decide(&mut self, outcome: ApplicationStatus, action: &str) -> CoreResult<()> {
        if self.status != ApplicationStatus::Pending {
            return Err(CoreError::InvalidStatus {
                entity: "application".to_string(),
                id: self.id.clone(),
                current_status: self.status.to_string(),
                action: action.to_string(),
            });
        }
        self.status = outcome;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
