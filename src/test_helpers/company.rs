//! Test helpers for creating company records.

use chrono::{NaiveDate, Utc};

use crate::models::{
    Company, CompanyKind, CompanyStatus, DocumentFile, DocumentKind, DocumentSlots,
};

/// A builder for creating `Company` instances for testing.
pub struct CompanyBuilder {
    company: Company,
}

impl CompanyBuilder {
    /// Creates a builder for a principal company with sensible defaults.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            company: Company {
                id: id.to_string(),
                kind: CompanyKind::Principal,
                parent_company_id: None,
                name: name.to_string(),
                cnpj: "00.000.000/0001-00".to_string(),
                status: CompanyStatus::Active,
                start_date: None,
                termination_date: None,
                esocial: false,
                coordinating_physician: String::new(),
                notes: String::new(),
                documents: DocumentSlots::default(),
                created_at: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                updated_at: None,
            },
        }
    }

    /// Turns the record into a branch of the given principal.
    pub fn branch_of(mut self, parent_id: &str) -> Self {
        self.company.kind = CompanyKind::Branch;
        self.company.parent_company_id = Some(parent_id.to_string());
        self
    }

    /// Sets the contract termination date (raw string, may be malformed).
    pub fn termination_date(mut self, date: &str) -> Self {
        self.company.termination_date = Some(date.to_string());
        self
    }

    /// Sets the contract start date.
    pub fn start_date(mut self, date: &str) -> Self {
        self.company.start_date = Some(date.to_string());
        self
    }

    /// Sets the registration date.
    pub fn created_at(mut self, date: NaiveDate) -> Self {
        self.company.created_at = date;
        self
    }

    /// Sets the contract activity status.
    pub fn status(mut self, status: CompanyStatus) -> Self {
        self.company.status = status;
        self
    }

    /// Fills a document slot with a stub file for the given year.
    pub fn document(mut self, kind: DocumentKind, year: i32) -> Self {
        self.company.documents.set(
            kind,
            DocumentFile {
                file_name: format!("{}.pdf", kind.acronym()),
                uploaded_at: Utc::now(),
                year,
                payload: String::new(),
            },
        );
        self
    }

    /// Builds the company.
    pub fn build(self) -> Company {
        self.company
    }
}
