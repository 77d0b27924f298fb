//! This module defines the `Company` structure, which represents a tracked
//! company or branch together with its occupational-health document slots.

use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a record is a head office or a branch of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyKind {
    /// A head office. May have branches pointing at it.
    Principal,
    /// A branch tied to a principal through `parent_company_id`.
    Branch,
}

/// Contract activity status of a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    /// The contract is in force.
    Active,
    /// The contract has been closed out.
    Inactive,
}

/// One of the three mandatory occupational-health documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Occupational health medical control program.
    Pcmso,
    /// Workplace conditions technical report.
    Ltcat,
    /// Risk management program.
    Pgr,
}

impl DocumentKind {
    /// Fixed traversal order. Alert lists and folder views follow it.
    pub const ALL: [DocumentKind; 3] = [DocumentKind::Pcmso, DocumentKind::Ltcat, DocumentKind::Pgr];

    /// Lowercase wire form, as used in alert keys and stored state.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pcmso => "pcmso",
            DocumentKind::Ltcat => "ltcat",
            DocumentKind::Pgr => "pgr",
        }
    }

    /// Uppercase acronym for display.
    pub fn acronym(&self) -> &'static str {
        match self {
            DocumentKind::Pcmso => "PCMSO",
            DocumentKind::Ltcat => "LTCAT",
            DocumentKind::Pgr => "PGR",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown document kind.
#[derive(Debug, Error)]
#[error("unknown document kind: {0}")]
pub struct ParseDocumentKindError(String);

impl FromStr for DocumentKind {
    type Err = ParseDocumentKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pcmso" => Ok(DocumentKind::Pcmso),
            "ltcat" => Ok(DocumentKind::Ltcat),
            "pgr" => Ok(DocumentKind::Pgr),
            other => Err(ParseDocumentKindError(other.to_string())),
        }
    }
}

/// Metadata for a stored document file.
///
/// The payload reference is opaque to this crate; converting files to data
/// URLs (or wherever else the bytes live) is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFile {
    /// Original file name, e.g. `PCMSO.pdf`.
    pub file_name: String,

    /// When the file was attached to the record.
    pub uploaded_at: DateTime<Utc>,

    /// Reference year the document covers. Drives the history folder view.
    pub year: i32,

    /// Opaque payload reference (data URL, path, ...).
    #[serde(default)]
    pub payload: String,
}

/// The per-company document slots, one per [`DocumentKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSlots {
    /// PCMSO slot.
    #[serde(default)]
    pub pcmso: Option<DocumentFile>,

    /// LTCAT slot.
    #[serde(default)]
    pub ltcat: Option<DocumentFile>,

    /// PGR slot.
    #[serde(default)]
    pub pgr: Option<DocumentFile>,
}

impl DocumentSlots {
    /// Returns the slot for `kind`, if populated.
    pub fn get(&self, kind: DocumentKind) -> Option<&DocumentFile> {
        match kind {
            DocumentKind::Pcmso => self.pcmso.as_ref(),
            DocumentKind::Ltcat => self.ltcat.as_ref(),
            DocumentKind::Pgr => self.pgr.as_ref(),
        }
    }

    /// Fills (or replaces) the slot for `kind`.
    pub fn set(&mut self, kind: DocumentKind, file: DocumentFile) {
        match kind {
            DocumentKind::Pcmso => self.pcmso = Some(file),
            DocumentKind::Ltcat => self.ltcat = Some(file),
            DocumentKind::Pgr => self.pgr = Some(file),
        }
    }

    /// Whether the slot for `kind` is populated.
    pub fn has(&self, kind: DocumentKind) -> bool {
        self.get(kind).is_some()
    }
}

/// Represents a tracked company or branch with its document-expiry lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier, generated at registration time.
    pub id: String,

    /// Whether this record is a principal or a branch.
    pub kind: CompanyKind,

    /// For branches, the id of the principal they belong to.
    #[serde(default)]
    pub parent_company_id: Option<String>,

    /// Display name.
    pub name: String,

    /// Company registration number.
    pub cnpj: String,

    /// Contract activity status.
    pub status: CompanyStatus,

    /// Contract start date as an ISO `YYYY-MM-DD` string.
    #[serde(default)]
    pub start_date: Option<String>,

    /// Contract termination date as an ISO `YYYY-MM-DD` string.
    ///
    /// Kept as the raw string so one malformed record degrades to an
    /// `Invalid` classification instead of failing the whole collection.
    #[serde(default)]
    pub termination_date: Option<String>,

    /// Whether the company reports through eSocial.
    #[serde(default)]
    pub esocial: bool,

    /// Coordinating physician responsible for the PCMSO.
    #[serde(default)]
    pub coordinating_physician: String,

    /// Free-form notes.
    #[serde(default)]
    pub notes: String,

    /// The three document slots.
    #[serde(default)]
    pub documents: DocumentSlots,

    /// Registration date.
    pub created_at: NaiveDate,

    /// Date of the last update, if any.
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

impl Company {
    /// Generates a new company id: `<prefix>_<unix-millis>_<seq>`.
    ///
    /// The process-local sequence keeps ids unique within a millisecond.
    pub fn generate_id(prefix: &str, now: DateTime<Utc>) -> String {
        static SEQUENCE: AtomicU64 = AtomicU64::new(0);
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}_{}", prefix, now.timestamp_millis(), seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_kind_round_trip() {
        for kind in DocumentKind::ALL {
            assert_eq!(kind.as_str().parse::<DocumentKind>().unwrap(), kind);
            assert_eq!(kind.acronym().parse::<DocumentKind>().unwrap(), kind);
        }
        assert!("nr7".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn test_document_slots_get_and_set() {
        let mut slots = DocumentSlots::default();
        assert!(!slots.has(DocumentKind::Ltcat));

        slots.set(
            DocumentKind::Ltcat,
            DocumentFile {
                file_name: "LTCAT.pdf".to_string(),
                uploaded_at: Utc::now(),
                year: 2026,
                payload: String::new(),
            },
        );

        assert!(slots.has(DocumentKind::Ltcat));
        assert_eq!(slots.get(DocumentKind::Ltcat).unwrap().year, 2026);
        assert!(!slots.has(DocumentKind::Pcmso));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let now = Utc::now();
        let a = Company::generate_id("comp", now);
        let b = Company::generate_id("comp", now);
        assert_ne!(a, b);
        assert!(a.starts_with("comp_"));
    }
}
