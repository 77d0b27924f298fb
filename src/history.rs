//! Folder-style history data over companies, branches, and document years.
//!
//! This module only shapes the data; rendering the collapsible tree is the
//! consumer's job.

use serde::Serialize;

use crate::models::{Company, CompanyKind, DocumentFile, DocumentKind};

/// A principal company together with the branches registered under it.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyGroup<'a> {
    /// The head office.
    pub principal: &'a Company,

    /// Branches whose `parent_company_id` points at the principal, in
    /// registration order.
    pub branches: Vec<&'a Company>,
}

/// Documents registered for one reference year, in kind traversal order.
#[derive(Debug, Clone, Serialize)]
pub struct YearFolder<'a> {
    /// The reference year.
    pub year: i32,

    /// The documents covering that year.
    pub files: Vec<(DocumentKind, &'a DocumentFile)>,
}

/// Groups principals with their branches, preserving input order.
///
/// Branches pointing at an unknown principal are dropped.
pub fn company_tree(companies: &[Company]) -> Vec<CompanyGroup<'_>> {
    companies
        .iter()
        .filter(|c| c.kind == CompanyKind::Principal)
        .map(|principal| CompanyGroup {
            principal,
            branches: companies
                .iter()
                .filter(|c| {
                    c.kind == CompanyKind::Branch
                        && c.parent_company_id.as_deref() == Some(principal.id.as_str())
                })
                .collect(),
        })
        .collect()
}

/// Collects a company's distinct document years, oldest first, each with the
/// documents covering it.
///
/// A company with no documents yields an empty list.
pub fn document_folders(company: &Company) -> Vec<YearFolder<'_>> {
    let mut years: Vec<i32> = DocumentKind::ALL
        .iter()
        .filter_map(|kind| company.documents.get(*kind).map(|doc| doc.year))
        .collect();
    years.sort_unstable();
    years.dedup();

    years
        .into_iter()
        .map(|year| YearFolder {
            year,
            files: DocumentKind::ALL
                .iter()
                .filter_map(|kind| {
                    company
                        .documents
                        .get(*kind)
                        .filter(|doc| doc.year == year)
                        .map(|doc| (*kind, doc))
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::CompanyBuilder;

    #[test]
    fn test_company_tree_groups_branches_under_principal() {
        let companies = vec![
            CompanyBuilder::new("p1", "Matrix One").build(),
            CompanyBuilder::new("b1", "Branch One").branch_of("p1").build(),
            CompanyBuilder::new("p2", "Matrix Two").build(),
            CompanyBuilder::new("b2", "Branch Two").branch_of("p1").build(),
        ];

        let tree = company_tree(&companies);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].principal.id, "p1");
        let branch_ids: Vec<&str> = tree[0].branches.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(branch_ids, vec!["b1", "b2"]);
        assert!(tree[1].branches.is_empty());
    }

    #[test]
    fn test_company_tree_drops_orphan_branches() {
        let companies = vec![
            CompanyBuilder::new("p1", "Matrix").build(),
            CompanyBuilder::new("b1", "Orphan").branch_of("gone").build(),
        ];

        let tree = company_tree(&companies);

        assert_eq!(tree.len(), 1);
        assert!(tree[0].branches.is_empty());
    }

    #[test]
    fn test_document_folders_sorted_by_year() {
        let company = CompanyBuilder::new("p1", "Matrix")
            .document(DocumentKind::Pcmso, 2026)
            .document(DocumentKind::Ltcat, 2025)
            .document(DocumentKind::Pgr, 2026)
            .build();

        let folders = document_folders(&company);

        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].year, 2025);
        assert_eq!(folders[0].files.len(), 1);
        assert_eq!(folders[0].files[0].0, DocumentKind::Ltcat);
        assert_eq!(folders[1].year, 2026);
        let kinds: Vec<DocumentKind> = folders[1].files.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![DocumentKind::Pcmso, DocumentKind::Pgr]);
    }

    #[test]
    fn test_document_folders_empty_without_documents() {
        let company = CompanyBuilder::new("p1", "Matrix").build();
        assert!(document_folders(&company).is_empty());
    }
}
