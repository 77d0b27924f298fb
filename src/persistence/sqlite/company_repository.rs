//! Implementation of the CompanyRepository trait for SqliteStateRepository

use async_trait::async_trait;
use sqlx::Row;

use crate::{
    models::Company,
    persistence::{error::PersistenceError, sqlite::SqliteStateRepository, traits::CompanyRepository},
};

#[async_trait]
impl CompanyRepository for SqliteStateRepository {
    /// Retrieves all companies in registration order (created date, then id).
    #[tracing::instrument(skip(self), level = "debug")]
    async fn get_companies(&self) -> Result<Vec<Company>, PersistenceError> {
        let rows = self
            .execute_query_with_error_handling(
                "get companies",
                sqlx::query("SELECT company_id, value FROM companies ORDER BY created_at, company_id")
                    .fetch_all(self.pool()),
            )
            .await?;

        let mut companies = Vec::with_capacity(rows.len());
        for row in rows {
            let company_id: String = row
                .try_get("company_id")
                .map_err(|e| PersistenceError::OperationFailed(e.to_string()))?;
            let value_str: String = row
                .try_get("value")
                .map_err(|e| PersistenceError::OperationFailed(e.to_string()))?;
            match serde_json::from_str::<Company>(&value_str) {
                Ok(company) => companies.push(company),
                Err(e) => {
                    // One corrupt record must not take down the collection.
                    tracing::error!(company_id, "Failed to decode company record: {}", e);
                }
            }
        }

        Ok(companies)
    }

    /// Retrieves a single company by id.
    #[tracing::instrument(skip(self), level = "debug")]
    async fn get_company(&self, id: &str) -> Result<Option<Company>, PersistenceError> {
        let row = self
            .execute_query_with_error_handling(
                "get company",
                sqlx::query("SELECT value FROM companies WHERE company_id = ?")
                    .bind(id)
                    .fetch_optional(self.pool()),
            )
            .await?;

        match row {
            Some(row) => {
                let value_str: String = row
                    .try_get("value")
                    .map_err(|e| PersistenceError::OperationFailed(e.to_string()))?;
                serde_json::from_str(&value_str)
                    .map(Some)
                    .map_err(|e| PersistenceError::SerializationError(e.to_string()))
            }
            None => Ok(None),
        }
    }

    /// Inserts a new company.
    #[tracing::instrument(skip(self, company), fields(company_id = %company.id), level = "debug")]
    async fn add_company(&self, company: &Company) -> Result<(), PersistenceError> {
        let value_str = serde_json::to_string(company)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

        let result =
            sqlx::query("INSERT INTO companies (company_id, value, created_at) VALUES (?, ?, ?)")
                .bind(&company.id)
                .bind(value_str)
                .bind(company.created_at.to_string())
                .execute(self.pool())
                .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(PersistenceError::AlreadyExists(company.id.clone()))
            }
            Err(e) => {
                tracing::error!(error = %e, operation = "add company", "Database operation failed.");
                Err(PersistenceError::OperationFailed(e.to_string()))
            }
        }
    }

    /// Replaces an existing company record.
    #[tracing::instrument(skip(self, company), fields(company_id = %company.id), level = "debug")]
    async fn update_company(&self, company: &Company) -> Result<(), PersistenceError> {
        let value_str = serde_json::to_string(company)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

        let result = self
            .execute_query_with_error_handling(
                "update company",
                sqlx::query("UPDATE companies SET value = ? WHERE company_id = ?")
                    .bind(value_str)
                    .bind(&company.id)
                    .execute(self.pool()),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(company.id.clone()));
        }
        Ok(())
    }

    /// Deletes a company; a principal takes its branches with it.
    #[tracing::instrument(skip(self), level = "debug")]
    async fn delete_company_and_branches(&self, id: &str) -> Result<bool, PersistenceError> {
        let row = self
            .execute_query_with_error_handling(
                "get company kind",
                sqlx::query("SELECT json_extract(value, '$.kind') AS kind FROM companies WHERE company_id = ?")
                    .bind(id)
                    .fetch_optional(self.pool()),
            )
            .await?;

        let Some(row) = row else {
            return Ok(false);
        };
        let kind: String = row
            .try_get("kind")
            .map_err(|e| PersistenceError::OperationFailed(e.to_string()))?;

        // Wire form of `CompanyKind::Principal`.
        let query = if kind == "principal" {
            sqlx::query(
                "DELETE FROM companies WHERE company_id = ?1 \
                 OR json_extract(value, '$.parent_company_id') = ?1",
            )
            .bind(id)
        } else {
            sqlx::query("DELETE FROM companies WHERE company_id = ?").bind(id)
        };

        let result = self
            .execute_query_with_error_handling("delete company", query.execute(self.pool()))
            .await?;

        tracing::info!(company_id = id, removed = result.rows_affected(), "Deleted company records.");
        Ok(result.rows_affected() > 0)
    }
}
