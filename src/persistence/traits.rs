//! This module contains the storage ports for the sentinela application.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{de::DeserializeOwned, Serialize};

use crate::{models::Company, persistence::error::PersistenceError};

/// A small JSON key-value port for application state such as alert exposures.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieves a JSON-serializable state object by its key.
    async fn get_json_state<T: DeserializeOwned + Send + Sync + 'static>(
        &self,
        key: &str,
    ) -> Result<Option<T>, PersistenceError>;

    /// Sets or replaces a JSON-serializable state object by its key.
    async fn set_json_state<T: Serialize + Send + Sync + 'static>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), PersistenceError>;
}

/// Read/write access to the tracked company collection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Retrieves all companies and branches in stable registration order.
    ///
    /// Rows that fail to decode are skipped, so one corrupt record cannot
    /// take the whole collection down with it.
    async fn get_companies(&self) -> Result<Vec<Company>, PersistenceError>;

    /// Retrieves a single company by id.
    async fn get_company(&self, id: &str) -> Result<Option<Company>, PersistenceError>;

    /// Inserts a new company. Fails when the id is already taken.
    async fn add_company(&self, company: &Company) -> Result<(), PersistenceError>;

    /// Replaces an existing company record. Fails when the id is unknown.
    async fn update_company(&self, company: &Company) -> Result<(), PersistenceError>;

    /// Deletes a company. Deleting a principal also deletes the branches
    /// pointing at it. Returns whether any record was removed.
    async fn delete_company_and_branches(&self, id: &str) -> Result<bool, PersistenceError>;
}
