use std::sync::Arc;

use tracing::debug;

use shared_database::{PostgrestClient, StoreError};

use crate::models::Account;
use crate::queries::{FindAccountById, FindProviderById};

/// Read-only lookups against the user directory.
pub struct AccountDirectory {
    store: Arc<PostgrestClient>,
}

impl AccountDirectory {
    pub fn new(store: Arc<PostgrestClient>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        debug!("Directory lookup for account {}", id);
        let rows: Vec<Account> = self.store.select(&FindAccountById { id }.to_path()).await?;
        Ok(rows.into_iter().next())
    }

    /// Resolve an account only if it carries the provider capability flag.
    pub async fn find_provider_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        debug!("Directory lookup for provider {}", id);
        let rows: Vec<Account> = self
            .store
            .select(&FindProviderById { id }.to_path())
            .await?;
        Ok(rows.into_iter().next())
    }
}
