//! Organizations-backed account directory.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_organizations::types::Account;
use tracing::{debug, warn};

use orgbridge_core::{AccountDirectory, AccountId, AccountPage, DirectoryError};

/// Lists organizational unit members through `ListAccountsForParent`.
#[derive(Debug, Clone)]
pub struct OrganizationsDirectory {
    client: aws_sdk_organizations::Client,
}

impl OrganizationsDirectory {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: aws_sdk_organizations::Client) -> Self {
        Self { client }
    }

    /// Build a client from shared SDK configuration.
    #[must_use]
    pub fn from_conf(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_organizations::Client::new(config))
    }
}

#[async_trait]
impl AccountDirectory for OrganizationsDirectory {
    async fn list_accounts_page(
        &self,
        parent_id: &str,
        next_token: Option<&str>,
    ) -> Result<AccountPage, DirectoryError> {
        debug!(parent_id, has_token = next_token.is_some(), "ListAccountsForParent");

        let output = self
            .client
            .list_accounts_for_parent()
            .parent_id(parent_id)
            .set_next_token(next_token.map(ToOwned::to_owned))
            .send()
            .await
            .map_err(|e| DirectoryError::Remote {
                parent_id: parent_id.to_owned(),
                source: Box::new(e),
            })?;

        Ok(AccountPage {
            accounts: account_ids(output.accounts()),
            next_token: output.next_token().map(ToOwned::to_owned),
        })
    }
}

/// Extract account IDs in API order, dropping entries without an ID.
fn account_ids(accounts: &[Account]) -> Vec<AccountId> {
    accounts
        .iter()
        .filter_map(|account| {
            let id = account.id();
            if id.is_none() {
                warn!(name = ?account.name(), "skipping account without an ID");
            }
            id.map(AccountId::new)
        })
        .collect()
}
