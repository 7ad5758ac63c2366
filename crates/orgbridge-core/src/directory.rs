//! Account enumeration.
//!
//! [`AccountDirectory`] is the boundary to the Organizations API: it returns
//! one page of accounts per call. [`list_accounts`] drives the pagination.

use async_trait::async_trait;
use tracing::debug;

use crate::error::DirectoryError;
use crate::types::AccountId;

/// One page of a `ListAccountsForParent` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPage {
    /// Accounts on this page, in API order.
    pub accounts: Vec<AccountId>,
    /// Continuation token, present when more pages remain.
    pub next_token: Option<String>,
}

/// Read access to the accounts of an organizational unit.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Fetch the page of accounts under `parent_id` starting at `next_token`.
    async fn list_accounts_page(
        &self,
        parent_id: &str,
        next_token: Option<&str>,
    ) -> Result<AccountPage, DirectoryError>;
}

/// List every account directly under `parent_id`, in API order.
///
/// Pages are fetched one after another, each carrying the token from the
/// previous response, until a response comes back without a token. An empty
/// token is treated the same as a missing one. Any error aborts the listing;
/// no partial result is returned.
pub async fn list_accounts<D>(directory: &D, parent_id: &str) -> Result<Vec<AccountId>, DirectoryError>
where
    D: AccountDirectory + ?Sized,
{
    let mut accounts = Vec::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0_usize;

    loop {
        let page = directory
            .list_accounts_page(parent_id, next_token.as_deref())
            .await?;
        pages += 1;
        accounts.extend(page.accounts);

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }

    debug!(
        parent_id,
        pages,
        accounts = accounts.len(),
        "listed organizational unit accounts"
    );
    Ok(accounts)
}
