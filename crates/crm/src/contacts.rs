//! Contact listing with upstream pagination.

use contacthub_core::types::Timestamp;

use crate::api::{CrmApi, CONTACTS_PAGE_LIMIT};
use crate::error::CrmError;
use crate::types::{ContactsQuery, CrmContact};

/// Contacts updated after `from`. Only the first page is returned.
pub async fn list_contacts_since(
    api: &dyn CrmApi,
    token: &str,
    from: Timestamp,
) -> Result<Vec<CrmContact>, CrmError> {
    let page = api
        .contacts_page(
            token,
            ContactsQuery {
                updated_after: Some(from),
            },
        )
        .await?;
    Ok(page.contacts)
}

/// Every contact in the account, following `_links.next` until exhausted.
pub async fn list_all_contacts(api: &dyn CrmApi, token: &str) -> Result<Vec<CrmContact>, CrmError> {
    let first = api.contacts_page(token, ContactsQuery::default()).await?;

    // A count below the page size means there is nothing more to fetch.
    if first
        .contacts_count
        .is_some_and(|count| count < u64::from(CONTACTS_PAGE_LIMIT))
    {
        return Ok(first.contacts);
    }

    let mut next = first.next_href().map(str::to_string);
    let mut contacts = first.contacts;
    while let Some(href) = next {
        let page = api.contacts_page_at(token, &href).await?;
        tracing::debug!(fetched = page.contacts.len(), "Fetched contacts page");
        next = page.next_href().map(str::to_string);
        contacts.extend(page.contacts);
    }

    Ok(contacts)
}
