//! Bulk submission of mapped contacts as one upstream import activity.

use chrono::Utc;
use contacthub_core::activity::{ActivityState, ImportActivity};
use contacthub_core::contact::NormalizedContact;
use contacthub_core::payload::ImportRecord;

use crate::api::CrmApi;
use crate::error::CrmError;
use crate::types::BulkImportRequest;

/// Largest batch accepted by the upstream JSON import endpoint.
pub const MAX_IMPORT_CONTACTS: usize = 40_000;

/// SMS consent recorded for every imported contact.
pub const SMS_PERMISSION_EXPLICIT: &str = "explicit";

/// Submit `contacts` as a single import into the account's first list.
///
/// Batch size is checked before any request is made. One list lookup and
/// one import request are issued; nothing is retried.
pub async fn submit_bulk(
    api: &dyn CrmApi,
    token: &str,
    contacts: &[NormalizedContact],
) -> Result<ImportActivity, CrmError> {
    if contacts.is_empty() {
        return Err(CrmError::EmptyBatch);
    }
    if contacts.len() > MAX_IMPORT_CONTACTS {
        return Err(CrmError::BatchTooLarge {
            count: contacts.len(),
            max: MAX_IMPORT_CONTACTS,
        });
    }

    let lists = api.contact_lists(token).await?;
    let list_id = lists
        .lists
        .into_iter()
        .next()
        .map(|list| list.list_id)
        .ok_or(CrmError::NoContactLists)?;

    let request = BulkImportRequest {
        import_data: contacts.iter().map(ImportRecord::from_contact).collect(),
        list_ids: vec![list_id],
        sms_permission_to_send: SMS_PERMISSION_EXPLICIT,
    };

    let response = api.import_contacts(token, &request).await?;
    tracing::info!(
        activity_id = %response.activity_id,
        count = contacts.len(),
        list_id = %request.list_ids[0],
        "Bulk import submitted",
    );

    Ok(ImportActivity {
        activity_id: response.activity_id,
        submitted_at: Utc::now(),
        state: response
            .state
            .as_deref()
            .map(ActivityState::parse)
            .unwrap_or(ActivityState::Initialized),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeCrm;
    use assert_matches::assert_matches;
    use contacthub_core::contact::{PermissionToSend, PhoneKind};

    fn contacts(n: usize) -> Vec<NormalizedContact> {
        let now = Utc::now();
        (0..n)
            .map(|i| {
                NormalizedContact::builder(format!("First{i}"), "Last", now)
                    .email(&format!("p{i}@example.com"), PermissionToSend::Implicit, now)
                    .phone("555-0100", PhoneKind::Mobile, now)
                    .build()
                    .unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn submits_into_first_list() {
        let fake = FakeCrm::with_lists(&["list-a", "list-b"]);

        let activity = submit_bulk(&fake, "tok", &contacts(3)).await.unwrap();

        assert_eq!(activity.activity_id, "act-1");
        assert_eq!(activity.state, ActivityState::Initialized);
        assert_eq!(fake.calls(), vec!["contact_lists", "import_contacts"]);

        let imports = fake.imports.lock().unwrap();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].list_ids, vec!["list-a".to_string()]);
        assert_eq!(imports[0].import_data.len(), 3);
        assert_eq!(imports[0].sms_permission_to_send, "explicit");
    }

    #[tokio::test]
    async fn no_lists_means_no_write() {
        let fake = FakeCrm::with_lists(&[]);

        let result = submit_bulk(&fake, "tok", &contacts(1)).await;

        assert_matches!(result, Err(CrmError::NoContactLists));
        assert_eq!(fake.calls(), vec!["contact_lists"]);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_calls() {
        let fake = FakeCrm::with_lists(&["list-a"]);
        let result = submit_bulk(&fake, "tok", &[]).await;
        assert_matches!(result, Err(CrmError::EmptyBatch));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn oversized_batch_makes_no_calls() {
        let fake = FakeCrm::with_lists(&["list-a"]);
        let result = submit_bulk(&fake, "tok", &contacts(MAX_IMPORT_CONTACTS + 1)).await;
        assert_matches!(
            result,
            Err(CrmError::BatchTooLarge { count, max: MAX_IMPORT_CONTACTS }) if count == MAX_IMPORT_CONTACTS + 1
        );
        assert!(fake.calls().is_empty());
    }
}
