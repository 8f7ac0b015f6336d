//! Handlers for the `/contacts` resource: listing, single create, and the
//! bulk import pipeline (validate, submit, poll).

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use contacthub_core::contact::NewContact;
use contacthub_core::error::CoreError;
use contacthub_core::import::schema::{self, validate_upload, ColumnValidation};
use contacthub_core::import::{prepare_import, FileFormat, UNSUPPORTED_FORMAT_MESSAGE};
use contacthub_core::payload::CreateContactBody;
use contacthub_core::types::Timestamp;
use contacthub_crm::bulk::submit_bulk;
use contacthub_crm::contacts::{list_all_contacts, list_contacts_since};
use contacthub_crm::poller::poll_activity;
use contacthub_crm::types::{ContactsQuery, CrmContact};
use contacthub_crm::CrmApi;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::upload::UploadedFile;

const FROM_PARAM_MESSAGE: &str =
    "The \"from\" parameter must be a valid ISO date format (e.g., YYYY-MM-DD)";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query for `GET /contacts`. Exactly one parameter must be present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub all_contacts: Option<bool>,
    pub from: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactCreated {
    pub message: &'static str,
    pub contact: CrmContact,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSubmitted {
    pub message: &'static str,
    pub activity_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatus {
    pub is_done: bool,
}

// ---------------------------------------------------------------------------
// Listing and single create
// ---------------------------------------------------------------------------

/// GET /api/contacts?allContacts=true | ?from=YYYY-MM-DD
pub async fn list_contacts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<CrmContact>>> {
    let contacts = match (params.all_contacts, params.from.as_deref()) {
        (Some(true), None) => list_all_contacts(state.crm.as_ref(), &user.access_token).await?,
        (Some(false), None) => {
            state
                .crm
                .contacts_page(&user.access_token, ContactsQuery::default())
                .await?
                .contacts
        }
        (None, Some(from)) => {
            let from = parse_from(from)
                .ok_or_else(|| AppError::BadRequest(FROM_PARAM_MESSAGE.to_string()))?;
            list_contacts_since(state.crm.as_ref(), &user.access_token, from).await?
        }
        _ => {
            return Err(AppError::BadRequest(
                "Provide exactly one parameter: either \"allContacts\" or \"from\"".to_string(),
            ))
        }
    };

    tracing::debug!(count = contacts.len(), "Listed contacts");
    Ok(Json(contacts))
}

/// POST /api/contacts
///
/// Validate the body, normalize it, and create the contact upstream.
pub async fn create_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<NewContact>,
) -> AppResult<(StatusCode, Json<ContactCreated>)> {
    input.validate().map_err(CoreError::from)?;
    let contact = input.into_contact(Utc::now()).map_err(CoreError::from)?;

    let created = state
        .crm
        .create_contact(&user.access_token, &CreateContactBody::from_contact(&contact))
        .await?;
    tracing::info!(contact_id = ?created.contact_id, "Contact created");

    Ok((
        StatusCode::CREATED,
        Json(ContactCreated {
            message: "Contact created successfully",
            contact: created,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Bulk import
// ---------------------------------------------------------------------------

/// POST /api/contacts/validate
///
/// Check an uploaded file's columns. The content type only gates the upload;
/// a recognised extension picks the decoder. The verdict is always returned
/// with status 200.
pub async fn validate_file(
    _user: AuthUser,
    multipart: Multipart,
) -> AppResult<Json<ColumnValidation>> {
    let file = UploadedFile::from_multipart(multipart).await?;

    let result = match file.format() {
        Ok(_) if FileFormat::from_file_name(&file.file_name).is_some() => {
            schema::validate_file(&file.file_name, &file.bytes)
        }
        Ok(format) => validate_upload(&file.bytes, format),
        Err(_) => ColumnValidation {
            is_valid: false,
            errors: vec![UNSUPPORTED_FORMAT_MESSAGE.to_string()],
        },
    };

    tracing::debug!(
        file_name = %file.file_name,
        is_valid = result.is_valid,
        error_count = result.errors.len(),
        "Validated upload",
    );
    Ok(Json(result))
}

/// POST /api/contacts/bulk
///
/// Parse, validate, and map the uploaded file, then submit every contact as
/// one upstream import. Any file, column, or row error rejects the whole
/// upload before anything is sent.
pub async fn bulk_upload(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<BulkSubmitted>)> {
    let file = UploadedFile::from_multipart(multipart).await?;
    let format = file.format()?;

    let contacts = prepare_import(&file.bytes, format, &state.mapping_options(), Utc::now())
        .inspect_err(|e| {
            tracing::info!(file_name = %file.file_name, error = %e, "Upload rejected");
        })?;

    let activity = submit_bulk(state.crm.as_ref(), &user.access_token, &contacts).await?;

    Ok((
        StatusCode::CREATED,
        Json(BulkSubmitted {
            message: "Contacts uploaded successfully",
            activity_id: activity.activity_id,
        }),
    ))
}

/// GET /api/contacts/bulk/{activity_id}
///
/// One upstream status check. Upstream failures are returned as errors, not
/// as "not done".
pub async fn bulk_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(activity_id): Path<String>,
) -> AppResult<Json<BulkStatus>> {
    let is_done = poll_activity(state.crm.as_ref(), &user.access_token, &activity_id).await?;
    Ok(Json(BulkStatus { is_done }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Accept a calendar date (midnight UTC) or a full RFC 3339 timestamp.
fn parse_from(value: &str) -> Option<Timestamp> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
