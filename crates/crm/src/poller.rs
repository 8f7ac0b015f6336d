//! Completion polling for submitted import activities.

use std::time::Duration;

use contacthub_core::activity::ActivityState;
use tokio_util::sync::CancellationToken;

use crate::api::CrmApi;
use crate::error::CrmError;

/// Default spacing between status checks in [`wait_for_completion`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Check once whether `activity_id` has completed.
///
/// Any failure is returned as-is; it is never reported as "not done".
pub async fn poll_activity(
    api: &dyn CrmApi,
    token: &str,
    activity_id: &str,
) -> Result<bool, CrmError> {
    let status = api.activity(token, activity_id).await?;
    let state = ActivityState::parse(&status.state);
    tracing::debug!(activity_id, state = %status.state, percent_done = ?status.percent_done, "Polled activity");
    Ok(state.is_completed())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Completed,
    Cancelled,
}

/// Poll every `interval` until the activity completes or `cancel` fires.
///
/// Poll errors are logged and treated as "not done yet".
pub async fn wait_for_completion(
    api: &dyn CrmApi,
    token: &str,
    activity_id: &str,
    interval: Duration,
    cancel: CancellationToken,
) -> WaitOutcome {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(activity_id, "Activity wait cancelled");
                return WaitOutcome::Cancelled;
            }
            _ = ticker.tick() => {
                match poll_activity(api, token, activity_id).await {
                    Ok(true) => return WaitOutcome::Completed,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(activity_id, error = %e, "Activity poll failed");
                    }
                }
            }
        }
    }
}
