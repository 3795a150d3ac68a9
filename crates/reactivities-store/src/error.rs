use reactivities_shared::RemoteError;
use thiserror::Error;

/// Why an operation settled without committing.
///
/// These never escape the store; they are turned into
/// [`crate::StoreEvent::OperationFailed`] notifications.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Attend / unattend need a current selection.
    #[error("No activity is selected")]
    NoSelection,
}
