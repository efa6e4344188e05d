use thiserror::Error;

/// Rejections from the activity directory. All of them are caller errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivityError {
    #[error("Activity not found")]
    NotFound,

    #[error("Student is already signed up")]
    AlreadySignedUp,

    #[error("Student is not signed up for this activity")]
    NotSignedUp,
}
