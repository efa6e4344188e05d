use serde::Serialize;
use tracing::{info, warn};

use crate::database::{ActivityStore, Directory};
use crate::error::ActivityError;

/// A signup or unregister call after the transport has decoded and checked it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    pub activity: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub message: String,
}

pub async fn list_activities(store: &ActivityStore) -> Directory {
    store.list().await
}

pub async fn signup(
    store: &ActivityStore,
    req: &SignupRequest,
) -> Result<MessageView, ActivityError> {
    let activity = match store.insert_participant(&req.activity, &req.email).await {
        Ok(a) => a,
        Err(e) => {
            warn!(activity = %req.activity, email = %req.email, "signup rejected: {}", e);
            return Err(e);
        }
    };

    let over_capacity = activity.participants.len() > activity.max_participants as usize;
    info!(
        activity = %req.activity,
        email = %req.email,
        participants = activity.participants.len(),
        max_participants = activity.max_participants,
        over_capacity,
        "signed up"
    );

    Ok(MessageView {
        message: format!("Signed up {} for {}", req.email, req.activity),
    })
}

pub async fn unregister(
    store: &ActivityStore,
    req: &SignupRequest,
) -> Result<MessageView, ActivityError> {
    let activity = match store.remove_participant(&req.activity, &req.email).await {
        Ok(a) => a,
        Err(e) => {
            warn!(activity = %req.activity, email = %req.email, "unregister rejected: {}", e);
            return Err(e);
        }
    };

    info!(
        activity = %req.activity,
        email = %req.email,
        participants = activity.participants.len(),
        "unregistered"
    );

    Ok(MessageView {
        message: format!("Unregistered {} from {}", req.email, req.activity),
    })
}
