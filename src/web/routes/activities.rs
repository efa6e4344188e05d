use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::database::{ActivityStore, Directory};
use crate::services::activities_service::{self, MessageView, SignupRequest};
use crate::web::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct SignupQuery {
    pub email: Option<String>,
}

impl SignupQuery {
    /// Pairs the decoded path segment with the email, kept exactly as decoded.
    /// Only an absent `email` parameter is refused here.
    pub fn into_request(self, activity: String) -> Result<SignupRequest, ApiError> {
        let email = self
            .email
            .ok_or_else(|| ApiError::InvalidRequest("email query parameter is required".into()))?;
        Ok(SignupRequest { activity, email })
    }
}

pub async fn list_activities_handler(State(store): State<ActivityStore>) -> Json<Directory> {
    Json(activities_service::list_activities(&store).await)
}

pub async fn signup_handler(
    Path(activity_name): Path<String>,
    Query(query): Query<SignupQuery>,
    State(store): State<ActivityStore>,
) -> Result<Json<MessageView>, ApiError> {
    let req = query.into_request(activity_name)?;
    let view = activities_service::signup(&store, &req).await?;
    Ok(Json(view))
}

pub async fn unregister_handler(
    Path(activity_name): Path<String>,
    Query(query): Query<SignupQuery>,
    State(store): State<ActivityStore>,
) -> Result<Json<MessageView>, ApiError> {
    let req = query.into_request(activity_name)?;
    let view = activities_service::unregister(&store, &req).await?;
    Ok(Json(view))
}
