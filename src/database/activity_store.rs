use std::sync::Arc;

use serde::{Serialize, Serializer};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::ActivityError;
use crate::models::{seed_activities, Activity};

/// In-memory activity directory shared by all request handlers.
///
/// Cloning is cheap and every clone sees the same rosters. Each mutation
/// checks and applies under one write guard, so a concurrent signup can never
/// slip a duplicate past the membership check.
#[derive(Clone, Default)]
pub struct ActivityStore {
    inner: Arc<RwLock<Vec<Activity>>>,
}

impl ActivityStore {
    pub fn with_seed() -> Self {
        Self::from_activities(seed_activities())
    }

    /// Builds a store keeping the given order. A repeated name keeps the first record.
    pub fn from_activities(activities: Vec<Activity>) -> Self {
        let mut unique: Vec<Activity> = Vec::with_capacity(activities.len());
        for activity in activities {
            if unique.iter().any(|a| a.name == activity.name) {
                warn!(activity = %activity.name, "duplicate activity in catalog, ignoring");
                continue;
            }
            unique.push(activity);
        }
        info!(activities = unique.len(), "activity directory loaded");
        Self {
            inner: Arc::new(RwLock::new(unique)),
        }
    }

    pub async fn list(&self) -> Directory {
        Directory(self.inner.read().await.clone())
    }

    /// Appends `email` to the roster and returns the updated record.
    pub async fn insert_participant(
        &self,
        name: &str,
        email: &str,
    ) -> Result<Activity, ActivityError> {
        let mut guard = self.inner.write().await;
        let activity = guard
            .iter_mut()
            .find(|a| a.name == name)
            .ok_or(ActivityError::NotFound)?;

        if activity.is_signed_up(email) {
            return Err(ActivityError::AlreadySignedUp);
        }
        activity.participants.push(email.to_string());
        Ok(activity.clone())
    }

    pub async fn remove_participant(
        &self,
        name: &str,
        email: &str,
    ) -> Result<Activity, ActivityError> {
        let mut guard = self.inner.write().await;
        let activity = guard
            .iter_mut()
            .find(|a| a.name == name)
            .ok_or(ActivityError::NotFound)?;

        let Some(pos) = activity.participants.iter().position(|p| p == email) else {
            return Err(ActivityError::NotSignedUp);
        };
        activity.participants.remove(pos);
        Ok(activity.clone())
    }
}

/// Point-in-time copy of the directory, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory(Vec<Activity>);

#[cfg(test)]
impl Directory {
    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.0.iter().find(|a| a.name == name)
    }
}

impl Serialize for Directory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|a| (&a.name, a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_store() -> ActivityStore {
        ActivityStore::from_activities(vec![
            Activity::new("Test Club", "A test club for testing purposes", "Test Schedule", 5)
                .with_participants(["p1@x.edu", "p2@x.edu"]),
            Activity::new("Empty Club", "An empty club with no participants", "Empty Schedule", 10),
        ])
    }

    async fn roster(store: &ActivityStore, name: &str) -> Vec<String> {
        store
            .list()
            .await
            .get(name)
            .map(|a| a.participants.clone())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn insert_then_duplicate_is_rejected() {
        let store = test_store();

        store.insert_participant("Empty Club", "a@x.edu").await.unwrap();
        assert_eq!(roster(&store, "Empty Club").await, vec!["a@x.edu"]);

        let err = store.insert_participant("Empty Club", "a@x.edu").await.unwrap_err();
        assert_eq!(err, ActivityError::AlreadySignedUp);
        assert_eq!(roster(&store, "Empty Club").await, vec!["a@x.edu"]);
    }

    #[tokio::test]
    async fn remove_keeps_order_of_the_rest() {
        let store = test_store();

        store.remove_participant("Test Club", "p1@x.edu").await.unwrap();
        assert_eq!(roster(&store, "Test Club").await, vec!["p2@x.edu"]);

        let err = store.remove_participant("Test Club", "p1@x.edu").await.unwrap_err();
        assert_eq!(err, ActivityError::NotSignedUp);
    }

    #[tokio::test]
    async fn unknown_activity_is_not_found_for_both_mutations() {
        let store = test_store();
        let before = store.list().await;

        assert_eq!(
            store.insert_participant("Nonexistent", "a@x.edu").await.unwrap_err(),
            ActivityError::NotFound
        );
        assert_eq!(
            store.remove_participant("Nonexistent", "p1@x.edu").await.unwrap_err(),
            ActivityError::NotFound
        );
        assert_eq!(store.list().await, before);
    }

    #[tokio::test]
    async fn duplicate_catalog_names_keep_first() {
        let store = ActivityStore::from_activities(vec![
            Activity::new("Chess Club", "first", "", 12),
            Activity::new("Chess Club", "second", "", 4),
        ]);
        let directory = store.list().await;
        let value = serde_json::to_value(&directory).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
        assert_eq!(directory.get("Chess Club").unwrap().description, "first");
    }

    #[tokio::test]
    async fn directory_serialises_as_ordered_map() {
        let json = serde_json::to_string(&test_store().list().await).unwrap();
        let test_pos = json.find("\"Test Club\"").unwrap();
        let empty_pos = json.find("\"Empty Club\"").unwrap();
        assert!(test_pos < empty_pos);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["Test Club"]["max_participants"], 5);
        assert_eq!(value["Empty Club"]["participants"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn concurrent_signups_of_one_email_admit_exactly_one() {
        let store = test_store();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert_participant("Empty Club", "race@x.edu").await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(roster(&store, "Empty Club").await, vec!["race@x.edu"]);
    }
}
