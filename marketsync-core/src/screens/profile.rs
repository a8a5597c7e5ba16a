//! Profile screen.

use marketsync_sdk::cancel::Cancellation;
use marketsync_sdk::client::ProfileClient;
use marketsync_sdk::objects::profile::Profile;
use tracing::info;

use super::{ScreenError, run_mutation};
use crate::slice::StateSlice;

pub struct ProfileScreen {
    client: ProfileClient,
    profile: StateSlice<Option<Profile>>,
    cancel: Option<Cancellation>,
}

impl ProfileScreen {
    pub fn new(client: ProfileClient) -> Self {
        Self {
            client,
            profile: StateSlice::new("profile", None),
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn profile(&self) -> Option<Profile> {
        self.profile.get()
    }

    pub fn profile_slice(&self) -> &StateSlice<Option<Profile>> {
        &self.profile
    }

    pub async fn load(&self) -> Result<Profile, ScreenError> {
        let profile = self.client.profile().await?;
        self.profile.confirm(Some(profile.clone()));
        Ok(profile)
    }

    /// Show `edited` right away and save it; the stored profile replaces
    /// it on success, the previous one comes back on failure.
    pub async fn update(&self, edited: Profile) -> Result<Profile, ScreenError> {
        let client = self.client.clone();
        let body = edited.clone();
        let stored = run_mutation(
            &self.profile,
            Some(edited.clone()),
            move |_| async move { client.update_profile(&body).await.map(Some) },
            self.cancel.as_ref(),
        )
        .await?;
        let stored = stored.unwrap_or(edited);
        info!(user = %stored.id, "Profile updated");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimistic::MutationError;
    use crate::test_support::{FakeBackend, Reply};
    use marketsync_sdk::cancel::cancellation;
    use serde_json::json;
    use std::time::Duration;

    const PATH: &str = "/api/users/profile";

    fn profile_json(city: &str) -> serde_json::Value {
        json!({"_id": "u1", "name": "Asha Rao", "email": "asha@example.com", "city": city})
    }

    fn edited(city: &str) -> Profile {
        Profile {
            id: "u1".into(),
            name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            phone: None,
            city: Some(city.into()),
        }
    }

    #[tokio::test]
    async fn test_load_confirms_slice() {
        let backend = FakeBackend::new();
        backend.on("GET", PATH, Reply::ok(profile_json("Pune")));
        let screen = ProfileScreen::new(backend.profile_client());

        let profile = screen.load().await.unwrap();
        assert_eq!(profile, edited("Pune"));
        assert_eq!(screen.profile(), Some(edited("Pune")));
    }

    #[tokio::test]
    async fn test_load_failure_leaves_slice_empty() {
        let backend = FakeBackend::new();
        backend.on("GET", PATH, Reply::json(401, json!({"success": false, "message": "Session expired"})));
        let screen = ProfileScreen::new(backend.profile_client());

        let err = screen.load().await.unwrap_err();
        assert_eq!(err.to_string(), "Session expired");
        assert!(screen.profile().is_none());
    }

    #[tokio::test]
    async fn test_update_stored_profile_wins() {
        let backend = FakeBackend::new();
        backend.on("GET", PATH, Reply::ok(profile_json("Pune")));
        backend.on("PUT", PATH, Reply::ok(profile_json("Mumbai")));
        let screen = ProfileScreen::new(backend.profile_client());
        screen.load().await.unwrap();

        let stored = screen.update(edited("mumbai ")).await.unwrap();
        assert_eq!(stored, edited("Mumbai"));
        assert_eq!(screen.profile(), Some(edited("Mumbai")));
    }

    #[tokio::test]
    async fn test_update_failure_restores_previous() {
        let backend = FakeBackend::new();
        backend.on("GET", PATH, Reply::ok(profile_json("Pune")));
        backend.on(
            "PUT",
            PATH,
            Reply::json(422, json!({"success": false, "message": "Invalid", "errors": ["city is not served"]})),
        );
        let screen = ProfileScreen::new(backend.profile_client());
        screen.load().await.unwrap();

        let err = screen.update(edited("Atlantis")).await.unwrap_err();
        assert_eq!(err.to_string(), "could not update profile: city is not served");
        assert_eq!(screen.profile(), Some(edited("Pune")));
    }

    #[tokio::test]
    async fn test_cancel_rolls_back_update() {
        let backend = FakeBackend::new();
        backend.on("GET", PATH, Reply::ok(profile_json("Pune")));
        backend.on("PUT", PATH, Reply::Hang);
        let (handle, cancel) = cancellation();
        let screen = ProfileScreen::new(backend.profile_client()).with_cancellation(cancel);
        screen.load().await.unwrap();

        let cancel_soon = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(screen.profile(), Some(edited("Delhi")));
            handle.cancel();
        };
        let (result, ()) = tokio::join!(screen.update(edited("Delhi")), cancel_soon);

        assert!(matches!(
            result,
            Err(ScreenError::Mutation(MutationError::Cancelled { .. }))
        ));
        assert_eq!(screen.profile(), Some(edited("Pune")));
        assert!(!screen.profile_slice().is_in_flight());
    }
}
