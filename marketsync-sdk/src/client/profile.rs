//! Profile API client (profile screen → backend).

use std::sync::Arc;

use super::{ClientError, ResilientRequester};
use crate::objects::profile::Profile;
use crate::request::RequestDescriptor;
use crate::session::TokenStore;

pub const PROFILE_PATH: &str = "/api/users/profile";

/// Typed client for the signed-in user's profile.
#[derive(Clone)]
pub struct ProfileClient {
    requester: ResilientRequester,
    session: Arc<dyn TokenStore>,
}

impl ProfileClient {
    pub fn new(requester: ResilientRequester, session: Arc<dyn TokenStore>) -> Self {
        Self { requester, session }
    }

    fn authorize(&self, descriptor: RequestDescriptor) -> RequestDescriptor {
        match self.session.bearer_token() {
            Some(token) => descriptor.with_bearer(&token),
            None => descriptor,
        }
    }

    pub fn profile_request(&self) -> RequestDescriptor {
        self.authorize(RequestDescriptor::get(PROFILE_PATH))
    }

    pub fn update_request(&self, profile: &Profile) -> Result<RequestDescriptor, ClientError> {
        let descriptor = RequestDescriptor::put(PROFILE_PATH).with_json(profile)?;
        Ok(self.authorize(descriptor))
    }

    /// `GET /api/users/profile`.
    pub async fn profile(&self) -> Result<Profile, ClientError> {
        let resp = self.requester.send(&self.profile_request()).await?;
        Ok(resp.decode()?)
    }

    /// `PUT /api/users/profile`; returns the profile as stored.
    pub async fn update_profile(&self, profile: &Profile) -> Result<Profile, ClientError> {
        let resp = self.requester.send(&self.update_request(profile)?).await?;
        Ok(resp.decode()?)
    }
}
