//! Collaborator interfaces: current-user context and profile lookup.
//!
//! Profile storage itself is outside this core; the directory trait is the
//! seam through which attendee ids are resolved to display records.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Cap on attendee profile lookups per request.
pub const DEFAULT_PROFILE_CAP: usize = 20;

/// Platform role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Artist,
    Programmer,
    Community,
}

/// The authenticated user, as provided by the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub uid: String,
    pub role: Role,
}

/// A resolved display profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic_url: Option<String>,
    pub role: Role,
}

impl UserProfile {
    /// The degraded record for ids no directory can resolve.
    fn placeholder(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            name: "Community member".to_string(),
            profile_pic_url: None,
            role: Role::Community,
        }
    }
}

/// Lookup of artist and programmer profiles by user id.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn artist_profile(&self, uid: &str) -> Result<Option<UserProfile>>;

    async fn programmer_profile(&self, uid: &str) -> Result<Option<UserProfile>>;
}

/// Resolve attendee ids to display profiles, probing the artist store first
/// and the programmer store second. Unresolvable ids, and per-id directory
/// failures, degrade to a placeholder record rather than erroring. At most
/// `cap` ids are resolved.
pub async fn resolve_attendee_profiles<D: ProfileDirectory>(
    directory: &D,
    user_ids: &[String],
    cap: usize,
) -> Vec<UserProfile> {
    let mut profiles = Vec::with_capacity(user_ids.len().min(cap));

    for uid in user_ids.iter().take(cap) {
        let resolved = match directory.artist_profile(uid).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => match directory.programmer_profile(uid).await {
                Ok(profile) => profile,
                Err(err) => {
                    warn!("programmer profile lookup failed for {}: {}", uid, err);
                    None
                }
            },
            Err(err) => {
                warn!("artist profile lookup failed for {}: {}", uid, err);
                None
            }
        };

        profiles.push(resolved.unwrap_or_else(|| UserProfile::placeholder(uid)));
    }

    profiles
}

/// In-memory profile directory for tests and embedded deployments.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    artists: HashMap<String, UserProfile>,
    programmers: HashMap<String, UserProfile>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_artist(&mut self, uid: impl Into<String>, name: impl Into<String>) {
        let uid = uid.into();
        self.artists.insert(
            uid.clone(),
            UserProfile {
                uid,
                name: name.into(),
                profile_pic_url: None,
                role: Role::Artist,
            },
        );
    }

    pub fn insert_programmer(&mut self, uid: impl Into<String>, name: impl Into<String>) {
        let uid = uid.into();
        self.programmers.insert(
            uid.clone(),
            UserProfile {
                uid,
                name: name.into(),
                profile_pic_url: None,
                role: Role::Programmer,
            },
        );
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryDirectory {
    async fn artist_profile(&self, uid: &str) -> Result<Option<UserProfile>> {
        Ok(self.artists.get(uid).cloned())
    }

    async fn programmer_profile(&self, uid: &str) -> Result<Option<UserProfile>> {
        Ok(self.programmers.get(uid).cloned())
    }
}
