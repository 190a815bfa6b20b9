use crate::config::*;
use crate::core::errors::StoreError;
use crate::core::helpers::{now_iso, sanitize_text};
use crate::core::persist::{Persisted, Reducer};
use crate::core::validation::{
    validate_email, validate_length, validate_password, validate_required, validate_username,
};
use crate::models::models::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const USER_NAMESPACE: Uuid = Uuid::from_u128(0x0c1c_1e00_0000_5000_8000_0000_0000_0000);

/// Fields the profile editor may change. `None` leaves a field untouched,
/// an empty string clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AuthAction {
    SignedIn(User),
    SignedOut,
    SetLoading(bool),
    ProfileUpdated(ProfilePatch),
    AdjustFollowing(i32),
    AdjustPosts(i32),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSnapshot {
    pub user: Option<User>,
    pub is_authenticated: bool,
}

/// Same email, same id, so a returning user still owns their posts and
/// follow edges.
pub fn user_id_for(email: &str) -> String {
    Uuid::new_v5(&USER_NAMESPACE, email.trim().to_lowercase().as_bytes()).to_string()
}

fn mock_user(name: &str, username: &str, email: &str) -> User {
    User {
        id: user_id_for(email),
        name: name.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        avatar: None,
        bio: None,
        location: None,
        website: None,
        followers_count: 0,
        following_count: 0,
        posts_count: 0,
        is_verified: false,
        joined_at: now_iso(),
    }
}

/// Any well-formed credentials sign in; the user is derived from the email.
pub fn login_user(email: &str, password: &str) -> Result<User, StoreError> {
    validate_email(email)?;
    validate_password(password)?;

    let email = email.trim();
    let local = email.split('@').next().unwrap_or(email);
    let mut username: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .take(MAX_USERNAME_LENGTH)
        .collect();
    if username.len() < MIN_USERNAME_LENGTH {
        username = format!("user_{}", &user_id_for(email)[..8]);
    }
    let name = local
        .split(['.', '_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let name = if name.is_empty() { username.clone() } else { name };

    Ok(mock_user(&name, &username, email))
}

pub fn create_user(name: &str, username: &str, email: &str, password: &str) -> Result<User, StoreError> {
    validate_required("Name", name)?;
    validate_length("Name", name.trim(), MAX_NAME_LENGTH)?;
    validate_username(username)?;
    validate_email(email)?;
    validate_password(password)?;

    Ok(mock_user(&sanitize_text(name.trim()), username, email.trim()))
}

fn patched(value: &str) -> Option<String> {
    let clean = sanitize_text(value.trim());
    if clean.is_empty() {
        None
    } else {
        Some(clean)
    }
}

pub fn validate_profile_patch(patch: &ProfilePatch) -> Result<(), StoreError> {
    if let Some(name) = &patch.name {
        validate_required("Name", name)?;
        validate_length("Name", name, MAX_NAME_LENGTH)?;
    }
    if let Some(bio) = &patch.bio {
        validate_length("Bio", bio, MAX_BIO_LENGTH)?;
    }
    if let Some(location) = &patch.location {
        validate_length("Location", location, MAX_LOCATION_LENGTH)?;
    }
    if let Some(website) = &patch.website {
        validate_length("Website", website, MAX_WEBSITE_LENGTH)?;
        let website = website.trim();
        if !website.is_empty() && !(website.starts_with("http://") || website.starts_with("https://")) {
            return Err(StoreError::Validation(
                "Website must start with http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}

fn adjust(counter: &mut u32, delta: i32) {
    if delta >= 0 {
        *counter = counter.saturating_add(delta as u32);
    } else {
        *counter = counter.saturating_sub(delta.unsigned_abs());
    }
}

impl AuthState {
    pub fn current_user(&self) -> Result<&User, StoreError> {
        match (&self.user, self.is_authenticated) {
            (Some(user), true) => Ok(user),
            _ => Err(StoreError::Unauthenticated),
        }
    }
}

impl Reducer for AuthState {
    type Action = AuthAction;

    fn reduce(&mut self, action: AuthAction) {
        match action {
            AuthAction::SignedIn(user) => {
                self.user = Some(user);
                self.is_authenticated = true;
                self.is_loading = false;
            }
            AuthAction::SignedOut => {
                self.user = None;
                self.is_authenticated = false;
                self.is_loading = false;
            }
            AuthAction::SetLoading(loading) => self.is_loading = loading,
            AuthAction::ProfileUpdated(patch) => {
                let Some(user) = self.user.as_mut() else {
                    return;
                };
                if let Some(name) = patch.name.as_deref().and_then(patched) {
                    user.name = name;
                }
                if let Some(bio) = patch.bio {
                    user.bio = patched(&bio);
                }
                if let Some(location) = patch.location {
                    user.location = patched(&location);
                }
                if let Some(website) = patch.website {
                    user.website = patched(&website);
                }
                if let Some(avatar) = patch.avatar {
                    user.avatar = patched(&avatar);
                }
            }
            AuthAction::AdjustFollowing(delta) => {
                if let Some(user) = self.user.as_mut() {
                    adjust(&mut user.following_count, delta);
                }
            }
            AuthAction::AdjustPosts(delta) => {
                if let Some(user) = self.user.as_mut() {
                    adjust(&mut user.posts_count, delta);
                }
            }
        }
    }
}

impl Persisted for AuthState {
    type Snapshot = AuthSnapshot;

    fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
        }
    }

    fn restore(snapshot: AuthSnapshot) -> Self {
        AuthState {
            // A snapshot without a user cannot be signed in
            is_authenticated: snapshot.is_authenticated && snapshot.user.is_some(),
            user: snapshot.user,
            is_loading: false,
        }
    }
}
