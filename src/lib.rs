pub mod assistant;
pub mod auth;
pub mod config;
pub mod core;
pub mod follow;
pub mod media;
pub mod models;
pub mod notifications;
pub mod panels;
pub mod posts;
pub mod routes;
pub mod search;

use crate::assistant::Assistant;
use crate::auth::{create_user, login_user, validate_profile_patch, AuthAction, AuthState, ProfilePatch};
use crate::config::*;
use crate::core::errors::StoreError;
use crate::core::persist::Store;
use crate::core::storage::SharedStore;
use crate::follow::ConnectionState;
use crate::models::models::{Event, Group, Notification, NotificationKind, Post, User};
use crate::notifications::{build_notification, NotificationAction, NotificationState};
use crate::panels::Panels;
use crate::posts::{build_comment, build_edit, build_post, NewPost, PostAction, PostState};
use crate::routes::Route;
use crate::search::{SearchIndex, SearchResults, SearchTab};
use tracing::info;

/// Everything the client holds, passed around explicitly instead of living in
/// globals. Stores rehydrate from `storage` on open.
pub struct AppState {
    pub auth: Store<AuthState>,
    pub posts: Store<PostState>,
    pub connections: Store<ConnectionState>,
    pub notifications: Store<NotificationState>,
    pub directory: Vec<User>,
    pub groups: Vec<Group>,
    pub events: Vec<Event>,
    pub panels: Panels,
    pub assistant: Assistant,
    storage: SharedStore,
}

/// Fixture people with the follow edges persisted on this device counted in.
fn directory_with_followers(connections: &ConnectionState) -> Vec<User> {
    let mut directory = crate::core::db::fixture_users();
    for user in &mut directory {
        let followers = connections.follower_count(&user.id) as u32;
        user.followers_count = user.followers_count.saturating_add(followers);
    }
    directory
}

impl AppState {
    pub fn open(storage: SharedStore) -> Self {
        let connections: Store<ConnectionState> = Store::open(storage.clone(), storage_key(CONNECTIONS_KEY));
        let directory = directory_with_followers(connections.state());
        let app = AppState {
            auth: Store::open(storage.clone(), storage_key(AUTH_KEY)),
            posts: Store::open(storage.clone(), storage_key(POSTS_KEY)),
            connections,
            notifications: Store::open(storage.clone(), storage_key(NOTIFICATIONS_KEY)),
            directory,
            groups: crate::core::db::fixture_groups(),
            events: crate::core::db::fixture_events(),
            panels: Panels::default(),
            assistant: Assistant::default(),
            storage,
        };
        info!(
            signed_in = app.auth.state().is_authenticated,
            posts = app.posts.state().len(),
            "app state opened"
        );
        app
    }

    /// Opens and loads the mock feed on first run.
    pub fn open_seeded(storage: SharedStore) -> anyhow::Result<Self> {
        let mut app = Self::open(storage);
        crate::core::db::seed_fixtures(&mut app)?;
        Ok(app)
    }

    /// Wipes persisted state and starts from an empty session.
    pub fn reset(&mut self) -> anyhow::Result<()> {
        self.assistant.clear();
        crate::core::db::reset_storage(&*self.storage)?;
        *self = Self::open(self.storage.clone());
        Ok(())
    }

    pub fn current_user(&self) -> Result<&User, StoreError> {
        self.auth.state().current_user()
    }

    fn current_user_owned(&self) -> Result<User, StoreError> {
        self.current_user().cloned()
    }

    /// Counters a returning user left behind in the posts and connections
    /// stores.
    fn with_counters(&self, mut user: User) -> User {
        let connections = self.connections.state();
        user.posts_count = self.posts.state().by_author(&user.id).count() as u32;
        user.following_count = connections.following_count(&user.id) as u32;
        user.followers_count = connections.follower_count(&user.id) as u32;
        user
    }

    // === Auth ===

    pub fn login(&mut self, email: &str, password: &str) -> Result<&User, StoreError> {
        self.auth.dispatch(AuthAction::SetLoading(true))?;
        match login_user(email, password) {
            Ok(user) => {
                let user = self.with_counters(user);
                info!(username = %user.username, "signed in");
                self.auth.dispatch(AuthAction::SignedIn(user))?;
                self.current_user()
            }
            Err(e) => {
                self.auth.dispatch(AuthAction::SetLoading(false))?;
                Err(e)
            }
        }
    }

    pub fn signup(&mut self, name: &str, username: &str, email: &str, password: &str) -> Result<&User, StoreError> {
        if self.directory.iter().any(|u| u.username.eq_ignore_ascii_case(username)) {
            return Err(StoreError::Conflict("Username is already taken".to_string()));
        }
        let user = self.with_counters(create_user(name, username, email, password)?);
        info!(username = %user.username, "signed up");
        self.auth.dispatch(AuthAction::SignedIn(user))?;
        self.current_user()
    }

    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.assistant.close();
        self.auth.dispatch(AuthAction::SignedOut)
    }

    pub fn update_profile(&mut self, patch: ProfilePatch) -> Result<&User, StoreError> {
        self.current_user()?;
        validate_profile_patch(&patch)?;
        self.auth.dispatch(AuthAction::ProfileUpdated(patch))?;
        self.current_user()
    }

    // === Posts ===

    pub fn compose_post(&mut self, draft: NewPost) -> Result<Post, StoreError> {
        let author = self.current_user_owned()?;
        if let Some(group_id) = &draft.group_id {
            if !self.groups.iter().any(|g| &g.id == group_id) {
                return Err(StoreError::NotFound("Group not found".to_string()));
            }
        }
        let post = build_post(&author, draft)?;
        self.posts.dispatch(PostAction::Create(post.clone()))?;
        self.auth.dispatch(AuthAction::AdjustPosts(1))?;
        Ok(post)
    }

    fn own_post(&self, post_id: &str) -> Result<(), StoreError> {
        let user = self.current_user()?;
        let post = self
            .posts
            .state()
            .get(post_id)
            .ok_or_else(|| StoreError::NotFound("Post not found".to_string()))?;
        if post.author.id != user.id {
            return Err(StoreError::Forbidden);
        }
        Ok(())
    }

    pub fn edit_post(&mut self, post_id: &str, content: &str) -> Result<(), StoreError> {
        self.own_post(post_id)?;
        self.posts.dispatch(build_edit(post_id, content)?)
    }

    pub fn delete_post(&mut self, post_id: &str) -> Result<(), StoreError> {
        self.own_post(post_id)?;
        self.posts.dispatch(PostAction::Delete(post_id.to_string()))?;
        self.auth.dispatch(AuthAction::AdjustPosts(-1))
    }

    fn require_post(&self, post_id: &str) -> Result<(), StoreError> {
        self.current_user()?;
        match self.posts.state().get(post_id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound("Post not found".to_string())),
        }
    }

    pub fn toggle_like(&mut self, post_id: &str) -> Result<(), StoreError> {
        self.require_post(post_id)?;
        self.posts.dispatch(PostAction::ToggleLike(post_id.to_string()))
    }

    pub fn toggle_bookmark(&mut self, post_id: &str) -> Result<(), StoreError> {
        self.require_post(post_id)?;
        self.posts.dispatch(PostAction::ToggleBookmark(post_id.to_string()))
    }

    pub fn share_post(&mut self, post_id: &str) -> Result<(), StoreError> {
        self.require_post(post_id)?;
        self.posts.dispatch(PostAction::Share(post_id.to_string()))
    }

    pub fn comment_on(&mut self, post_id: &str, content: &str) -> Result<(), StoreError> {
        self.require_post(post_id)?;
        let author = self.current_user_owned()?;
        let comment = build_comment(post_id, &author, content)?;
        self.posts.dispatch(PostAction::AddComment(comment))
    }

    pub fn toggle_comment_like(&mut self, post_id: &str, comment_id: &str) -> Result<(), StoreError> {
        self.require_post(post_id)?;
        self.posts.dispatch(PostAction::ToggleCommentLike {
            post_id: post_id.to_string(),
            comment_id: comment_id.to_string(),
        })
    }

    // === Connections ===

    /// Returns whether the current user follows `target_id` afterwards.
    pub fn toggle_follow(&mut self, target_id: &str) -> Result<bool, StoreError> {
        let me = self.current_user()?.id.clone();
        if !self.directory.iter().any(|u| u.id == target_id) {
            return Err(StoreError::NotFound("Target user not found".to_string()));
        }

        let action = self.connections.state().toggle_action(&me, target_id)?;
        self.connections.dispatch(action)?;
        let now_following = self.connections.state().is_following(&me, target_id);
        let delta = if now_following { 1 } else { -1 };

        if let Some(target) = self.directory.iter_mut().find(|u| u.id == target_id) {
            target.followers_count = if now_following {
                target.followers_count.saturating_add(1)
            } else {
                target.followers_count.saturating_sub(1)
            };
        }
        self.auth.dispatch(AuthAction::AdjustFollowing(delta))?;
        Ok(now_following)
    }

    pub fn is_following(&self, target_id: &str) -> bool {
        match self.current_user() {
            Ok(me) => self.connections.state().is_following(&me.id, target_id),
            Err(_) => false,
        }
    }

    /// Posts by people the current user follows plus their own, newest first.
    pub fn home_feed(&self) -> Vec<&Post> {
        let Ok(me) = self.current_user() else {
            return Vec::new();
        };
        let connections = self.connections.state();
        self.posts
            .state()
            .feed()
            .iter()
            .filter(|p| p.author.id == me.id || connections.is_following(&me.id, &p.author.id))
            .collect()
    }

    pub fn find_user(&self, username: &str) -> Option<&User> {
        let me = self.current_user().ok().filter(|u| u.username == username);
        me.or_else(|| self.directory.iter().find(|u| u.username == username))
    }

    // === Notifications ===

    pub fn notify(&mut self, kind: NotificationKind, actor: &User, target_id: Option<&str>) -> Result<Notification, StoreError> {
        let notification = build_notification(kind, actor, target_id);
        self.notifications
            .dispatch(NotificationAction::Push(notification.clone()))?;
        Ok(notification)
    }

    pub fn mark_notification_read(&mut self, id: &str) -> Result<(), StoreError> {
        self.notifications
            .dispatch(NotificationAction::MarkRead(id.to_string()))
    }

    pub fn mark_all_notifications_read(&mut self) -> Result<(), StoreError> {
        self.notifications.dispatch(NotificationAction::MarkAllRead)
    }

    // === Search & navigation ===

    pub fn search(&self, query: &str, tab: SearchTab) -> SearchResults<'_> {
        SearchIndex {
            users: &self.directory,
            posts: self.posts.state().feed(),
            groups: &self.groups,
            events: &self.events,
        }
        .search(query, tab)
    }

    pub fn navigate(&self, uri: &str) -> Route {
        Route::parse(uri).resolve(self.auth.state().is_authenticated)
    }
}
