use crate::core::errors::StoreError;
use crate::core::persist::{Persisted, Reducer};
use crate::models::models::Followings;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub enum FollowAction {
    Follow { follower_id: String, following_id: String },
    Unfollow { follower_id: String, following_id: String },
}

/// Follow edges keyed by follower. Ordered maps keep snapshots stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionState {
    following: BTreeMap<String, BTreeSet<String>>,
}

pub fn follow_action(follower_id: &str, following_id: &str) -> Result<FollowAction, StoreError> {
    if follower_id.is_empty() || following_id.is_empty() {
        return Err(StoreError::Validation("Invalid target user".to_string()));
    }
    if follower_id == following_id {
        return Err(StoreError::Validation("You cannot follow yourself".to_string()));
    }
    Ok(FollowAction::Follow {
        follower_id: follower_id.to_string(),
        following_id: following_id.to_string(),
    })
}

pub fn unfollow_action(follower_id: &str, following_id: &str) -> FollowAction {
    FollowAction::Unfollow {
        follower_id: follower_id.to_string(),
        following_id: following_id.to_string(),
    }
}

impl ConnectionState {
    pub fn is_following(&self, follower_id: &str, following_id: &str) -> bool {
        self.following
            .get(follower_id)
            .is_some_and(|set| set.contains(following_id))
    }

    /// Picks follow or unfollow from the current edge.
    pub fn toggle_action(&self, follower_id: &str, following_id: &str) -> Result<FollowAction, StoreError> {
        if self.is_following(follower_id, following_id) {
            Ok(unfollow_action(follower_id, following_id))
        } else {
            follow_action(follower_id, following_id)
        }
    }

    pub fn followings(&self, user_id: &str) -> Followings {
        self.following
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn followers(&self, user_id: &str) -> Vec<String> {
        self.following
            .iter()
            .filter(|(_, set)| set.contains(user_id))
            .map(|(follower, _)| follower.clone())
            .collect()
    }

    pub fn following_count(&self, user_id: &str) -> usize {
        self.following.get(user_id).map_or(0, BTreeSet::len)
    }

    pub fn follower_count(&self, user_id: &str) -> usize {
        self.following.values().filter(|set| set.contains(user_id)).count()
    }
}

impl Reducer for ConnectionState {
    type Action = FollowAction;

    fn reduce(&mut self, action: FollowAction) {
        match action {
            FollowAction::Follow { follower_id, following_id } => {
                self.following.entry(follower_id).or_default().insert(following_id);
            }
            FollowAction::Unfollow { follower_id, following_id } => {
                if let Some(set) = self.following.get_mut(&follower_id) {
                    set.remove(&following_id);
                    if set.is_empty() {
                        self.following.remove(&follower_id);
                    }
                }
            }
        }
    }
}

impl Persisted for ConnectionState {
    type Snapshot = ConnectionState;

    fn snapshot(&self) -> ConnectionState {
        self.clone()
    }

    fn restore(snapshot: ConnectionState) -> Self {
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_then_unfollow() {
        let mut state = ConnectionState::default();
        state.reduce(follow_action("me", "bob").unwrap());
        state.reduce(follow_action("alice", "bob").unwrap());
        assert!(state.is_following("me", "bob"));
        assert_eq!(state.followers("bob"), vec!["alice".to_string(), "me".to_string()]);
        assert_eq!(state.follower_count("bob"), 2);

        state.reduce(unfollow_action("me", "bob"));
        assert!(!state.is_following("me", "bob"));
        assert_eq!(state.following_count("me"), 0);
        assert!(state.followings("me").is_empty());
    }

    #[test]
    fn following_twice_is_idempotent() {
        let mut state = ConnectionState::default();
        state.reduce(follow_action("me", "bob").unwrap());
        state.reduce(follow_action("me", "bob").unwrap());
        assert_eq!(state.followings("me"), vec!["bob".to_string()]);
    }

    #[test]
    fn toggle_picks_the_opposite() {
        let mut state = ConnectionState::default();
        let action = state.toggle_action("me", "bob").unwrap();
        assert!(matches!(action, FollowAction::Follow { .. }));
        state.reduce(action);
        let action = state.toggle_action("me", "bob").unwrap();
        assert!(matches!(action, FollowAction::Unfollow { .. }));
    }

    #[test]
    fn self_follow_is_rejected() {
        assert!(matches!(follow_action("me", "me"), Err(StoreError::Validation(_))));
        assert!(follow_action("", "bob").is_err());
    }

    #[test]
    fn unfollow_unknown_edge_is_noop() {
        let mut state = ConnectionState::default();
        state.reduce(unfollow_action("me", "ghost"));
        assert_eq!(state, ConnectionState::default());
    }
}
