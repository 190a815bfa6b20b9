use crate::core::helpers::{new_id, now_iso};
use crate::core::persist::{Persisted, Reducer};
use crate::models::models::{Notification, NotificationKind, User};

#[derive(Debug, Clone)]
pub enum NotificationAction {
    Push(Notification),
    MarkRead(String),
    MarkAllRead,
    Remove(String),
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
    items: Vec<Notification>,
}

pub fn build_notification(
    kind: NotificationKind,
    actor: &User,
    target_id: Option<&str>,
) -> Notification {
    let message = match kind {
        NotificationKind::Like => "liked your post",
        NotificationKind::Comment => "commented on your post",
        NotificationKind::Follow => "started following you",
        NotificationKind::Mention => "mentioned you in a post",
        NotificationKind::Share => "shared your post",
        NotificationKind::GroupInvite => "invited you to join a group",
        NotificationKind::EventReminder => "reminded you about an upcoming event",
    };
    Notification {
        id: new_id(),
        kind,
        actor: actor.clone(),
        message: format!("{} {}", actor.name, message),
        target_id: target_id.map(str::to_string),
        is_read: false,
        created_at: now_iso(),
    }
}

impl NotificationState {
    /// Newest first.
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(|n| !n.is_read)
    }

    pub fn unread_count(&self) -> usize {
        self.unread().count()
    }
}

impl Reducer for NotificationState {
    type Action = NotificationAction;

    fn reduce(&mut self, action: NotificationAction) {
        match action {
            NotificationAction::Push(notification) => self.items.insert(0, notification),
            NotificationAction::MarkRead(id) => {
                if let Some(n) = self.items.iter_mut().find(|n| n.id == id) {
                    n.is_read = true;
                }
            }
            NotificationAction::MarkAllRead => {
                self.items.iter_mut().for_each(|n| n.is_read = true);
            }
            NotificationAction::Remove(id) => self.items.retain(|n| n.id != id),
            NotificationAction::Clear => self.items.clear(),
        }
    }
}

impl Persisted for NotificationState {
    type Snapshot = Vec<Notification>;

    fn snapshot(&self) -> Vec<Notification> {
        self.items.clone()
    }

    fn restore(snapshot: Vec<Notification>) -> Self {
        NotificationState { items: snapshot }
    }
}
