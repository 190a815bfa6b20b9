use crate::config::*;
use crate::core::helpers::now_iso;
use crate::core::storage::KeyValueStore;
use crate::models::models::{Event, Group, NotificationKind, Post, User};
use crate::notifications::{build_notification, NotificationAction};
use crate::posts::{build_post, NewPost, PostAction};
use crate::AppState;
use tracing::info;
use uuid::Uuid;

/// Stable ids so persisted follow edges keep pointing at the same people.
fn fixture_id(n: u128) -> String {
    Uuid::from_u128(0x0c1c_1e00_0000_4000_8000_0000_0000_0000 + n).to_string()
}

fn fixture_user(n: u128, name: &str, username: &str, bio: &str, verified: bool) -> User {
    User {
        id: fixture_id(n),
        name: name.to_string(),
        username: username.to_string(),
        email: format!("{}@circle.test", username),
        avatar: Some(format!("/avatars/{}.png", username)),
        bio: Some(bio.to_string()),
        location: None,
        website: None,
        followers_count: 120 * n as u32,
        following_count: 40 + n as u32,
        posts_count: 0,
        is_verified: verified,
        joined_at: "2024-01-15T09:00:00+00:00".to_string(),
    }
}

pub fn fixture_users() -> Vec<User> {
    vec![
        fixture_user(1, "Alice Johnson", "alice", "Product designer. Coffee, bikes, typography.", true),
        fixture_user(2, "Bob Martinez", "bob", "Backend engineer who hikes on weekends.", false),
        fixture_user(3, "Chen Wei", "chenwei", "Photographer chasing golden hour.", true),
        fixture_user(4, "Dana Okafor", "dana", "Community organiser and amateur chef.", false),
    ]
}

pub fn fixture_groups() -> Vec<Group> {
    let group = |n: u128, name: &str, description: &str, category: &str, members: u32, private: bool| Group {
        id: fixture_id(100 + n),
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        members_count: members,
        is_private: private,
        is_member: false,
    };
    vec![
        group(1, "Weekend Hikers", "Trail meetups every Saturday morning.", "Outdoors", 1840, false),
        group(2, "Rustaceans", "Systems programming, borrow checker support group.", "Technology", 5210, false),
        group(3, "Film Photography", "Share scans, swap tips on developing at home.", "Arts", 930, false),
        group(4, "Neighbourhood Watch", "Local updates for residents.", "Community", 312, true),
    ]
}

pub fn fixture_events() -> Vec<Event> {
    let event = |n: u128, name: &str, description: &str, location: &str, starts_at: &str, attendees: u32| Event {
        id: fixture_id(200 + n),
        name: name.to_string(),
        description: description.to_string(),
        location: location.to_string(),
        starts_at: starts_at.to_string(),
        attendees_count: attendees,
        is_attending: false,
    };
    vec![
        event(1, "Sunrise Hike", "Easy 8km loop with breakfast at the top.", "Ridge Park", "2026-11-07T06:30:00+00:00", 42),
        event(2, "Rust Meetup", "Talks on async runtimes and embedded Rust.", "Tech Hub, Hall B", "2026-11-12T18:00:00+00:00", 118),
        event(3, "Darkroom Night", "Bring a roll, leave with prints.", "Community Arts Centre", "2026-11-20T19:00:00+00:00", 16),
    ]
}

fn fixture_posts(users: &[User]) -> anyhow::Result<Vec<Post>> {
    let texts = [
        (0, "Just shipped the new onboarding flow. Feedback welcome! #design", None),
        (1, "Saturday hike is on. Meet at the trailhead at 7. #outdoors", Some(fixture_id(101))),
        (2, "Golden hour over the harbour tonight was unreal. #photography", None),
        (3, "Cooking for 30 at the community dinner, wish me luck.", None),
    ];

    let mut posts = Vec::new();
    for (idx, content, group_id) in texts {
        let author = &users[idx];
        let mut post = build_post(
            author,
            NewPost { content: content.to_string(), attachments: Vec::new(), group_id },
        )
        .map_err(anyhow::Error::new)?;
        post.likes_count = 12 * (idx as u32 + 1);
        post.comments_count = 0;
        posts.push(post);
    }
    Ok(posts)
}

/// Loads mock posts and notifications once; a store that already holds
/// posts is left alone.
pub fn seed_fixtures(app: &mut AppState) -> anyhow::Result<()> {
    if !app.posts.state().is_empty() {
        return Ok(());
    }

    let users = fixture_users();
    // Oldest first so the feed ends up newest first
    for post in fixture_posts(&users)? {
        app.posts.dispatch(PostAction::Create(post))?;
    }

    if app.notifications.state().items().is_empty() {
        let newest = app.posts.state().feed().first().map(|p| p.id.clone());
        let seeded = [
            build_notification(NotificationKind::Follow, &users[0], None),
            build_notification(NotificationKind::GroupInvite, &users[1], Some(&fixture_id(101))),
            build_notification(NotificationKind::Like, &users[2], newest.as_deref()),
        ];
        for notification in seeded {
            app.notifications.dispatch(NotificationAction::Push(notification))?;
        }
    }

    info!(posts = app.posts.state().len(), at = %now_iso(), "seeded fixtures");
    Ok(())
}

/// Deletes every persisted key the app writes.
pub fn reset_storage(storage: &dyn KeyValueStore) -> anyhow::Result<()> {
    for name in [AUTH_KEY, POSTS_KEY, CONNECTIONS_KEY, NOTIFICATIONS_KEY] {
        storage.delete(&storage_key(name))?;
    }
    Ok(())
}
