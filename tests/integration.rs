use circle::auth::ProfilePatch;
use circle::core::errors::StoreError;
use circle::core::storage::{FileStore, JsonStoreExt, KeyValueStore, MemoryStore, SharedStore};
use circle::media::upload_after;
use circle::models::models::NotificationKind;
use circle::panels::PanelState;
use circle::posts::NewPost;
use circle::routes::Route;
use circle::search::SearchTab;
use circle::AppState;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn signed_in(storage: SharedStore) -> AppState {
    init_tracing();
    let mut app = AppState::open(storage);
    app.login("ada.lovelace@example.com", "engine1843").unwrap();
    app
}

fn draft(content: &str) -> NewPost {
    NewPost { content: content.to_string(), ..NewPost::default() }
}

#[test]
fn test_full_user_flow() {
    let _lock = lock_env();
    let storage = MemoryStore::shared();

    // 1. Sign in
    let mut app = AppState::open(storage.clone());
    assert_eq!(app.navigate("/settings"), Route::Login);
    let user = app.login("ada.lovelace@example.com", "engine1843").unwrap().clone();
    assert_eq!(user.name, "Ada Lovelace");
    assert_eq!(app.navigate("/login"), Route::Feed);

    // 2. Create post
    let post = app.compose_post(draft("hello")).unwrap();
    assert_eq!(post.likes_count, 0);
    assert!(!post.is_liked);
    assert_eq!(app.posts.state().feed().len(), 1);
    assert_eq!(app.current_user().unwrap().posts_count, 1);

    // 3. Like twice
    app.toggle_like(&post.id).unwrap();
    let liked = app.posts.state().get(&post.id).unwrap();
    assert_eq!((liked.likes_count, liked.is_liked), (1, true));
    app.toggle_like(&post.id).unwrap();
    let unliked = app.posts.state().get(&post.id).unwrap();
    assert_eq!((unliked.likes_count, unliked.is_liked), (0, false));

    // 4. Comment, then delete
    app.comment_on(&post.id, "first!").unwrap();
    assert_eq!(app.posts.state().comments_for(&post.id).len(), 1);
    app.delete_post(&post.id).unwrap();
    assert!(app.posts.state().get(&post.id).is_none());
    assert!(!app.posts.state().has_comment_thread(&post.id));
    assert_eq!(app.current_user().unwrap().posts_count, 0);

    // 5. Logout
    app.logout().unwrap();
    assert!(app.current_user().is_err());
    assert!(matches!(app.compose_post(draft("nope")), Err(StoreError::Unauthenticated)));
}

#[test]
fn test_state_survives_reload() {
    let _lock = lock_env();
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStore::shared(dir.path()).unwrap();

    let (post_id, snapshot_posts) = {
        let mut app = signed_in(storage.clone());
        let post = app.compose_post(draft("persist me #keep")).unwrap();
        app.toggle_bookmark(&post.id).unwrap();
        app.comment_on(&post.id, "noted").unwrap();
        let bob = app.find_user("bob").unwrap().id.clone();
        app.toggle_follow(&bob).unwrap();
        (post.id, app.posts.state().clone())
    };

    let reopened = AppState::open(FileStore::shared(dir.path()).unwrap());
    assert!(reopened.auth.state().is_authenticated);
    assert_eq!(reopened.current_user().unwrap().email, "ada.lovelace@example.com");
    assert_eq!(reopened.posts.state(), &snapshot_posts);
    assert!(reopened.posts.state().get(&post_id).unwrap().is_bookmarked);
    let bob = reopened.find_user("bob").unwrap().id.clone();
    assert!(reopened.is_following(&bob));
}

#[test]
fn test_snapshot_shape_uses_camel_case() {
    let _lock = lock_env();
    let storage = MemoryStore::shared();
    let mut app = signed_in(storage.clone());
    app.compose_post(draft("shape")).unwrap();

    let raw: serde_json::Value = storage.get_json("circle-posts").unwrap().unwrap();
    let post = &raw["posts"][0];
    assert_eq!(post["likesCount"], 0);
    assert_eq!(post["isLiked"], false);

    let auth: serde_json::Value = storage.get_json("circle-auth").unwrap().unwrap();
    assert_eq!(auth["isAuthenticated"], true);
    assert!(auth.get("isLoading").is_none());
}

#[test]
fn test_storage_namespace_from_env() {
    let _lock = lock_env();
    std::env::set_var("CIRCLE_STORAGE_NAMESPACE", "staging");
    let storage = MemoryStore::shared();
    let mut app = signed_in(storage.clone());
    app.compose_post(draft("namespaced")).unwrap();
    std::env::remove_var("CIRCLE_STORAGE_NAMESPACE");

    assert!(storage.exists("staging-posts").unwrap());
    assert!(!storage.exists("circle-posts").unwrap());
}

#[test]
fn test_cannot_touch_other_peoples_posts() {
    let _lock = lock_env();
    let mut app = AppState::open_seeded(MemoryStore::shared()).unwrap();
    app.login("ada@example.com", "engine1843").unwrap();

    let foreign = app.posts.state().feed()[0].id.clone();
    assert_eq!(app.delete_post(&foreign), Err(StoreError::Forbidden));
    assert_eq!(app.edit_post(&foreign, "mine now"), Err(StoreError::Forbidden));
    assert!(matches!(app.toggle_like("missing"), Err(StoreError::NotFound(_))));

    // Liking someone else's post is fine
    app.toggle_like(&foreign).unwrap();
}

#[test]
fn test_seeding_is_idempotent() {
    let _lock = lock_env();
    let storage = MemoryStore::shared();
    let first = AppState::open_seeded(storage.clone()).unwrap();
    let count = first.posts.state().len();
    assert!(count > 0);
    assert_eq!(first.notifications.state().unread_count(), 3);

    let second = AppState::open_seeded(storage).unwrap();
    assert_eq!(second.posts.state().len(), count);
}

#[test]
fn test_follow_drives_home_feed() {
    let _lock = lock_env();
    let mut app = AppState::open_seeded(MemoryStore::shared()).unwrap();
    app.login("ada@example.com", "engine1843").unwrap();
    assert!(app.home_feed().is_empty());

    let bob = app.find_user("bob").unwrap().clone();
    assert!(app.toggle_follow(&bob.id).unwrap());
    assert_eq!(app.current_user().unwrap().following_count, 1);
    assert_eq!(app.find_user("bob").unwrap().followers_count, bob.followers_count + 1);
    assert!(app.home_feed().iter().all(|p| p.author.id == bob.id));
    assert!(!app.home_feed().is_empty());

    let mine = app.compose_post(draft("my own")).unwrap();
    assert_eq!(app.home_feed()[0].id, mine.id);

    assert!(!app.toggle_follow(&bob.id).unwrap());
    assert_eq!(app.current_user().unwrap().following_count, 0);

    assert!(matches!(app.toggle_follow("ghost"), Err(StoreError::NotFound(_))));
}

#[test]
fn test_signing_back_in_keeps_ownership() {
    let _lock = lock_env();
    let storage = MemoryStore::shared();
    let mut app = AppState::open_seeded(storage.clone()).unwrap();

    // 1. First session: post and follow
    let first_id = app.login("ada@example.com", "engine1843").unwrap().id.clone();
    let keep = app.compose_post(draft("still mine")).unwrap();
    let gone = app.compose_post(draft("delete me later")).unwrap();
    let bob = app.find_user("bob").unwrap().id.clone();
    app.toggle_follow(&bob).unwrap();
    app.logout().unwrap();

    // 2. Same email, different casing, new process
    let mut app = AppState::open(storage);
    let user = app.login("ADA@example.com", "another99").unwrap().clone();
    assert_eq!(user.id, first_id);
    assert_eq!(user.posts_count, 2);
    assert_eq!(user.following_count, 1);
    assert!(app.is_following(&bob));

    // 3. Own posts are still editable
    app.edit_post(&keep.id, "still mine, edited").unwrap();
    app.delete_post(&gone.id).unwrap();
    assert_eq!(app.current_user().unwrap().posts_count, 1);
}

#[test]
fn test_follower_counts_survive_reload() {
    let _lock = lock_env();
    let storage = MemoryStore::shared();
    let mut app = AppState::open_seeded(storage.clone()).unwrap();
    app.login("ada@example.com", "engine1843").unwrap();
    let baseline = app.find_user("bob").unwrap().followers_count;
    let bob = app.find_user("bob").unwrap().id.clone();

    // 1. Follow
    app.toggle_follow(&bob).unwrap();
    assert_eq!(app.find_user("bob").unwrap().followers_count, baseline + 1);

    // 2. Reload keeps the edge and the count together
    let mut app = AppState::open(storage);
    assert!(app.is_following(&bob));
    assert_eq!(app.find_user("bob").unwrap().followers_count, baseline + 1);

    // 3. Unfollow lands back on the baseline
    assert!(!app.toggle_follow(&bob).unwrap());
    assert_eq!(app.find_user("bob").unwrap().followers_count, baseline);
}

#[test]
fn test_search_across_tabs() {
    let _lock = lock_env();
    let mut app = AppState::open_seeded(MemoryStore::shared()).unwrap();
    assert_eq!(app.navigate("/search?q=rust"), Route::Login);
    app.login("ada@example.com", "engine1843").unwrap();

    let hike = app.search("HIKE", SearchTab::All);
    assert!(hike.people.iter().any(|u| u.username == "bob"));
    assert!(hike.groups.iter().any(|g| g.name == "Weekend Hikers"));
    assert!(hike.events.iter().any(|e| e.name == "Sunrise Hike"));
    assert!(hike.posts.iter().all(|p| p.text.to_lowercase().contains("hike")
        || p.author.name.to_lowercase().contains("hike")
        || p.author.username.to_lowercase().contains("hike")));

    let only_events = app.search("rust", SearchTab::Events);
    assert!(only_events.people.is_empty());
    assert!(only_events.groups.is_empty());
    assert_eq!(only_events.events.len(), 1);

    match app.navigate("/search?q=rust&tab=groups") {
        Route::Search { query, tab } => {
            assert_eq!(app.search(&query, tab).groups.len(), 1);
        }
        other => panic!("unexpected route {:?}", other),
    }
}

#[test]
fn test_profile_update_and_validation() {
    let _lock = lock_env();
    let mut app = signed_in(MemoryStore::shared());

    let patch = ProfilePatch {
        bio: Some("Poet of science".to_string()),
        website: Some("https://ada.dev".to_string()),
        ..ProfilePatch::default()
    };
    let user = app.update_profile(patch).unwrap();
    assert_eq!(user.bio.as_deref(), Some("Poet of science"));

    let bad = ProfilePatch { website: Some("ada.dev".to_string()), ..ProfilePatch::default() };
    assert!(matches!(app.update_profile(bad), Err(StoreError::Validation(_))));
    assert_eq!(app.current_user().unwrap().website.as_deref(), Some("https://ada.dev"));

    assert!(matches!(
        app.signup("Bob Two", "bob", "bob2@example.com", "trail2026"),
        Err(StoreError::Conflict(_))
    ));
}

#[test]
fn test_notifications_flow() {
    let _lock = lock_env();
    let mut app = AppState::open_seeded(MemoryStore::shared()).unwrap();
    let actor = app.directory[3].clone();
    let n = app.notify(NotificationKind::Mention, &actor, None).unwrap();
    assert_eq!(app.notifications.state().unread_count(), 4);

    app.mark_notification_read(&n.id).unwrap();
    assert_eq!(app.notifications.state().unread_count(), 3);
    app.mark_all_notifications_read().unwrap();
    assert_eq!(app.notifications.state().unread_count(), 0);
}

#[test]
fn test_reset_clears_everything() {
    let _lock = lock_env();
    let storage = MemoryStore::shared();
    let mut app = signed_in(storage.clone());
    app.compose_post(draft("temporary")).unwrap();

    app.reset().unwrap();
    assert!(app.posts.state().is_empty());
    assert!(app.current_user().is_err());
    assert!(storage.get_keys().unwrap().is_empty());
}

#[tokio::test]
async fn test_attachment_post_and_assistant() {
    let storage = MemoryStore::shared();
    let mut app = {
        let _lock = lock_env();
        signed_in(storage)
    };

    let token = CancellationToken::new();
    let photo = upload_after("sunset.jpg", Duration::from_millis(1), &token).await.unwrap();
    let post = app
        .compose_post(NewPost { attachments: vec![photo], ..NewPost::default() })
        .unwrap();
    assert_eq!(post.attachments[0].name, "sunset.jpg");

    app.assistant = circle::assistant::Assistant::with_delay(Duration::from_millis(200), Duration::ZERO);
    let pending = app.assistant.ask("any events?").unwrap();
    assert_eq!(app.assistant.toggle(), PanelState::Closed);
    assert_eq!(pending.wait().await.unwrap_err(), StoreError::Cancelled);
    assert_eq!(app.assistant.messages().len(), 1);

    let pending = app.assistant.ask("and groups?").unwrap();
    assert_eq!(app.assistant.panel(), PanelState::Open);
    app.logout().unwrap();
    assert_eq!(pending.wait().await.unwrap_err(), StoreError::Cancelled);
    assert_eq!(app.assistant.messages().len(), 2);
}
