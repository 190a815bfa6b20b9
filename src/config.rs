pub const MAX_POST_LENGTH: usize = 5000;
pub const MAX_COMMENT_LENGTH: usize = 1000;
pub const MAX_BIO_LENGTH: usize = 500;
pub const MAX_LOCATION_LENGTH: usize = 100;
pub const MAX_WEBSITE_LENGTH: usize = 200;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 30;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_ATTACHMENTS: usize = 4;

pub const AUTH_KEY: &str = "auth";
pub const POSTS_KEY: &str = "posts";
pub const CONNECTIONS_KEY: &str = "connections";
pub const NOTIFICATIONS_KEY: &str = "notifications";

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

pub fn assistant_base_delay_ms() -> u64 {
    env_u64("CIRCLE_ASSISTANT_BASE_DELAY_MS", 1000)
}

pub fn assistant_jitter_ms() -> u64 {
    env_u64("CIRCLE_ASSISTANT_JITTER_MS", 1000)
}

pub fn upload_delay_ms() -> u64 {
    env_u64("CIRCLE_UPLOAD_DELAY_MS", 500)
}

pub fn storage_namespace() -> String {
    std::env::var("CIRCLE_STORAGE_NAMESPACE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "circle".to_string())
}

/// Namespaced storage key, e.g. `circle-posts`.
pub fn storage_key(name: &str) -> String {
    format!("{}-{}", storage_namespace(), name)
}
