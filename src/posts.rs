use crate::config::*;
use crate::core::errors::StoreError;
use crate::core::helpers::{filter_post_content, new_id, now_iso};
use crate::core::persist::{Persisted, Reducer};
use crate::core::validation::validate_length;
use crate::models::models::{Attachment, Comment, Post, User};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// What the compose box hands over.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub group_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum PostAction {
    Create(Post),
    Edit { id: String, content: String, text: String, at: String },
    ToggleLike(String),
    ToggleBookmark(String),
    Share(String),
    Delete(String),
    AddComment(Comment),
    ToggleCommentLike { post_id: String, comment_id: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostState {
    posts: Vec<Post>,
    comments: HashMap<String, Vec<Comment>>,
}

#[derive(Serialize, Deserialize)]
pub struct PostSnapshot {
    pub posts: Vec<Post>,
    pub comments: HashMap<String, Vec<Comment>>,
}

/// Sanitizes and links `content`, then checks the stored form against `max`
/// since escaping and link markup make it longer than what was typed.
fn render_content(content: &str, max: usize) -> Result<String, StoreError> {
    let html = filter_post_content(content);
    validate_length("Content", &html, max)?;
    Ok(html)
}

/// Builds a new post with a fresh id and timestamp.
pub fn build_post(author: &User, draft: NewPost) -> Result<Post, StoreError> {
    let content = draft.content.trim();
    if content.is_empty() && draft.attachments.is_empty() {
        return Err(StoreError::Validation("Write something or attach a file".to_string()));
    }
    let html = render_content(content, MAX_POST_LENGTH)?;
    if draft.attachments.len() > MAX_ATTACHMENTS {
        return Err(StoreError::Validation(format!(
            "At most {} attachments per post",
            MAX_ATTACHMENTS
        )));
    }

    Ok(Post {
        id: new_id(),
        content: html,
        text: content.to_string(),
        author: author.clone(),
        attachments: draft.attachments,
        likes_count: 0,
        comments_count: 0,
        shares_count: 0,
        is_liked: false,
        is_bookmarked: false,
        group_id: draft.group_id,
        created_at: now_iso(),
        updated_at: None,
    })
}

pub fn build_comment(post_id: &str, author: &User, content: &str) -> Result<Comment, StoreError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(StoreError::Validation("Comment cannot be empty".to_string()));
    }
    let html = render_content(content, MAX_COMMENT_LENGTH)?;

    Ok(Comment {
        id: new_id(),
        post_id: post_id.to_string(),
        content: html,
        author: author.clone(),
        likes_count: 0,
        is_liked: false,
        created_at: now_iso(),
    })
}

pub fn build_edit(id: &str, content: &str) -> Result<PostAction, StoreError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(StoreError::Validation("Content cannot be empty".to_string()));
    }
    let html = render_content(content, MAX_POST_LENGTH)?;
    Ok(PostAction::Edit {
        id: id.to_string(),
        content: html,
        text: content.to_string(),
        at: now_iso(),
    })
}

fn toggle_counter(flag: &mut bool, counter: &mut u32) {
    if *flag {
        *counter = counter.saturating_sub(1);
    } else {
        *counter = counter.saturating_add(1);
    }
    *flag = !*flag;
}

impl PostState {
    fn post_mut(&mut self, id: &str) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }

    /// Most recent first.
    pub fn feed(&self) -> &[Post] {
        &self.posts
    }

    pub fn get(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn by_author<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Post> + 'a {
        self.posts.iter().filter(move |p| p.author.id == user_id)
    }

    pub fn in_group<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a Post> + 'a {
        self.posts
            .iter()
            .filter(move |p| p.group_id.as_deref() == Some(group_id))
    }

    pub fn bookmarked(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| p.is_bookmarked)
    }

    pub fn comments_for(&self, post_id: &str) -> &[Comment] {
        self.comments.get(post_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_comment_thread(&self, post_id: &str) -> bool {
        self.comments.contains_key(post_id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl Reducer for PostState {
    type Action = PostAction;

    fn reduce(&mut self, action: PostAction) {
        match action {
            PostAction::Create(post) => {
                self.posts.insert(0, post);
            }
            PostAction::Edit { id, content, text, at } => {
                if let Some(post) = self.post_mut(&id) {
                    if post.content != content {
                        post.content = content;
                        post.text = text;
                        post.updated_at = Some(at);
                    }
                }
            }
            PostAction::ToggleLike(id) => {
                if let Some(post) = self.post_mut(&id) {
                    toggle_counter(&mut post.is_liked, &mut post.likes_count);
                }
            }
            PostAction::ToggleBookmark(id) => {
                if let Some(post) = self.post_mut(&id) {
                    post.is_bookmarked = !post.is_bookmarked;
                }
            }
            PostAction::Share(id) => {
                if let Some(post) = self.post_mut(&id) {
                    post.shares_count = post.shares_count.saturating_add(1);
                }
            }
            PostAction::Delete(id) => {
                self.posts.retain(|p| p.id != id);
                self.comments.remove(&id);
            }
            PostAction::AddComment(comment) => {
                let Some(post) = self.post_mut(&comment.post_id) else {
                    return;
                };
                post.comments_count = post.comments_count.saturating_add(1);
                self.comments
                    .entry(comment.post_id.clone())
                    .or_default()
                    .push(comment);
            }
            PostAction::ToggleCommentLike { post_id, comment_id } => {
                if let Some(comment) = self
                    .comments
                    .get_mut(&post_id)
                    .and_then(|list| list.iter_mut().find(|c| c.id == comment_id))
                {
                    toggle_counter(&mut comment.is_liked, &mut comment.likes_count);
                }
            }
        }
    }
}

impl Persisted for PostState {
    type Snapshot = PostSnapshot;

    fn snapshot(&self) -> PostSnapshot {
        PostSnapshot {
            posts: self.posts.clone(),
            comments: self.comments.clone(),
        }
    }

    fn restore(snapshot: PostSnapshot) -> Self {
        PostState {
            posts: snapshot.posts,
            comments: snapshot.comments,
        }
    }
}

fn hashtag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"#(\w+)").expect("Regex should compile"))
}

fn mention_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"@(\w+)").expect("Regex should compile"))
}

fn unique_captures(re: &Regex, content: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in re.captures_iter(content) {
        let tag = caps[1].to_lowercase();
        if !found.contains(&tag) {
            found.push(tag);
        }
    }
    found
}

/// Lowercased hashtags in order of first appearance.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    unique_captures(hashtag_regex(), content)
}

pub fn extract_mentions(content: &str) -> Vec<String> {
    unique_captures(mention_regex(), content)
}
