use crate::models::models::{Event, Group, Post, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchTab {
    #[default]
    All,
    People,
    Posts,
    Groups,
    Events,
}

impl SearchTab {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "people" | "users" => SearchTab::People,
            "posts" => SearchTab::Posts,
            "groups" => SearchTab::Groups,
            "events" => SearchTab::Events,
            _ => SearchTab::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchTab::All => "all",
            SearchTab::People => "people",
            SearchTab::Posts => "posts",
            SearchTab::Groups => "groups",
            SearchTab::Events => "events",
        }
    }
}

/// Anything the search page can list.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.username.as_str()];
        fields.extend(self.bio.as_deref());
        fields
    }
}

impl Searchable for Post {
    fn search_fields(&self) -> Vec<&str> {
        // The stored content is escaped HTML; match what the author typed
        vec![self.text.as_str(), self.author.name.as_str(), self.author.username.as_str()]
    }
}

impl Searchable for Group {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str(), self.category.as_str()]
    }
}

impl Searchable for Event {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str(), self.location.as_str()]
    }
}

pub fn matches<T: Searchable>(item: &T, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Case-insensitive substring filter that keeps source order.
pub fn filter<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    items.iter().filter(|item| matches(*item, query)).collect()
}

#[derive(Debug, Default)]
pub struct SearchResults<'a> {
    pub people: Vec<&'a User>,
    pub posts: Vec<&'a Post>,
    pub groups: Vec<&'a Group>,
    pub events: Vec<&'a Event>,
}

impl SearchResults<'_> {
    pub fn total(&self) -> usize {
        self.people.len() + self.posts.len() + self.groups.len() + self.events.len()
    }
}

pub struct SearchIndex<'a> {
    pub users: &'a [User],
    pub posts: &'a [Post],
    pub groups: &'a [Group],
    pub events: &'a [Event],
}

impl<'a> SearchIndex<'a> {
    pub fn search(&self, query: &str, tab: SearchTab) -> SearchResults<'a> {
        let mut results = SearchResults::default();
        if matches!(tab, SearchTab::All | SearchTab::People) {
            results.people = filter(self.users, query);
        }
        if matches!(tab, SearchTab::All | SearchTab::Posts) {
            results.posts = filter(self.posts, query);
        }
        if matches!(tab, SearchTab::All | SearchTab::Groups) {
            results.groups = filter(self.groups, query);
        }
        if matches!(tab, SearchTab::All | SearchTab::Events) {
            results.events = filter(self.events, query);
        }
        results
    }
}
