use crate::core::query_params::{encode, get_string, split_path};
use crate::search::SearchTab;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Feed,
    Login,
    Signup,
    Explore,
    Groups,
    Group(String),
    Events,
    Event(String),
    Messages,
    Notifications,
    Profile(String),
    Settings,
    Search { query: String, tab: SearchTab },
    NotFound(String),
}

impl Route {
    pub fn parse(uri: &str) -> Route {
        let (path, params) = split_path(uri);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Feed,
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["explore"] => Route::Explore,
            ["groups"] => Route::Groups,
            ["groups", id] => Route::Group(id.to_string()),
            ["events"] => Route::Events,
            ["events", id] => Route::Event(id.to_string()),
            ["messages"] => Route::Messages,
            ["notifications"] => Route::Notifications,
            ["profile", username] => Route::Profile(username.to_string()),
            ["settings"] => Route::Settings,
            ["search"] => Route::Search {
                query: get_string(&params, "q", Some("")).unwrap_or_default(),
                tab: SearchTab::parse(&get_string(&params, "tab", Some("all")).unwrap_or_default()),
            },
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Feed => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Explore => "/explore".to_string(),
            Route::Groups => "/groups".to_string(),
            Route::Group(id) => format!("/groups/{}", id),
            Route::Events => "/events".to_string(),
            Route::Event(id) => format!("/events/{}", id),
            Route::Messages => "/messages".to_string(),
            Route::Notifications => "/notifications".to_string(),
            Route::Profile(username) => format!("/profile/{}", username),
            Route::Settings => "/settings".to_string(),
            Route::Search { query, tab } => {
                format!("/search?q={}&tab={}", encode(query), tab.as_str())
            }
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Pages that bounce to the login screen when signed out.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login | Route::Signup | Route::NotFound(_))
    }

    /// Where navigation actually lands given the auth state.
    pub fn resolve(self, is_authenticated: bool) -> Route {
        match self {
            route if route.requires_auth() && !is_authenticated => Route::Login,
            Route::Login | Route::Signup if is_authenticated => Route::Feed,
            route => route,
        }
    }
}
