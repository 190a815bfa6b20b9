use std::borrow::Cow;
use std::collections::HashMap;

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .unwrap_or(Cow::Borrowed(spaced.as_str()))
        .to_string()
}

/// Splits a client path into its route part and decoded query parameters.
///
/// Repeated keys keep the last value; a key without `=` maps to an empty
/// string.
///
/// # Example
/// ```
/// use circle::core::query_params::split_path;
/// let (path, params) = split_path("/search?q=rust+meetup&tab=events");
/// assert_eq!(path, "/search");
/// assert_eq!(params.get("q"), Some(&"rust meetup".to_string()));
/// ```
pub fn split_path(uri: &str) -> (&str, HashMap<String, String>) {
    match uri.split_once('?') {
        Some((path, query)) => (path, parse_query(query)),
        None => (uri, HashMap::new()),
    }
}

pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for param in query.split('&').filter(|p| !p.is_empty()) {
        match param.split_once('=') {
            Some((key, value)) => {
                params.insert(decode(key), decode(value));
            }
            None => {
                params.insert(decode(param), String::new());
            }
        }
    }
    params
}

pub fn get_string(params: &HashMap<String, String>, key: &str, default: Option<&str>) -> Option<String> {
    params
        .get(key)
        .cloned()
        .or_else(|| default.map(|d| d.to_string()))
}

/// Encodes a value for use inside a query string.
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
