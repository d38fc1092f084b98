//! URLs for the login round trip.
//!
//! The draft is persisted before leaving for the login page; the
//! `formState=saved` marker on the return URL tells the page it came back
//! from that round trip.

/// Query parameter appended to the return URL after a forced login.
pub const FORM_STATE_PARAM: &str = "formState";

/// Builds the login start URL carrying an encoded `returnTo`.
pub fn login_url(auth_url: &str, return_to: &str) -> String {
    format!("{}?returnTo={}", auth_url, urlencoding::encode(return_to))
}

/// Rebuilds the current location with `formState=saved` in its query.
///
/// `query` may be empty or start with `?`; `hash` may be empty or start with
/// `#`. An existing `formState` parameter is replaced.
pub fn return_to_with_saved_state(path: &str, query: &str, hash: &str) -> String {
    let mut params = params_without_state(query);
    params.push(format!("{FORM_STATE_PARAM}=saved"));
    format!("{}?{}{}", path, params.join("&"), hash)
}

/// The current location minus the `formState` marker, for cleaning the
/// address bar once the draft has been restored.
pub fn without_saved_state(path: &str, query: &str, hash: &str) -> String {
    let params = params_without_state(query);
    if params.is_empty() {
        format!("{path}{hash}")
    } else {
        format!("{}?{}{}", path, params.join("&"), hash)
    }
}

fn params_without_state(query: &str) -> Vec<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(FORM_STATE_PARAM))
        .map(str::to_string)
        .collect()
}

/// True when the page was reached through the save-and-login path.
pub fn came_back_from_login(query: &str) -> bool {
    query
        .trim_start_matches('?')
        .split('&')
        .any(|pair| pair == format!("{FORM_STATE_PARAM}=saved"))
}
