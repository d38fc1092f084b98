//! Backend endpoints. The bundle is served by the backend itself, so every
//! path is same-origin.

pub struct ServerConfig {
    pub submit_url: &'static str,
    pub auth_url: &'static str,
    pub check_auth_url: &'static str,
    pub logout_url: &'static str,
    pub check_slug_url: &'static str,
}

pub const SERVER: ServerConfig = ServerConfig {
    submit_url: "/submit",
    auth_url: "/auth/github",
    check_auth_url: "/auth/check",
    logout_url: "/auth/logout",
    check_slug_url: "/checkSlug",
};
