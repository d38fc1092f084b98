/// Environment configuration for the submission server.
/// Every variable and default is read here once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client id of the GitHub App. Required.
    pub github_client_id: String,

    /// OAuth client secret. Required. Never logged.
    pub github_client_secret: String,

    /// PEM encoded RSA key used to sign app JWTs. Required.
    pub github_private_key: String,

    /// JWT issuer.
    /// Default: the client id
    pub github_app_id: String,

    /// Repository pull requests are opened against, as `owner/repo`. Required.
    pub upstream_owner: String,
    pub upstream_repo: String,

    /// Default: main
    pub base_branch: String,

    /// Folder holding one sub-folder per device.
    /// Default: content/devices
    pub devices_path: String,

    /// Default: 127.0.0.1
    pub host: String,

    /// Default: 8080
    pub port: u16,

    /// Lifetime of an authenticated session.
    /// Default: 24
    pub session_ttl_hours: i64,

    /// Whether the session cookie carries `Secure`.
    /// Default: true
    pub cookie_secure: bool,
}

impl Config {
    /// Build config from environment variables.
    /// Returns an error naming every missing required variable.
    pub fn from_env() -> Result<Self, String> {
        let required = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let client_id = required("GITHUB_CLIENT_ID");
        let client_secret = required("GITHUB_CLIENT_SECRET");
        let private_key = required("GITHUB_PRIVATE_KEY");
        let upstream = required("UPSTREAM_REPO");

        let missing: Vec<&str> = [
            ("GITHUB_CLIENT_ID", client_id.is_none()),
            ("GITHUB_CLIENT_SECRET", client_secret.is_none()),
            ("GITHUB_PRIVATE_KEY", private_key.is_none()),
            ("UPSTREAM_REPO", upstream.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        if !missing.is_empty() {
            return Err(format!("{} must be set in .env", missing.join(", ")));
        }

        let github_client_id = client_id.unwrap_or_default();
        let (upstream_owner, upstream_repo) = split_repo(&upstream.unwrap_or_default())?;

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| "PORT must be a valid port number")?;
        let session_ttl_hours = std::env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<i64>()
            .map_err(|_| "SESSION_TTL_HOURS must be a whole number")?;
        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| !matches!(v.trim(), "0" | "false" | "no"))
            .unwrap_or(true);

        Ok(Self {
            github_app_id: std::env::var("GITHUB_APP_ID")
                .unwrap_or_else(|_| github_client_id.clone()),
            github_client_id,
            github_client_secret: client_secret.unwrap_or_default(),
            // Keys pasted into a single-line variable keep literal "\n".
            github_private_key: private_key.unwrap_or_default().replace("\\n", "\n"),
            upstream_owner,
            upstream_repo,
            base_branch: std::env::var("BASE_BRANCH").unwrap_or_else(|_| "main".to_string()),
            devices_path: std::env::var("DEVICES_PATH")
                .unwrap_or_else(|_| "content/devices".to_string())
                .trim_matches('/')
                .to_string(),
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            session_ttl_hours,
            cookie_secure,
        })
    }

    /// Path of a device folder inside the upstream repository.
    pub fn device_folder(&self, slug: &str) -> String {
        format!("{}/{}", self.devices_path, slug)
    }

    /// Config for tests. No request made with it reaches GitHub.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            github_client_id: "test-client".to_string(),
            github_client_secret: "test-secret".to_string(),
            github_private_key: String::new(),
            github_app_id: "test-client".to_string(),
            upstream_owner: "owner".to_string(),
            upstream_repo: "devices".to_string(),
            base_branch: "main".to_string(),
            devices_path: "content/devices".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            session_ttl_hours: 24,
            cookie_secure: false,
        }
    }
}

fn split_repo(value: &str) -> Result<(String, String), String> {
    match value.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(format!("UPSTREAM_REPO must look like owner/repo, got {value:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_repo_must_have_owner_and_name() {
        assert_eq!(
            split_repo("esphome/devices").unwrap(),
            ("esphome".to_string(), "devices".to_string())
        );
        assert!(split_repo("devices").is_err());
        assert!(split_repo("a/b/c").is_err());
        assert!(split_repo("/devices").is_err());
    }

    #[test]
    fn device_folder_joins_slug() {
        assert_eq!(
            Config::for_tests().device_folder("sonoff-basic"),
            "content/devices/sonoff-basic"
        );
    }
}
