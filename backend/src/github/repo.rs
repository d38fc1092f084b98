//! The upstream device catalogue repository.

use octocrab::params::repos::Reference;
use octocrab::Octocrab;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

pub fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

pub struct UpstreamRepo {
    client: Octocrab,
    owner: String,
    repo: String,
}

impl UpstreamRepo {
    pub fn new(client: Octocrab, owner: &str, repo: &str) -> Self {
        Self {
            client,
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    /// Whether a file or folder exists on the default branch.
    pub async fn path_exists(&self, path: &str) -> Result<bool, octocrab::Error> {
        match self
            .client
            .repos(&self.owner, &self.repo)
            .get_content()
            .path(path)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn branch_exists(&self, branch: &str) -> Result<bool, octocrab::Error> {
        match self
            .client
            .repos(&self.owner, &self.repo)
            .get_ref(&Reference::Branch(branch.to_string()))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Commit sha at the tip of `branch`.
    pub async fn branch_sha(&self, branch: &str) -> Result<String, octocrab::Error> {
        let route = format!(
            "/repos/{}/{}/git/ref/heads/{}",
            self.owner, self.repo, branch
        );
        let git_ref: GitRef = self.client.get(route, None::<&()>).await?;
        Ok(git_ref.object.sha)
    }

    pub async fn create_branch(&self, branch: &str, sha: &str) -> Result<(), octocrab::Error> {
        self.client
            .repos(&self.owner, &self.repo)
            .create_ref(&Reference::Branch(branch.to_string()), sha)
            .await?;
        Ok(())
    }

    /// Commits one new file to `branch`.
    pub async fn create_file(
        &self,
        branch: &str,
        path: &str,
        message: &str,
        content: &[u8],
    ) -> Result<(), octocrab::Error> {
        self.client
            .repos(&self.owner, &self.repo)
            .create_file(path, message, content)
            .branch(branch)
            .send()
            .await?;
        Ok(())
    }

    /// Opens a pull request and returns its web URL.
    pub async fn open_pull_request(
        &self,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> Result<Option<String>, octocrab::Error> {
        let pr = self
            .client
            .pulls(&self.owner, &self.repo)
            .create(title, head, base)
            .body(body)
            .send()
            .await?;
        Ok(pr.html_url.map(|url| url.to_string()))
    }
}
