/// Code-host entities, trimmed to the fields the commands actually display.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Project {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Repository {
    pub slug: String,
    pub name: String,
    pub full_name: String,
}

#[derive(Debug, Clone)]
pub struct PullRequest {
    pub id: u64,
    pub title: String,
    pub url: Option<String>,
}

/// Inputs for creating a pull request. `title` defaults at the adapter to
/// "Merge {source} into {destination}" when left empty.
#[derive(Debug, Clone)]
pub struct PullRequestSpec {
    pub repository: String,
    pub source_branch: String,
    pub destination_branch: String,
    pub title: Option<String>,
    pub description: Option<String>,
}
