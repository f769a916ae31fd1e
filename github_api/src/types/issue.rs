use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::users::User;

/// An issue or pull request in a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,

    /// Repository-scoped issue number.
    pub number: u64,

    pub title: String,

    /// "open" or "closed".
    pub state: String,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub user: Option<User>,

    #[serde(default)]
    pub labels: Vec<Label>,

    #[serde(default)]
    pub assignees: Vec<User>,

    #[serde(default)]
    pub comments: u64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Body for creating an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}
