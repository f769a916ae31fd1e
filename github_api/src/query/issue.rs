use chrono::{DateTime, SecondsFormat, Utc};
use url::Url;

use super::common::{ListOptions, Query, SortDirection};

/// Filters for listing a repository's issues.
#[derive(Debug, Clone, Default)]
pub struct IssueListOptions {
    pub list: ListOptions,
    pub state: Option<IssueState>,
    pub labels: Vec<String>,
    pub assignee: Option<String>,
    pub creator: Option<String>,
    pub sort: Option<IssueSort>,
    pub direction: Option<SortDirection>,
    pub since: Option<DateTime<Utc>>,
}

impl Query for IssueListOptions {
    fn list_options_mut(&mut self) -> &mut ListOptions {
        &mut self.list
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.list.add_to_url(url);
        if let Some(state) = self.state {
            url.query_pairs_mut()
                .append_pair("state", state.to_string().as_str());
        }
        if !self.labels.is_empty() {
            url.query_pairs_mut()
                .append_pair("labels", self.labels.join(",").as_str());
        }
        if let Some(assignee) = &self.assignee {
            url.query_pairs_mut().append_pair("assignee", assignee);
        }
        if let Some(creator) = &self.creator {
            url.query_pairs_mut().append_pair("creator", creator);
        }
        if let Some(sort) = self.sort {
            url.query_pairs_mut()
                .append_pair("sort", sort.to_string().as_str());
        }
        if let Some(direction) = self.direction {
            url.query_pairs_mut()
                .append_pair("direction", direction.to_string().as_str());
        }
        if let Some(since) = self.since {
            url.query_pairs_mut().append_pair(
                "since",
                since.to_rfc3339_opts(SecondsFormat::Secs, true).as_str(),
            );
        }
        url
    }
}

impl IssueListOptions {
    pub fn with_state(mut self, state: IssueState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.labels.push(label.to_string());
        self
    }

    pub fn with_labels(mut self, labels: &[String]) -> Self {
        self.labels.extend_from_slice(labels);
        self
    }

    pub fn with_assignee(mut self, assignee: &str) -> Self {
        self.assignee = Some(assignee.to_string());
        self
    }

    pub fn with_creator(mut self, creator: &str) -> Self {
        self.creator = Some(creator.to_string());
        self
    }

    pub fn with_sort(mut self, sort: IssueSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }
}

/// Issue state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    Open,
    Closed,
    All,
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                IssueState::Open => "open",
                IssueState::Closed => "closed",
                IssueState::All => "all",
            }
        )
    }
}

/// Issue sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSort {
    Created,
    Updated,
    Comments,
}

impl std::fmt::Display for IssueSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                IssueSort::Created => "created",
                IssueSort::Updated => "updated",
                IssueSort::Comments => "comments",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use url::Url;

    use super::*;
    use crate::pagination::PageToken;

    #[test]
    fn test_issue_query() {
        let url = Url::parse("https://example.com/repos/o/r/issues").unwrap();

        insta::assert_snapshot!(
            IssueListOptions::default().add_to_url(&url).to_string(),
            @"https://example.com/repos/o/r/issues"
        );

        insta::assert_snapshot!(
            IssueListOptions::default()
                .with_state(IssueState::Closed)
                .with_label("bug")
                .with_label("ui")
                .add_to_url(&url)
                .to_string(),
            @"https://example.com/repos/o/r/issues?state=closed&labels=bug%2Cui"
        );

        insta::assert_snapshot!(
            IssueListOptions::default()
                .with_sort(IssueSort::Updated)
                .with_direction(SortDirection::Asc)
                .with_since(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
                .with_page(2)
                .with_per_page(50)
                .add_to_url(&url)
                .to_string(),
            @"https://example.com/repos/o/r/issues?page=2&per_page=50&sort=updated&direction=asc&since=2024-01-02T03%3A04%3A05Z"
        );
    }

    #[test]
    fn for_page_keeps_filters() {
        let options = IssueListOptions::default()
            .with_assignee("octocat")
            .with_per_page(10)
            .with_page(1);
        let next = options.for_page(&PageToken::After("abc".to_string()));
        assert_eq!(next.assignee.as_deref(), Some("octocat"));
        assert_eq!(next.list.per_page, Some(10));
        assert_eq!(next.list.page, None);
        assert_eq!(next.list.after.as_deref(), Some("abc"));
    }
}
