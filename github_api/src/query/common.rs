//! Shared query infrastructure: the [`Query`] trait, [`ListOptions`], and [`SortDirection`].

use std::str::FromStr;

use url::Url;

use crate::pagination::PageToken;

/// Trait implemented by all option structs. Serializes only fields that hold
/// a non-default value, and exposes the pagination slot so pagers can move
/// through pages without knowing the concrete options type.
pub trait Query: Clone + Default + Send + Sync {
    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Returns a mutable reference to the pagination fields.
    fn list_options_mut(&mut self) -> &mut ListOptions;

    /// Sets the page number (1-indexed).
    fn with_page(mut self, page: u32) -> Self
    where
        Self: Sized,
    {
        let list = self.list_options_mut();
        list.page = Some(page);
        list.page_token = None;
        self
    }

    /// Sets an opaque page token, for endpoints that page with strings.
    fn with_page_token(mut self, token: &str) -> Self
    where
        Self: Sized,
    {
        self.list_options_mut().page_token = Some(token.to_string());
        self
    }

    /// Sets the number of results per page.
    fn with_per_page(mut self, per_page: u32) -> Self
    where
        Self: Sized,
    {
        self.list_options_mut().per_page = Some(per_page);
        self
    }

    /// Copy of these options pointed at `token`; filters and sorting are untouched.
    fn for_page(&self, token: &PageToken) -> Self
    where
        Self: Sized,
    {
        let mut next = self.clone();
        next.list_options_mut().seek(token);
        next
    }
}

/// Pagination fields shared by every list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Page number (1-indexed). `None` uses the API default.
    pub page: Option<u32>,
    /// Opaque page value; sent under the `page` key and wins over `page`.
    pub page_token: Option<String>,
    /// Results per page. `None` uses the API default.
    pub per_page: Option<u32>,
    /// Cursor for forward keyset pagination.
    pub after: Option<String>,
    /// Cursor for backward keyset pagination.
    pub before: Option<String>,
    /// Opaque cursor used by a few audit-log style endpoints.
    pub cursor: Option<String>,
}

impl ListOptions {
    /// Appends the pagination parameters to the URL.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(token) = &self.page_token {
            url.query_pairs_mut().append_pair("page", token);
        } else if let Some(page) = self.page {
            url.query_pairs_mut()
                .append_pair("page", &page.to_string());
        }
        if let Some(per_page) = self.per_page {
            url.query_pairs_mut()
                .append_pair("per_page", &per_page.to_string());
        }
        if let Some(after) = &self.after {
            url.query_pairs_mut().append_pair("after", after);
        }
        if let Some(before) = &self.before {
            url.query_pairs_mut().append_pair("before", before);
        }
        if let Some(cursor) = &self.cursor {
            url.query_pairs_mut().append_pair("cursor", cursor);
        }
        url
    }

    /// Points these options at `token`, clearing every other position field.
    pub fn seek(&mut self, token: &PageToken) {
        let per_page = self.per_page;
        *self = ListOptions {
            per_page,
            ..ListOptions::default()
        };
        match token {
            PageToken::Number(page) => self.page = Some(*page),
            PageToken::Token(token) => self.page_token = Some(token.clone()),
            PageToken::After(after) => self.after = Some(after.clone()),
            PageToken::Before(before) => self.before = Some(before.clone()),
            PageToken::Cursor(cursor) => self.cursor = Some(cursor.clone()),
        }
    }
}

impl Query for ListOptions {
    fn add_to_url(&self, url: &Url) -> Url {
        ListOptions::add_to_url(self, url)
    }

    fn list_options_mut(&mut self) -> &mut ListOptions {
        self
    }
}

/// Sort order for API results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (oldest/smallest first).
    Asc,
    /// Descending order (newest/largest first). This is the API default.
    #[default]
    Desc,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            }
        )
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}
