//! Page cursors and lazy page-by-page iteration.

use std::collections::VecDeque;
use std::marker::PhantomData;

use futures::Stream;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::Client;
use crate::query::Query;
use crate::response::Response;
use crate::Error;

/// Position of a page, as advertised by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageToken {
    /// Numeric `page` parameter.
    Number(u32),
    /// Non-numeric `page` parameter.
    Token(String),
    /// `after` keyset cursor.
    After(String),
    /// `before` keyset cursor.
    Before(String),
    /// `cursor` parameter.
    Cursor(String),
}

impl PageToken {
    /// Reads the page position out of a link target's query string.
    pub fn from_url(url: &Url) -> Option<PageToken> {
        let mut after = None;
        let mut before = None;
        let mut cursor = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "page" => {
                    return Some(match value.parse::<u32>() {
                        Ok(page) => PageToken::Number(page),
                        Err(_) => PageToken::Token(value.into_owned()),
                    })
                }
                "after" if !value.is_empty() => after = Some(value.into_owned()),
                "before" if !value.is_empty() => before = Some(value.into_owned()),
                "cursor" if !value.is_empty() => cursor = Some(value.into_owned()),
                _ => {}
            }
        }
        after
            .map(PageToken::After)
            .or(before.map(PageToken::Before))
            .or(cursor.map(PageToken::Cursor))
    }
}

/// Named page cursors from a `Link` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    pub first: Option<PageToken>,
    pub prev: Option<PageToken>,
    pub next: Option<PageToken>,
    pub last: Option<PageToken>,
}

impl Links {
    /// Total page count, when the API reports a numeric last page.
    pub fn total_pages(&self) -> Option<u32> {
        match self.last {
            Some(PageToken::Number(last)) => Some(last),
            _ => None,
        }
    }
}

/// Parse a `Link` header into page cursors.
///
/// Link headers look like:
/// `<https://api.github.com/user/repos?page=3&per_page=100>; rel="next", <...?page=50>; rel="last"`
pub fn parse_link_header(link_header: &str) -> Links {
    let mut links = Links::default();

    for part in link_header.split(',') {
        let mut target = None;
        let mut rels: Vec<&str> = Vec::new();

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                target = Some(&segment[1..segment.len() - 1]);
            } else if let Some(rel) = segment.strip_prefix("rel=") {
                rels.extend(rel.trim_matches('"').split_whitespace());
            }
        }

        let Some(token) = target.and_then(parse_target).and_then(|u| PageToken::from_url(&u)) else {
            continue;
        };
        for rel in rels {
            let slot = match rel {
                "first" => &mut links.first,
                "prev" => &mut links.prev,
                "next" => &mut links.next,
                "last" => &mut links.last,
                _ => continue,
            };
            *slot = Some(token.clone());
        }
    }

    links
}

fn parse_target(target: &str) -> Option<Url> {
    Url::parse(target)
        .or_else(|_| Url::parse("https://placeholder.invalid/").and_then(|base| base.join(target)))
        .ok()
}

/// Body shape of one page of a list endpoint.
///
/// Plain JSON arrays page through `Link` headers; envelope bodies may carry
/// their own cursor, which takes precedence.
pub trait Page {
    type Item;

    /// Consumes the page, returning its items in order.
    fn into_items(self) -> Vec<Self::Item>;

    /// Cursor for the following page carried in the body, if any.
    fn next_token(&self) -> Option<PageToken> {
        None
    }
}

impl<T> Page for Vec<T> {
    type Item = T;

    fn into_items(self) -> Vec<T> {
        self
    }
}

/// A lazy, single-pass walk over every page of a list endpoint.
///
/// Pages are fetched one at a time, only when the caller asks for more.
/// After a failed fetch the pager yields nothing further.
pub struct Pager<P: Page, Q: Query> {
    client: Client,
    cancel: CancellationToken,
    path: String,
    options: Q,
    buffer: VecDeque<P::Item>,
    done: bool,
    _page: PhantomData<fn() -> P>,
}

impl<P, Q> Pager<P, Q>
where
    P: Page + DeserializeOwned,
    Q: Query,
{
    pub(crate) fn new(client: Client, cancel: CancellationToken, path: String, options: Q) -> Self {
        Self {
            client,
            cancel,
            path,
            options,
            buffer: VecDeque::new(),
            done: false,
            _page: PhantomData,
        }
    }

    /// Options that the next fetch will use.
    pub fn options(&self) -> &Q {
        &self.options
    }

    /// True once the last page has been fetched or a fetch has failed.
    pub fn is_finished(&self) -> bool {
        self.done
    }

    /// Fetch the next full page.
    ///
    /// Returns `Ok(None)` when all pages have been exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Response<Vec<P::Item>>>, Error> {
        if self.done {
            return Ok(None);
        }
        let response = match self.fetch_page().await {
            Ok(response) => response,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };

        let (page, meta) = response.into_parts();
        match page.next_token().or_else(|| meta.next_page()) {
            Some(token) => self.options = self.options.for_page(&token),
            None => self.done = true,
        }
        Ok(Some(Response {
            body: page.into_items(),
            meta,
        }))
    }

    /// Fetch the next individual item, requesting new pages as needed.
    ///
    /// Returns `Ok(None)` when all pages have been exhausted.
    pub async fn next(&mut self) -> Result<Option<P::Item>, Error> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            match self.next_page().await? {
                Some(page) => self.buffer.extend(page.body),
                None => return Ok(None),
            }
        }
    }

    /// Collect all remaining items into a `Vec`.
    pub async fn collect_all(mut self) -> Result<Vec<P::Item>, Error> {
        let mut all = Vec::new();
        while let Some(item) = self.next().await? {
            all.push(item);
        }
        Ok(all)
    }

    /// Converts the pager into a [`Stream`] of items. The stream ends after
    /// the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<P::Item, Error>> {
        futures::stream::unfold(self, |mut pager| async move {
            match pager.next().await {
                Ok(Some(item)) => Some((Ok(item), pager)),
                Ok(None) => None,
                Err(e) => Some((Err(e), pager)),
            }
        })
    }

    async fn fetch_page(&self) -> Result<Response<P>, Error> {
        let request = self.client.new_request_with_query(
            Method::GET,
            &self.path,
            Some(&self.options),
            None::<&()>,
        )?;
        self.client.execute::<P>(&self.cancel, request).await
    }
}
