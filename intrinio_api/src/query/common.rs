//! Shared query infrastructure: the [`Query`] trait and the [`Paging`] fields.

use url::Url;

/// Trait implemented by all query builders. Provides URL serialization and
/// shared builder methods for page size and continuation tokens.
pub trait Query {
    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Returns a mutable reference to the paging fields.
    fn get_paging(&mut self) -> &mut Paging;

    /// Sets the number of results per page.
    fn with_page_size(mut self, page_size: u32) -> Self
    where
        Self: Sized,
    {
        self.get_paging().page_size = Some(page_size);
        self
    }

    /// Sets the continuation token returned by the previous page.
    fn with_next_page(mut self, next_page: &str) -> Self
    where
        Self: Sized,
    {
        self.get_paging().next_page = Some(next_page.to_string());
        self
    }
}

/// Fields shared by all paginated queries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Paging {
    /// Results per page. `None` uses the API default.
    pub page_size: Option<u32>,
    /// Continuation token. `None` requests the first page.
    pub next_page: Option<String>,
}

impl Paging {
    /// Appends the paging parameters to the URL.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(page_size) = self.page_size {
            url.query_pairs_mut()
                .append_pair("page_size", &page_size.to_string());
        }
        if let Some(next_page) = &self.next_page {
            url.query_pairs_mut().append_pair("next_page", next_page);
        }
        url
    }
}
