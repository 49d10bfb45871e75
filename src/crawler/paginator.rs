//! Search results pagination
//!
//! Walks every results page of one combination and yields the offer links
//! found on them, in page order. The walk is lazy: a page is only fetched
//! once the listings of the previous one have been consumed.

use crate::crawler::fetcher::{FetchError, PageFetcher};
use scraper::{ElementRef, Html, Selector};
use std::collections::VecDeque;
use url::Url;

/// What one results page contributes to the walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsPage {
    /// Offer detail links, in document order
    pub listings: Vec<Url>,

    /// The page after this one, if the pager shows one
    pub next_page: Option<Url>,
}

/// Parses a results page
///
/// # Link Extraction Rules
///
/// An offer link is an `<a>` carrying the `photoLink` class whose `href`
/// contains `offer_marker`. Navigation and ad anchors lack one or the other.
///
/// The pager marks the current page with `a.saveSlink.selected`. There is a
/// next page when a later sibling is an unselected `a.saveSlink`; its URL is
/// the `href` of the element right after the current page.
///
/// Relative and protocol-relative links are resolved against `page_url`.
pub fn parse_results_page(html: &str, page_url: &Url, offer_marker: &str) -> ResultsPage {
    let document = Html::parse_document(html);

    ResultsPage {
        listings: extract_offer_links(&document, page_url, offer_marker),
        next_page: find_next_page(&document, page_url),
    }
}

fn extract_offer_links(document: &Html, page_url: &Url, offer_marker: &str) -> Vec<Url> {
    let Ok(selector) = Selector::parse("a.photoLink[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| href.contains(offer_marker))
        .filter_map(|href| page_url.join(href.trim()).ok())
        .collect()
}

fn find_next_page(document: &Html, page_url: &Url) -> Option<Url> {
    let selector = Selector::parse("a.saveSlink.selected").ok()?;
    let current = document.select(&selector).next()?;

    let mut following = current.next_siblings().filter_map(ElementRef::wrap);
    let next = following.next()?;

    let more_pages = std::iter::once(next)
        .chain(following)
        .any(is_unselected_page_link);
    if !more_pages {
        return None;
    }

    let href = next.value().attr("href")?;
    page_url.join(href.trim()).ok()
}

fn is_unselected_page_link(element: ElementRef<'_>) -> bool {
    let value = element.value();
    value.name() == "a"
        && value.classes().any(|class| class == "saveSlink")
        && !value.classes().any(|class| class == "selected")
}

/// Lazy, finite walk over one combination's result pages
///
/// Not restartable: once exhausted it stays exhausted.
pub struct ListingPaginator<'a> {
    fetcher: &'a PageFetcher,
    offer_marker: &'a str,
    pending: VecDeque<Url>,
    next_page: Option<Url>,
    pages_walked: usize,
    max_pages: usize,
}

impl<'a> ListingPaginator<'a> {
    /// Fetches the first results page and prepares the walk
    ///
    /// Failing to obtain the first page is returned to the caller; failing
    /// to obtain a later page ends the walk early.
    pub async fn start(
        fetcher: &'a PageFetcher,
        start_url: Url,
        offer_marker: &'a str,
        max_pages: usize,
    ) -> Result<ListingPaginator<'a>, FetchError> {
        let body = fetcher.fetch(&start_url).await?;
        let first = parse_results_page(&body, &start_url, offer_marker);

        Ok(Self {
            fetcher,
            offer_marker,
            pending: first.listings.into(),
            next_page: first.next_page,
            pages_walked: 1,
            max_pages: max_pages.max(1),
        })
    }

    /// Returns the next offer link, fetching further pages as needed
    pub async fn next_listing(&mut self) -> Option<Url> {
        loop {
            if let Some(url) = self.pending.pop_front() {
                return Some(url);
            }

            let next = self.next_page.take()?;

            if self.pages_walked >= self.max_pages {
                tracing::warn!(
                    "Page cap of {} reached, not following {}",
                    self.max_pages,
                    next
                );
                return None;
            }

            let body = match self.fetcher.fetch(&next).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Stopping pagination, next page unavailable: {}", e);
                    return None;
                }
            };

            let page = parse_results_page(&body, &next, self.offer_marker);
            self.pages_walked += 1;
            tracing::debug!(
                "Results page {} has {} listings",
                self.pages_walked,
                page.listings.len()
            );

            self.pending.extend(page.listings);
            self.next_page = page.next_page;
        }
    }

    /// Number of results pages fetched so far
    pub fn pages_walked(&self) -> usize {
        self.pages_walked
    }
}
