//! Results pagination over a multi-page mock site

use crate::common::{results_page, test_config};
use offer_sweep::crawler::{FetchError, ListingPaginator, PageFetcher};
use tempfile::tempdir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MARKER: &str = "/pcgi/mobile.cgi?act=4&";

async fn mount_page(server: &MockServer, page: usize, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/results/{}", page)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn offer_ids(urls: &[Url]) -> Vec<String> {
    urls.iter()
        .filter_map(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "adv")
                .map(|(_, value)| value.into_owned())
        })
        .collect()
}

async fn collect_all(paginator: &mut ListingPaginator<'_>) -> Vec<Url> {
    let mut urls = Vec::new();
    while let Some(url) = paginator.next_listing().await {
        urls.push(url);
    }
    urls
}

#[tokio::test]
async fn test_walks_every_page_in_order() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, results_page(&[11, 12], 1, 3)).await;
    mount_page(&mock_server, 2, results_page(&[21, 22], 2, 3)).await;
    mount_page(&mock_server, 3, results_page(&[31], 3, 3)).await;

    let scratch = tempdir().unwrap();
    let fetcher = PageFetcher::new(&test_config(scratch.path()).fetch).unwrap();
    let start = Url::parse(&format!("{}/results/1", mock_server.uri())).unwrap();

    let mut paginator = ListingPaginator::start(&fetcher, start, MARKER, 50)
        .await
        .unwrap();
    let urls = collect_all(&mut paginator).await;

    assert_eq!(offer_ids(&urls), vec!["11", "12", "21", "22", "31"]);
    assert_eq!(paginator.pages_walked(), 3);
    assert!(urls
        .iter()
        .all(|url| url.as_str().starts_with(&mock_server.uri())));

    // Exhausted paginators stay exhausted
    assert!(paginator.next_listing().await.is_none());
}

#[tokio::test]
async fn test_unavailable_later_page_ends_walk() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, results_page(&[11, 12], 1, 2)).await;
    Mock::given(method("GET"))
        .and(path("/results/2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let scratch = tempdir().unwrap();
    let fetcher = PageFetcher::new(&test_config(scratch.path()).fetch).unwrap();
    let start = Url::parse(&format!("{}/results/1", mock_server.uri())).unwrap();

    let mut paginator = ListingPaginator::start(&fetcher, start, MARKER, 50)
        .await
        .unwrap();
    let urls = collect_all(&mut paginator).await;

    assert_eq!(offer_ids(&urls), vec!["11", "12"]);
}

#[tokio::test]
async fn test_unavailable_first_page_is_an_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/results/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let scratch = tempdir().unwrap();
    let fetcher = PageFetcher::new(&test_config(scratch.path()).fetch).unwrap();
    let start = Url::parse(&format!("{}/results/1", mock_server.uri())).unwrap();

    let result = ListingPaginator::start(&fetcher, start, MARKER, 50).await;
    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_page_cap_stops_walk() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, results_page(&[11], 1, 3)).await;
    Mock::given(method("GET"))
        .and(path("/results/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[21], 2, 3)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let scratch = tempdir().unwrap();
    let fetcher = PageFetcher::new(&test_config(scratch.path()).fetch).unwrap();
    let start = Url::parse(&format!("{}/results/1", mock_server.uri())).unwrap();

    let mut paginator = ListingPaginator::start(&fetcher, start, MARKER, 1)
        .await
        .unwrap();
    let urls = collect_all(&mut paginator).await;

    assert_eq!(offer_ids(&urls), vec!["11"]);
    assert_eq!(paginator.pages_walked(), 1);
}
