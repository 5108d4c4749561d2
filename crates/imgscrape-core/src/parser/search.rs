//! Search results parser for the Custom Search JSON API
//!
//! Decodes a result page and extracts the image locators to download.

use crate::error::{Result, ScrapeError};
use crate::types::SearchResultPage;

/// Parse a search API response body.
///
/// # Arguments
/// * `body` - Raw JSON body of a successful search response
///
/// # Returns
/// * `Ok(SearchResultPage)` with the page items (possibly none)
/// * `Err(ScrapeError::MalformedResponse)` if the body is not the expected shape
///
/// # Examples
/// ```
/// use imgscrape_core::parser::parse_search_page;
///
/// let page = parse_search_page(r#"{"items":[{"link":"https://img.example/a.jpg"}]}"#).unwrap();
/// assert_eq!(page.items.len(), 1);
/// ```
pub fn parse_search_page(body: &str) -> Result<SearchResultPage> {
    serde_json::from_str(body).map_err(|e| ScrapeError::MalformedResponse(e.to_string()))
}

/// Extract image locators from a page.
///
/// Preserves page order. Items without a link, or with an empty one, are
/// skipped. An empty result means the search has no more images.
///
/// # Examples
/// ```
/// use imgscrape_core::parser::extract_locators;
/// use imgscrape_core::{ResultItem, SearchResultPage};
///
/// let page = SearchResultPage::new(vec![
///     ResultItem::with_link("https://img.example/a.jpg"),
///     ResultItem::default(),
///     ResultItem::with_link("https://img.example/b.jpg"),
/// ]);
/// assert_eq!(
///     extract_locators(&page),
///     vec!["https://img.example/a.jpg", "https://img.example/b.jpg"]
/// );
/// ```
pub fn extract_locators(page: &SearchResultPage) -> Vec<String> {
    page.items
        .iter()
        .filter_map(|item| item.link.as_deref())
        .filter(|link| !link.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep only the first `remaining` locators of a page.
pub fn plan_batch(mut locators: Vec<String>, remaining: u32) -> Vec<String> {
    locators.truncate(remaining as usize);
    locators
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResultItem;

    #[test]
    fn test_parse_page_with_items() {
        let body = r#"{
            "kind": "customsearch#search",
            "items": [
                {"title": "Cat", "link": "https://img.example/cat.jpg", "mime": "image/jpeg"},
                {"title": "No link"}
            ]
        }"#;
        let page = parse_search_page(body).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].mime.as_deref(), Some("image/jpeg"));
        assert!(page.items[1].link.is_none());
    }

    #[test]
    fn test_parse_page_without_items() {
        let page = parse_search_page(r#"{"searchInformation":{"totalResults":"0"}}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(extract_locators(&page).is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_search_page("<html>not json</html>");
        assert!(matches!(result, Err(ScrapeError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_items_wrong_type() {
        let result = parse_search_page(r#"{"items":"nope"}"#);
        assert!(matches!(result, Err(ScrapeError::MalformedResponse(_))));

        let result = parse_search_page(r#"{"items":[{"link":42}]}"#);
        assert!(matches!(result, Err(ScrapeError::MalformedResponse(_))));
    }

    #[test]
    fn test_extract_skips_missing_and_empty_links() {
        let page = SearchResultPage::new(vec![
            ResultItem::with_link("https://img.example/1.jpg"),
            ResultItem::default(),
            ResultItem::with_link(""),
            ResultItem::with_link("https://img.example/2.jpg"),
        ]);
        assert_eq!(
            extract_locators(&page),
            vec!["https://img.example/1.jpg", "https://img.example/2.jpg"]
        );
    }

    #[test]
    fn test_plan_batch_truncates() {
        let locators: Vec<String> = (1..=4).map(|i| format!("https://img.example/{i}.jpg")).collect();
        let batch = plan_batch(locators.clone(), 2);
        assert_eq!(batch, locators[..2].to_vec());

        let batch = plan_batch(locators.clone(), 10);
        assert_eq!(batch, locators);
    }
}
