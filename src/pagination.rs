//! Page-token accumulation shared by every listing helper

use serde_json::Value;
use std::future::Future;

/// One fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from a raw response, reading the continuation token from `token_key`
    pub fn from_response(
        response: &Value,
        token_key: &str,
        extract: impl FnOnce(&Value) -> Vec<T>,
    ) -> Self {
        Self {
            items: extract(response),
            next_token: response
                .get(token_key)
                .and_then(Value::as_str)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        }
    }
}

/// Position of the next page to fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
    /// Continuation token from the previous page; the caller's own token on the first call
    pub token: Option<String>,
    /// Number of items collected so far
    pub fetched: usize,
}

/// Fetch all pages (auto-paginate), concatenating items in page order.
///
/// Stops as soon as a page comes back without a continuation token.
pub async fn collect_pages<T, E, F, Fut>(
    first_token: Option<String>,
    mut fetch_page: F,
) -> Result<Vec<T>, E>
where
    F: FnMut(PageCursor) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut all_items = Vec::new();
    let mut cursor = PageCursor {
        token: first_token,
        fetched: 0,
    };
    let mut pages = 0usize;

    loop {
        let page = fetch_page(cursor.clone()).await?;
        pages += 1;
        all_items.extend(page.items);
        tracing::debug!("page {} fetched, {} items so far", pages, all_items.len());

        match page.next_token {
            Some(token) => {
                cursor = PageCursor {
                    token: Some(token),
                    fetched: all_items.len(),
                }
            },
            None => break,
        }
    }

    Ok(all_items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[tokio::test]
    async fn test_collects_pages_in_order() {
        let calls = RefCell::new(Vec::new());

        let items: Result<Vec<i32>, ()> = collect_pages(None, |cursor| {
            calls.borrow_mut().push(cursor.clone());
            let page = match cursor.token.as_deref() {
                None => Page {
                    items: vec![1, 2],
                    next_token: Some("t2".into()),
                },
                Some("t2") => Page {
                    items: vec![3],
                    next_token: Some("t3".into()),
                },
                _ => Page {
                    items: vec![4, 5],
                    next_token: None,
                },
            };
            async move { Ok(page) }
        })
        .await;

        assert_eq!(items.unwrap(), vec![1, 2, 3, 4, 5]);
        let calls = calls.into_inner();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].fetched, 2);
        assert_eq!(calls[2].token.as_deref(), Some("t3"));
        assert_eq!(calls[2].fetched, 3);
    }

    #[tokio::test]
    async fn test_error_stops_pagination() {
        let result: Result<Vec<i32>, &str> =
            collect_pages(Some("start".into()), |_| async { Err("boom") }).await;
        assert_eq!(result.unwrap_err(), "boom");
    }

    #[test]
    fn test_page_from_response() {
        let response = json!({"items": [1, 2], "nextPageToken": "abc"});
        let page = Page::from_response(&response, "nextPageToken", |r| {
            r["items"].as_array().cloned().unwrap_or_default()
        });
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_token.as_deref(), Some("abc"));

        let last = Page::<Value>::from_response(&json!({"nextPageToken": ""}), "nextPageToken", |_| vec![]);
        assert!(last.next_token.is_none());
    }
}
