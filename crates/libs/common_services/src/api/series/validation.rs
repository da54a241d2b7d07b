use crate::api::series::interfaces::{CreateSeriesRequest, PostOrder, UpdateSeriesRequest};
use regex::Regex;
use std::sync::LazyLock;

static SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap()
});

#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_PATTERN.is_match(slug)
}

fn check_title(title: &str, violations: &mut Vec<String>) {
    if title.trim().is_empty() {
        violations.push("title must not be empty".to_owned());
    }
}

fn check_slug(slug: &str, violations: &mut Vec<String>) {
    if slug.is_empty() {
        violations.push("slug must not be empty".to_owned());
    } else if !is_valid_slug(slug) {
        violations.push(
            "slug may only contain lowercase letters, digits and single hyphens".to_owned(),
        );
    }
}

fn check_description(description: &str, violations: &mut Vec<String>) {
    if description.trim().is_empty() {
        violations.push("description must not be empty".to_owned());
    }
}

/// Every violation of a create payload, empty when valid.
#[must_use]
pub fn validate_create(request: &CreateSeriesRequest) -> Vec<String> {
    let mut violations = Vec::new();
    check_title(&request.title, &mut violations);
    check_slug(&request.slug, &mut violations);
    check_description(&request.description, &mut violations);
    violations
}

/// Like [`validate_create`], but only for the fields that are present.
#[must_use]
pub fn validate_update(request: &UpdateSeriesRequest) -> Vec<String> {
    let mut violations = Vec::new();
    if let Some(title) = &request.title {
        check_title(title, &mut violations);
    }
    if let Some(slug) = &request.slug {
        check_slug(slug, &mut violations);
    }
    if let Some(description) = &request.description {
        check_description(description, &mut violations);
    }
    violations
}

#[must_use]
pub fn validate_order_batch(series_id: &str, post_orders: &[PostOrder]) -> Vec<String> {
    let mut violations = Vec::new();
    if series_id.trim().is_empty() {
        violations.push("seriesId must not be empty".to_owned());
    }
    for (index, entry) in post_orders.iter().enumerate() {
        if entry.post_id.trim().is_empty() {
            violations.push(format!("postOrders[{index}].postId must not be empty"));
        }
        if entry.order < 0 {
            violations.push(format!("postOrders[{index}].order must be >= 0"));
        } else if entry.order > i64::from(i32::MAX) {
            violations.push(format!("postOrders[{index}].order must be <= {}", i32::MAX));
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_pattern() {
        for slug in ["guide", "rust-2024", "a-b-c", "0"] {
            assert!(is_valid_slug(slug), "{slug} should be valid");
        }
        for slug in ["", "Guide", "a--b", "-a", "a-", "a b", "a_b"] {
            assert!(!is_valid_slug(slug), "{slug} should be invalid");
        }
    }

    #[test]
    fn test_validate_create_collects_all_violations() {
        let request = CreateSeriesRequest {
            title: "  ".to_owned(),
            slug: "Not A Slug".to_owned(),
            description: String::new(),
            cover: None,
            published: false,
        };

        let violations = validate_create(&request);

        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_validate_update_ignores_missing_fields() {
        let request = UpdateSeriesRequest {
            slug: Some("bad slug".to_owned()),
            ..UpdateSeriesRequest::default()
        };

        assert_eq!(validate_update(&request).len(), 1);
        assert!(validate_update(&UpdateSeriesRequest::default()).is_empty());
    }

    #[test]
    fn test_validate_order_batch_reports_per_index() {
        let entries = vec![
            PostOrder {
                post_id: "a".to_owned(),
                order: 0,
            },
            PostOrder {
                post_id: String::new(),
                order: -1,
            },
            PostOrder {
                post_id: "c".to_owned(),
                order: i64::from(i32::MAX) + 1,
            },
        ];

        let violations = validate_order_batch("", &entries);

        assert_eq!(
            violations,
            vec![
                "seriesId must not be empty".to_owned(),
                "postOrders[1].postId must not be empty".to_owned(),
                "postOrders[1].order must be >= 0".to_owned(),
                format!("postOrders[2].order must be <= {}", i32::MAX),
            ]
        );
    }
}
