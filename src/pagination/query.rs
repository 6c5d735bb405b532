use url::form_urlencoded;

use crate::errors::{AppError, ParamProblem};

/// Page size used when `size` is absent or not positive.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// List query parameters exactly as they arrive on the URL.
///
/// Numbers are kept as strings so a malformed value can be reported with the
/// API's own error envelope instead of the framework rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListParams {
    pub page: Option<String>,
    pub size: Option<String>,
    pub search: Option<String>,
    pub order_by: Option<String>,
}

impl RawListParams {
    /// Read the list keys from a raw query string. When a key repeats, the
    /// first occurrence wins; unknown keys are ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut raw = Self::default();
        let Some(query) = query else {
            return raw;
        };

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "page" => &mut raw.page,
                "size" => &mut raw.size,
                "search" => &mut raw.search,
                "orderBy" => &mut raw.order_by,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        raw
    }
}

/// Parsed list parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: i64,
    pub size: i64,
    pub search: Option<String>,
    pub order_by: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
            search: None,
            order_by: None,
        }
    }
}

impl TryFrom<RawListParams> for ListParams {
    type Error = AppError;

    fn try_from(raw: RawListParams) -> Result<Self, Self::Error> {
        Ok(Self {
            page: parse_number(raw.page.as_deref())?.unwrap_or(1),
            size: parse_number(raw.size.as_deref())?.unwrap_or(DEFAULT_PAGE_SIZE),
            search: non_blank(raw.search),
            order_by: non_blank(raw.order_by),
        })
    }
}

fn parse_number(value: Option<&str>) -> Result<Option<i64>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .map(Some)
            .map_err(|e| AppError::InvalidQueryParam(ParamProblem::from(&e))),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(page: Option<&str>, size: Option<&str>) -> RawListParams {
        RawListParams {
            page: page.map(String::from),
            size: size.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_when_absent() {
        let params = ListParams::try_from(RawListParams::default()).unwrap();
        assert_eq!(params, ListParams::default());
        assert_eq!(params.size, 10);
        assert_eq!(params.page, 1);
    }

    #[test]
    fn empty_values_use_defaults() {
        let params = ListParams::try_from(raw(Some(""), Some(" "))).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn parses_numbers_and_text() {
        let params = ListParams::try_from(RawListParams {
            page: Some("3".to_string()),
            size: Some("25".to_string()),
            search: Some("  budi ".to_string()),
            order_by: Some("email".to_string()),
        })
        .unwrap();
        assert_eq!(params.page, 3);
        assert_eq!(params.size, 25);
        assert_eq!(params.search.as_deref(), Some("budi"));
        assert_eq!(params.order_by.as_deref(), Some("email"));
    }

    #[test]
    fn non_numeric_page_is_invalid() {
        let err = ListParams::try_from(raw(Some("two"), None)).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidQueryParam(ParamProblem::Invalid)
        ));
    }

    #[test]
    fn huge_size_is_out_of_range() {
        let err = ListParams::try_from(raw(None, Some("92233720368547758070"))).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidQueryParam(ParamProblem::OutOfRange)
        ));
    }

    #[test]
    fn from_query_keeps_first_of_repeated_keys() {
        let raw =
            RawListParams::from_query(Some("page=1&page=2&orderBy=-name&search=ali+b&lang=en"));
        assert_eq!(
            raw,
            RawListParams {
                page: Some("1".to_string()),
                size: None,
                search: Some("ali b".to_string()),
                order_by: Some("-name".to_string()),
            }
        );
        assert_eq!(RawListParams::from_query(None), RawListParams::default());
    }

    #[test]
    fn blank_search_is_dropped() {
        let params = ListParams::try_from(RawListParams {
            search: Some("   ".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(params.search.is_none());
    }
}
