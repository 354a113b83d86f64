//! Search results URL construction.

use tscript_models::{LengthFilter, SearchRequest, SortBy, UploadDateFilter};

fn upload_date_code(filter: UploadDateFilter) -> Option<&'static str> {
    match filter {
        UploadDateFilter::Any => None,
        UploadDateFilter::Hour => Some("EgQIARAB"),
        UploadDateFilter::Today => Some("EgQIAhAB"),
        UploadDateFilter::Week => Some("EgQIAxAB"),
        UploadDateFilter::Month => Some("EgQIBBAB"),
    }
}

fn length_code(filter: LengthFilter) -> Option<&'static str> {
    match filter {
        LengthFilter::Any => None,
        LengthFilter::Short => Some("EgQQARgB"),
        LengthFilter::Medium => Some("EgQQARgC"),
        LengthFilter::Long => Some("EgQQARgD"),
    }
}

fn sort_code(sort_by: SortBy) -> Option<&'static str> {
    match sort_by {
        SortBy::Relevance => None,
        SortBy::Date => Some("CAI"),
        SortBy::ViewCount => Some("CAM"),
        SortBy::Rating => Some("CAE"),
    }
}

/// Build the results page path for a request, relative to the site root.
///
/// Every non-default filter is appended as its own `sp` parameter.
pub fn build_search_url(request: &SearchRequest) -> String {
    let mut url = format!(
        "/results?search_query={}",
        urlencoding::encode(request.keyword.trim())
    );

    let codes = [
        upload_date_code(request.upload_date),
        length_code(request.length),
        sort_code(request.sort_by),
    ];
    for code in codes.into_iter().flatten() {
        url.push_str("&sp=");
        url.push_str(code);
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_add_nothing() {
        let url = build_search_url(&SearchRequest::new("rust 入門", 5));
        assert_eq!(
            url,
            "/results?search_query=rust%20%E5%85%A5%E9%96%80"
        );
    }

    #[test]
    fn test_filter_codes() {
        let request = SearchRequest::new("cats", 3)
            .with_upload_date(UploadDateFilter::Week)
            .with_length(LengthFilter::Long)
            .with_sort_by(SortBy::ViewCount);
        assert_eq!(
            build_search_url(&request),
            "/results?search_query=cats&sp=EgQIAxAB&sp=EgQQARgD&sp=CAM"
        );
    }

    #[test]
    fn test_single_filter_codes() {
        let hour = SearchRequest::new("a", 1).with_upload_date(UploadDateFilter::Hour);
        assert!(build_search_url(&hour).ends_with("&sp=EgQIARAB"));

        let short = SearchRequest::new("a", 1).with_length(LengthFilter::Short);
        assert!(build_search_url(&short).ends_with("&sp=EgQQARgB"));

        let rating = SearchRequest::new("a", 1).with_sort_by(SortBy::Rating);
        assert!(build_search_url(&rating).ends_with("&sp=CAE"));
    }
}
