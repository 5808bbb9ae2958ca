// URL list parsing for free-form user input

/// Split user input into URLs
///
/// Accepts commas and newlines as separators, trims whitespace and drops
/// empty entries. No further validation happens here; the downloader decides
/// what it can fetch.
pub fn split_url_list(input: &str) -> Vec<String> {
    input
        .split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
