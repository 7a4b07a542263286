//! Internationalization utilities for the backend
//!
//! This module provides locale extraction from HTTP requests and
//! thread-local storage for the current locale. It only affects API error
//! messages; refusals follow the script of the question instead.

use std::cell::RefCell;

// Thread-local storage for current locale
thread_local! {
    static CURRENT_LOCALE: RefCell<String> = RefCell::new(DEFAULT_LOCALE.to_string());
}

/// Supported locales
pub const SUPPORTED_LOCALES: &[&str] = &["en", "mr"];
pub const DEFAULT_LOCALE: &str = "en";

/// Set the current locale for the current thread
pub fn set_locale(locale: &str) {
    let locale = normalize_locale(locale);
    CURRENT_LOCALE.with(|l| {
        *l.borrow_mut() = locale;
    });
}

/// Get the current locale for the current thread
pub fn get_locale() -> String {
    CURRENT_LOCALE.with(|l| l.borrow().clone())
}

/// Normalize locale string to supported format
/// Accepts: "mr", "mr-IN", "mr_IN", "en", "en-US", "en_US", etc.
fn normalize_locale(locale: &str) -> String {
    let locale = locale.trim().to_lowercase();

    // Extract primary language tag
    let primary = locale
        .split(['-', '_', ',', ';'])
        .next()
        .unwrap_or(DEFAULT_LOCALE);

    SUPPORTED_LOCALES
        .iter()
        .find(|l| primary == **l)
        .unwrap_or(&DEFAULT_LOCALE)
        .to_string()
}

/// Extract locale from Accept-Language header value
pub fn extract_locale_from_header(header_value: Option<&str>) -> String {
    match header_value {
        Some(value) => normalize_locale(value),
        None => DEFAULT_LOCALE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("mr"), "mr");
        assert_eq!(normalize_locale("mr-IN"), "mr");
        assert_eq!(normalize_locale("mr_IN"), "mr");
        assert_eq!(normalize_locale("mr-IN,en;q=0.8"), "mr");
        assert_eq!(normalize_locale("en"), "en");
        assert_eq!(normalize_locale("en-US"), "en");
        assert_eq!(normalize_locale("hi-IN"), "en"); // Unsupported, fallback to default
        assert_eq!(normalize_locale("mrx"), "en");
        assert_eq!(normalize_locale(""), "en");
    }

    #[test]
    fn test_extract_locale_from_header() {
        assert_eq!(extract_locale_from_header(Some("mr-IN")), "mr");
        assert_eq!(extract_locale_from_header(None), "en");
    }

    #[test]
    fn test_set_get_locale() {
        set_locale("mr");
        assert_eq!(get_locale(), "mr");

        set_locale("en-GB");
        assert_eq!(get_locale(), "en");
    }
}
