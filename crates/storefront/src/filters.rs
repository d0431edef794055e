//! Askama filters shared by the page templates.

use std::fmt::Display;

/// Current year, for the footer copyright.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Content hash of `main.css`, computed by the build script.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// `tel:` link for a display phone number such as `(212) 555-0123`.
///
/// Usage in templates: `{{ phone|tel_href }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn tel_href(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(tel_link(&value.to_string()))
}

fn tel_link(phone: &str) -> String {
    let digits: String = phone
        .chars()
        .enumerate()
        .filter(|&(i, c)| c.is_ascii_digit() || (i == 0 && c == '+'))
        .map(|(_, c)| c)
        .collect();
    format!("tel:{digits}")
}
