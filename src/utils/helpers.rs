//! Helper functions and utilities
//!
//! Input masks, formatting and small calculations shared by the services.

use std::sync::OnceLock;
use chrono::{DateTime, Local, Utc};
use rand::Rng;
use regex::Regex;

fn non_digit() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\D").expect("valid regex"))
}

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"))
}

/// Strip everything but ASCII digits
pub fn digits_only(value: &str) -> String {
    non_digit().replace_all(value, "").into_owned()
}

/// Apply the `000.000.000-00` CPF mask progressively, keeping at most 11 digits
pub fn mask_cpf(value: &str) -> String {
    let digits: String = digits_only(value).chars().take(11).collect();
    let mut masked = String::with_capacity(14);
    for (i, c) in digits.chars().enumerate() {
        match i {
            3 | 6 => masked.push('.'),
            9 => masked.push('-'),
            _ => {}
        }
        masked.push(c);
    }
    masked
}

/// Apply the `(00) 00000-0000` phone mask progressively, keeping at most 11 digits
pub fn mask_phone(value: &str) -> String {
    let digits: Vec<char> = digits_only(value).chars().take(11).collect();
    if digits.len() <= 2 {
        return digits.into_iter().collect();
    }

    let area: String = digits[..2].iter().collect();
    let rest = &digits[2..];
    let mut masked = format!("({}) ", area);
    for (i, c) in rest.iter().enumerate() {
        if i == 5 {
            masked.push('-');
        }
        masked.push(*c);
    }
    masked
}

/// Check a CPF has exactly eleven digits once the mask is removed
pub fn is_complete_cpf(value: &str) -> bool {
    digits_only(value).len() == 11
}

/// Validate e-mail format
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email.trim())
}

/// Format a weight the way the dashboard prints it (`2,5kg`)
pub fn format_kg(kg: f64) -> String {
    let rendered = if kg.fract() == 0.0 {
        format!("{}", kg as i64)
    } else {
        let trimmed = format!("{:.2}", kg);
        trimmed.trim_end_matches('0').trim_end_matches('.').to_string()
    };
    format!("{}kg", rendered.replace('.', ","))
}

/// Format a delivery timestamp as local `dd/mm/yyyy HH:MM`
pub fn format_delivery_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}

/// Calculate pagination offset for a 1-based page, `None` when it does not fit in `usize`
pub fn calculate_offset(page: usize, page_size: usize) -> Option<usize> {
    page.saturating_sub(1).checked_mul(page_size)
}

/// Number of pages needed for `total_items`, never less than one
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_items.div_ceil(page_size).max(1)
}

/// Build a collision-resistant storage path like `hero/9f3c0a1b2d4e5f60.jpg` for an uploaded file
pub fn random_upload_path(folder: &str, original_name: &str) -> String {
    let ext = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "bin".to_string());
    let token: u64 = rand::thread_rng().gen();
    format!("{}/{:016x}.{}", folder.trim_matches('/'), token, ext)
}
