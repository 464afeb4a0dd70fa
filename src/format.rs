//! Display formatting for prices, magnitudes and addresses.
//!
//! All functions are total. Non-finite numbers render as [`PLACEHOLDER`] and
//! negative numbers carry a leading `-` in front of the currency sign.

pub const PLACEHOLDER: &str = "-";

const ADDRESS_HEAD: usize = 6;
const ADDRESS_TAIL: usize = 4;

/// `$1.50B`, `$2.50M`, `$2.50K`, `$5.00`.
pub fn format_currency_magnitude(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    if value < 0.0 {
        return format!("-{}", format_currency_magnitude(-value));
    }

    if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else if value >= 1e3 {
        format!("${:.2}K", value / 1e3)
    } else {
        format!("${:.2}", value)
    }
}

/// Precision grows as the price shrinks: 6 decimals under one cent, 4 under
/// one dollar, 2 otherwise.
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return PLACEHOLDER.to_string();
    }
    if price < 0.0 {
        return format!("-{}", format_price(-price));
    }

    if price < 0.01 {
        format!("${:.6}", price)
    } else if price < 1.0 {
        format!("${:.4}", price)
    } else {
        format!("${:.2}", price)
    }
}

/// `0x1a2b3c...9f8e`. Short inputs come back untouched.
pub fn truncate_address(address: &str) -> String {
    let len = address.chars().count();
    if len <= ADDRESS_HEAD + ADDRESS_TAIL {
        return address.to_string();
    }

    let head: String = address.chars().take(ADDRESS_HEAD).collect();
    let tail: String = address.chars().skip(len - ADDRESS_TAIL).collect();
    format!("{}...{}", head, tail)
}

/// Unsigned magnitude of a percentage, the sign is conveyed by color/arrow.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    format!("{:.2}%", value.abs())
}

pub fn format_signed_percent(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

/// Integer with thousands separators, e.g. `12,345`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
