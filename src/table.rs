//! Sort state and row windowing for the token table.

use std::cmp::Ordering;

use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    PriceChange24h,
    Volume24h,
    MarketCap,
    Liquidity,
    Holders,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Price,
        SortField::PriceChange24h,
        SortField::Volume24h,
        SortField::MarketCap,
        SortField::Liquidity,
        SortField::Holders,
    ];

    pub fn header(self) -> &'static str {
        match self {
            SortField::Price => "Price",
            SortField::PriceChange24h => "24h %",
            SortField::Volume24h => "Volume",
            SortField::MarketCap => "Market Cap",
            SortField::Liquidity => "Liquidity",
            SortField::Holders => "Holders",
        }
    }

    /// Keyboard shortcut shown in the footer.
    pub fn key(self) -> char {
        match self {
            SortField::Price => 'p',
            SortField::PriceChange24h => 'c',
            SortField::Volume24h => 'v',
            SortField::MarketCap => 'm',
            SortField::Liquidity => 'i',
            SortField::Holders => 'h',
        }
    }

    pub fn from_key(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    pub fn value(self, token: &Token) -> f64 {
        match self {
            SortField::Price => token.price,
            SortField::PriceChange24h => token.price_change_24h,
            SortField::Volume24h => token.volume_24h,
            SortField::MarketCap => token.market_cap,
            SortField::Liquidity => token.liquidity,
            SortField::Holders => token.holders as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::Volume24h,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    /// Same field flips the direction; a new field starts descending.
    pub fn request(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.toggled();
        } else {
            self.field = field;
            self.direction = SortDirection::Descending;
        }
    }

    pub fn compare(&self, a: &Token, b: &Token) -> Ordering {
        let (a, b) = (self.field.value(a), self.field.value(b));
        match self.direction {
            SortDirection::Ascending => a.total_cmp(&b),
            SortDirection::Descending => b.total_cmp(&a),
        }
    }

    /// Header text for `field`, with the direction arrow on the active one.
    pub fn header(&self, field: SortField) -> String {
        if self.field == field {
            format!("{} {}", field.header(), self.direction.arrow())
        } else {
            field.header().to_string()
        }
    }
}

/// Stable sort, so equal keys keep their feed order in both directions.
pub fn sort_tokens(tokens: &[Token], state: SortState) -> Vec<Token> {
    let mut sorted = tokens.to_vec();
    sorted.sort_by(|a, b| state.compare(a, b));
    sorted
}

/// First row index to draw so that `cursor` stays on screen.
pub fn visible_window(cursor: usize, len: usize, height: usize) -> usize {
    if height == 0 || len <= height {
        return 0;
    }
    let cursor = cursor.min(len - 1);
    (cursor + 1).saturating_sub(height).min(len - height)
}
