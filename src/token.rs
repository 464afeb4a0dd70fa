use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Number of hourly samples carried in `Token::chart_data`.
pub const CHART_POINTS: usize = 24;

/// Discovery-pipeline stage of a token. Fixed for the lifetime of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    New,
    Final,
    Migrated,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::New, Category::Final, Category::Migrated];

    pub fn slug(self) -> &'static str {
        match self {
            Category::New => "new",
            Category::Final => "final",
            Category::Migrated => "migrated",
        }
    }

    /// Tab label.
    pub fn label(self) -> &'static str {
        match self {
            Category::New => "New Pairs",
            Category::Final => "Final Stretch",
            Category::Migrated => "Migrated",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Category::New => 0,
            Category::Final => 1,
            Category::Migrated => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialKind {
    Twitter,
    Telegram,
    Website,
}

impl SocialKind {
    pub fn label(self) -> &'static str {
        match self {
            SocialKind::Twitter => "Twitter",
            SocialKind::Telegram => "Telegram",
            SocialKind::Website => "Website",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SocialLinks {
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub website: Option<String>,
}

impl SocialLinks {
    /// Present links, in twitter / telegram / website order.
    pub fn iter(&self) -> impl Iterator<Item = (SocialKind, &str)> {
        [
            (SocialKind::Twitter, self.twitter.as_deref()),
            (SocialKind::Telegram, self.telegram.as_deref()),
            (SocialKind::Website, self.website.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, url)| url.map(|url| (kind, url)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub address: String,
    pub price: f64,
    pub price_change_24h: f64, // signed percent
    pub volume_24h: f64,
    pub market_cap: f64,
    pub liquidity: f64,
    pub holders: u64,
    pub transactions_24h: u64,
    pub created_at: DateTime<Utc>,
    pub chart_data: Vec<PricePoint>,
    pub category: Category,
    pub badges: Option<Vec<String>>,
    pub social_links: SocialLinks,
}

impl Token {
    /// Two-letter avatar text shown next to the name.
    pub fn initials(&self) -> String {
        self.symbol.chars().take(2).collect()
    }

    pub fn is_up(&self) -> bool {
        self.price_change_24h >= 0.0
    }
}
