//! Mock token generation and the per-session token collections.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::token::{CHART_POINTS, Category, PricePoint, SocialLinks, Token};

pub const DEFAULT_TOKENS_PER_CATEGORY: usize = 10;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";
const ADDRESS_HEX_LEN: usize = 40;
const BADGE_PROBABILITY: f64 = 0.3;
const SOCIAL_PROBABILITY: f64 = 0.5;

/// Builds one fully populated token. `now` anchors the chart timestamps and
/// the creation time so the output depends only on its arguments and `rng`.
pub fn generate_token<R: Rng + ?Sized>(
    category: Category,
    index: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Token {
    let base_price = rng.gen_range(0.0..10.0);

    let chart_data = (0..CHART_POINTS)
        .map(|i| PricePoint {
            time: now - Duration::hours((CHART_POINTS - 1 - i) as i64),
            price: base_price * rng.gen_range(0.9..1.1),
        })
        .collect();

    let price_change_24h = rng.gen_range(-50.0..50.0);
    let volume_24h = rng.gen_range(0.0..10_000_000.0);
    let market_cap = rng.gen_range(0.0..50_000_000.0);
    let liquidity = rng.gen_range(0.0..5_000_000.0);
    let holders = rng.gen_range(0..10_000u64);
    let transactions_24h = rng.gen_range(0..5_000u64);
    let created_at = now - Duration::milliseconds(rng.gen_range(0..86_400_000i64));
    let address = random_address(rng);

    let badges = rng
        .gen_bool(BADGE_PROBABILITY)
        .then(|| vec!["Verified".to_string(), "Hot".to_string()]);

    let social_links = SocialLinks {
        twitter: rng
            .gen_bool(SOCIAL_PROBABILITY)
            .then(|| "https://twitter.com".to_string()),
        telegram: rng
            .gen_bool(SOCIAL_PROBABILITY)
            .then(|| "https://t.me".to_string()),
        website: rng
            .gen_bool(SOCIAL_PROBABILITY)
            .then(|| "https://example.com".to_string()),
    };

    Token {
        id: format!("token-{}-{}", category.slug(), index),
        name: format!("Token {} {}", category.slug().to_uppercase(), index + 1),
        symbol: format!("TKN{}", index),
        address,
        price: base_price,
        price_change_24h,
        volume_24h,
        market_cap,
        liquidity,
        holders,
        transactions_24h,
        created_at,
        chart_data,
        category,
        badges,
        social_links,
    }
}

fn random_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut address = String::with_capacity(ADDRESS_HEX_LEN + 2);
    address.push_str("0x");
    for _ in 0..ADDRESS_HEX_LEN {
        address.push(HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())] as char);
    }
    address
}

/// The three category collections, generated once per session and handed
/// to whoever owns them next.
#[derive(Debug, Clone)]
pub struct TokenCollections {
    pub new: Vec<Token>,
    pub final_stretch: Vec<Token>,
    pub migrated: Vec<Token>,
}

impl TokenCollections {
    pub fn generate<R: Rng + ?Sized>(per_category: usize, now: DateTime<Utc>, rng: &mut R) -> Self {
        let mut batch = |category| {
            (0..per_category)
                .map(|i| generate_token(category, i, now, &mut *rng))
                .collect::<Vec<_>>()
        };

        Self {
            new: batch(Category::New),
            final_stretch: batch(Category::Final),
            migrated: batch(Category::Migrated),
        }
    }

    pub fn into_parts(self) -> [(Category, Vec<Token>); 3] {
        [
            (Category::New, self.new),
            (Category::Final, self.final_stretch),
            (Category::Migrated, self.migrated),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }

    #[test]
    fn chart_has_24_hourly_points_oldest_first() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = fixed_now();
        for i in 0..50 {
            let token = generate_token(Category::New, i, now, &mut rng);
            assert_eq!(token.chart_data.len(), CHART_POINTS);
            assert!(token
                .chart_data
                .windows(2)
                .all(|pair| pair[0].time <= pair[1].time));
            assert_eq!(token.chart_data[CHART_POINTS - 1].time, now);
            assert_eq!(token.chart_data[0].time, now - Duration::hours(23));
            for point in &token.chart_data {
                assert!(point.price >= token.price * 0.9 - 1e-12);
                assert!(point.price <= token.price * 1.1 + 1e-12);
            }
        }
    }

    #[test]
    fn fields_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let now = fixed_now();
        for i in 0..200 {
            let token = generate_token(Category::Final, i, now, &mut rng);
            assert!((0.0..10.0).contains(&token.price));
            assert!((-50.0..50.0).contains(&token.price_change_24h));
            assert!((0.0..10_000_000.0).contains(&token.volume_24h));
            assert!((0.0..50_000_000.0).contains(&token.market_cap));
            assert!((0.0..5_000_000.0).contains(&token.liquidity));
            assert!(token.holders < 10_000);
            assert!(token.transactions_24h < 5_000);
            assert!(token.created_at <= now && token.created_at > now - Duration::hours(24));
            assert_eq!(token.address.len(), 42);
            assert!(token.address.starts_with("0x"));
            if let Some(badges) = &token.badges {
                assert_eq!(badges, &vec!["Verified".to_string(), "Hot".to_string()]);
            }
        }
    }

    #[test]
    fn identity_follows_category_and_index() {
        let mut rng = StdRng::seed_from_u64(3);
        let token = generate_token(Category::Migrated, 4, fixed_now(), &mut rng);
        assert_eq!(token.id, "token-migrated-4");
        assert_eq!(token.name, "Token MIGRATED 5");
        assert_eq!(token.symbol, "TKN4");
        assert_eq!(token.category, Category::Migrated);
    }

    #[test]
    fn seeded_source_gives_exact_values() {
        let now = fixed_now();
        let token = generate_token(Category::New, 0, now, &mut StdRng::seed_from_u64(42));

        let mut replay = StdRng::seed_from_u64(42);
        let base: f64 = replay.gen_range(0.0..10.0);
        let first_sample = base * replay.gen_range(0.9..1.1);
        assert_eq!(token.price, base);
        assert_eq!(token.chart_data[0].price, first_sample);

        let again = generate_token(Category::New, 0, now, &mut StdRng::seed_from_u64(42));
        assert_eq!(token, again);
    }

    #[test]
    fn collections_are_partitioned_by_category() {
        let mut rng = StdRng::seed_from_u64(1);
        let collections =
            TokenCollections::generate(DEFAULT_TOKENS_PER_CATEGORY, fixed_now(), &mut rng);

        let parts = collections.into_parts();
        for ((category, tokens), expected) in parts.iter().zip(Category::ALL) {
            assert_eq!(*category, expected);
            assert_eq!(tokens.len(), DEFAULT_TOKENS_PER_CATEGORY);
            assert!(tokens.iter().all(|t| t.category == expected));
            let ids: HashSet<&str> = tokens.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(ids.len(), tokens.len());
        }
    }
}
