//! Price-cell highlighting after a live tick.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::token::Token;

pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Up,
    Down,
}

#[derive(Debug)]
struct Entry {
    last_price: f64,
    flash: Option<(Flash, Instant)>,
}

/// Remembers the last price seen per token id and flashes the direction of
/// any change for `duration`.
#[derive(Debug)]
pub struct FlashTracker {
    duration: Duration,
    entries: HashMap<String, Entry>,
}

impl FlashTracker {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            entries: HashMap::new(),
        }
    }

    /// Tokens seen for the first time are recorded without flashing.
    pub fn observe(&mut self, tokens: &[Token], now: Instant) {
        for token in tokens {
            match self.entries.get_mut(&token.id) {
                Some(entry) => {
                    let direction = if token.price > entry.last_price {
                        Some(Flash::Up)
                    } else if token.price < entry.last_price {
                        Some(Flash::Down)
                    } else {
                        None
                    };
                    if let Some(direction) = direction {
                        entry.flash = Some((direction, now + self.duration));
                    }
                    entry.last_price = token.price;
                }
                None => {
                    self.entries.insert(
                        token.id.clone(),
                        Entry {
                            last_price: token.price,
                            flash: None,
                        },
                    );
                }
            }
        }
    }

    pub fn get(&self, id: &str, now: Instant) -> Option<Flash> {
        let (flash, until) = self.entries.get(id)?.flash?;
        (now < until).then_some(flash)
    }
}
