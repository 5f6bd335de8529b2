//! Supply capacity over time.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed, Time};

/// Supply provided by one structure or unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyProvider {
    /// Supply provided.
    pub capacity: i32,
    /// When the provider is complete.
    #[serde(with = "fixed_serde")]
    pub created: Fixed,
    /// When the provider is lost.
    pub destroyed: Time,
}

impl SupplyProvider {
    fn alive_at(&self, time: Fixed) -> bool {
        self.created <= time && self.destroyed >= Time::At(time)
    }
}

/// All supply providers, ordered by completion time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyTrack {
    providers: Vec<SupplyProvider>,
}

impl SupplyTrack {
    /// Create an empty track.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider completing at `created`.
    pub fn add(&mut self, capacity: i32, created: Fixed) {
        let index = self.providers.partition_point(|p| p.created <= created);
        self.providers.insert(
            index,
            SupplyProvider {
                capacity,
                created,
                destroyed: Time::Never,
            },
        );
    }

    /// Lose the oldest living provider of `capacity` at `time`.
    ///
    /// Returns whether a provider was found.
    pub fn remove(&mut self, capacity: i32, time: Fixed) -> bool {
        let found = self.providers.iter_mut().find(|p| {
            p.capacity == capacity && p.created <= time && p.destroyed.is_never()
        });
        match found {
            Some(provider) => {
                provider.destroyed = Time::At(time);
                true
            }
            None => false,
        }
    }

    /// Supply capacity at `time`.
    #[must_use]
    pub fn surplus(&self, time: Fixed) -> i32 {
        self.providers
            .iter()
            .filter(|p| p.alive_at(time))
            .map(|p| p.capacity)
            .sum()
    }

    /// Earliest time capacity reaches `needed`, counting providers that
    /// are never lost.
    #[must_use]
    pub fn when(&self, needed: i32) -> Time {
        if needed <= 0 {
            return Time::ZERO;
        }
        let mut missing = needed;
        for provider in self.providers.iter().filter(|p| p.destroyed.is_never()) {
            missing -= provider.capacity;
            if missing <= 0 {
                return Time::At(provider.created);
            }
        }
        Time::Never
    }

    /// All providers.
    #[must_use]
    pub fn providers(&self) -> &[SupplyProvider] {
        &self.providers
    }
}
