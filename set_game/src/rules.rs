//! Combination rules.
//!
//! The dealer never decides validity itself; it asks a [`SetRules`]
//! implementation. [`FeatureRules`] is the classic game: every card is a
//! vector of features, and a combination is valid when, feature by feature,
//! the values are either all equal or all different.

use crate::{
    cards::Card,
    config::{ConfigError, GameConfig},
};
use std::ops::ControlFlow;

/// Validity test and search over cards.
pub trait SetRules: Send + Sync {
    /// Whether `cards` (exactly the configured feature size) form a valid
    /// combination.
    fn is_valid(&self, cards: &[Card]) -> bool;

    /// Up to `max` valid combinations drawn from `cards`.
    fn find_sets(&self, cards: &[Card], max: usize) -> Vec<Vec<Card>>;

    /// Feature vectors for hint output.
    fn cards_to_features(&self, cards: &[Card]) -> Vec<Vec<u32>>;

    /// Whether at least one valid combination exists in `cards`.
    fn any_set(&self, cards: &[Card]) -> bool {
        !self.find_sets(cards, 1).is_empty()
    }
}

/// Cards encoded as `features` digits in base `feature_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRules {
    features: usize,
    feature_size: usize,
}

impl FeatureRules {
    pub fn new(features: usize, feature_size: usize) -> Self {
        Self {
            features,
            feature_size,
        }
    }

    /// Rules matching `config`, rejecting a deck size the encoding cannot
    /// represent exactly.
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        let rules = Self::new(config.features, config.feature_size);
        let expected = rules.deck_size();
        if expected != Some(config.deck_size) {
            return Err(ConfigError::Invalid {
                field: "deck_size".to_string(),
                reason: format!(
                    "must equal feature_size^features ({}^{}) for the feature rules",
                    config.feature_size, config.features
                ),
            });
        }
        Ok(rules)
    }

    /// Number of distinct cards, `None` on overflow.
    pub fn deck_size(&self) -> Option<usize> {
        self.feature_size.checked_pow(u32::try_from(self.features).ok()?)
    }

    fn features_of(&self, card: Card) -> Vec<u32> {
        let base = self.feature_size as u32;
        let mut id = card.0;
        let mut digits = vec![0; self.features];
        for digit in digits.iter_mut().rev() {
            *digit = id % base;
            id /= base;
        }
        digits
    }
}

impl Default for FeatureRules {
    fn default() -> Self {
        Self::new(4, 3)
    }
}

impl SetRules for FeatureRules {
    fn is_valid(&self, cards: &[Card]) -> bool {
        if cards.len() != self.feature_size {
            return false;
        }
        let vectors = self.cards_to_features(cards);
        (0..self.features).all(|feature| {
            let mut values: Vec<u32> = vectors.iter().map(|v| v[feature]).collect();
            values.sort_unstable();
            values.dedup();
            values.len() == 1 || values.len() == cards.len()
        })
    }

    fn find_sets(&self, cards: &[Card], max: usize) -> Vec<Vec<Card>> {
        let mut found = Vec::new();
        if max == 0 {
            return found;
        }
        let mut candidate = Vec::with_capacity(self.feature_size);
        for_each_combination(cards.len(), self.feature_size, |indices| {
            candidate.clear();
            candidate.extend(indices.iter().map(|&i| cards[i]));
            if self.is_valid(&candidate) {
                found.push(candidate.clone());
                if found.len() >= max {
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        });
        found
    }

    fn cards_to_features(&self, cards: &[Card]) -> Vec<Vec<u32>> {
        cards.iter().map(|&card| self.features_of(card)).collect()
    }
}

/// Visit every `k`-subset of `0..n` in lexicographic order.
fn for_each_combination<F>(n: usize, k: usize, mut visit: F)
where
    F: FnMut(&[usize]) -> ControlFlow<()>,
{
    if k == 0 || k > n {
        return;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        if visit(&indices).is_break() {
            return;
        }
        // Rightmost index that can still move forward.
        let Some(pos) = (0..k).rev().find(|&i| indices[i] < n - k + i) else {
            return;
        };
        indices[pos] += 1;
        for i in pos + 1..k {
            indices[i] = indices[i - 1] + 1;
        }
    }
}
