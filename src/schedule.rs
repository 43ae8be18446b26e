//! Token-source scheduling
//!
//! Decides, for every zero-based output position, which backend generates the token.
//! The decision is a pure function of the position, the warm-up length and the mix
//! ratio: the first `warmup_count` positions always go to the primary backend, after
//! which every `interval`-th position (starting at the first post-warm-up position)
//! goes to the secondary backend.

use serde::{Deserialize, Serialize};

/// Backend chosen for a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Primary,
    Secondary,
}

/// Display tag of an emitted token. `Initial` tokens come from the primary backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenOrigin {
    Initial,
    Secondary,
    Primary,
}

impl TokenOrigin {
    pub fn backend(self) -> Backend {
        match self {
            TokenOrigin::Initial | TokenOrigin::Primary => Backend::Primary,
            TokenOrigin::Secondary => Backend::Secondary,
        }
    }
}

/// Spacing between consecutive secondary positions. Zero means "never secondary".
pub fn stride(mix_ratio: f64) -> usize {
    if mix_ratio.is_nan() || mix_ratio <= 0.0 {
        return 0;
    }
    if mix_ratio >= 1.0 {
        return 1;
    }
    (1.0 / mix_ratio).floor() as usize
}

/// Backend for `position` given the warm-up length and mix ratio.
pub fn decide(position: usize, warmup_count: usize, mix_ratio: f64) -> Backend {
    Schedule::new(warmup_count, mix_ratio).decide(position)
}

/// Precomputed schedule for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    warmup_count: usize,
    interval: usize,
}

impl Schedule {
    pub fn new(warmup_count: usize, mix_ratio: f64) -> Self {
        Self {
            warmup_count,
            interval: stride(mix_ratio),
        }
    }

    pub fn warmup_count(&self) -> usize {
        self.warmup_count
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    pub fn decide(&self, position: usize) -> Backend {
        if position < self.warmup_count {
            return Backend::Primary;
        }
        let offset = position - self.warmup_count;
        if self.interval > 0 && offset % self.interval == 0 {
            Backend::Secondary
        } else {
            Backend::Primary
        }
    }

    pub fn origin(&self, position: usize) -> TokenOrigin {
        if position < self.warmup_count {
            return TokenOrigin::Initial;
        }
        match self.decide(position) {
            Backend::Primary => TokenOrigin::Primary,
            Backend::Secondary => TokenOrigin::Secondary,
        }
    }
}
