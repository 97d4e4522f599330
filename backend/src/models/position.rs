//! Position (place) model
//!
//! A position is a named counter of indistinguishable tokens. Besides the
//! current count it keeps the throughput and occupancy statistics the
//! reporting layer derives queue lengths and utilisation from:
//!
//! - `total_inflow`: every token ever added, including the initial ones
//! - `max_tokens`: historical peak
//! - `total_busy_time`: time-integral of the indicator `tokens > 0`
//!
//! Busy time is integrated lazily: every mutation first closes the interval
//! since `last_change_time` using the token count that held during it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during position operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PositionError {
    #[error("Insufficient tokens in position '{position}': requested {requested}, available {available}")]
    InsufficientTokens {
        position: String,
        requested: u64,
        available: u64,
    },

    #[error("Token count overflow in position '{position}': {current} + {added}")]
    TokenOverflow {
        position: String,
        current: u64,
        added: u64,
    },
}

/// A place of the Petri net holding a token count
///
/// # Example
/// ```
/// use channel_petri_sim::Position;
///
/// let mut queue = Position::new("P2", 0);
/// queue.add_tokens(2, 1.0).unwrap();
/// queue.remove_tokens(2, 4.0).unwrap();
/// queue.settle(10.0);
///
/// assert_eq!(queue.tokens(), 0);
/// assert_eq!(queue.total_inflow(), 2);
/// assert_eq!(queue.max_tokens(), 2);
/// assert_eq!(queue.total_busy_time(), 3.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    name: String,
    tokens: u64,
    total_inflow: u64,
    max_tokens: u64,
    total_busy_time: f64,
    last_change_time: f64,
}

impl Position {
    /// Create a position holding `initial_tokens` at time 0
    pub fn new(name: impl Into<String>, initial_tokens: u64) -> Self {
        Self {
            name: name.into(),
            tokens: initial_tokens,
            total_inflow: initial_tokens,
            max_tokens: initial_tokens,
            total_busy_time: 0.0,
            last_change_time: 0.0,
        }
    }

    /// Add `count` tokens at `at_time`
    ///
    /// Fails without touching the marking if the inflow counter would
    /// overflow.
    ///
    /// # Panics
    /// Panics if `count` is zero; output arcs are validated to carry a
    /// positive weight.
    pub fn add_tokens(&mut self, count: u64, at_time: f64) -> Result<(), PositionError> {
        assert!(count > 0, "count must be positive");
        self.check_add(count)?;

        self.integrate_busy_time(at_time);
        self.tokens += count;
        self.total_inflow += count;
        self.max_tokens = self.max_tokens.max(self.tokens);
        Ok(())
    }

    /// Check that `count` more tokens fit without overflowing
    ///
    /// `tokens <= total_inflow` always holds, so checking the inflow
    /// counter covers both.
    pub fn check_add(&self, count: u64) -> Result<(), PositionError> {
        match self.total_inflow.checked_add(count) {
            Some(_) => Ok(()),
            None => Err(PositionError::TokenOverflow {
                position: self.name.clone(),
                current: self.total_inflow,
                added: count,
            }),
        }
    }

    /// Remove `count` tokens at `at_time`
    ///
    /// The marking is left untouched when the position holds fewer than
    /// `count` tokens.
    pub fn remove_tokens(&mut self, count: u64, at_time: f64) -> Result<(), PositionError> {
        if self.tokens < count {
            return Err(PositionError::InsufficientTokens {
                position: self.name.clone(),
                requested: count,
                available: self.tokens,
            });
        }

        self.integrate_busy_time(at_time);
        self.tokens -= count;
        Ok(())
    }

    /// True iff `weight > 0` and the position holds at least `weight` tokens
    ///
    /// A zero weight is never satisfied. "Must be empty" conditions are
    /// expressed with inhibitor arcs instead.
    pub fn has_capacity(&self, weight: u64) -> bool {
        weight > 0 && self.tokens >= weight
    }

    /// Close the busy-time interval up to `at_time` without changing tokens
    pub fn settle(&mut self, at_time: f64) {
        self.integrate_busy_time(at_time);
    }

    /// Fraction of `total_time` during which the position held tokens
    pub fn busy_ratio(&self, total_time: f64) -> f64 {
        if total_time > 0.0 {
            self.total_busy_time / total_time
        } else {
            0.0
        }
    }

    fn integrate_busy_time(&mut self, at_time: f64) {
        if at_time <= self.last_change_time {
            return;
        }
        if self.tokens > 0 {
            self.total_busy_time += at_time - self.last_change_time;
        }
        self.last_change_time = at_time;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tokens(&self) -> u64 {
        self.tokens
    }

    pub fn total_inflow(&self) -> u64 {
        self.total_inflow
    }

    pub fn max_tokens(&self) -> u64 {
        self.max_tokens
    }

    pub fn total_busy_time(&self) -> f64 {
        self.total_busy_time
    }

    pub fn last_change_time(&self) -> f64 {
        self.last_change_time
    }
}
