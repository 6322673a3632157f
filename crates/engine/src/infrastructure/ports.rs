//! Port traits for infrastructure boundaries.
//!
//! Participants are the domain's port (`dlgflow_domain::Participant`); the
//! engine adds only what it needs for testability.

/// Source of randomness for random selector nodes.
#[cfg_attr(test, mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// A value in `min..=max`.
    fn gen_range(&self, min: i32, max: i32) -> i32;
}
