//! Shared utilities.
//!
//! Test helpers only for now: a recording [`Runner`](crate::invoke::Runner)
//! stub and cross-platform shell snippets.

#[cfg(test)]
pub mod testutil;
