#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod aggregate;
pub mod optimistic;
pub mod screens;
pub mod slice;
pub mod submission;

#[cfg(test)]
pub(crate) mod test_support;
