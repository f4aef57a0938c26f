//! Atlas library exports for testing

pub mod cli;
pub mod core;
pub mod data;

#[cfg(test)]
pub mod test_support;
