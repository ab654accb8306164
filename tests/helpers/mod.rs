//! Test helpers module
//!
//! Utilities shared by the integration tests: a mock backend server and
//! builders for test records.

#![allow(dead_code)]

pub mod gateway_mock;
pub mod test_data;

pub use gateway_mock::*;
pub use test_data::*;
