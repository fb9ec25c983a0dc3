#![allow(dead_code, unused_imports)]

pub use sitegen_test_utils::*;
