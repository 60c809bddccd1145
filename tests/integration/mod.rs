//! Integration tests for the configuration assembly pipeline

mod context_resolution;
mod layered_loading;
mod test_utils;
