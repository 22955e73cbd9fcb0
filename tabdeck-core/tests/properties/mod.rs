//! Property test modules

mod eviction_tests;
mod reconcile_tests;
mod split_layout_tests;
