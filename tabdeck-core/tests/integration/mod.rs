//! Integration test modules

mod scenario_tests;
