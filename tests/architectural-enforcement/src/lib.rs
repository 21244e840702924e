//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural
//! principles:
//! - The core crate never references the UI stack
//! - No blocking sleeps in production code
//!
//! These tests are designed to catch violations early in the development
//! cycle.

#![allow(dead_code)]

pub fn placeholder() {
    // Placeholder to make this a valid library
}
