//! Browser-driving layers
//!
//! Session lifetime, URL patterns, response capture, request interception,
//! page-scoped state and DOM assertions. Everything here is generic over
//! the application under test; the flows supply the semantics.

pub mod capture;
pub mod intercept;
pub mod page_assert;
pub mod pattern;
pub mod session;
pub mod storage;
