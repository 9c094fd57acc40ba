//! Tests for the dispatch engine
