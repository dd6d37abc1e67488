//! Tests for configuration parsing and validation.
