// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for Baxter
//!
//! This module defines all error types used throughout the application.

use thiserror::Error;

/// Main error type for Baxter operations
#[derive(Error, Debug)]
pub enum BaxterError {
    /// API-related errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Persistence errors (chat log / project records)
    ///
    /// Kept as a distinct channel: a failed write after a completed turn is
    /// never reported as a failed generation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Document export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// API-specific error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication failed (invalid API key)
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Rate limited by the API
    #[error("Rate limited by upstream API")]
    RateLimited,

    /// Requested model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// API returned an error
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Timeout waiting for the next fragment
    #[error("Request timed out")]
    Timeout,

    /// Streaming error
    #[error("Streaming error: {0}")]
    StreamError(String),
}

/// Persistence-specific error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database
    #[error("Failed to open store: {0}")]
    Open(String),

    /// Failed to initialize the schema
    #[error("Failed to initialize schema: {0}")]
    Schema(String),

    /// Failed to write a row
    #[error("Failed to write: {0}")]
    Write(String),

    /// Failed to read rows
    #[error("Failed to query: {0}")]
    Query(String),
}

/// Result type alias for Baxter operations
pub type Result<T> = std::result::Result<T, BaxterError>;
