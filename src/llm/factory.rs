// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Backend factory
//!
//! Centralizes backend construction from settings so entry points do not
//! duplicate credential resolution.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::{BaxterError, Result};
use crate::llm::provider::ChatBackend;
use crate::llm::providers::OpenAiBackend;

/// Factory for creating chat backends
pub struct BackendFactory;

impl BackendFactory {
    /// Create the configured backend from settings
    ///
    /// The API key is resolved once here; the backend holds it for the life
    /// of the process and nothing else reads the environment.
    pub fn create(settings: &Settings) -> Result<Arc<dyn ChatBackend>> {
        let api_key = settings.get_api_key().ok_or_else(|| {
            BaxterError::Config(format!(
                "No API key found. Set {} or add upstream.api_key to {}.",
                settings.upstream.api_key_env,
                Settings::default_path().display()
            ))
        })?;

        let backend = OpenAiBackend::with_base_url(api_key, &settings.upstream.base_url);
        Ok(Arc::new(backend))
    }

    /// Get the default model from settings
    pub fn default_model(settings: &Settings) -> String {
        settings.upstream.default_model.clone()
    }
}
