// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Backend implementations for the upstream completion API

pub mod openai;

pub use openai::OpenAiBackend;
