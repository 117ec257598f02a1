//! Permission matrix and its inbound payload
//!
//! Payloads are validated into these structs before they reach the store;
//! every category must be present with a boolean value and no other keys are
//! accepted.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::ModeError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeMatrix {
    pub text: bool,
    pub image: bool,
    pub audio: bool,
    pub video: bool,
    pub other: bool,
}

impl ModeMatrix {
    pub fn allow_all() -> Self {
        Self {
            text: true,
            image: true,
            audio: true,
            video: true,
            other: true,
        }
    }

    pub fn deny_all() -> Self {
        Self {
            text: false,
            image: false,
            audio: false,
            video: false,
            other: false,
        }
    }

    pub fn allows(&self, category: Category) -> bool {
        match category {
            Category::Text => self.text,
            Category::Image => self.image,
            Category::Audio => self.audio,
            Category::Video => self.video,
            Category::Other => self.other,
        }
    }

    pub fn set(&mut self, category: Category, allowed: bool) {
        match category {
            Category::Text => self.text = allowed,
            Category::Image => self.image = allowed,
            Category::Audio => self.audio = allowed,
            Category::Video => self.video = allowed,
            Category::Other => self.other = allowed,
        }
    }
}

/// `{"domain": "example.com", "mode": {"text": true, ...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModePayload {
    pub domain: String,
    pub mode: ModeMatrix,
}

impl ModePayload {
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| ModeError::Validation(e.to_string()))
    }
}
