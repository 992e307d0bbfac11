use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable record of what a stage did and by how much
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectionNote(String);

impl CorrectionNote {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrectionNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CorrectionNote {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for CorrectionNote {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}
