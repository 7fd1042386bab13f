use serde::{Deserialize, Serialize};

/// Text of a single PDF page, keyed by its zero-based position in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    pub index: usize,
    pub text: String,
}

impl PageText {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// One-based page number as printed in prompts and records.
    pub fn page_number(&self) -> u32 {
        self.index as u32 + 1
    }

    /// Pages with only whitespace carry nothing worth sending to the model.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
