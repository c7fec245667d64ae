//! Batch and per-symbol state machines

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Received,
    Decoding,
    Grouping,
    ProcessingSymbols,
    Complete,
}

impl BatchPhase {
    /// The phase that follows this one; `Complete` is terminal.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Received => Some(Self::Decoding),
            Self::Decoding => Some(Self::Grouping),
            Self::Grouping => Some(Self::ProcessingSymbols),
            Self::ProcessingSymbols => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Decoding => "decoding",
            Self::Grouping => "grouping",
            Self::ProcessingSymbols => "processing_symbols",
            Self::Complete => "complete",
        }
    }
}

impl Display for BatchPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stages one symbol passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolStage {
    Analyzing,
    Classifying,
    Projecting,
    Persisting,
}

impl SymbolStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Analyzing => "analyzing",
            Self::Classifying => "classifying",
            Self::Projecting => "projecting",
            Self::Persisting => "persisting",
        }
    }
}

impl Display for SymbolStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of a symbol's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolOutcome {
    Persisted,
    Failed,
}
