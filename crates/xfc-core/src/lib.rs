//! # xfc-core: Transformer Conversion Model
//!
//! Data records shared by every stage of the transformer conversion pipeline.
//!
//! ## Pipeline
//!
//! Transformers are described by ends that carry their own tap changers, shunts
//! and rated voltages. Conversion refers everything to a single reference end:
//!
//! ```text
//! raw ends ──► interpreted (role-assigned, per end) ──► converted (end1 only) ──► destination
//! ```
//!
//! This crate holds the records at both edges of that flow plus the ambient
//! pieces the stages share:
//!
//! - [`model`] - [`WindingEnd`], [`TapChanger`], [`TapStep`], [`RatioConversion`]
//! - [`converted`] - [`ConvertedT2x`], [`ConvertedT3x`]
//! - [`config`] - closed policy enums grouped in [`Configuration`]
//! - [`diagnostics`] - recoverable conditions collected during a conversion
//! - [`error`] - [`XfcError`] for conditions that abort one transformer
//! - [`units`] - [`Kilovolts`], [`Degrees`], [`Radians`]
//!
//! ## Identifiers
//!
//! Transformers and terminals are identified by the string ids of the source
//! ontology. Three-winding legs are addressed by [`WindingIndex`], threaded
//! through the model from the start so no stage needs to map a terminal back to
//! its leg.

use serde::{Deserialize, Serialize};

pub mod config;
pub mod converted;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod units;

pub use config::{
    Configuration, Xfmr2Config, Xfmr2RatioPhase, Xfmr2Shunt, Xfmr2StructuralRatio, Xfmr3Config,
    Xfmr3RatedUf, Xfmr3Shunt, Xfmr3WindingConfig,
};
pub use converted::{
    ConvertedT2x, ConvertedT2xEnd1, ConvertedT2xEnd2, ConvertedT3x, ConvertedWinding,
    ConvertedWindingEnd1, ConvertedWindingEnd2,
};
pub use diagnostics::{ConditionKind, DiagnosticIssue, Diagnostics, Severity};
pub use error::{XfcError, XfcResult};
pub use model::{
    AllShunt, AllTapChanger, RatioConversion, Regulation, RegulationMode, TapChanger, TapStep,
    ThreeWindingEnds, TwoWindingEnds, WindingEnd,
};
pub use units::{Degrees, Kilovolts, Radians};

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformerId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerminalId(String);

impl TransformerId {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        TransformerId(value.into())
    }
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TerminalId {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        TerminalId(value.into())
    }
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransformerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for TerminalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Leg of a three-winding transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WindingIndex {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
}

impl WindingIndex {
    pub const ALL: [WindingIndex; 3] = [WindingIndex::One, WindingIndex::Two, WindingIndex::Three];

    /// Zero-based position in per-winding arrays
    #[inline]
    pub fn index(self) -> usize {
        match self {
            WindingIndex::One => 0,
            WindingIndex::Two => 1,
            WindingIndex::Three => 2,
        }
    }

    /// One-based winding number
    #[inline]
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl std::fmt::Display for WindingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "winding {}", self.number())
    }
}
