//! Raw-ends input documents.
//!
//! A document lists the transformers to convert with the attributes already
//! read from the source ontology:
//!
//! ```json
//! {
//!   "two_winding": [
//!     {
//!       "id": "PT-1",
//!       "end1": { "r": 0.0, "x": 0.0, "rated_u": 230.0, "terminal": "PT-1-T1" },
//!       "end2": {
//!         "r": 2.0, "x": 20.0, "rated_u": 115.0, "terminal": "PT-1-T2",
//!         "ratio_tap_changer": {
//!           "id": "RTC-1",
//!           "table": { "kind": "linear_ratio", "low_step": 1, "high_step": 3,
//!                      "neutral_step": 2, "step_voltage_increment": 5.0 }
//!         }
//!       }
//!     }
//!   ],
//!   "three_winding": []
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use xfc_core::error::{XfcError, XfcResult};
use xfc_core::model::{ThreeWindingEnds, TwoWindingEnds, WindingEnd};
use xfc_core::units::Kilovolts;
use xfc_core::{TerminalId, TransformerId};

use crate::tap_table::TapChangerSpec;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub two_winding: Vec<RawTwoWinding>,
    #[serde(default)]
    pub three_winding: Vec<RawThreeWinding>,
}

impl RawDocument {
    pub fn len(&self) -> usize {
        self.two_winding.len() + self.three_winding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.two_winding.is_empty() && self.three_winding.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTwoWinding {
    pub id: String,
    pub end1: RawEnd,
    pub end2: RawEnd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawThreeWinding {
    pub id: String,
    /// Windings 1..=3 in order
    pub windings: Vec<RawEnd>,
}

/// Per-end attributes as read from the source ontology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEnd {
    pub r: f64,
    pub x: f64,
    #[serde(default)]
    pub g: f64,
    #[serde(default)]
    pub b: f64,
    pub rated_u: f64,
    pub terminal: String,
    #[serde(default)]
    pub phase_angle_clock: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio_tap_changer: Option<TapChangerSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_tap_changer: Option<TapChangerSpec>,
}

impl RawEnd {
    pub fn to_winding_end(&self) -> XfcResult<WindingEnd> {
        let mut end = WindingEnd::new(
            self.r,
            self.x,
            self.g,
            self.b,
            Kilovolts(self.rated_u),
            TerminalId::new(self.terminal.as_str()),
        )
        .with_phase_angle_clock(self.phase_angle_clock);
        if let Some(spec) = &self.ratio_tap_changer {
            end = end.with_ratio_tap_changer(spec.build()?);
        }
        if let Some(spec) = &self.phase_tap_changer {
            end = end.with_phase_tap_changer(spec.build()?);
        }
        Ok(end)
    }
}

impl RawTwoWinding {
    pub fn to_model(&self) -> XfcResult<TwoWindingEnds> {
        let ends = TwoWindingEnds {
            id: TransformerId::new(self.id.as_str()),
            end1: self.end1.to_winding_end()?,
            end2: self.end2.to_winding_end()?,
        };
        ends.validate()?;
        Ok(ends)
    }
}

impl RawThreeWinding {
    pub fn to_model(&self) -> XfcResult<ThreeWindingEnds> {
        let [w1, w2, w3] = self.windings.as_slice() else {
            return Err(XfcError::malformed(
                &self.id,
                format!("expected 3 windings, found {}", self.windings.len()),
            ));
        };
        let ends = ThreeWindingEnds {
            id: TransformerId::new(self.id.as_str()),
            windings: [
                w1.to_winding_end()?,
                w2.to_winding_end()?,
                w3.to_winding_end()?,
            ],
        };
        ends.validate()?;
        Ok(ends)
    }
}

/// Read a raw-ends document from a JSON file.
pub fn load_document(path: &Path) -> Result<RawDocument> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading input document '{}'", path.display()))?;
    let document: RawDocument = serde_json::from_str(&data)
        .with_context(|| format!("parsing input document '{}'", path.display()))?;
    debug!(
        path = %path.display(),
        two_winding = document.two_winding.len(),
        three_winding = document.three_winding.len(),
        "loaded input document"
    );
    Ok(document)
}
