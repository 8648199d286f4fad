//! Converted transformer models handed to the destination network builder.
//!
//! Every tap changer and every non-unity ratio effect sits at end1 (the network
//! side). The destination model holds a single shunt per two-winding
//! transformer and one per three-winding leg.

use serde::{Deserialize, Serialize};

use crate::model::TapChanger;
use crate::units::Kilovolts;
use crate::{TerminalId, TransformerId, WindingIndex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedT2x {
    pub id: TransformerId,
    pub r: f64,
    pub x: f64,
    pub end1: ConvertedT2xEnd1,
    pub end2: ConvertedT2xEnd2,
    /// Clock of end2 relative to end1; zero unless clocks are enabled.
    #[serde(default)]
    pub phase_angle_clock: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedT2xEnd1 {
    pub g: f64,
    pub b: f64,
    pub ratio_tap_changer: Option<TapChanger>,
    pub phase_tap_changer: Option<TapChanger>,
    pub rated_u: Kilovolts,
    pub terminal: TerminalId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedT2xEnd2 {
    pub rated_u: Kilovolts,
    pub terminal: TerminalId,
}

impl ConvertedT2x {
    /// Effective structural ratio seen by the destination (`ratedU2 / ratedU1`).
    pub fn structural_ratio(&self) -> f64 {
        self.end2.rated_u / self.end1.rated_u
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedT3x {
    pub id: TransformerId,
    /// Fictitious star-bus reference voltage
    pub rated_uf: Kilovolts,
    pub windings: [ConvertedWinding; 3],
}

impl ConvertedT3x {
    pub fn winding(&self, index: WindingIndex) -> &ConvertedWinding {
        &self.windings[index.index()]
    }
}

/// One leg of a converted three-winding transformer; end1 is the network side,
/// end2 the star bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedWinding {
    pub index: WindingIndex,
    pub r: f64,
    pub x: f64,
    pub end1: ConvertedWindingEnd1,
    pub end2: ConvertedWindingEnd2,
}

impl ConvertedWinding {
    /// Shunt conductance of the destination leg
    pub fn total_g(&self) -> f64 {
        self.end1.g + self.end2.g
    }

    /// Shunt susceptance of the destination leg
    pub fn total_b(&self) -> f64 {
        self.end1.b + self.end2.b
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedWindingEnd1 {
    pub g: f64,
    pub b: f64,
    pub ratio_tap_changer: Option<TapChanger>,
    pub phase_tap_changer: Option<TapChanger>,
    #[serde(default)]
    pub phase_angle_clock: u8,
    pub rated_u: Kilovolts,
    pub terminal: TerminalId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertedWindingEnd2 {
    pub g: f64,
    pub b: f64,
}
