//! Conversion policy configuration.
//!
//! Every axis is a closed enum or a boolean, so an unhandled policy is a compile
//! error in the converters rather than a silent fallback. Each axis is
//! independent of the others. A [`Configuration`] is read-only during a
//! conversion and can be shared by reference across threads.
//!
//! Partial files are accepted: every struct is `#[serde(default)]`.
//!
//! ```toml
//! phase_angle_clock_enabled = true
//!
//! [xfmr2]
//! ratio_phase = "END2"
//! structural_ratio = "END2"
//!
//! [xfmr3]
//! rated_uf = "STAR_BUS_SIDE"
//! ```

use serde::{Deserialize, Serialize};

use crate::WindingIndex;

/// Where the tap changers of a two-winding transformer are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Xfmr2RatioPhase {
    /// Combine everything at end1
    End1,
    /// Combine everything at end2
    End2,
    /// Keep each tap changer at its own end
    #[default]
    End1End2,
    /// Combine at the end whose series reactance is zero
    X,
}

/// Where the shunt admittance of a two-winding transformer is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Xfmr2Shunt {
    End1,
    End2,
    #[default]
    End1End2,
    /// Half of the total at each end
    Split,
}

/// Which end carries a non-unity structural ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Xfmr2StructuralRatio {
    End1,
    End2,
    #[default]
    X,
}

/// Source of the star-bus reference voltage of a three-winding transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Xfmr3RatedUf {
    /// Winding 1 rated voltage
    #[default]
    StarBusSide,
    /// 1.0, ratios stay distributed
    NetworkSide,
    End1,
    End2,
    End3,
}

/// Where the shunt admittance of one winding is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Xfmr3Shunt {
    #[default]
    NetworkSide,
    StarBusSide,
    Split,
}

macro_rules! impl_as_str {
    ($type:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $type {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_as_str!(Xfmr2RatioPhase { End1 => "END1", End2 => "END2", End1End2 => "END1_END2", X => "X" });
impl_as_str!(Xfmr2Shunt { End1 => "END1", End2 => "END2", End1End2 => "END1_END2", Split => "SPLIT" });
impl_as_str!(Xfmr2StructuralRatio { End1 => "END1", End2 => "END2", X => "X" });
impl_as_str!(Xfmr3RatedUf {
    StarBusSide => "STAR_BUS_SIDE",
    NetworkSide => "NETWORK_SIDE",
    End1 => "END1",
    End2 => "END2",
    End3 => "END3",
});
impl_as_str!(Xfmr3Shunt {
    NetworkSide => "NETWORK_SIDE",
    StarBusSide => "STAR_BUS_SIDE",
    Split => "SPLIT",
});

/// Two-winding policy axes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Xfmr2Config {
    pub ratio_phase: Xfmr2RatioPhase,
    pub shunt: Xfmr2Shunt,
    pub structural_ratio: Xfmr2StructuralRatio,
    /// Flip the sign of every phase tap-changer angle
    pub phase_negate: bool,
}

/// Policy axes of one three-winding leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Xfmr3WindingConfig {
    /// Tap changers sit at the network side (end1) instead of the star bus (end2)
    pub ratio_phase_network_side: bool,
    pub shunt: Xfmr3Shunt,
    /// Relocate the `ratedUf / ratedU` structural ratio from the star bus side.
    /// Has no effect when `ratedUf` is `NETWORK_SIDE`.
    pub ratio0_at_star_bus: bool,
}

impl Default for Xfmr3WindingConfig {
    fn default() -> Self {
        Self {
            ratio_phase_network_side: true,
            shunt: Xfmr3Shunt::NetworkSide,
            ratio0_at_star_bus: true,
        }
    }
}

/// Three-winding policy axes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Xfmr3Config {
    pub rated_uf: Xfmr3RatedUf,
    pub windings: [Xfmr3WindingConfig; 3],
}

impl Xfmr3Config {
    pub fn winding(&self, index: WindingIndex) -> &Xfmr3WindingConfig {
        &self.windings[index.index()]
    }
}

/// Complete set of conversion policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub xfmr2: Xfmr2Config,
    pub xfmr3: Xfmr3Config,
    /// Carry phase-angle clocks into the converted model
    pub phase_angle_clock_enabled: bool,
}
