//! Transformer end and tap-changer records.
//!
//! All records are plain values. Conversion stages never edit a record they
//! receive; combination and relocation build new ones.

use serde::{Deserialize, Serialize};

use crate::error::{XfcError, XfcResult};
use crate::units::{Degrees, Kilovolts};
use crate::{TerminalId, TransformerId, WindingIndex};

/// Highest phase-angle clock reading (30 degree steps, 0..=11).
pub const MAX_PHASE_ANGLE_CLOCK: u8 = 11;

/// Largest step count accepted for a single tap changer read from input.
pub const MAX_TAP_STEPS: usize = 1024;

/// One position of a tap changer.
///
/// `rho` multiplies the voltage of the hosting end. The deviations `rdr..rdb` are
/// fractional multipliers on the base r/x/g/b of the hosting end, so a step with
/// `rdx = 0.1` means 110% of the base reactance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapStep {
    pub rho: f64,
    #[serde(default)]
    pub angle: Degrees,
    #[serde(default)]
    pub rdr: f64,
    #[serde(default)]
    pub rdx: f64,
    #[serde(default)]
    pub rdg: f64,
    #[serde(default)]
    pub rdb: f64,
}

impl TapStep {
    /// A step without impedance deviations.
    pub fn new(rho: f64, angle: Degrees) -> Self {
        Self {
            rho,
            angle,
            rdr: 0.0,
            rdx: 0.0,
            rdg: 0.0,
            rdb: 0.0,
        }
    }

    pub fn with_deviations(mut self, rdr: f64, rdx: f64, rdg: f64, rdb: f64) -> Self {
        self.rdr = rdr;
        self.rdx = rdx;
        self.rdg = rdg;
        self.rdb = rdb;
        self
    }
}

/// Quantity a regulating tap changer controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegulationMode {
    Voltage,
    ActivePower,
    CurrentFlow,
    Fixed,
}

/// Regulating-control data attached to a tap changer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regulation {
    pub mode: RegulationMode,
    pub target_value: f64,
    #[serde(default)]
    pub target_deadband: f64,
    #[serde(default)]
    pub target_terminal: Option<TerminalId>,
    /// Whether the control is active
    #[serde(default)]
    pub enabled: bool,
}

/// Discrete ratio/phase adjustment device.
///
/// Steps are ordered by ascending tap position starting at `low_tap_position`;
/// `neutral_step` and `tap_position` are indices into `steps`. Build through
/// [`TapChanger::new`] so the invariants hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapChanger {
    pub id: String,
    pub low_tap_position: i32,
    pub steps: Vec<TapStep>,
    pub neutral_step: usize,
    pub tap_position: usize,
    #[serde(default)]
    pub regulation: Option<Regulation>,
}

impl TapChanger {
    pub fn new(
        id: impl Into<String>,
        low_tap_position: i32,
        steps: Vec<TapStep>,
        neutral_step: usize,
        tap_position: usize,
    ) -> XfcResult<Self> {
        let tap_changer = Self {
            id: id.into(),
            low_tap_position,
            steps,
            neutral_step,
            tap_position,
            regulation: None,
        };
        tap_changer.validate()?;
        Ok(tap_changer)
    }

    pub fn with_regulation(mut self, regulation: Regulation) -> Self {
        self.regulation = Some(regulation);
        self
    }

    pub fn validate(&self) -> XfcResult<()> {
        if self.steps.is_empty() {
            return Err(XfcError::malformed(&self.id, "tap changer has no steps"));
        }
        if self.steps.len() > MAX_TAP_STEPS {
            return Err(XfcError::malformed(
                &self.id,
                format!(
                    "{} steps exceed the limit of {}",
                    self.steps.len(),
                    MAX_TAP_STEPS
                ),
            ));
        }
        let high = i64::from(self.low_tap_position) + self.steps.len() as i64 - 1;
        if high > i64::from(i32::MAX) {
            return Err(XfcError::malformed(
                &self.id,
                format!("tap positions from {} overflow", self.low_tap_position),
            ));
        }
        if self.neutral_step >= self.steps.len() {
            return Err(XfcError::malformed(
                &self.id,
                format!(
                    "neutral step index {} outside {} steps",
                    self.neutral_step,
                    self.steps.len()
                ),
            ));
        }
        if self.tap_position >= self.steps.len() {
            return Err(XfcError::malformed(
                &self.id,
                format!(
                    "tap position index {} outside {} steps",
                    self.tap_position,
                    self.steps.len()
                ),
            ));
        }
        for (index, step) in self.steps.iter().enumerate() {
            if !step.rho.is_finite() || step.rho <= 0.0 {
                return Err(XfcError::malformed(
                    &self.id,
                    format!("step {} has non-positive ratio {}", index, step.rho),
                ));
            }
            let finite = step.angle.is_finite()
                && [step.rdr, step.rdx, step.rdg, step.rdb]
                    .iter()
                    .all(|v| v.is_finite());
            if !finite {
                return Err(XfcError::malformed(
                    &self.id,
                    format!("step {} has a non-finite angle or deviation", index),
                ));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn neutral(&self) -> Option<&TapStep> {
        self.steps.get(self.neutral_step)
    }

    pub fn current(&self) -> Option<&TapStep> {
        self.steps.get(self.tap_position)
    }

    pub fn high_tap_position(&self) -> i32 {
        self.low_tap_position + self.steps.len() as i32 - 1
    }

    /// True when regulation data is present and active.
    pub fn is_regulating(&self) -> bool {
        self.regulation.as_ref().is_some_and(|r| r.enabled)
    }

    pub fn is_phase_shifting(&self) -> bool {
        self.steps.iter().any(|s| s.angle.value() != 0.0)
    }
}

/// One end (or winding) of a transformer as read from the source ontology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindingEnd {
    pub r: f64,
    pub x: f64,
    #[serde(default)]
    pub g: f64,
    #[serde(default)]
    pub b: f64,
    pub rated_u: Kilovolts,
    pub terminal: TerminalId,
    #[serde(default)]
    pub phase_angle_clock: u8,
    #[serde(default)]
    pub ratio_tap_changer: Option<TapChanger>,
    #[serde(default)]
    pub phase_tap_changer: Option<TapChanger>,
}

impl WindingEnd {
    pub fn new(r: f64, x: f64, g: f64, b: f64, rated_u: Kilovolts, terminal: TerminalId) -> Self {
        Self {
            r,
            x,
            g,
            b,
            rated_u,
            terminal,
            phase_angle_clock: 0,
            ratio_tap_changer: None,
            phase_tap_changer: None,
        }
    }

    pub fn with_ratio_tap_changer(mut self, tap_changer: TapChanger) -> Self {
        self.ratio_tap_changer = Some(tap_changer);
        self
    }

    pub fn with_phase_tap_changer(mut self, tap_changer: TapChanger) -> Self {
        self.phase_tap_changer = Some(tap_changer);
        self
    }

    pub fn with_phase_angle_clock(mut self, clock: u8) -> Self {
        self.phase_angle_clock = clock;
        self
    }

    /// Check the end against the model invariants; `entity` names the owner in errors.
    pub fn validate(&self, entity: &str) -> XfcResult<()> {
        if !self.rated_u.is_finite() || self.rated_u.value() <= 0.0 {
            return Err(XfcError::malformed(
                entity,
                format!(
                    "terminal {}: rated voltage must be positive, got {}",
                    self.terminal,
                    self.rated_u.value()
                ),
            ));
        }
        let finite = [self.r, self.x, self.g, self.b].iter().all(|v| v.is_finite());
        if !finite {
            return Err(XfcError::malformed(
                entity,
                format!("terminal {}: non-finite r/x/g/b", self.terminal),
            ));
        }
        if self.phase_angle_clock > MAX_PHASE_ANGLE_CLOCK {
            return Err(XfcError::malformed(
                entity,
                format!(
                    "terminal {}: phase angle clock {} outside 0..={}",
                    self.terminal, self.phase_angle_clock, MAX_PHASE_ANGLE_CLOCK
                ),
            ));
        }
        if let Some(tc) = &self.ratio_tap_changer {
            tc.validate()?;
        }
        if let Some(tc) = &self.phase_tap_changer {
            tc.validate()?;
        }
        Ok(())
    }
}

/// Raw ends of a two-winding transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoWindingEnds {
    pub id: TransformerId,
    pub end1: WindingEnd,
    pub end2: WindingEnd,
}

impl TwoWindingEnds {
    pub fn validate(&self) -> XfcResult<()> {
        self.end1.validate(self.id.as_str())?;
        self.end2.validate(self.id.as_str())
    }
}

/// Raw windings of a three-winding transformer, in winding order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeWindingEnds {
    pub id: TransformerId,
    pub windings: [WindingEnd; 3],
}

impl ThreeWindingEnds {
    pub fn winding(&self, index: WindingIndex) -> &WindingEnd {
        &self.windings[index.index()]
    }

    pub fn validate(&self) -> XfcResult<()> {
        for winding in &self.windings {
            winding.validate(self.id.as_str())?;
        }
        Ok(())
    }
}

/// The four tap-changer slots of an interpreted transformer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllTapChanger {
    pub ratio1: Option<TapChanger>,
    pub phase1: Option<TapChanger>,
    pub ratio2: Option<TapChanger>,
    pub phase2: Option<TapChanger>,
}

/// Shunt admittance assigned to each end of an interpreted transformer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AllShunt {
    pub g1: f64,
    pub b1: f64,
    pub g2: f64,
    pub b2: f64,
}

impl AllShunt {
    pub fn total_g(&self) -> f64 {
        self.g1 + self.g2
    }

    pub fn total_b(&self) -> f64 {
        self.b1 + self.b2
    }
}

/// Series impedance and end shunts of a π-section, before or after a ratio relocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioConversion {
    pub r: f64,
    pub x: f64,
    pub g1: f64,
    pub b1: f64,
    pub g2: f64,
    pub b2: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(rhos: &[f64]) -> Vec<TapStep> {
        rhos.iter().map(|&rho| TapStep::new(rho, Degrees(0.0))).collect()
    }

    #[test]
    fn tap_changer_accepts_valid_table() {
        let tc = TapChanger::new("RTC", -1, steps(&[0.95, 1.0, 1.05]), 1, 2).unwrap();
        assert_eq!(tc.len(), 3);
        assert_eq!(tc.high_tap_position(), 1);
        assert_eq!(tc.neutral().unwrap().rho, 1.0);
        assert_eq!(tc.current().unwrap().rho, 1.05);
        assert!(!tc.is_regulating());
        assert!(!tc.is_phase_shifting());
    }

    #[test]
    fn tap_changer_rejects_bad_tables() {
        assert!(TapChanger::new("E", 0, Vec::new(), 0, 0).is_err());
        assert!(TapChanger::new("N", 0, steps(&[1.0]), 1, 0).is_err());
        assert!(TapChanger::new("P", 0, steps(&[1.0]), 0, 3).is_err());
        let err = TapChanger::new("R", 0, steps(&[1.0, -0.5]), 0, 0).unwrap_err();
        assert!(err.to_string().contains("non-positive ratio"));

        let long = vec![TapStep::new(1.0, Degrees(0.0)); MAX_TAP_STEPS + 1];
        let err = TapChanger::new("L", 0, long, 0, 0).unwrap_err();
        assert!(err.to_string().contains("exceed the limit"));
        assert!(TapChanger::new("O", i32::MAX, steps(&[1.0, 1.1]), 0, 0).is_err());
        assert!(TapChanger::new("M", i32::MAX, steps(&[1.0]), 0, 0).is_ok());
    }

    #[test]
    fn regulation_flag_requires_enabled() {
        let regulation = Regulation {
            mode: RegulationMode::Voltage,
            target_value: 110.0,
            target_deadband: 0.5,
            target_terminal: None,
            enabled: false,
        };
        let tc = TapChanger::new("RTC", 0, steps(&[1.0]), 0, 0)
            .unwrap()
            .with_regulation(regulation.clone());
        assert!(!tc.is_regulating());

        let active = tc.with_regulation(Regulation {
            enabled: true,
            ..regulation
        });
        assert!(active.is_regulating());
    }

    #[test]
    fn winding_end_validation() {
        let end = WindingEnd::new(0.1, 1.0, 0.0, 0.0, Kilovolts(0.0), TerminalId::new("TE1"));
        let err = end.validate("T1").unwrap_err();
        assert!(err.to_string().contains("rated voltage"));

        let clock = WindingEnd::new(0.1, 1.0, 0.0, 0.0, Kilovolts(20.0), TerminalId::new("TE1"))
            .with_phase_angle_clock(12);
        assert!(clock.validate("T1").is_err());
    }

    #[test]
    fn shunt_totals() {
        let shunt = AllShunt {
            g1: 1.0,
            b1: 2.0,
            g2: 3.0,
            b2: 4.0,
        };
        assert_eq!(shunt.total_g(), 4.0);
        assert_eq!(shunt.total_b(), 6.0);
    }
}
