//! Regulating-control records emitted alongside converted models.
//!
//! The destination network builder wires voltage and flow controls from these
//! records after every transformer is converted, so each record names the
//! converted tap changer that owns the control.

use serde::{Deserialize, Serialize};
use xfc_core::converted::{ConvertedT2x, ConvertedT3x};
use xfc_core::model::{Regulation, TapChanger};
use xfc_core::WindingIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapChangerKind {
    Ratio,
    Phase,
}

/// Regulation data of one converted tap changer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatingControlRecord {
    pub kind: TapChangerKind,
    /// Leg of a three-winding transformer; absent for two-winding ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winding: Option<WindingIndex>,
    pub tap_changer: String,
    pub regulation: Regulation,
}

/// All regulating-control records of one converted transformer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegulatingControls {
    pub records: Vec<RegulatingControlRecord>,
}

impl RegulatingControls {
    pub fn for_two_winding(model: &ConvertedT2x) -> Self {
        let mut controls = Self::default();
        controls.push(
            TapChangerKind::Ratio,
            None,
            model.end1.ratio_tap_changer.as_ref(),
        );
        controls.push(
            TapChangerKind::Phase,
            None,
            model.end1.phase_tap_changer.as_ref(),
        );
        controls
    }

    pub fn for_three_winding(model: &ConvertedT3x) -> Self {
        let mut controls = Self::default();
        for winding in &model.windings {
            controls.push(
                TapChangerKind::Ratio,
                Some(winding.index),
                winding.end1.ratio_tap_changer.as_ref(),
            );
            controls.push(
                TapChangerKind::Phase,
                Some(winding.index),
                winding.end1.phase_tap_changer.as_ref(),
            );
        }
        controls
    }

    fn push(&mut self, kind: TapChangerKind, winding: Option<WindingIndex>, tc: Option<&TapChanger>) {
        let Some(tc) = tc else { return };
        if let Some(regulation) = &tc.regulation {
            self.records.push(RegulatingControlRecord {
                kind,
                winding,
                tap_changer: tc.id.clone(),
                regulation: regulation.clone(),
            });
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegulatingControlRecord> {
        self.records.iter()
    }

    /// Records whose control is active.
    pub fn active(&self) -> impl Iterator<Item = &RegulatingControlRecord> {
        self.records.iter().filter(|r| r.regulation.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfc_core::converted::{ConvertedT2xEnd1, ConvertedT2xEnd2};
    use xfc_core::model::{RegulationMode, TapStep};
    use xfc_core::units::{Degrees, Kilovolts};
    use xfc_core::{TerminalId, TransformerId};

    #[test]
    fn only_tap_changers_with_regulation_produce_records() {
        let rtc = TapChanger::new("RTC", 0, vec![TapStep::new(1.0, Degrees(0.0))], 0, 0)
            .unwrap()
            .with_regulation(Regulation {
                mode: RegulationMode::Voltage,
                target_value: 118.0,
                target_deadband: 1.0,
                target_terminal: Some(TerminalId::new("T2")),
                enabled: true,
            });
        let ptc = TapChanger::new("PTC", 0, vec![TapStep::new(1.0, Degrees(3.0))], 0, 0).unwrap();
        let model = ConvertedT2x {
            id: TransformerId::new("T"),
            r: 0.1,
            x: 1.0,
            end1: ConvertedT2xEnd1 {
                g: 0.0,
                b: 0.0,
                ratio_tap_changer: Some(rtc),
                phase_tap_changer: Some(ptc),
                rated_u: Kilovolts(230.0),
                terminal: TerminalId::new("T1"),
            },
            end2: ConvertedT2xEnd2 {
                rated_u: Kilovolts(115.0),
                terminal: TerminalId::new("T2"),
            },
            phase_angle_clock: 0,
        };

        let controls = RegulatingControls::for_two_winding(&model);
        assert_eq!(controls.len(), 1);
        let record = controls.iter().next().unwrap();
        assert_eq!(record.kind, TapChangerKind::Ratio);
        assert_eq!(record.tap_changer, "RTC");
        assert_eq!(record.winding, None);
        assert_eq!(controls.active().count(), 1);
    }
}
