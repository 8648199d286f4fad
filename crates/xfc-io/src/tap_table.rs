//! Tap-changer step tables.
//!
//! A tap changer is either given step by step or generated from its regulation
//! parameters. Generated tables cover tap positions `low_step..=high_step`, with
//! `n = position - neutral_step`:
//!
//! | kind | rho | angle (deg) |
//! |------|-----|-------------|
//! | `linear_ratio` | `1 + n·du/100` | 0 |
//! | `linear_phase` | 1 | `n·step_phase_shift_increment` |
//! | `symmetrical_phase` | 1 | `2·atan(n·du/200)` |
//! | `asymmetrical_phase` | `1/hypot(dx, dy)` | `atan2(dy, dx)` |
//!
//! where `du` is the step voltage increment in percent and, for the asymmetrical
//! case, `dx = 1 + n·du/100·cos θ`, `dy = n·du/100·sin θ` with θ the winding
//! connection angle. Generated steps carry no impedance deviations.

use serde::{Deserialize, Serialize};
use xfc_core::error::{XfcError, XfcResult};
use xfc_core::model::{Regulation, TapChanger, TapStep, MAX_TAP_STEPS};
use xfc_core::units::Degrees;

/// A tap changer as written in an input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapChangerSpec {
    pub id: String,
    pub table: TapTable,
    /// Current tap position; the neutral position when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap_position: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation: Option<Regulation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TapTable {
    Table {
        low_tap_position: i32,
        neutral_position: i32,
        steps: Vec<TapStep>,
    },
    LinearRatio {
        low_step: i32,
        high_step: i32,
        neutral_step: i32,
        /// Percent of rated voltage per step
        step_voltage_increment: f64,
    },
    LinearPhase {
        low_step: i32,
        high_step: i32,
        neutral_step: i32,
        /// Degrees per step
        step_phase_shift_increment: f64,
    },
    SymmetricalPhase {
        low_step: i32,
        high_step: i32,
        neutral_step: i32,
        step_voltage_increment: f64,
    },
    AsymmetricalPhase {
        low_step: i32,
        high_step: i32,
        neutral_step: i32,
        step_voltage_increment: f64,
        /// Degrees
        winding_connection_angle: f64,
    },
}

/// Positions and steps of a resolved table.
#[derive(Debug, Clone, PartialEq)]
pub struct StepTable {
    pub low_tap_position: i32,
    pub neutral_position: i32,
    pub steps: Vec<TapStep>,
}

impl TapTable {
    pub fn kind(&self) -> &'static str {
        match self {
            TapTable::Table { .. } => "table",
            TapTable::LinearRatio { .. } => "linear_ratio",
            TapTable::LinearPhase { .. } => "linear_phase",
            TapTable::SymmetricalPhase { .. } => "symmetrical_phase",
            TapTable::AsymmetricalPhase { .. } => "asymmetrical_phase",
        }
    }

    /// Resolve the table into explicit steps; `entity` names the tap changer in errors.
    pub fn resolve(&self, entity: &str) -> XfcResult<StepTable> {
        match self {
            TapTable::Table {
                low_tap_position,
                neutral_position,
                steps,
            } => Ok(StepTable {
                low_tap_position: *low_tap_position,
                neutral_position: *neutral_position,
                steps: steps.clone(),
            }),
            TapTable::LinearRatio {
                low_step,
                high_step,
                neutral_step,
                step_voltage_increment,
            } => generate(entity, *low_step, *high_step, *neutral_step, |n| {
                TapStep::new(1.0 + n * step_voltage_increment / 100.0, Degrees(0.0))
            }),
            TapTable::LinearPhase {
                low_step,
                high_step,
                neutral_step,
                step_phase_shift_increment,
            } => generate(entity, *low_step, *high_step, *neutral_step, |n| {
                TapStep::new(1.0, Degrees(n * step_phase_shift_increment))
            }),
            TapTable::SymmetricalPhase {
                low_step,
                high_step,
                neutral_step,
                step_voltage_increment,
            } => generate(entity, *low_step, *high_step, *neutral_step, |n| {
                let angle = 2.0 * (n * step_voltage_increment / 200.0).atan();
                TapStep::new(1.0, Degrees(angle.to_degrees()))
            }),
            TapTable::AsymmetricalPhase {
                low_step,
                high_step,
                neutral_step,
                step_voltage_increment,
                winding_connection_angle,
            } => {
                let theta = winding_connection_angle.to_radians();
                generate(entity, *low_step, *high_step, *neutral_step, |n| {
                    let du = n * step_voltage_increment / 100.0;
                    let dx = 1.0 + du * theta.cos();
                    let dy = du * theta.sin();
                    TapStep::new(1.0 / dx.hypot(dy), Degrees(dy.atan2(dx).to_degrees()))
                })
            }
        }
    }
}

fn generate(
    entity: &str,
    low_step: i32,
    high_step: i32,
    neutral_step: i32,
    step: impl Fn(f64) -> TapStep,
) -> XfcResult<StepTable> {
    if high_step < low_step {
        return Err(XfcError::malformed(
            entity,
            format!("high step {} below low step {}", high_step, low_step),
        ));
    }
    let count = i64::from(high_step) - i64::from(low_step) + 1;
    if count > MAX_TAP_STEPS as i64 {
        return Err(XfcError::malformed(
            entity,
            format!(
                "steps {}..={} exceed the limit of {}",
                low_step, high_step, MAX_TAP_STEPS
            ),
        ));
    }
    if !(low_step..=high_step).contains(&neutral_step) {
        return Err(XfcError::malformed(
            entity,
            format!(
                "neutral step {} outside {}..={}",
                neutral_step, low_step, high_step
            ),
        ));
    }
    // Both ends lie within a range of at most MAX_TAP_STEPS, so n cannot overflow
    let steps = (low_step..=high_step)
        .map(|position| step(f64::from(position - neutral_step)))
        .collect();
    Ok(StepTable {
        low_tap_position: low_step,
        neutral_position: neutral_step,
        steps,
    })
}

impl TapChangerSpec {
    /// Build a validated [`TapChanger`].
    pub fn build(&self) -> XfcResult<TapChanger> {
        let table = self.table.resolve(&self.id)?;
        let neutral_step = position_index(&self.id, "neutral", table.neutral_position, &table)?;
        let tap_position = match self.tap_position {
            Some(position) => position_index(&self.id, "tap", position, &table)?,
            None => neutral_step,
        };
        let tap_changer = TapChanger::new(
            self.id.clone(),
            table.low_tap_position,
            table.steps,
            neutral_step,
            tap_position,
        )?;
        Ok(match &self.regulation {
            Some(regulation) => tap_changer.with_regulation(regulation.clone()),
            None => tap_changer,
        })
    }
}

fn position_index(entity: &str, what: &str, position: i32, table: &StepTable) -> XfcResult<usize> {
    let offset = i64::from(position) - i64::from(table.low_tap_position);
    if offset < 0 || offset >= table.steps.len() as i64 {
        return Err(XfcError::malformed(
            entity,
            format!(
                "{} position {} outside {}..={}",
                what,
                position,
                table.low_tap_position,
                i64::from(table.low_tap_position) + table.steps.len() as i64 - 1
            ),
        ));
    }
    Ok(offset as usize)
}
