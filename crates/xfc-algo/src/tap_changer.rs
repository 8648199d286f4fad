//! Tap-changer algebra: combination, relocation and angle negation.
//!
//! These are the only operations the converters apply to tap changers. Each one
//! consumes its inputs and builds a new value.

use tracing::warn;
use xfc_core::diagnostics::{ConditionKind, Diagnostics};
use xfc_core::model::{Regulation, TapChanger, TapStep};

/// Merge two optional tap changers that end up at the same end.
///
/// With only one operand present it is returned as is. With both present the
/// result holds one step per `(a, b)` pair in row-major order (the index into
/// `b` varies fastest):
///
/// - `rho = rho_a * rho_b`, `angle = angle_a + angle_b`
/// - each deviation composes as `rd = rd_a + rd_b + rd_a * rd_b`
/// - the neutral and current positions are the pair of the operand positions
///
/// If both operands carry active regulation a `ConflictingRegulation` condition
/// is recorded and the regulation of `a` is kept.
pub fn combine(
    a: Option<TapChanger>,
    b: Option<TapChanger>,
    diagnostics: &mut Diagnostics,
) -> Option<TapChanger> {
    match (a, b) {
        (None, None) => None,
        (Some(tc), None) | (None, Some(tc)) => Some(tc),
        (Some(a), Some(b)) => Some(combine_pair(a, b, diagnostics)),
    }
}

fn combine_pair(a: TapChanger, b: TapChanger, diagnostics: &mut Diagnostics) -> TapChanger {
    let width = b.steps.len();
    let steps: Vec<TapStep> = a
        .steps
        .iter()
        .flat_map(|sa| b.steps.iter().map(move |sb| combine_step(sa, sb)))
        .collect();
    let neutral_step = a.neutral_step * width + b.neutral_step;
    let tap_position = a.tap_position * width + b.tap_position;
    let regulation = combine_regulation(&a, &b, diagnostics);

    TapChanger {
        id: format!("{}+{}", a.id, b.id),
        // Positions are renumbered so that the combined neutral sits at zero
        low_tap_position: -(neutral_step as i32),
        steps,
        neutral_step,
        tap_position,
        regulation,
    }
}

fn combine_step(a: &TapStep, b: &TapStep) -> TapStep {
    TapStep {
        rho: a.rho * b.rho,
        angle: a.angle + b.angle,
        rdr: compose_deviation(a.rdr, b.rdr),
        rdx: compose_deviation(a.rdx, b.rdx),
        rdg: compose_deviation(a.rdg, b.rdg),
        rdb: compose_deviation(a.rdb, b.rdb),
    }
}

// (1 + a)(1 + b) - 1
#[inline]
fn compose_deviation(a: f64, b: f64) -> f64 {
    a + b + a * b
}

fn combine_regulation(
    a: &TapChanger,
    b: &TapChanger,
    diagnostics: &mut Diagnostics,
) -> Option<Regulation> {
    match (a.is_regulating(), b.is_regulating()) {
        (true, true) => {
            let message = format!(
                "tap changers {} and {} both regulate; keeping regulation of {}",
                a.id, b.id, a.id
            );
            warn!(tap_changer = %a.id, other = %b.id, "conflicting regulation");
            diagnostics.add_warning_with_entity(
                ConditionKind::ConflictingRegulation,
                &message,
                &a.id,
            );
            a.regulation.clone()
        }
        (true, false) => a.regulation.clone(),
        (false, true) => b.regulation.clone(),
        (false, false) => a.regulation.clone().or_else(|| b.regulation.clone()),
    }
}

/// Express a tap changer from the opposite end of its branch.
///
/// Every step gets `rho -> 1/rho` and `angle -> -angle`. Deviations are kept:
/// they are fractional multipliers and do not depend on the side they are read
/// from. Applying it twice gives back the original steps up to rounding.
pub fn relocate(tc: Option<TapChanger>) -> Option<TapChanger> {
    tc.map(relocate_tap_changer)
}

pub fn relocate_tap_changer(tc: TapChanger) -> TapChanger {
    let steps = tc
        .steps
        .iter()
        .map(|step| TapStep {
            rho: 1.0 / step.rho,
            angle: -step.angle,
            ..*step
        })
        .collect();
    TapChanger { steps, ..tc }
}

/// Flip the sign of every step angle.
pub fn negate_angles(tc: Option<TapChanger>) -> Option<TapChanger> {
    tc.map(|tc| {
        let steps = tc
            .steps
            .iter()
            .map(|step| TapStep {
                angle: -step.angle,
                ..*step
            })
            .collect();
        TapChanger { steps, ..tc }
    })
}
