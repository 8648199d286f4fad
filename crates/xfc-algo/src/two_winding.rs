//! Two-winding transformer conversion.
//!
//! Runs the raw ends through three stages:
//!
//! 1. **Load**: sum the series impedance of both ends and record which end had
//!    zero reactance.
//! 2. **Interpret**: assign tap changers, shunts and the structural ratio to
//!    logical ends according to [`Xfmr2Config`].
//! 3. **Convert**: move everything found at end2 onto end1.

use tracing::{debug, warn};
use xfc_core::config::{
    Configuration, Xfmr2Config, Xfmr2RatioPhase, Xfmr2Shunt, Xfmr2StructuralRatio,
};
use xfc_core::converted::{ConvertedT2x, ConvertedT2xEnd1, ConvertedT2xEnd2};
use xfc_core::diagnostics::{ConditionKind, Diagnostics};
use xfc_core::error::XfcResult;
use xfc_core::model::{AllShunt, AllTapChanger, RatioConversion, TapChanger, TwoWindingEnds, WindingEnd};
use xfc_core::units::{Degrees, Kilovolts};
use xfc_core::{TerminalId, TransformerId};

use crate::ratio::{identity_ratio_conversion, relocate_ratio};
use crate::regulating::RegulatingControls;
use crate::tap_changer::{combine, negate_angles, relocate};
use crate::Conversion;

/// Convert the raw ends of a two-winding transformer.
///
/// Malformed ends abort this transformer with [`XfcError::MalformedInput`];
/// recoverable conditions are returned in the [`Conversion`] diagnostics.
///
/// [`XfcError::MalformedInput`]: xfc_core::XfcError::MalformedInput
pub fn convert(ends: &TwoWindingEnds, config: &Configuration) -> XfcResult<Conversion<ConvertedT2x>> {
    ends.validate()?;
    let mut diagnostics = Diagnostics::new();

    let loaded = LoadedT2x::load(ends);
    debug!(transformer = %loaded.id, r = loaded.r, x = loaded.x, "loaded two-winding transformer");

    let interpreted = interpret(
        loaded,
        &config.xfmr2,
        config.phase_angle_clock_enabled,
        &mut diagnostics,
    );
    debug!(
        transformer = %interpreted.id,
        structural_ratio_at_end2 = interpreted.structural_ratio_at_end2,
        "interpreted two-winding transformer"
    );

    let model = convert_interpreted(interpreted, &mut diagnostics)?;
    let regulating = RegulatingControls::for_two_winding(&model);
    Ok(Conversion {
        model,
        regulating,
        diagnostics,
    })
}

#[derive(Debug, Clone)]
struct LoadedEnd {
    g: f64,
    b: f64,
    ratio_tap_changer: Option<TapChanger>,
    phase_tap_changer: Option<TapChanger>,
    rated_u: Kilovolts,
    terminal: TerminalId,
    phase_angle_clock: u8,
    x_is_zero: bool,
}

impl LoadedEnd {
    fn load(end: &WindingEnd) -> Self {
        Self {
            g: end.g,
            b: end.b,
            ratio_tap_changer: end.ratio_tap_changer.clone(),
            phase_tap_changer: end.phase_tap_changer.clone(),
            rated_u: end.rated_u,
            terminal: end.terminal.clone(),
            phase_angle_clock: end.phase_angle_clock,
            x_is_zero: end.x == 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct LoadedT2x {
    id: TransformerId,
    r: f64,
    x: f64,
    end1: LoadedEnd,
    end2: LoadedEnd,
}

impl LoadedT2x {
    fn load(ends: &TwoWindingEnds) -> Self {
        Self {
            id: ends.id.clone(),
            r: ends.end1.r + ends.end2.r,
            x: ends.end1.x + ends.end2.x,
            end1: LoadedEnd::load(&ends.end1),
            end2: LoadedEnd::load(&ends.end2),
        }
    }
}

#[derive(Debug, Clone)]
struct InterpretedEnd {
    g: f64,
    b: f64,
    ratio_tap_changer: Option<TapChanger>,
    phase_tap_changer: Option<TapChanger>,
    rated_u: Kilovolts,
    terminal: TerminalId,
}

#[derive(Debug, Clone)]
struct InterpretedT2x {
    id: TransformerId,
    r: f64,
    x: f64,
    end1: InterpretedEnd,
    end2: InterpretedEnd,
    structural_ratio_at_end2: bool,
    phase_angle_clock: u8,
}

fn interpret(
    loaded: LoadedT2x,
    config: &Xfmr2Config,
    clock_enabled: bool,
    diagnostics: &mut Diagnostics,
) -> InterpretedT2x {
    let shunts = interpret_shunts(&loaded, config.shunt);
    let structural_ratio_at_end2 = interpret_structural_ratio(&loaded, config.structural_ratio);
    let phase_angle_clock = interpret_phase_angle_clock(&loaded, clock_enabled, diagnostics);

    let LoadedT2x {
        id,
        r,
        x,
        end1,
        end2,
    } = loaded;
    let raw_taps = AllTapChanger {
        ratio1: end1.ratio_tap_changer,
        phase1: end1.phase_tap_changer,
        ratio2: end2.ratio_tap_changer,
        phase2: end2.phase_tap_changer,
    };
    let mut taps =
        interpret_tap_changers(raw_taps, config.ratio_phase, end1.x_is_zero, diagnostics);
    if config.phase_negate {
        taps.phase1 = negate_angles(taps.phase1);
        taps.phase2 = negate_angles(taps.phase2);
    }

    InterpretedT2x {
        id,
        r,
        x,
        end1: InterpretedEnd {
            g: shunts.g1,
            b: shunts.b1,
            ratio_tap_changer: taps.ratio1,
            phase_tap_changer: taps.phase1,
            rated_u: end1.rated_u,
            terminal: end1.terminal,
        },
        end2: InterpretedEnd {
            g: shunts.g2,
            b: shunts.b2,
            ratio_tap_changer: taps.ratio2,
            phase_tap_changer: taps.phase2,
            rated_u: end2.rated_u,
            terminal: end2.terminal,
        },
        structural_ratio_at_end2,
        phase_angle_clock,
    }
}

fn interpret_tap_changers(
    taps: AllTapChanger,
    policy: Xfmr2RatioPhase,
    x_is_zero1: bool,
    diagnostics: &mut Diagnostics,
) -> AllTapChanger {
    match policy {
        Xfmr2RatioPhase::End1 => at_end1(taps, diagnostics),
        Xfmr2RatioPhase::End2 => at_end2(taps, diagnostics),
        Xfmr2RatioPhase::End1End2 => taps,
        Xfmr2RatioPhase::X if x_is_zero1 => at_end1(taps, diagnostics),
        Xfmr2RatioPhase::X => at_end2(taps, diagnostics),
    }
}

fn at_end1(taps: AllTapChanger, diagnostics: &mut Diagnostics) -> AllTapChanger {
    AllTapChanger {
        ratio1: combine(taps.ratio1, taps.ratio2, diagnostics),
        phase1: combine(taps.phase1, taps.phase2, diagnostics),
        ratio2: None,
        phase2: None,
    }
}

fn at_end2(taps: AllTapChanger, diagnostics: &mut Diagnostics) -> AllTapChanger {
    AllTapChanger {
        ratio1: None,
        phase1: None,
        ratio2: combine(taps.ratio2, taps.ratio1, diagnostics),
        phase2: combine(taps.phase2, taps.phase1, diagnostics),
    }
}

fn interpret_shunts(loaded: &LoadedT2x, policy: Xfmr2Shunt) -> AllShunt {
    let (g1, b1, g2, b2) = (loaded.end1.g, loaded.end1.b, loaded.end2.g, loaded.end2.b);
    match policy {
        Xfmr2Shunt::End1 => AllShunt {
            g1: g1 + g2,
            b1: b1 + b2,
            g2: 0.0,
            b2: 0.0,
        },
        Xfmr2Shunt::End2 => AllShunt {
            g1: 0.0,
            b1: 0.0,
            g2: g1 + g2,
            b2: b1 + b2,
        },
        Xfmr2Shunt::End1End2 => AllShunt { g1, b1, g2, b2 },
        Xfmr2Shunt::Split => {
            let g = (g1 + g2) * 0.5;
            let b = (b1 + b2) * 0.5;
            AllShunt {
                g1: g,
                b1: b,
                g2: g,
                b2: b,
            }
        }
    }
}

fn interpret_structural_ratio(loaded: &LoadedT2x, policy: Xfmr2StructuralRatio) -> bool {
    if loaded.end1.rated_u == loaded.end2.rated_u {
        return false;
    }
    match policy {
        Xfmr2StructuralRatio::End1 => false,
        Xfmr2StructuralRatio::End2 => true,
        Xfmr2StructuralRatio::X => !loaded.end1.x_is_zero,
    }
}

fn interpret_phase_angle_clock(
    loaded: &LoadedT2x,
    enabled: bool,
    diagnostics: &mut Diagnostics,
) -> u8 {
    if !enabled {
        return 0;
    }
    if loaded.end1.phase_angle_clock != 0 {
        let message = format!(
            "phase angle clock {} at end1 is not supported and was dropped",
            loaded.end1.phase_angle_clock
        );
        warn!(transformer = %loaded.id, clock = loaded.end1.phase_angle_clock, "unsupported phase angle clock at end1");
        diagnostics.add_warning_with_entity(
            ConditionKind::UnsupportedModeling,
            &message,
            loaded.id.as_str(),
        );
    }
    loaded.end2.phase_angle_clock
}

fn convert_interpreted(
    interpreted: InterpretedT2x,
    diagnostics: &mut Diagnostics,
) -> XfcResult<ConvertedT2x> {
    let InterpretedT2x {
        id,
        r,
        x,
        end1,
        end2,
        structural_ratio_at_end2,
        phase_angle_clock,
    } = interpreted;

    let ratio_tap_changer = combine(
        end1.ratio_tap_changer,
        relocate(end2.ratio_tap_changer),
        diagnostics,
    );
    let phase_tap_changer = combine(
        end1.phase_tap_changer,
        relocate(end2.phase_tap_changer),
        diagnostics,
    );

    let pi = RatioConversion {
        r,
        x,
        g1: end1.g,
        b1: end1.b,
        g2: end2.g,
        b2: end2.b,
    };
    let converted = if structural_ratio_at_end2 {
        let a0 = end2.rated_u / end1.rated_u;
        relocate_ratio(a0, Degrees(0.0), pi)?
    } else {
        identity_ratio_conversion(pi)
    };

    Ok(ConvertedT2x {
        id,
        r: converted.r,
        x: converted.x,
        end1: ConvertedT2xEnd1 {
            g: converted.g1 + converted.g2,
            b: converted.b1 + converted.b2,
            ratio_tap_changer,
            phase_tap_changer,
            rated_u: end1.rated_u,
            terminal: end1.terminal,
        },
        end2: ConvertedT2xEnd2 {
            rated_u: end2.rated_u,
            terminal: end2.terminal,
        },
        phase_angle_clock,
    })
}
