//! Three-winding transformer conversion.
//!
//! The transformer is modelled as three legs meeting at a fictitious star bus
//! with reference voltage `ratedUf`. Each leg is interpreted and converted on its
//! own: end1 is the network side, end2 the star bus.

use tracing::{debug, warn};
use xfc_core::config::{Configuration, Xfmr3RatedUf, Xfmr3Shunt, Xfmr3WindingConfig};
use xfc_core::converted::{
    ConvertedT3x, ConvertedWinding, ConvertedWindingEnd1, ConvertedWindingEnd2,
};
use xfc_core::diagnostics::{ConditionKind, Diagnostics};
use xfc_core::error::XfcResult;
use xfc_core::model::{AllShunt, AllTapChanger, RatioConversion, ThreeWindingEnds, WindingEnd};
use xfc_core::units::{Degrees, Kilovolts};
use xfc_core::{TerminalId, TransformerId, WindingIndex};

use crate::ratio::{identity_ratio_conversion, relocate_ratio};
use crate::regulating::RegulatingControls;
use crate::tap_changer::{combine, relocate};
use crate::Conversion;

/// Convert the raw windings of a three-winding transformer.
pub fn convert(
    ends: &ThreeWindingEnds,
    config: &Configuration,
) -> XfcResult<Conversion<ConvertedT3x>> {
    ends.validate()?;
    let mut diagnostics = Diagnostics::new();

    let rated_uf = select_rated_uf(ends, config.xfmr3.rated_uf);
    debug!(transformer = %ends.id, rated_uf = rated_uf.value(), policy = %config.xfmr3.rated_uf, "selected star bus voltage");

    // NETWORK_SIDE leaves the structural ratios distributed over the legs
    let star_bus_ratio = config.xfmr3.rated_uf != Xfmr3RatedUf::NetworkSide;
    let [w1, w2, w3] = WindingIndex::ALL.map(|index| {
        interpret_winding(
            &ends.id,
            index,
            ends.winding(index),
            config.xfmr3.winding(index),
            star_bus_ratio,
            config.phase_angle_clock_enabled,
            &mut diagnostics,
        )
    });
    let windings = [
        convert_winding(w1, rated_uf, &mut diagnostics)?,
        convert_winding(w2, rated_uf, &mut diagnostics)?,
        convert_winding(w3, rated_uf, &mut diagnostics)?,
    ];

    let model = ConvertedT3x {
        id: ends.id.clone(),
        rated_uf,
        windings,
    };
    let regulating = RegulatingControls::for_three_winding(&model);
    Ok(Conversion {
        model,
        regulating,
        diagnostics,
    })
}

/// Star-bus reference voltage for the configured policy.
///
/// `STAR_BUS_SIDE` takes winding 1's rated voltage whichever winding is the
/// intended reference.
pub fn select_rated_uf(ends: &ThreeWindingEnds, policy: Xfmr3RatedUf) -> Kilovolts {
    match policy {
        Xfmr3RatedUf::StarBusSide => ends.winding(WindingIndex::One).rated_u,
        Xfmr3RatedUf::NetworkSide => Kilovolts(1.0),
        Xfmr3RatedUf::End1 => ends.winding(WindingIndex::One).rated_u,
        Xfmr3RatedUf::End2 => ends.winding(WindingIndex::Two).rated_u,
        Xfmr3RatedUf::End3 => ends.winding(WindingIndex::Three).rated_u,
    }
}

#[derive(Debug, Clone)]
struct InterpretedWinding {
    index: WindingIndex,
    r: f64,
    x: f64,
    taps: AllTapChanger,
    shunts: AllShunt,
    phase_angle_clock: u8,
    rated_u: Kilovolts,
    terminal: TerminalId,
    ratio0_at_star_bus: bool,
}

fn interpret_winding(
    id: &TransformerId,
    index: WindingIndex,
    winding: &WindingEnd,
    config: &Xfmr3WindingConfig,
    star_bus_ratio: bool,
    clock_enabled: bool,
    diagnostics: &mut Diagnostics,
) -> InterpretedWinding {
    let ratio = winding.ratio_tap_changer.clone();
    let phase = winding.phase_tap_changer.clone();
    let taps = if config.ratio_phase_network_side {
        AllTapChanger {
            ratio1: ratio,
            phase1: phase,
            ..AllTapChanger::default()
        }
    } else {
        AllTapChanger {
            ratio2: ratio,
            phase2: phase,
            ..AllTapChanger::default()
        }
    };

    InterpretedWinding {
        index,
        r: winding.r,
        x: winding.x,
        taps,
        shunts: interpret_shunt(winding.g, winding.b, config.shunt),
        phase_angle_clock: interpret_phase_angle_clock(id, index, winding, clock_enabled, diagnostics),
        rated_u: winding.rated_u,
        terminal: winding.terminal.clone(),
        ratio0_at_star_bus: star_bus_ratio && config.ratio0_at_star_bus,
    }
}

fn interpret_shunt(g: f64, b: f64, policy: Xfmr3Shunt) -> AllShunt {
    match policy {
        Xfmr3Shunt::NetworkSide => AllShunt {
            g1: g,
            b1: b,
            g2: 0.0,
            b2: 0.0,
        },
        Xfmr3Shunt::StarBusSide => AllShunt {
            g1: 0.0,
            b1: 0.0,
            g2: g,
            b2: b,
        },
        Xfmr3Shunt::Split => AllShunt {
            g1: g * 0.5,
            b1: b * 0.5,
            g2: g * 0.5,
            b2: b * 0.5,
        },
    }
}

fn interpret_phase_angle_clock(
    id: &TransformerId,
    index: WindingIndex,
    winding: &WindingEnd,
    enabled: bool,
    diagnostics: &mut Diagnostics,
) -> u8 {
    if !enabled {
        return 0;
    }
    // The destination has no clock slot at the network side of winding 1
    if index == WindingIndex::One && winding.phase_angle_clock != 0 {
        let message = format!(
            "phase angle clock {} at {} is not supported and was dropped",
            winding.phase_angle_clock, index
        );
        warn!(transformer = %id, clock = winding.phase_angle_clock, "unsupported phase angle clock at winding 1");
        diagnostics.add_warning_with_entity(ConditionKind::UnsupportedModeling, &message, id.as_str());
        return 0;
    }
    winding.phase_angle_clock
}

fn convert_winding(
    winding: InterpretedWinding,
    rated_uf: Kilovolts,
    diagnostics: &mut Diagnostics,
) -> XfcResult<ConvertedWinding> {
    let InterpretedWinding {
        index,
        r,
        x,
        taps,
        shunts,
        phase_angle_clock,
        rated_u,
        terminal,
        ratio0_at_star_bus,
    } = winding;

    let ratio_tap_changer = combine(taps.ratio1, relocate(taps.ratio2), diagnostics);
    let phase_tap_changer = combine(taps.phase1, relocate(taps.phase2), diagnostics);

    let pi = RatioConversion {
        r,
        x,
        g1: shunts.g1,
        b1: shunts.b1,
        g2: shunts.g2,
        b2: shunts.b2,
    };
    let converted = if ratio0_at_star_bus {
        relocate_ratio(rated_uf / rated_u, Degrees(0.0), pi)?
    } else {
        identity_ratio_conversion(pi)
    };

    Ok(ConvertedWinding {
        index,
        r: converted.r,
        x: converted.x,
        end1: ConvertedWindingEnd1 {
            g: converted.g1,
            b: converted.b1,
            ratio_tap_changer,
            phase_tap_changer,
            phase_angle_clock,
            rated_u,
            terminal,
        },
        end2: ConvertedWindingEnd2 {
            g: converted.g2,
            b: converted.b2,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ends(rated: [f64; 3]) -> ThreeWindingEnds {
        let winding = |i: usize| {
            WindingEnd::new(
                0.5,
                12.0,
                1e-6,
                1e-5,
                Kilovolts(rated[i]),
                TerminalId::new(format!("TE{}", i + 1)),
            )
        };
        ThreeWindingEnds {
            id: TransformerId::new("T3"),
            windings: [winding(0), winding(1), winding(2)],
        }
    }

    #[test]
    fn rated_uf_policies() {
        let t = ends([230.0, 115.0, 23.0]);
        assert_eq!(select_rated_uf(&t, Xfmr3RatedUf::StarBusSide), Kilovolts(230.0));
        assert_eq!(select_rated_uf(&t, Xfmr3RatedUf::NetworkSide), Kilovolts(1.0));
        assert_eq!(select_rated_uf(&t, Xfmr3RatedUf::End1), Kilovolts(230.0));
        assert_eq!(select_rated_uf(&t, Xfmr3RatedUf::End2), Kilovolts(115.0));
        assert_eq!(select_rated_uf(&t, Xfmr3RatedUf::End3), Kilovolts(23.0));
    }

    #[test]
    fn shunt_policies_conserve_admittance() {
        for policy in [Xfmr3Shunt::NetworkSide, Xfmr3Shunt::StarBusSide, Xfmr3Shunt::Split] {
            let shunt = interpret_shunt(2e-6, -4e-5, policy);
            assert_eq!(shunt.total_g(), 2e-6);
            assert_eq!(shunt.total_b(), -4e-5);
        }
    }

    #[test]
    fn winding1_clock_is_dropped_and_reported() {
        let mut diag = Diagnostics::new();
        let t = ends([230.0, 115.0, 23.0]);
        let w1 = t.windings[0].clone().with_phase_angle_clock(1);
        let w2 = t.windings[1].clone().with_phase_angle_clock(5);

        let id = TransformerId::new("T3");
        assert_eq!(interpret_phase_angle_clock(&id, WindingIndex::One, &w1, true, &mut diag), 0);
        assert_eq!(interpret_phase_angle_clock(&id, WindingIndex::Two, &w2, true, &mut diag), 5);
        assert_eq!(diag.count_of(ConditionKind::UnsupportedModeling), 1);
        assert_eq!(interpret_phase_angle_clock(&id, WindingIndex::Two, &w2, false, &mut diag), 0);
    }
}
