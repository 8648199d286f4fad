use xfc_algo::{relocate, relocate_ratio, two_winding, TapChangerKind};
use xfc_core::{
    ConditionKind, Configuration, Degrees, Kilovolts, RatioConversion, Regulation,
    RegulationMode, TapChanger, TapStep, TerminalId, TransformerId, TwoWindingEnds, WindingEnd,
    Xfmr2RatioPhase, Xfmr2Shunt, Xfmr2StructuralRatio,
};

fn ratio_tc(id: &str) -> TapChanger {
    let steps = [0.95, 1.0, 1.05]
        .iter()
        .map(|&rho| TapStep::new(rho, Degrees(0.0)))
        .collect();
    TapChanger::new(id, -1, steps, 1, 1).unwrap()
}

fn phase_tc(id: &str, target: f64) -> TapChanger {
    let steps = [-5.0, 0.0, 5.0]
        .iter()
        .map(|&angle| TapStep::new(1.0, Degrees(angle)))
        .collect();
    TapChanger::new(id, -1, steps, 1, 2)
        .unwrap()
        .with_regulation(Regulation {
            mode: RegulationMode::ActivePower,
            target_value: target,
            target_deadband: 1.0,
            target_terminal: None,
            enabled: true,
        })
}

fn end(r: f64, x: f64, g: f64, b: f64, rated_u: f64, terminal: &str) -> WindingEnd {
    WindingEnd::new(r, x, g, b, Kilovolts(rated_u), TerminalId::new(terminal))
}

fn transformer(end1: WindingEnd, end2: WindingEnd) -> TwoWindingEnds {
    TwoWindingEnds {
        id: TransformerId::new("PT-230-115"),
        end1,
        end2,
    }
}

fn config(
    ratio_phase: Xfmr2RatioPhase,
    shunt: Xfmr2Shunt,
    structural_ratio: Xfmr2StructuralRatio,
) -> Configuration {
    let mut config = Configuration::default();
    config.xfmr2.ratio_phase = ratio_phase;
    config.xfmr2.shunt = shunt;
    config.xfmr2.structural_ratio = structural_ratio;
    config
}

#[test]
fn end2_tap_and_ratio_move_to_end1() {
    let rtc = ratio_tc("RTC");
    let ends = transformer(
        end(0.0, 0.0, 0.0, 0.0, 230.0, "HV"),
        end(2.0, 20.0, 0.0, 0.0, 115.0, "LV").with_ratio_tap_changer(rtc.clone()),
    );
    let cfg = config(
        Xfmr2RatioPhase::End2,
        Xfmr2Shunt::End1End2,
        Xfmr2StructuralRatio::End2,
    );

    let conversion = two_winding::convert(&ends, &cfg).unwrap();
    let model = &conversion.model;

    assert_eq!(model.end1.rated_u, Kilovolts(230.0));
    assert_eq!(model.end2.rated_u, Kilovolts(115.0));
    assert_eq!(model.structural_ratio(), 0.5);

    let expected_tap = relocate(Some(rtc)).unwrap();
    let tap = model.end1.ratio_tap_changer.as_ref().unwrap();
    assert_eq!(tap.steps, expected_tap.steps);
    assert_eq!(tap.neutral_step, 1);
    assert!(model.end1.phase_tap_changer.is_none());

    let expected_pi = relocate_ratio(
        0.5,
        Degrees(0.0),
        RatioConversion {
            r: 2.0,
            x: 20.0,
            ..RatioConversion::default()
        },
    )
    .unwrap();
    assert_eq!(model.r, expected_pi.r);
    assert_eq!(model.x, expected_pi.x);
    assert!((model.r - 0.5).abs() < 1e-12);
    assert!((model.x - 5.0).abs() < 1e-12);
    assert!(!conversion.diagnostics.has_issues());
}

#[test]
fn equal_rated_voltages_convert_without_ratio() {
    let ends = transformer(
        end(0.3, 4.0, 1e-6, 2e-5, 110.0, "A"),
        end(0.1, 2.0, 3e-6, 4e-5, 110.0, "B"),
    );
    for structural_ratio in [
        Xfmr2StructuralRatio::End1,
        Xfmr2StructuralRatio::End2,
        Xfmr2StructuralRatio::X,
    ] {
        let cfg = config(Xfmr2RatioPhase::End1End2, Xfmr2Shunt::End1End2, structural_ratio);
        let model = two_winding::convert(&ends, &cfg).unwrap().model;
        assert_eq!(model.structural_ratio(), 1.0);
        assert_eq!(model.r, 0.3 + 0.1);
        assert_eq!(model.x, 4.0 + 2.0);
    }
}

#[test]
fn converted_shunt_holds_total_admittance() {
    let ends = transformer(
        end(0.3, 4.0, 1e-6, 2e-5, 110.0, "A"),
        end(0.1, 2.0, 3e-6, 4e-5, 110.0, "B"),
    );
    for shunt in [
        Xfmr2Shunt::End1,
        Xfmr2Shunt::End2,
        Xfmr2Shunt::End1End2,
        Xfmr2Shunt::Split,
    ] {
        let cfg = config(Xfmr2RatioPhase::End1End2, shunt, Xfmr2StructuralRatio::X);
        let model = two_winding::convert(&ends, &cfg).unwrap().model;
        assert!((model.end1.g - 4e-6).abs() < 1e-18, "{shunt}");
        assert!((model.end1.b - 6e-5).abs() < 1e-18, "{shunt}");
    }
}

#[test]
fn conflicting_phase_regulation_reported_once() {
    let ends = transformer(
        end(0.0, 0.0, 0.0, 0.0, 230.0, "A").with_phase_tap_changer(phase_tc("PTC-A", 150.0)),
        end(1.0, 10.0, 0.0, 0.0, 230.0, "B").with_phase_tap_changer(phase_tc("PTC-B", 80.0)),
    );

    for ratio_phase in [Xfmr2RatioPhase::End1, Xfmr2RatioPhase::End1End2] {
        let cfg = config(ratio_phase, Xfmr2Shunt::End1End2, Xfmr2StructuralRatio::X);
        let conversion = two_winding::convert(&ends, &cfg).unwrap();

        let tap = conversion.model.end1.phase_tap_changer.as_ref().unwrap();
        assert_eq!(tap.len(), 9);
        assert_eq!(tap.regulation.as_ref().unwrap().target_value, 150.0);
        assert_eq!(
            conversion
                .diagnostics
                .count_of(ConditionKind::ConflictingRegulation),
            1
        );

        assert_eq!(conversion.regulating.len(), 1);
        let record = conversion.regulating.iter().next().unwrap();
        assert_eq!(record.kind, TapChangerKind::Phase);
        assert_eq!(record.tap_changer, "PTC-A+PTC-B");
    }
}

#[test]
fn end1_end2_keeps_end1_tap_unchanged() {
    let rtc = ratio_tc("RTC1");
    let ends = transformer(
        end(0.2, 8.0, 0.0, 0.0, 20.0, "A").with_ratio_tap_changer(rtc.clone()),
        end(0.0, 0.0, 0.0, 0.0, 400.0, "B"),
    );
    let model = two_winding::convert(&ends, &Configuration::default())
        .unwrap()
        .model;
    assert_eq!(model.end1.ratio_tap_changer, Some(rtc));
}

#[test]
fn phase_negation_flips_angles() {
    let ends = transformer(
        end(0.0, 0.0, 0.0, 0.0, 230.0, "A").with_phase_tap_changer(phase_tc("PTC", 100.0)),
        end(1.0, 10.0, 0.0, 0.0, 230.0, "B"),
    );
    let mut cfg = Configuration::default();
    cfg.xfmr2.phase_negate = true;
    let model = two_winding::convert(&ends, &cfg).unwrap().model;
    let angles: Vec<f64> = model
        .end1
        .phase_tap_changer
        .unwrap()
        .steps
        .iter()
        .map(|s| s.angle.value())
        .collect();
    assert_eq!(angles, vec![5.0, 0.0, -5.0]);
}

#[test]
fn phase_angle_clock_of_end2_is_carried() {
    let ends = transformer(
        end(0.0, 0.0, 0.0, 0.0, 230.0, "A").with_phase_angle_clock(2),
        end(1.0, 10.0, 0.0, 0.0, 20.0, "B").with_phase_angle_clock(11),
    );
    let mut cfg = Configuration::default();
    cfg.phase_angle_clock_enabled = true;
    let conversion = two_winding::convert(&ends, &cfg).unwrap();
    assert_eq!(conversion.model.phase_angle_clock, 11);
    assert_eq!(
        conversion
            .diagnostics
            .count_of(ConditionKind::UnsupportedModeling),
        1
    );

    let disabled = two_winding::convert(&ends, &Configuration::default()).unwrap();
    assert_eq!(disabled.model.phase_angle_clock, 0);
    assert!(!disabled.diagnostics.has_issues());
}

#[test]
fn malformed_ends_fail_only_with_malformed_input() {
    let ends = transformer(
        end(0.0, 0.0, 0.0, 0.0, -230.0, "A"),
        end(1.0, 10.0, 0.0, 0.0, 115.0, "B"),
    );
    let err = two_winding::convert(&ends, &Configuration::default()).unwrap_err();
    assert!(err.is_per_transformer());

    let bad_tap = TapChanger {
        id: "RTC".to_string(),
        low_tap_position: 0,
        steps: vec![TapStep::new(-1.0, Degrees(0.0))],
        neutral_step: 0,
        tap_position: 0,
        regulation: None,
    };
    let ends = transformer(
        end(0.0, 0.0, 0.0, 0.0, 230.0, "A").with_ratio_tap_changer(bad_tap),
        end(1.0, 10.0, 0.0, 0.0, 115.0, "B"),
    );
    let err = two_winding::convert(&ends, &Configuration::default()).unwrap_err();
    assert!(err.to_string().contains("non-positive ratio"));
}

#[test]
fn end2_policy_combines_end2_first_and_keeps_its_regulation() {
    let ends = transformer(
        end(0.0, 0.0, 0.0, 0.0, 230.0, "A").with_phase_tap_changer(phase_tc("PTC-A", 150.0)),
        end(1.0, 10.0, 0.0, 0.0, 230.0, "B").with_phase_tap_changer(phase_tc("PTC-B", 80.0)),
    );
    let cfg = config(
        Xfmr2RatioPhase::End2,
        Xfmr2Shunt::End1End2,
        Xfmr2StructuralRatio::X,
    );
    let conversion = two_winding::convert(&ends, &cfg).unwrap();

    let tap = conversion.model.end1.phase_tap_changer.as_ref().unwrap();
    assert_eq!(tap.id, "PTC-B+PTC-A");
    assert_eq!(tap.len(), 9);
    assert_eq!(tap.neutral_step, 4);
    assert_eq!(tap.tap_position, 8);
    assert_eq!(tap.regulation.as_ref().unwrap().target_value, 80.0);
    // Combined at end2 then relocated: angles come back negated
    assert_eq!(tap.steps[0].angle, Degrees(10.0));
    assert_eq!(tap.steps[2].angle, Degrees(0.0));
    assert_eq!(tap.steps[8].angle, Degrees(-10.0));
    assert_eq!(
        conversion
            .diagnostics
            .count_of(ConditionKind::ConflictingRegulation),
        1
    );
}

#[test]
fn x_policy_follows_the_zero_reactance_end() {
    let rho = |tc: &TapChanger, i: usize| tc.steps[i].rho;
    let cfg = config(Xfmr2RatioPhase::X, Xfmr2Shunt::End1End2, Xfmr2StructuralRatio::End1);

    // End1 reactance is zero: both tap changers are combined at end1 as read
    let at_end1 = transformer(
        end(0.0, 0.0, 0.0, 0.0, 230.0, "A").with_ratio_tap_changer(ratio_tc("RTC1")),
        end(1.0, 10.0, 0.0, 0.0, 115.0, "B").with_ratio_tap_changer(ratio_tc("RTC2")),
    );
    let model = two_winding::convert(&at_end1, &cfg).unwrap().model;
    let tap = model.end1.ratio_tap_changer.as_ref().unwrap();
    assert_eq!(tap.id, "RTC1+RTC2");
    assert!((rho(tap, 0) - 0.95 * 0.95).abs() < 1e-12);
    assert!((rho(tap, 2) - 0.95 * 1.05).abs() < 1e-12);

    // Otherwise they are combined at end2 and relocated
    let at_end2 = transformer(
        end(0.0, 4.0, 0.0, 0.0, 230.0, "A").with_ratio_tap_changer(ratio_tc("RTC1")),
        end(1.0, 10.0, 0.0, 0.0, 115.0, "B").with_ratio_tap_changer(ratio_tc("RTC2")),
    );
    let model = two_winding::convert(&at_end2, &cfg).unwrap().model;
    let tap = model.end1.ratio_tap_changer.as_ref().unwrap();
    assert_eq!(tap.id, "RTC2+RTC1");
    assert!((rho(tap, 0) - 1.0 / (0.95 * 0.95)).abs() < 1e-12);
    assert!((rho(tap, 2) - 1.0 / (0.95 * 1.05)).abs() < 1e-12);
    assert_eq!(rho(tap, 4), 1.0);
}

#[test]
fn x_structural_ratio_relocates_unless_end1_reactance_is_zero() {
    let cfg = config(
        Xfmr2RatioPhase::End1End2,
        Xfmr2Shunt::End1End2,
        Xfmr2StructuralRatio::X,
    );

    let zero_x1 = transformer(
        end(0.0, 0.0, 0.0, 0.0, 230.0, "A"),
        end(2.0, 20.0, 1e-6, 4e-5, 115.0, "B"),
    );
    let model = two_winding::convert(&zero_x1, &cfg).unwrap().model;
    assert_eq!(model.r, 2.0);
    assert_eq!(model.x, 20.0);
    assert_eq!(model.end1.b, 4e-5);

    // a0 = 115 / 230 = 0.5 moved from end2 to end1
    let split = transformer(
        end(0.0, 4.0, 0.0, 0.0, 230.0, "A"),
        end(2.0, 16.0, 1e-6, 4e-5, 115.0, "B"),
    );
    let model = two_winding::convert(&split, &cfg).unwrap().model;
    assert!((model.r - 0.5).abs() < 1e-12);
    assert!((model.x - 5.0).abs() < 1e-12);
    assert!((model.end1.g - 4e-6).abs() < 1e-15);
    assert!((model.end1.b - 1.6e-4).abs() < 1e-15);
}

#[test]
fn end2_phase_tap_is_relocated_and_combined_with_end1() {
    let mut passive = phase_tc("PTC-B", 40.0);
    if let Some(regulation) = passive.regulation.as_mut() {
        regulation.enabled = false;
    }
    let ends = transformer(
        end(0.0, 0.0, 0.0, 0.0, 230.0, "A").with_phase_tap_changer(phase_tc("PTC-A", 150.0)),
        end(1.0, 10.0, 0.0, 0.0, 230.0, "B").with_phase_tap_changer(passive),
    );
    let conversion = two_winding::convert(&ends, &Configuration::default()).unwrap();

    let tap = conversion.model.end1.phase_tap_changer.as_ref().unwrap();
    assert_eq!(tap.id, "PTC-A+PTC-B");
    assert_eq!(tap.len(), 9);
    // angle_a - angle_b
    assert_eq!(tap.steps[0].angle, Degrees(0.0));
    assert_eq!(tap.steps[2].angle, Degrees(-10.0));
    assert_eq!(tap.steps[6].angle, Degrees(10.0));
    assert!(tap.steps.iter().all(|s| s.rho == 1.0));
    assert_eq!(tap.regulation.as_ref().unwrap().target_value, 150.0);
    assert!(!conversion.diagnostics.has_issues());
}
