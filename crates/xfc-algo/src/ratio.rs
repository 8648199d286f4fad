//! Relocation of a structural ratio across a π-section.
//!
//! A π-section with series impedance `z = r + jx`, shunts `ya = g1 + jb1` at end1
//! and `yb = g2 + jb2` at end2, and an ideal ratio `a = a0∠angle0` at end2
//! (`V2 = a·Vb`) has the two-port admittance matrix
//!
//! ```text
//! Y11 = ya + y          Y12 = -y / a
//! Y22 = (yb + y) / |a|² Y21 = -y / conj(a)
//! ```
//!
//! with `y = 1/z`. Moving the ratio to end1 as `1/a` and solving for the section
//! that keeps the same matrix gives
//!
//! ```text
//! y'  = y  / |a|²
//! ya' = ya / |a|²
//! yb' = Y22 - y'
//! ```
//!
//! so `r` and `x` scale by `a0²` while `g` and `b` at both ends scale by `1/a0²`.
//! The returned section depends on `|a|` only. The phase of `a` appears solely in
//! `Y12` and `Y21`, which a π-section cannot hold, so it is dropped here: a caller
//! with a phase-shifting structural ratio keeps that angle on the tap changer it
//! moves to end1.

use num_complex::Complex64;
use xfc_core::error::{XfcError, XfcResult};
use xfc_core::model::RatioConversion;
use xfc_core::units::Degrees;

/// Re-express a π-section after moving the ratio `a0∠angle0` from end2 to end1.
///
/// The identity ratio (`a0 == 1`, `angle0 == 0`) returns the input bit for bit.
/// `angle0` is validated but does not change the result, see the module docs.
/// A non-positive or non-finite magnitude or angle is malformed input.
pub fn relocate_ratio(
    a0: f64,
    angle0: Degrees,
    pi: RatioConversion,
) -> XfcResult<RatioConversion> {
    if !a0.is_finite() || a0 <= 0.0 || !angle0.is_finite() {
        return Err(XfcError::malformed(
            "structural ratio",
            format!("cannot relocate ratio {}∠{}", a0, angle0),
        ));
    }
    if a0 == 1.0 && angle0.value() == 0.0 {
        return Ok(identity_ratio_conversion(pi));
    }

    let a = Complex64::from_polar(a0, angle0.to_radians().value());
    let scale = a.norm_sqr();
    let ya = Complex64::new(pi.g1, pi.b1);
    let yb = Complex64::new(pi.g2, pi.b2);
    let z = Complex64::new(pi.r, pi.x);

    // No series branch: the ends are decoupled and only the shunts rescale
    if z.re == 0.0 && z.im == 0.0 {
        let ya_new = ya / scale;
        let yb_new = yb / scale;
        return Ok(RatioConversion {
            r: 0.0,
            x: 0.0,
            g1: ya_new.re,
            b1: ya_new.im,
            g2: yb_new.re,
            b2: yb_new.im,
        });
    }

    let y = z.inv();
    let y11 = ya + y;
    let y12 = -y / a;
    let y22 = (yb + y) / scale;

    let y_new = -y12 / a.conj();
    let ya_new = y11 / scale - y_new;
    let yb_new = y22 - y_new;
    let z_new = y_new.inv();

    Ok(RatioConversion {
        r: z_new.re,
        x: z_new.im,
        g1: ya_new.re,
        b1: ya_new.im,
        g2: yb_new.re,
        b2: yb_new.im,
    })
}

/// The π-section unchanged, for ends that carry no structural ratio.
#[inline]
pub fn identity_ratio_conversion(pi: RatioConversion) -> RatioConversion {
    pi
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn section() -> RatioConversion {
        RatioConversion {
            r: 0.2,
            x: 10.0,
            g1: 1e-5,
            b1: -2e-4,
            g2: 3e-6,
            b2: 4e-5,
        }
    }

    fn assert_close(got: f64, want: f64) {
        assert!(
            (got - want).abs() <= TOL * want.abs().max(1.0),
            "got {got}, want {want}"
        );
    }

    #[test]
    fn identity_is_exact() {
        let pi = section();
        assert_eq!(relocate_ratio(1.0, Degrees(0.0), pi).unwrap(), pi);
        assert_eq!(identity_ratio_conversion(pi), pi);
    }

    #[test]
    fn magnitude_scales_impedance_and_admittance() {
        let pi = section();
        let out = relocate_ratio(0.5, Degrees(0.0), pi).unwrap();
        assert_close(out.r, 0.2 * 0.25);
        assert_close(out.x, 10.0 * 0.25);
        assert_close(out.g1, 1e-5 / 0.25);
        assert_close(out.b1, -2e-4 / 0.25);
        assert_close(out.g2, 3e-6 / 0.25);
        assert_close(out.b2, 4e-5 / 0.25);
    }

    #[test]
    fn angle_does_not_change_the_section() {
        let pi = section();
        let plain = relocate_ratio(1.1, Degrees(0.0), pi).unwrap();
        let shifted = relocate_ratio(1.1, Degrees(30.0), pi).unwrap();
        assert_close(shifted.r, plain.r);
        assert_close(shifted.x, plain.x);
        assert_close(shifted.g1, plain.g1);
        assert_close(shifted.b1, plain.b1);
        assert_close(shifted.g2, plain.g2);
        assert_close(shifted.b2, plain.b2);
        assert!(relocate_ratio(1.1, Degrees(f64::INFINITY), pi).is_err());
    }

    #[test]
    fn zero_impedance_only_scales_shunts() {
        let pi = RatioConversion {
            r: 0.0,
            x: 0.0,
            ..section()
        };
        let out = relocate_ratio(2.0, Degrees(0.0), pi).unwrap();
        assert_eq!(out.r, 0.0);
        assert_eq!(out.x, 0.0);
        assert_close(out.b1, -2e-4 / 4.0);
    }

    #[test]
    fn rejects_non_positive_ratio() {
        assert!(relocate_ratio(0.0, Degrees(0.0), section()).is_err());
        assert!(relocate_ratio(-1.0, Degrees(0.0), section()).is_err());
        assert!(relocate_ratio(f64::NAN, Degrees(0.0), section()).is_err());
    }
}
