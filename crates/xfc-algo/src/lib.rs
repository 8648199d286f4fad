//! # xfc-algo: Transformer Conversion Algorithms
//!
//! Refers every tap changer, shunt and structural ratio of a transformer to its
//! network-side end.
//!
//! ## Modules
//!
//! - [`tap_changer`] - combine two tap changers, relocate one across the ideal ratio
//! - [`ratio`] - move a complex structural ratio across a π-section
//! - [`two_winding`] - load / interpret / convert for two-winding transformers
//! - [`three_winding`] - per-leg conversion against a shared star-bus voltage
//! - [`regulating`] - regulating-control records returned with each model
//!
//! ## Example
//!
//! ```
//! use xfc_algo::two_winding;
//! use xfc_core::{Configuration, Kilovolts, TerminalId, TransformerId, TwoWindingEnds, WindingEnd};
//!
//! let ends = TwoWindingEnds {
//!     id: TransformerId::new("T1"),
//!     end1: WindingEnd::new(0.0, 0.0, 0.0, 0.0, Kilovolts(230.0), TerminalId::new("A")),
//!     end2: WindingEnd::new(2.0, 20.0, 0.0, 0.0, Kilovolts(115.0), TerminalId::new("B")),
//! };
//! let conversion = two_winding::convert(&ends, &Configuration::default()).unwrap();
//! assert_eq!(conversion.model.r, 2.0);
//! assert!(!conversion.diagnostics.has_issues());
//! ```
//!
//! Every function takes its inputs by value or shared reference and returns new
//! records, so transformers can be converted concurrently with one shared
//! [`Configuration`].

use serde::{Deserialize, Serialize};
use xfc_core::converted::{ConvertedT2x, ConvertedT3x};
use xfc_core::diagnostics::Diagnostics;
use xfc_core::error::XfcResult;
use xfc_core::model::{ThreeWindingEnds, TwoWindingEnds};
use xfc_core::{Configuration, TransformerId};

pub mod ratio;
pub mod regulating;
pub mod tap_changer;
pub mod three_winding;
pub mod two_winding;

pub use ratio::{identity_ratio_conversion, relocate_ratio};
pub use regulating::{RegulatingControlRecord, RegulatingControls, TapChangerKind};
pub use tap_changer::{combine, negate_angles, relocate};

/// Result of converting one transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion<T> {
    pub model: T,
    /// Regulating controls of the converted tap changers
    pub regulating: RegulatingControls,
    /// Recoverable conditions met along the way
    pub diagnostics: Diagnostics,
}

/// Raw transformer records that convert into a destination model.
pub trait TransformerConversion {
    type Output;

    fn id(&self) -> &TransformerId;

    fn convert(&self, config: &Configuration) -> XfcResult<Conversion<Self::Output>>;
}

impl TransformerConversion for TwoWindingEnds {
    type Output = ConvertedT2x;

    fn id(&self) -> &TransformerId {
        &self.id
    }

    fn convert(&self, config: &Configuration) -> XfcResult<Conversion<ConvertedT2x>> {
        two_winding::convert(self, config)
    }
}

impl TransformerConversion for ThreeWindingEnds {
    type Output = ConvertedT3x;

    fn id(&self) -> &TransformerId {
        &self.id
    }

    fn convert(&self, config: &Configuration) -> XfcResult<Conversion<ConvertedT3x>> {
        three_winding::convert(self, config)
    }
}
