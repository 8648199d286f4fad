//! # xfc-io: Input and Output Adapters
//!
//! Thin adapters around the conversion core:
//!
//! - [`document`] - raw-ends input documents (JSON) and their conversion to model records
//! - [`tap_table`] - explicit or generated tap-changer step tables
//! - [`config`] - configuration files in TOML, YAML or JSON
//! - [`output`] - JSON output files
//!
//! Malformed transformer data surfaces as `XfcError::MalformedInput` so a batch
//! driver can skip the transformer; file and syntax errors are `anyhow` errors
//! with the path in their context.

pub mod config;
pub mod document;
pub mod output;
pub mod tap_table;

pub use config::{load_configuration, parse_configuration, render_configuration, ConfigFormat};
pub use document::{load_document, RawDocument, RawEnd, RawThreeWinding, RawTwoWinding};
pub use output::{read_json, write_json};
pub use tap_table::{StepTable, TapChangerSpec, TapTable};
