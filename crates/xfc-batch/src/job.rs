use serde::{Deserialize, Serialize};
use xfc_core::diagnostics::Diagnostics;
use xfc_io::{RawDocument, RawThreeWinding, RawTwoWinding};

/// Transformer categories handled by the batch driver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TransformerKind {
    TwoWinding,
    ThreeWinding,
}

impl TransformerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformerKind::TwoWinding => "two-winding",
            TransformerKind::ThreeWinding => "three-winding",
        }
    }
}

#[derive(Debug, Clone)]
pub enum JobInput {
    TwoWinding(RawTwoWinding),
    ThreeWinding(RawThreeWinding),
}

/// One transformer to convert.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub transformer_id: String,
    pub input: JobInput,
}

impl ConversionJob {
    pub fn kind(&self) -> TransformerKind {
        match self.input {
            JobInput::TwoWinding(_) => TransformerKind::TwoWinding,
            JobInput::ThreeWinding(_) => TransformerKind::ThreeWinding,
        }
    }
}

/// Outcome of one job as written to the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub transformer_id: String,
    pub kind: TransformerKind,
    pub status: String,
    pub error: Option<String>,
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl ConversionRecord {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Jobs in document order: two-winding transformers first.
pub fn jobs_from_document(document: &RawDocument) -> Vec<ConversionJob> {
    let two = document.two_winding.iter().map(|raw| ConversionJob {
        transformer_id: raw.id.clone(),
        input: JobInput::TwoWinding(raw.clone()),
    });
    let three = document.three_winding.iter().map(|raw| ConversionJob {
        transformer_id: raw.id.clone(),
        input: JobInput::ThreeWinding(raw.clone()),
    });
    two.chain(three).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfc_io::RawEnd;

    fn raw_end() -> RawEnd {
        RawEnd {
            r: 0.1,
            x: 1.0,
            g: 0.0,
            b: 0.0,
            rated_u: 20.0,
            terminal: "T".into(),
            phase_angle_clock: 0,
            ratio_tap_changer: None,
            phase_tap_changer: None,
        }
    }

    #[test]
    fn jobs_from_document_keeps_order() {
        let document = RawDocument {
            two_winding: vec![RawTwoWinding {
                id: "PT-1".into(),
                end1: raw_end(),
                end2: raw_end(),
            }],
            three_winding: vec![RawThreeWinding {
                id: "T3W-1".into(),
                windings: vec![raw_end(), raw_end(), raw_end()],
            }],
        };
        let jobs = jobs_from_document(&document);
        let ids: Vec<&str> = jobs.iter().map(|j| j.transformer_id.as_str()).collect();
        assert_eq!(ids, vec!["PT-1", "T3W-1"]);
        assert_eq!(jobs[1].kind(), TransformerKind::ThreeWinding);
        assert_eq!(jobs[0].kind().as_str(), "two-winding");
    }
}
