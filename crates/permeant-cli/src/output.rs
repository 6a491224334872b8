use crate::error::Result;
use permeant::core::descriptors::GiAbsorption;
use permeant::engine::result::{BatchSummary, PredictionClass, PredictionResult, Status};
use serde::Serialize;
use std::io::Write;

/// One CSV output row: a [`PredictionResult`] with its descriptors inlined and no
/// fingerprint vector.
#[derive(Debug, Serialize)]
pub struct ResultRow<'a> {
    pub smiles: &'a str,
    pub molecule_name: Option<&'a str>,
    pub status: Status,
    pub error: Option<&'a str>,
    pub bbb_probability: f64,
    pub prediction_class: PredictionClass,
    pub prediction_certainty: f64,
    pub applicability_score: Option<f64>,
    pub fingerprint_hash: Option<&'a str>,
    pub model_version: Option<&'a str>,
    pub mw: Option<f64>,
    pub logp: Option<f64>,
    pub tpsa: Option<f64>,
    pub rot_bonds: Option<u32>,
    pub h_acceptors: Option<u32>,
    pub h_donors: Option<u32>,
    pub frac_csp3: Option<f64>,
    pub molar_refractivity: Option<f64>,
    pub log_s_esol: Option<f64>,
    pub gi_absorption: GiAbsorption,
    pub lipinski_passes: Option<bool>,
    pub pains_alerts: u32,
    pub brenk_alerts: u32,
    pub heavy_atoms: Option<u32>,
    pub mol_formula: Option<&'a str>,
    pub exact_mw: Option<f64>,
    pub formal_charge: Option<i32>,
    pub num_rings: Option<u32>,
}

impl<'a> From<&'a PredictionResult> for ResultRow<'a> {
    fn from(r: &'a PredictionResult) -> Self {
        let d = &r.descriptors;
        Self {
            smiles: &r.smiles,
            molecule_name: r.molecule_name.as_deref(),
            status: r.status,
            error: r.error.as_deref(),
            bbb_probability: r.bbb_probability,
            prediction_class: r.prediction_class,
            prediction_certainty: r.prediction_certainty,
            applicability_score: r.applicability_score,
            fingerprint_hash: r.fingerprint_hash.as_deref(),
            model_version: r.model_version.as_deref(),
            mw: d.mw,
            logp: d.logp,
            tpsa: d.tpsa,
            rot_bonds: d.rot_bonds,
            h_acceptors: d.h_acceptors,
            h_donors: d.h_donors,
            frac_csp3: d.frac_csp3,
            molar_refractivity: d.molar_refractivity,
            log_s_esol: d.log_s_esol,
            gi_absorption: d.gi_absorption,
            lipinski_passes: d.lipinski_passes,
            pains_alerts: d.pains_alerts,
            brenk_alerts: d.brenk_alerts,
            heavy_atoms: d.heavy_atoms,
            mol_formula: d.mol_formula.as_deref(),
            exact_mw: d.exact_mw,
            formal_charge: d.formal_charge,
            num_rings: d.num_rings,
        }
    }
}

pub fn write_csv<W: Write>(writer: W, results: &[PredictionResult]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for result in results {
        csv_writer.serialize(ResultRow::from(result))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// A single result renders as an object, several as an array.
pub fn render_json(results: &[PredictionResult], pretty: bool) -> Result<String> {
    let rendered = match (results, pretty) {
        ([single], true) => serde_json::to_string_pretty(single)?,
        ([single], false) => serde_json::to_string(single)?,
        (many, true) => serde_json::to_string_pretty(many)?,
        (many, false) => serde_json::to_string(many)?,
    };
    Ok(rendered)
}

pub fn format_summary(summary: &BatchSummary) -> String {
    format!(
        "Scored {} molecule(s): {} succeeded ({} permeable, {} non-permeable), {} failed.",
        summary.total, summary.succeeded, summary.permeable, summary.non_permeable, summary.failed
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(smiles: &str) -> PredictionResult {
        let mut result = PredictionResult::new(smiles, Some("mol".to_string()));
        result.status = Status::Success;
        result.bbb_probability = 0.75;
        result.prediction_class = PredictionClass::Permeable;
        result.prediction_certainty = 0.5;
        result.descriptors.mw = Some(46.069);
        result.descriptors.gi_absorption = GiAbsorption::High;
        result.fingerprint_features = Some(vec![0, 1, 0]);
        result
    }

    #[test]
    fn csv_has_one_row_per_result_with_flat_columns() {
        let mut failed = PredictionResult::new("", None);
        failed.status = Status::EmptySmiles;
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &[success("CCO"), failed]).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("smiles,molecule_name,status,error,bbb_probability"));
        assert!(lines[0].contains("gi_absorption"));
        assert!(!lines[0].contains("fingerprint_features"));
        assert!(lines[1].starts_with("CCO,mol,success,,0.75,permeable"));
        assert!(lines[1].contains("High"));
        assert!(lines[2].starts_with(",,error_empty_smiles,"));
        assert!(lines[2].contains("N/A"));
    }

    #[test]
    fn single_result_renders_as_object() {
        let json = render_json(&[success("CCO")], false).unwrap();
        assert!(json.starts_with('{'));
        let many = render_json(&[success("CCO"), success("CCN")], true).unwrap();
        assert!(many.starts_with('['));
    }

    #[test]
    fn summary_line_mentions_every_count() {
        let line = format_summary(&BatchSummary {
            total: 4,
            succeeded: 2,
            failed: 2,
            permeable: 1,
            non_permeable: 1,
        });
        assert_eq!(
            line,
            "Scored 4 molecule(s): 2 succeeded (1 permeable, 1 non-permeable), 2 failed."
        );
    }
}
