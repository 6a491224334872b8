use serde::{Deserialize, Serialize};
use std::fmt;

pub const GI_TPSA_LIMIT: f64 = 130.0;
pub const GI_ROTATABLE_LIMIT: u32 = 10;

/// Gastrointestinal absorption category from the TPSA / rotatable-bond heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GiAbsorption {
    High,
    Low,
    #[default]
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl fmt::Display for GiAbsorption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "High",
            Self::Low => "Low",
            Self::NotAvailable => "N/A",
        })
    }
}

/// ESOL-style aqueous solubility estimate (log mol/L).
pub fn esol_log_s(
    logp: Option<f64>,
    mw: Option<f64>,
    rot_bonds: Option<u32>,
    frac_csp3: Option<f64>,
) -> Option<f64> {
    let (logp, mw, rot, fsp3) = (logp?, mw?, rot_bonds?, frac_csp3?);
    Some(0.16 - 0.63 * logp - 0.0062 * mw + 0.066 * rot as f64 - 0.74 * fsp3)
}

pub fn gi_absorption(tpsa: Option<f64>, rot_bonds: Option<u32>) -> GiAbsorption {
    match (tpsa, rot_bonds) {
        (Some(tpsa), Some(rot)) if tpsa <= GI_TPSA_LIMIT && rot <= GI_ROTATABLE_LIMIT => {
            GiAbsorption::High
        }
        (Some(_), Some(_)) => GiAbsorption::Low,
        _ => GiAbsorption::NotAvailable,
    }
}

/// Rule of Five: at most 5 donors, at most 10 acceptors, MW below 500 and logP below 5.
pub fn lipinski_passes(
    h_donors: Option<u32>,
    h_acceptors: Option<u32>,
    mw: Option<f64>,
    logp: Option<f64>,
) -> Option<bool> {
    Some(h_donors? <= 5 && h_acceptors? <= 10 && mw? < 500.0 && logp? < 5.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esol_requires_every_input() {
        assert_eq!(esol_log_s(None, Some(180.0), Some(2), Some(0.1)), None);
        let value = esol_log_s(Some(1.0), Some(100.0), Some(2), Some(0.5)).unwrap();
        assert!((value - (0.16 - 0.63 - 0.62 + 0.132 - 0.37)).abs() < 1e-12);
    }

    #[test]
    fn gi_thresholds_are_inclusive() {
        assert_eq!(gi_absorption(Some(130.0), Some(10)), GiAbsorption::High);
        assert_eq!(gi_absorption(Some(130.1), Some(3)), GiAbsorption::Low);
        assert_eq!(gi_absorption(Some(20.0), Some(11)), GiAbsorption::Low);
        assert_eq!(gi_absorption(None, Some(3)), GiAbsorption::NotAvailable);
    }

    #[test]
    fn gi_category_serializes_as_label() {
        assert_eq!(serde_json::to_string(&GiAbsorption::NotAvailable).unwrap(), "\"N/A\"");
        assert_eq!(serde_json::to_string(&GiAbsorption::High).unwrap(), "\"High\"");
        assert_eq!(GiAbsorption::Low.to_string(), "Low");
    }

    #[test]
    fn lipinski_thresholds() {
        assert_eq!(lipinski_passes(Some(5), Some(10), Some(499.9), Some(4.9)), Some(true));
        assert_eq!(lipinski_passes(Some(6), Some(1), Some(100.0), Some(1.0)), Some(false));
        assert_eq!(lipinski_passes(Some(1), Some(1), Some(500.0), Some(1.0)), Some(false));
        assert_eq!(lipinski_passes(Some(1), Some(1), Some(100.0), Some(5.0)), Some(false));
        assert_eq!(lipinski_passes(Some(1), None, Some(100.0), Some(1.0)), None);
    }
}
