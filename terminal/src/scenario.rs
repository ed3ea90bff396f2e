//! Fixing scenarios.

use std::collections::BTreeMap;
use std::path::Path;

use nibor_common::{Currency, Tenor};
use nibor_recon::{FacitRecord, SnapshotRecord};
use serde::{Deserialize, Serialize};

/// A set of tenor inputs to run through the drawer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Inputs per tenor, in the order they are shown.
    pub cases: Vec<TenorCase>,
}

/// Upstream data for one tenor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenorCase {
    pub snapshot: SnapshotRecord,
    #[serde(default)]
    pub facit: FacitRecord,
    /// Yesterday's published rate.
    #[serde(default)]
    pub previous_rate: Option<f64>,
}

impl TenorCase {
    pub fn tenor(&self) -> Tenor {
        self.snapshot.tenor
    }
}

impl Scenario {
    /// Load a built-in scenario by name.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "matched" => Ok(Self::matched()),
            "mismatch" => Ok(Self::mismatch()),
            "missing-facit" => Ok(Self::missing_facit()),
            _ => Err(anyhow::anyhow!("Unknown scenario: {}", name)),
        }
    }

    /// Load a scenario from a JSON file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let scenario = serde_json::from_str(&content)?;
        Ok(scenario)
    }

    pub fn case(&self, tenor: Tenor) -> Option<&TenorCase> {
        self.cases.iter().find(|c| c.tenor() == tenor)
    }

    pub fn tenors(&self) -> Vec<Tenor> {
        self.cases.iter().map(TenorCase::tenor).collect()
    }

    /// Every confirm tenor agrees with the facit.
    fn matched() -> Self {
        Self {
            name: "matched".to_string(),
            description: "All tenors agree with the facit workbook".to_string(),
            cases: Self::market()
                .into_iter()
                .map(|(tenor, rates, final_rate)| {
                    case(tenor, rates, facit(final_rate, final_rate, final_rate))
                })
                .collect(),
        }
    }

    /// 3M facit is half a basis point away from the computed rate.
    fn mismatch() -> Self {
        let mut scenario = Self::matched();
        scenario.name = "mismatch".to_string();
        scenario.description = "3M final rate disagrees with the facit".to_string();
        for c in &mut scenario.cases {
            if c.tenor() == Tenor::ThreeMonths {
                c.facit.final_rate = Some(4.4715);
            }
        }
        scenario
    }

    /// 2M has no facit, 6M lacks its output cell and 1W lacks the NOK rate.
    fn missing_facit() -> Self {
        let mut scenario = Self::matched();
        scenario.name = "missing-facit".to_string();
        scenario.description = "Facit cells left empty for 2M and 6M".to_string();
        for c in &mut scenario.cases {
            match c.tenor() {
                Tenor::OneWeek => {
                    c.snapshot.implied_rates.insert(Currency::Nok, None);
                }
                Tenor::TwoMonths => c.facit = FacitRecord::default(),
                Tenor::SixMonths => c.facit.contribution_output = None,
                _ => {}
            }
        }
        scenario
    }

    // EUR, USD and NOK implied rates with the resulting final rate.
    fn market() -> Vec<(Tenor, [f64; 3], f64)> {
        vec![
            (Tenor::OneWeek, [4.10, 4.00, 4.50], 4.315),
            (Tenor::OneMonth, [4.12, 4.04, 4.52], 4.392),
            (Tenor::TwoMonths, [4.16, 4.08, 4.56], 4.432),
            (Tenor::ThreeMonths, [4.20, 4.12, 4.60], 4.472),
            (Tenor::SixMonths, [4.28, 4.20, 4.68], 4.552),
        ]
    }
}

fn facit(final_rate: f64, input: f64, output: f64) -> FacitRecord {
    FacitRecord {
        final_rate: Some(final_rate),
        contribution_input: Some(input),
        contribution_output: Some(output),
    }
}

fn case(tenor: Tenor, [eur, usd, nok]: [f64; 3], facit: FacitRecord) -> TenorCase {
    let facit = if tenor.is_confirmable() {
        facit
    } else {
        FacitRecord::default()
    };
    let previous_rate = facit.final_rate.map(|r| r - 0.01);

    TenorCase {
        snapshot: SnapshotRecord {
            tenor,
            implied_rates: BTreeMap::from([
                (Currency::Eur, Some(eur)),
                (Currency::Usd, Some(usd)),
                (Currency::Nok, Some(nok)),
            ]),
            weights: BTreeMap::from([
                (Currency::Eur, 0.4),
                (Currency::Usd, 0.35),
                (Currency::Nok, 0.25),
            ]),
            spread: None,
            fx_inputs: BTreeMap::new(),
        },
        facit,
        previous_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nibor_recon::{FacitValues, RateSnapshot, ReconEngine, ReconStatus};

    fn status(scenario: &Scenario, tenor: Tenor) -> ReconStatus {
        let case = scenario.case(tenor).unwrap().clone();
        let snapshot = RateSnapshot::try_from(case.snapshot).unwrap();
        let facit = FacitValues::try_from(case.facit).unwrap();
        ReconEngine::default()
            .evaluate(snapshot, &facit)
            .unwrap()
            .result
            .status()
    }

    #[test]
    fn test_load_builtin() {
        for name in ["matched", "mismatch", "missing-facit"] {
            let scenario = Scenario::load(name).unwrap();
            assert_eq!(scenario.name, name);
            assert_eq!(scenario.tenors(), Tenor::ALL.to_vec());
        }
        assert!(Scenario::load("unknown").is_err());
    }

    #[test]
    fn test_matched_scenario_statuses() {
        let scenario = Scenario::load("matched").unwrap();
        assert_eq!(status(&scenario, Tenor::OneWeek), ReconStatus::Pending);
        for tenor in Tenor::CONFIRM_SET {
            assert_eq!(status(&scenario, tenor), ReconStatus::Matched, "{}", tenor);
        }
    }

    #[test]
    fn test_mismatch_scenario_fails_three_months() {
        let scenario = Scenario::load("mismatch").unwrap();
        assert_eq!(status(&scenario, Tenor::ThreeMonths), ReconStatus::Fail);
        assert_eq!(status(&scenario, Tenor::OneMonth), ReconStatus::Matched);
    }

    #[test]
    fn test_missing_facit_scenario_warns() {
        let scenario = Scenario::load("missing-facit").unwrap();
        assert_eq!(status(&scenario, Tenor::TwoMonths), ReconStatus::Warn);
        assert_eq!(status(&scenario, Tenor::SixMonths), ReconStatus::Warn);
    }

    #[test]
    fn test_scenario_json() {
        let json = r#"{
            "name": "file",
            "cases": [{
                "snapshot": {
                    "tenor": "3m",
                    "implied_rates": {"EUR": 4.2, "USD": 4.12, "NOK": null},
                    "weights": {"EUR": 0.4, "USD": 0.35, "NOK": 0.25}
                },
                "facit": {"final_rate": 4.472}
            }]
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();

        assert_eq!(scenario.tenors(), vec![Tenor::ThreeMonths]);
        assert!(scenario.case(Tenor::ThreeMonths).unwrap().previous_rate.is_none());
        // NOK rate missing, so the final rate cannot match.
        assert_eq!(status(&scenario, Tenor::ThreeMonths), ReconStatus::Fail);
    }
}
