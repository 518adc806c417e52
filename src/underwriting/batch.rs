use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{
    lenient_impact_level, ApplicationId, DecisionRecord, LoanApplication, SoftPullRecord,
};
use super::engine::UnderwritingEngine;

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read batch file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid batch CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Decision for one CSV row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub application_id: ApplicationId,
    pub result: DecisionRecord,
}

/// Scores every row of an application CSV independently.
pub struct BatchScorer;

impl BatchScorer {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        engine: &UnderwritingEngine,
    ) -> Result<Vec<BatchOutcome>, BatchError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, engine)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        engine: &UnderwritingEngine,
    ) -> Result<Vec<BatchOutcome>, BatchError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut outcomes = Vec::new();

        for (index, row) in csv_reader.deserialize::<BatchRow>().enumerate() {
            let row = row?;
            let application_id = row
                .application_id
                .clone()
                .map(ApplicationId)
                .unwrap_or_else(|| ApplicationId(format!("row-{}", index + 1)));

            let soft_pull = row.soft_pull();
            let application = row.into_application(application_id.clone());
            let result = engine.score(&application, soft_pull.as_ref());

            outcomes.push(BatchOutcome {
                application_id,
                result,
            });
        }

        Ok(outcomes)
    }
}

#[derive(Debug, Deserialize)]
struct BatchRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    application_id: Option<String>,
    #[serde(default)]
    monthly_revenue: Option<f64>,
    #[serde(default)]
    monthly_expenses: Option<f64>,
    #[serde(default)]
    loan_amount_requested: Option<f64>,
    #[serde(default)]
    collateral_value: Option<f64>,
    #[serde(default)]
    years_in_business: Option<f64>,
    #[serde(default, deserialize_with = "lenient_impact_level")]
    impact_level: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    credit_score_band: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    soft_pull_band: Option<String>,
    #[serde(default)]
    utilization_pct: Option<f64>,
}

impl BatchRow {
    fn soft_pull(&self) -> Option<SoftPullRecord> {
        if self.soft_pull_band.is_none() && self.utilization_pct.is_none() {
            return None;
        }
        Some(SoftPullRecord::approved(
            self.soft_pull_band.clone(),
            self.utilization_pct,
        ))
    }

    fn into_application(self, application_id: ApplicationId) -> LoanApplication {
        LoanApplication {
            application_id: Some(application_id),
            monthly_revenue: self.monthly_revenue,
            monthly_expenses: self.monthly_expenses,
            loan_amount_requested: self.loan_amount_requested,
            collateral_value: self.collateral_value,
            years_in_business: self.years_in_business,
            impact_level: self.impact_level,
            credit_score_band: self.credit_score_band,
            ..LoanApplication::default()
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|raw| !raw.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::underwriting::domain::{RiskTier, UnderwritingDecision};
    use std::io::Cursor;

    const HEADER: &str = "application_id,monthly_revenue,monthly_expenses,loan_amount_requested,collateral_value,years_in_business,impact_level,credit_score_band,soft_pull_band,utilization_pct\n";

    fn score(body: &str) -> Vec<BatchOutcome> {
        let csv = format!("{HEADER}{body}");
        BatchScorer::from_reader(Cursor::new(csv.into_bytes()), &UnderwritingEngine::default())
            .expect("batch scores")
    }

    #[test]
    fn rows_are_scored_independently() {
        let outcomes = score(
            "app-1,10000,4000,50000,,3,2,,700-719,35\n\
             ,,,,,,,,,\n",
        );

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].application_id.as_str(), "app-1");
        assert_eq!(outcomes[0].result.score_pct, 63.8);
        assert_eq!(outcomes[0].result.risk_tier, RiskTier::C);

        assert_eq!(outcomes[1].application_id.as_str(), "row-2");
        assert_eq!(outcomes[1].result.score_pct, 15.0);
        assert_eq!(outcomes[1].result.decision, UnderwritingDecision::Decline);
    }

    #[test]
    fn application_band_used_without_soft_pull_columns() {
        let outcomes = score("app-2,0,0,0,,,,excellent,,\n");
        assert_eq!(outcomes[0].result.subscores.credit_util, 4.0);
    }

    #[test]
    fn fractional_impact_cells_are_accepted() {
        let outcomes = score("app-4,0,0,0,,,4.0,,,\napp-5,0,0,0,,,0.4,,,\n");
        assert_eq!(outcomes[0].result.subscores.community_impact, 4.0);
        assert_eq!(outcomes[1].result.subscores.community_impact, 0.0);
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let csv = format!("{HEADER}app-3,lots,0,0,,,,,,\n");
        let result =
            BatchScorer::from_reader(Cursor::new(csv.into_bytes()), &UnderwritingEngine::default());
        assert!(matches!(result, Err(BatchError::Csv(_))));
    }
}
