use serde::{Deserialize, Serialize};

const DEFAULT_MIN_APR: f64 = 8.0;
const DEFAULT_MAX_APR: f64 = 22.0;
const DEFAULT_APR_SLOPE: f64 = 3.5;
const DEFAULT_PAYMENT_RATE: f64 = 0.10;
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Policy dials for the underwriting engine. `Default` is the production rubric.
///
/// Values that would break the engine's ranges (inverted APR bounds, negative weights,
/// a non-finite payment rate) are replaced on load and again in `UnderwritingEngine::new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConfigDocument")]
pub struct UnderwritingConfig {
    pub weights: ScoringWeights,
    /// Annual rate used for the placeholder monthly payment behind the DSCR estimate.
    pub payment_rate: f64,
    pub apr: AprPolicy,
}

impl UnderwritingConfig {
    pub fn sanitized(self) -> Self {
        let payment_rate = if self.payment_rate.is_finite() && self.payment_rate >= 0.0 {
            self.payment_rate
        } else {
            DEFAULT_PAYMENT_RATE
        };

        Self {
            weights: self.weights.sanitized(),
            payment_rate,
            apr: AprPolicy::new(self.apr.min_apr, self.apr.max_apr, self.apr.slope),
        }
    }
}

impl Default for UnderwritingConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            payment_rate: DEFAULT_PAYMENT_RATE,
            apr: AprPolicy::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct ConfigDocument {
    weights: ScoringWeights,
    payment_rate: f64,
    apr: AprPolicy,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        let UnderwritingConfig {
            weights,
            payment_rate,
            apr,
        } = UnderwritingConfig::default();
        Self {
            weights,
            payment_rate,
            apr,
        }
    }
}

impl From<ConfigDocument> for UnderwritingConfig {
    fn from(document: ConfigDocument) -> Self {
        Self {
            weights: document.weights,
            payment_rate: document.payment_rate,
            apr: document.apr,
        }
        .sanitized()
    }
}

/// Composite weights; they sum to 1.0 so the composite stays on the 0-4 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "WeightsDocument")]
pub struct ScoringWeights {
    pub cashflow: f64,
    pub credit_util: f64,
    pub collateral_ltv: f64,
    pub competency: f64,
    pub community_impact: f64,
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.cashflow + self.credit_util + self.collateral_ltv + self.competency + self.community_impact
    }

    fn values(&self) -> [f64; 5] {
        [
            self.cashflow,
            self.credit_util,
            self.collateral_ltv,
            self.competency,
            self.community_impact,
        ]
    }

    /// Negative or non-finite weights fall back to the defaults; other sets are rescaled to sum to 1.
    pub fn sanitized(self) -> Self {
        let usable = self
            .values()
            .iter()
            .all(|weight| weight.is_finite() && *weight >= 0.0);
        let total = self.total();
        if !usable || !total.is_finite() || total <= 0.0 {
            return Self::default();
        }
        if (total - 1.0).abs() <= WEIGHT_TOLERANCE {
            return self;
        }

        Self {
            cashflow: self.cashflow / total,
            credit_util: self.credit_util / total,
            collateral_ltv: self.collateral_ltv / total,
            competency: self.competency / total,
            community_impact: self.community_impact / total,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            cashflow: 0.35,
            credit_util: 0.25,
            collateral_ltv: 0.20,
            competency: 0.15,
            community_impact: 0.05,
        }
    }
}

#[derive(Deserialize)]
struct WeightsDocument {
    cashflow: f64,
    credit_util: f64,
    collateral_ltv: f64,
    competency: f64,
    community_impact: f64,
}

impl From<WeightsDocument> for ScoringWeights {
    fn from(document: WeightsDocument) -> Self {
        Self {
            cashflow: document.cashflow,
            credit_util: document.credit_util,
            collateral_ltv: document.collateral_ltv,
            competency: document.competency,
            community_impact: document.community_impact,
        }
        .sanitized()
    }
}

/// Continuous APR model bounds. A perfect composite lands on the floor before adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "AprDocument")]
pub struct AprPolicy {
    min_apr: f64,
    max_apr: f64,
    slope: f64,
}

impl AprPolicy {
    pub fn new(min_apr: f64, max_apr: f64, slope: f64) -> Self {
        let bounds_valid = min_apr.is_finite() && max_apr.is_finite() && min_apr <= max_apr;
        let (min_apr, max_apr) = if bounds_valid {
            (min_apr, max_apr)
        } else {
            (DEFAULT_MIN_APR, DEFAULT_MAX_APR)
        };
        let slope = if slope.is_finite() && slope >= 0.0 {
            slope
        } else {
            DEFAULT_APR_SLOPE
        };

        Self {
            min_apr,
            max_apr,
            slope,
        }
    }

    pub fn min_apr(&self) -> f64 {
        self.min_apr
    }

    pub fn max_apr(&self) -> f64 {
        self.max_apr
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }
}

impl Default for AprPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_APR, DEFAULT_MAX_APR, DEFAULT_APR_SLOPE)
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct AprDocument {
    min_apr: f64,
    max_apr: f64,
    slope: f64,
}

impl Default for AprDocument {
    fn default() -> Self {
        Self {
            min_apr: DEFAULT_MIN_APR,
            max_apr: DEFAULT_MAX_APR,
            slope: DEFAULT_APR_SLOPE,
        }
    }
}

impl From<AprDocument> for AprPolicy {
    fn from(document: AprDocument) -> Self {
        Self::new(document.min_apr, document.max_apr, document.slope)
    }
}
