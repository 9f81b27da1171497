//! Analysis results and the scoring generator.
//!
//! One canonical representation: a dimension holds raw points in
//! `0..=max` (its weight), and the overall score is the percentage
//! `round(Σ points / Σ max × 100)`. Anything that shows a dimension as a
//! percentage goes through [`percent_of`].

use crate::answers::Answers;
use crate::config::{BandThresholds, Config};
use crate::error::{Result, ScaleOpsError};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub name: String,
    /// Points awarded, `0..=max`.
    pub score: u32,
    /// Points available; doubles as the dimension's weight.
    pub max: u32,
    pub feedback: String,
}

impl Dimension {
    pub fn percent(&self) -> u32 {
        percent_of(u64::from(self.score), u64::from(self.max))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Overall percentage, 0-100.
    pub score: u32,
    pub dimensions: Vec<Dimension>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

/// `round(points / max × 100)` with halves rounded up; 0 when `max` is 0.
/// Takes totals as `u64` so sums over many `u32` dimensions cannot wrap.
pub fn percent_of(points: u64, max: u64) -> u32 {
    if max == 0 {
        return 0;
    }
    let percent = (u128::from(points) * 200 + u128::from(max)) / (2 * u128::from(max));
    u32::try_from(percent).unwrap_or(u32::MAX)
}

impl AnalysisResult {
    /// Build a result whose overall score is derived from `dimensions`.
    pub fn from_dimensions(
        dimensions: Vec<Dimension>,
        strengths: Vec<String>,
        weaknesses: Vec<String>,
        summary: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let score = Self::reconciled_score(&dimensions);
        Self {
            score,
            dimensions,
            strengths,
            weaknesses,
            summary,
            timestamp,
        }
    }

    pub fn reconciled_score(dimensions: &[Dimension]) -> u32 {
        let points: u64 = dimensions.iter().map(|d| u64::from(d.score)).sum();
        let max: u64 = dimensions.iter().map(|d| u64::from(d.max)).sum();
        percent_of(points, max)
    }

    /// Reject results whose numbers disagree with each other.
    pub fn check(&self) -> Result<()> {
        if self.score > 100 {
            return Err(ScaleOpsError::Validation(format!(
                "score {} is outside 0-100",
                self.score
            )));
        }
        if self.dimensions.is_empty() {
            return Err(ScaleOpsError::Validation(
                "analysis has no dimensions".to_string(),
            ));
        }
        if let Some(d) = self.dimensions.iter().find(|d| d.score > d.max) {
            return Err(ScaleOpsError::Validation(format!(
                "dimension '{}' has {} of {} points",
                d.name, d.score, d.max
            )));
        }
        let expected = Self::reconciled_score(&self.dimensions);
        if expected != self.score {
            return Err(ScaleOpsError::Validation(format!(
                "score {} does not match dimension total {}",
                self.score, expected
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Turns a set of answers into a scored, explainable result.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, item_id: &str, answers: &Answers) -> Result<AnalysisResult>;
}

struct DimensionTemplate {
    name: &'static str,
    max: u32,
    strength: &'static str,
    weakness: &'static str,
}

const TEMPLATES: &[DimensionTemplate] = &[
    DimensionTemplate {
        name: "Customer Clarity",
        max: 30,
        strength: "You name a specific customer segment with a clear buyer.",
        weakness: "Narrow the customer to one segment you can reach this quarter.",
    },
    DimensionTemplate {
        name: "Problem Definition",
        max: 25,
        strength: "The problem is stated in terms the customer would recognise.",
        weakness: "Describe the problem as the customer experiences it, with a cost attached.",
    },
    DimensionTemplate {
        name: "Market Timing",
        max: 20,
        strength: "There is a credible trigger that makes this urgent now.",
        weakness: "Identify the event that makes the customer act this year rather than next.",
    },
    DimensionTemplate {
        name: "Solution Fit",
        max: 25,
        strength: "The offer maps directly onto the stated problem.",
        weakness: "Show how each part of the offer removes a specific part of the problem.",
    },
];

/// Dimensions at or above this percentage count as strengths.
const STRENGTH_PERCENT: u32 = 75;

/// Placeholder scorer: bounded pseudo-random points per dimension with canned
/// feedback. Depends on the answers only through their presence and, when
/// seeded, through the seed fingerprint.
pub struct CannedEvaluator {
    seed: Option<u64>,
    bands: BandThresholds,
}

impl CannedEvaluator {
    pub fn new(seed: Option<u64>, bands: BandThresholds) -> Self {
        Self { seed, bands }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.scoring.seed, config.bands)
    }

    fn rng_for(&self, item_id: &str, answers: &Answers) -> StdRng {
        match self.seed {
            Some(seed) => {
                let mut hasher = std::collections::hash_map::DefaultHasher::new();
                item_id.hash(&mut hasher);
                for (id, answer) in answers {
                    id.hash(&mut hasher);
                    answer.value.hash(&mut hasher);
                }
                StdRng::seed_from_u64(seed ^ hasher.finish())
            }
            None => StdRng::from_entropy(),
        }
    }
}

impl Evaluator for CannedEvaluator {
    fn evaluate(&self, item_id: &str, answers: &Answers) -> Result<AnalysisResult> {
        if answers.is_empty() {
            return Err(ScaleOpsError::Validation(
                "no answers to analyze".to_string(),
            ));
        }

        let mut rng = self.rng_for(item_id, answers);
        let mut dimensions = Vec::with_capacity(TEMPLATES.len());
        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();

        for t in TEMPLATES {
            let floor = t.max * 55 / 100;
            let score = rng.gen_range(floor..=t.max);
            let strong = percent_of(u64::from(score), u64::from(t.max)) >= STRENGTH_PERCENT;
            let feedback = if strong { t.strength } else { t.weakness };
            if strong {
                strengths.push(t.strength.to_string());
            } else {
                weaknesses.push(t.weakness.to_string());
            }
            dimensions.push(Dimension {
                name: t.name.to_string(),
                score,
                max: t.max,
                feedback: feedback.to_string(),
            });
        }

        let best = dimensions
            .iter()
            .max_by_key(|d| d.percent())
            .map(|d| (d.name.clone(), d.percent()));
        let worst = dimensions
            .iter()
            .min_by_key(|d| d.percent())
            .map(|d| (d.name.clone(), d.percent()));

        if strengths.is_empty() {
            if let Some((name, pct)) = &best {
                strengths.push(format!("{name} is your strongest area at {pct}%."));
            }
        }
        if weaknesses.is_empty() {
            if let Some((name, pct)) = &worst {
                weaknesses.push(format!(
                    "{name} has the most room to grow at {pct}%."
                ));
            }
        }

        let score = AnalysisResult::reconciled_score(&dimensions);
        let band = self.bands.band(score);
        let summary = match (&best, &worst) {
            (Some((best, _)), Some((worst, _))) => format!(
                "Scored {score}/100 ({}). Strongest area: {best}. Focus next on {worst}.",
                band.label()
            ),
            _ => format!("Scored {score}/100 ({}).", band.label()),
        };

        tracing::debug!(item = item_id, score, "analysis generated");
        Ok(AnalysisResult::from_dimensions(
            dimensions,
            strengths,
            weaknesses,
            summary,
            Utc::now(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
