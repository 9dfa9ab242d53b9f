use crate::error::{Error, Result};
use crate::models::quiz_result::{QuizResult, SkillLevel};
use rust_decimal::Decimal;

// Thresholds as fractions of the maximum score.
const PASS_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 1); // 0.5
const INTERMEDIATE_THRESHOLD: Decimal = Decimal::from_parts(4, 0, 0, false, 1); // 0.4
const ADVANCED_THRESHOLD: Decimal = Decimal::from_parts(75, 0, 0, false, 2); // 0.75

pub struct ScoringService;

impl ScoringService {
    /// Pure evaluation of a finished quiz: pass verdict at 50% of the
    /// maximum, skill bands at 40% and 75%.
    pub fn evaluate(score: i32, max_score: i32) -> Result<QuizResult> {
        let ratio = Self::ratio(score, max_score)?;
        Ok(QuizResult {
            score,
            max_score,
            percentage: (ratio * Decimal::from(100)).round_dp(2),
            passed: ratio >= PASS_THRESHOLD,
            skill_level: Self::band(ratio),
        })
    }

    /// Skill band for an already persisted score. History display goes
    /// through this so stored results and end-of-quiz feedback can never
    /// disagree on the bands.
    pub fn skill_level(score: i32, max_score: i32) -> Result<SkillLevel> {
        Ok(Self::band(Self::ratio(score, max_score)?))
    }

    fn ratio(score: i32, max_score: i32) -> Result<Decimal> {
        if max_score <= 0 {
            return Err(Error::InvalidArgument(format!(
                "Maximum score must be positive, got {}",
                max_score
            )));
        }
        if score < 0 {
            return Err(Error::InvalidArgument(format!(
                "Score must be non-negative, got {}",
                score
            )));
        }
        Ok(Decimal::from(score) / Decimal::from(max_score))
    }

    fn band(ratio: Decimal) -> SkillLevel {
        if ratio >= ADVANCED_THRESHOLD {
            SkillLevel::Advanced
        } else if ratio >= INTERMEDIATE_THRESHOLD {
            SkillLevel::Intermediate
        } else {
            SkillLevel::Beginner
        }
    }
}
