use serde::{Deserialize, Serialize};

/// Habit field names, in the order the shipped model artifact was trained on.
pub const FEATURE_NAMES: [&str; 8] = [
    "work_hours_per_day",
    "sleep_hours",
    "exercise_minutes",
    "social_hours",
    "screen_time_nonwork",
    "breaks_per_day",
    "coffee_cups",
    "stress_level",
];

/// One day's self-reported habit metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssessmentInput {
    pub work_hours_per_day: f64,
    pub sleep_hours: f64,
    pub exercise_minutes: f64,
    pub social_hours: f64,
    pub screen_time_nonwork: f64,
    pub breaks_per_day: f64,
    pub coffee_cups: i64,
    pub stress_level: i64,
}

impl AssessmentInput {
    /// Look a feature up by its column name.
    pub fn feature(&self, name: &str) -> Option<f64> {
        let value = match name {
            "work_hours_per_day" => self.work_hours_per_day,
            "sleep_hours" => self.sleep_hours,
            "exercise_minutes" => self.exercise_minutes,
            "social_hours" => self.social_hours,
            "screen_time_nonwork" => self.screen_time_nonwork,
            "breaks_per_day" => self.breaks_per_day,
            "coffee_cups" => self.coffee_cups as f64,
            "stress_level" => self.stress_level as f64,
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
pub(crate) fn sample_input() -> AssessmentInput {
    AssessmentInput {
        work_hours_per_day: 8.0,
        sleep_hours: 7.0,
        exercise_minutes: 30.0,
        social_hours: 2.0,
        screen_time_nonwork: 4.0,
        breaks_per_day: 5.0,
        coffee_cups: 2,
        stress_level: 3,
    }
}
