//! Range checks applied before any prediction.
//!
//! Every rule is evaluated and all failures are returned together. Fields
//! without a rule here are bounded by the client form.

use super::input::AssessmentInput;

pub const MAX_WORK_HOURS: f64 = 16.0;
pub const MIN_SLEEP_HOURS: f64 = 4.0;
pub const MAX_SLEEP_HOURS: f64 = 12.0;
pub const STRESS_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

pub fn validate_input(input: &AssessmentInput) -> Vec<String> {
    let mut errors = Vec::new();

    if input.work_hours_per_day > MAX_WORK_HOURS {
        errors.push(format!("Work hours cannot exceed {MAX_WORK_HOURS} per day"));
    }

    if input.sleep_hours < MIN_SLEEP_HOURS {
        errors.push(format!("Sleep hours should be at least {MIN_SLEEP_HOURS}"));
    } else if input.sleep_hours > MAX_SLEEP_HOURS {
        errors.push(format!("Sleep hours cannot exceed {MAX_SLEEP_HOURS}"));
    }

    if !STRESS_RANGE.contains(&input.stress_level) {
        errors.push(format!(
            "Stress level must be between {}-{}",
            STRESS_RANGE.start(),
            STRESS_RANGE.end()
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::input::sample_input;

    #[test]
    fn typical_day_is_valid() {
        assert!(validate_input(&sample_input()).is_empty());
    }

    #[test]
    fn boundaries_are_inclusive() {
        let mut input = sample_input();
        input.work_hours_per_day = 16.0;
        input.sleep_hours = 4.0;
        input.stress_level = 1;
        assert!(validate_input(&input).is_empty());

        input.sleep_hours = 12.0;
        input.stress_level = 5;
        assert!(validate_input(&input).is_empty());
    }

    #[test]
    fn too_little_sleep() {
        let mut input = sample_input();
        input.sleep_hours = 3.0;
        assert_eq!(validate_input(&input), vec!["Sleep hours should be at least 4"]);
    }

    #[test]
    fn too_much_sleep() {
        let mut input = sample_input();
        input.sleep_hours = 13.0;
        assert_eq!(validate_input(&input), vec!["Sleep hours cannot exceed 12"]);
    }

    #[test]
    fn stress_out_of_range() {
        let mut input = sample_input();
        input.stress_level = 6;
        assert_eq!(validate_input(&input), vec!["Stress level must be between 1-5"]);
        input.stress_level = 0;
        assert_eq!(validate_input(&input), vec!["Stress level must be between 1-5"]);
    }

    #[test]
    fn overwork() {
        let mut input = sample_input();
        input.work_hours_per_day = 17.0;
        assert_eq!(validate_input(&input), vec!["Work hours cannot exceed 16 per day"]);
    }

    #[test]
    fn all_errors_are_collected() {
        let mut input = sample_input();
        input.work_hours_per_day = 20.0;
        input.sleep_hours = 2.0;
        input.stress_level = 9;
        let errors = validate_input(&input);
        assert_eq!(
            errors,
            vec![
                "Work hours cannot exceed 16 per day",
                "Sleep hours should be at least 4",
                "Stress level must be between 1-5",
            ]
        );
    }
}
