//! BMI and maintenance-calorie calculator. Pure arithmetic, no model calls.

use crate::error::ValidationError;
use crate::models::{ActivityLevel, BmiCategory, BmiResult, CalorieResult, Gender};

fn require_positive(value: f64, name: &'static str) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NotPositive(name))
    }
}

pub fn bmi(weight_kg: f64, height_cm: f64) -> Result<BmiResult, ValidationError> {
    let weight = require_positive(weight_kg, "weight_kg")?;
    let height_m = require_positive(height_cm, "height_cm")? / 100.0;

    let bmi = weight / (height_m * height_m);
    let category = if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Healthy
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    };

    Ok(BmiResult {
        bmi,
        category,
        message: category.message().to_string(),
    })
}

/// Mifflin-St Jeor BMR scaled by the activity factor.
pub fn maintenance_calories(
    gender: Gender,
    weight_kg: f64,
    height_cm: f64,
    age: f64,
    activity: ActivityLevel,
) -> Result<CalorieResult, ValidationError> {
    let weight = require_positive(weight_kg, "weight_kg")?;
    let height = require_positive(height_cm, "height_cm")?;
    let age = require_positive(age, "age")?;

    let base = 10.0 * weight + 6.25 * height - 5.0 * age;
    let bmr = match gender {
        Gender::Male => base,
        Gender::Female => base - 161.0,
    };

    Ok(CalorieResult {
        calories: bmr * activity.factor(),
        activity: activity.description().to_string(),
    })
}
