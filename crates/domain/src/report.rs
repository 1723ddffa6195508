use chrono::NaiveDate;

use crate::{
    ActivityLevel, BodyFatPoint, BodyMeasurement, CompositionRanges, CompositionStatus,
    UserProfile, body_composition_ranges, bmi, bmr, classify, daily_energy, is_available,
};

/// Derived figures for a user on a given day.
///
/// Values which cannot be calculated from the available data are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionReport {
    pub date: NaiveDate,
    pub age: i32,
    pub weight: f64,
    pub bmi: Option<f64>,
    pub body_fat: Option<BodyFatPoint>,
    pub bmr: Option<f64>,
    pub daily_energy: Option<f64>,
    pub ranges: CompositionRanges,
    pub body_fat_status: Option<CompositionStatus>,
    pub water_status: Option<CompositionStatus>,
    pub muscle_status: Option<CompositionStatus>,
}

impl CompositionReport {
    /// The report refers to the date of the measurement, or to `today` if
    /// there is none. The weight of the measurement takes precedence over the
    /// weight of the profile.
    #[must_use]
    pub fn new(
        profile: &UserProfile,
        measurement: Option<&BodyMeasurement>,
        today: NaiveDate,
        activity_level: ActivityLevel,
    ) -> Self {
        let date = measurement.map_or(today, |m| m.date);
        let age = profile.age_on(date);
        let weight = measurement.map_or(profile.weight, |m| m.weight);
        let ranges = body_composition_ranges(age, profile.sex);
        let bmr = Some(bmr(weight, profile.height, age, profile.sex)).filter(|v| is_available(*v));
        let body_fat = measurement.and_then(|m| m.body_fat(profile.sex, profile.height));
        Self {
            date,
            age,
            weight,
            bmi: Some(bmi(weight, profile.height)).filter(|v| is_available(*v)),
            body_fat,
            bmr,
            daily_energy: bmr.map(|bmr| daily_energy(bmr, activity_level)),
            ranges,
            body_fat_status: body_fat.map(|p| classify(p.value, &ranges.body_fat)),
            water_status: measurement
                .and_then(|m| m.water)
                .map(|v| classify(v, &ranges.water)),
            muscle_status: measurement
                .and_then(|m| m.muscle)
                .map(|v| classify(v, &ranges.muscle)),
        }
    }
}
