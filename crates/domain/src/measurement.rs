use std::collections::BTreeMap;

use chrono::{Duration, Local, NaiveDate};

use crate::{
    CreateError, DeleteError, ReadError, Sex, UpdateError, UserID, ValidationError, bfp,
    parse_decimal,
};

#[allow(async_fn_in_trait)]
pub trait MeasurementService {
    async fn get_measurements(&self, user_id: UserID) -> Result<Vec<BodyMeasurement>, ReadError>;
    async fn get_measurement_on(
        &self,
        user_id: UserID,
        date: NaiveDate,
    ) -> Result<BodyMeasurement, ReadError>;
    async fn get_latest_measurement(
        &self,
        user_id: UserID,
    ) -> Result<Option<BodyMeasurement>, ReadError>;
    async fn create_measurement(
        &self,
        user_id: UserID,
        measurement: BodyMeasurement,
    ) -> Result<BodyMeasurement, CreateError>;
    async fn replace_measurement(
        &self,
        user_id: UserID,
        measurement: BodyMeasurement,
    ) -> Result<BodyMeasurement, UpdateError>;
    async fn delete_measurement(
        &self,
        user_id: UserID,
        date: NaiveDate,
    ) -> Result<NaiveDate, DeleteError>;

    async fn validate_measurement_date(
        &self,
        user_id: UserID,
        date: &str,
    ) -> Result<NaiveDate, ValidationError> {
        let Ok(parsed_date) = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") else {
            return Err(ValidationError::Other("Invalid date".into()));
        };
        if parsed_date > Local::now().date_naive() {
            return Err(ValidationError::Other(
                "Date must not be in the future".into(),
            ));
        }
        let measurements = self.get_measurements(user_id).await?;
        if measurements.iter().all(|m| m.date != parsed_date) {
            Ok(parsed_date)
        } else {
            Err(ValidationError::Conflict("date".to_string()))
        }
    }

    fn validate_measurement_weight(&self, weight: &str) -> Result<f64, ValidationError> {
        match parse_decimal(weight) {
            Some(weight) if weight > 0.0 => Ok(weight),
            Some(_) => Err(ValidationError::Other(
                "Weight must be a positive decimal number".into(),
            )),
            None => Err(ValidationError::Other(
                "Weight must be a decimal number".into(),
            )),
        }
    }

    /// Validate an optional percentage, an empty input means no value.
    fn validate_measurement_percentage(
        &self,
        percentage: &str,
    ) -> Result<Option<f64>, ValidationError> {
        if percentage.trim().is_empty() {
            return Ok(None);
        }
        match parse_decimal(percentage) {
            Some(percentage) if (0.0..=100.0).contains(&percentage) => Ok(Some(percentage)),
            Some(_) => Err(ValidationError::Other(
                "Percentage must be between 0 and 100".into(),
            )),
            None => Err(ValidationError::Other(
                "Percentage must be a decimal number".into(),
            )),
        }
    }

    /// Validate an optional circumference in cm, an empty input means no value.
    fn validate_measurement_circumference(
        &self,
        circumference: &str,
    ) -> Result<Option<f64>, ValidationError> {
        if circumference.trim().is_empty() {
            return Ok(None);
        }
        match parse_decimal(circumference) {
            Some(circumference) if circumference > 0.0 => Ok(Some(circumference)),
            Some(_) => Err(ValidationError::Other(
                "Circumference must be a positive decimal number".into(),
            )),
            None => Err(ValidationError::Other(
                "Circumference must be a decimal number".into(),
            )),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait MeasurementRepository {
    async fn read_measurements(&self, user_id: UserID)
    -> Result<Vec<BodyMeasurement>, ReadError>;
    async fn create_measurement(
        &self,
        user_id: UserID,
        measurement: BodyMeasurement,
    ) -> Result<BodyMeasurement, CreateError>;
    async fn replace_measurement(
        &self,
        user_id: UserID,
        measurement: BodyMeasurement,
    ) -> Result<BodyMeasurement, UpdateError>;
    async fn delete_measurement(
        &self,
        user_id: UserID,
        date: NaiveDate,
    ) -> Result<NaiveDate, DeleteError>;
}

/// Measurements of a single day.
///
/// Percentages are readings of a body composition scale, circumferences are
/// given in cm.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyMeasurement {
    pub date: NaiveDate,
    pub weight: f64,
    pub body_fat: Option<f64>,
    pub water: Option<f64>,
    pub muscle: Option<f64>,
    pub circumference: Circumference,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Circumference {
    pub waist: Option<f64>,
    pub neck: Option<f64>,
    pub hips: Option<f64>,
}

impl Circumference {
    /// Body fat percentage estimated by the U.S. Navy method.
    #[must_use]
    pub fn bfp(&self, sex: Sex, height: f64) -> Option<f64> {
        let hips = match sex {
            Sex::FEMALE => self.hips?,
            Sex::MALE => 0.,
        };
        bfp(sex, height, self.waist?, self.neck?, hips)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFatSource {
    Device,
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFatPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub source: BodyFatSource,
}

impl BodyMeasurement {
    /// Body fat reading of the scale, or an estimate from the circumferences
    /// if no reading exists.
    #[must_use]
    pub fn body_fat(&self, sex: Sex, height: f64) -> Option<BodyFatPoint> {
        if let Some(value) = self.body_fat {
            return Some(BodyFatPoint {
                date: self.date,
                value,
                source: BodyFatSource::Device,
            });
        }
        self.circumference
            .bfp(sex, height)
            .map(|value| BodyFatPoint {
                date: self.date,
                value,
                source: BodyFatSource::Estimated,
            })
    }
}

/// Body fat values of all measurements, sorted by date.
#[must_use]
pub fn body_fat_series(
    measurements: &[BodyMeasurement],
    sex: Sex,
    height: f64,
) -> Vec<BodyFatPoint> {
    let mut points = measurements
        .iter()
        .filter_map(|m| m.body_fat(sex, height))
        .collect::<Vec<_>>();
    points.sort_by_key(|p| p.date);
    points
}

#[must_use]
pub fn latest_measurement(measurements: &[BodyMeasurement]) -> Option<&BodyMeasurement> {
    measurements.iter().max_by_key(|m| m.date)
}

/// Weight difference between the latest and the first measurement.
#[must_use]
pub fn weight_change(measurements: &[BodyMeasurement]) -> Option<f64> {
    if measurements.len() < 2 {
        return None;
    }
    let first = measurements.iter().min_by_key(|m| m.date)?;
    let last = latest_measurement(measurements)?;
    Some(last.weight - first.weight)
}

/// Relative weight change in percent over the week before the latest
/// measurement.
///
/// If there is no measurement exactly seven days earlier, the weight is
/// interpolated between the surrounding measurements.
#[must_use]
pub fn avg_weekly_change(measurements: &[BodyMeasurement]) -> Option<f64> {
    let weights = measurements
        .iter()
        .map(|m| (m.date, m.weight))
        .collect::<BTreeMap<NaiveDate, f64>>();
    let (&current_date, &current_weight) = weights.last_key_value()?;
    let prev_date = current_date - Duration::days(7);
    let prev_weight = match weights.get(&prev_date) {
        Some(weight) => *weight,
        None => {
            let (a, b) = neighbors(&weights, prev_date)?;
            interpolate(a, b, prev_date)
        }
    };
    Some((current_weight - prev_weight) / prev_weight * 100.)
}

fn neighbors(
    weights: &BTreeMap<NaiveDate, f64>,
    date: NaiveDate,
) -> Option<((NaiveDate, f64), (NaiveDate, f64))> {
    use std::ops::Bound::{Excluded, Unbounded};

    let before = weights.range((Unbounded, Excluded(date))).next_back()?;
    let after = weights.range((Excluded(date), Unbounded)).next()?;

    Some(((*before.0, *before.1), (*after.0, *after.1)))
}

fn interpolate(a: (NaiveDate, f64), b: (NaiveDate, f64), date: NaiveDate) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let ratio = (date - a.0).num_days() as f64 / (b.0 - a.0).num_days() as f64;
    a.1 + (b.1 - a.1) * ratio
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    struct Measurements(Vec<BodyMeasurement>);

    impl MeasurementService for Measurements {
        async fn get_measurements(&self, _: UserID) -> Result<Vec<BodyMeasurement>, ReadError> {
            Ok(self.0.clone())
        }

        async fn get_measurement_on(
            &self,
            _: UserID,
            _: NaiveDate,
        ) -> Result<BodyMeasurement, ReadError> {
            unimplemented!()
        }

        async fn get_latest_measurement(
            &self,
            _: UserID,
        ) -> Result<Option<BodyMeasurement>, ReadError> {
            unimplemented!()
        }

        async fn create_measurement(
            &self,
            _: UserID,
            _: BodyMeasurement,
        ) -> Result<BodyMeasurement, CreateError> {
            unimplemented!()
        }

        async fn replace_measurement(
            &self,
            _: UserID,
            _: BodyMeasurement,
        ) -> Result<BodyMeasurement, UpdateError> {
            unimplemented!()
        }

        async fn delete_measurement(
            &self,
            _: UserID,
            _: NaiveDate,
        ) -> Result<NaiveDate, DeleteError> {
            unimplemented!()
        }
    }

    fn from_num_days(days: i32) -> NaiveDate {
        NaiveDate::from_num_days_from_ce_opt(days).unwrap()
    }

    fn weight_on(days: i32, weight: f64) -> BodyMeasurement {
        BodyMeasurement {
            date: from_num_days(days),
            weight,
            body_fat: None,
            water: None,
            muscle: None,
            circumference: Circumference::default(),
        }
    }

    #[rstest]
    #[case::male_complete(
        Circumference { waist: Some(85.), neck: Some(38.), hips: None },
        Sex::MALE,
        true
    )]
    #[case::male_without_neck(
        Circumference { waist: Some(85.), neck: None, hips: None },
        Sex::MALE,
        false
    )]
    #[case::male_waist_below_neck(
        Circumference { waist: Some(36.), neck: Some(38.), hips: None },
        Sex::MALE,
        false
    )]
    #[case::female_without_hips(
        Circumference { waist: Some(70.), neck: Some(32.), hips: None },
        Sex::FEMALE,
        false
    )]
    #[case::female_complete(
        Circumference { waist: Some(70.), neck: Some(32.), hips: Some(97.) },
        Sex::FEMALE,
        true
    )]
    fn test_circumference_bfp(
        #[case] circumference: Circumference,
        #[case] sex: Sex,
        #[case] available: bool,
    ) {
        assert_eq!(circumference.bfp(sex, 175.).is_some(), available);
    }

    #[test]
    fn test_body_fat_series() {
        let measurements = vec![
            BodyMeasurement {
                date: from_num_days(3),
                weight: 80.,
                body_fat: None,
                water: None,
                muscle: None,
                circumference: Circumference {
                    waist: Some(85.),
                    neck: Some(38.),
                    hips: None,
                },
            },
            weight_on(2, 80.5),
            BodyMeasurement {
                date: from_num_days(1),
                weight: 81.,
                body_fat: Some(17.5),
                water: Some(58.),
                muscle: None,
                circumference: Circumference {
                    waist: Some(85.),
                    neck: Some(38.),
                    hips: None,
                },
            },
        ];
        let series = body_fat_series(&measurements, Sex::MALE, 180.);
        assert_eq!(series.len(), 2);
        assert_eq!(
            series[0],
            BodyFatPoint {
                date: from_num_days(1),
                value: 17.5,
                source: BodyFatSource::Device
            }
        );
        assert_eq!(series[1].date, from_num_days(3));
        assert_eq!(series[1].source, BodyFatSource::Estimated);
        assert_approx_eq!(series[1].value, 16.107, 0.001);
    }

    #[test]
    fn test_weight_change() {
        assert_eq!(weight_change(&[]), None);
        assert_eq!(weight_change(&[weight_on(0, 80.)]), None);
        assert_approx_eq!(
            weight_change(&[weight_on(5, 78.5), weight_on(0, 80.), weight_on(2, 79.)]).unwrap(),
            -1.5,
            1e-9
        );
    }

    #[test]
    fn test_latest_measurement() {
        let measurements = [weight_on(5, 78.5), weight_on(9, 78.), weight_on(2, 79.)];
        assert_eq!(
            latest_measurement(&measurements).map(|m| m.date),
            Some(from_num_days(9))
        );
        assert_eq!(latest_measurement(&[]), None);
    }

    #[test]
    fn test_avg_weekly_change() {
        assert_eq!(avg_weekly_change(&[]), None);
        assert_eq!(avg_weekly_change(&[weight_on(7, 70.)]), None);
        assert_approx_eq!(
            avg_weekly_change(&[weight_on(0, 70.), weight_on(7, 70.)]).unwrap(),
            0.0,
            1e-9
        );
        assert_approx_eq!(
            avg_weekly_change(&[weight_on(0, 70.), weight_on(7, 70.7)]).unwrap(),
            1.0,
            1e-9
        );
        assert_approx_eq!(
            avg_weekly_change(&[weight_on(0, 69.), weight_on(2, 71.), weight_on(8, 69.44)])
                .unwrap(),
            -0.8,
            1e-9
        );
    }

    #[test]
    fn test_validate_measurement_date() {
        let service = Measurements(vec![weight_on(738_000, 80.)]);
        let existing = from_num_days(738_000).format("%Y-%m-%d").to_string();
        assert_eq!(
            block_on(service.validate_measurement_date(UserID::nil(), "2020-02-02")).unwrap(),
            NaiveDate::from_ymd_opt(2020, 2, 2).unwrap()
        );
        assert!(matches!(
            block_on(service.validate_measurement_date(UserID::nil(), &existing)),
            Err(ValidationError::Conflict(field)) if field == "date"
        ));
        assert!(matches!(
            block_on(service.validate_measurement_date(UserID::nil(), "9999-12-31")),
            Err(ValidationError::Other(_))
        ));
        assert!(matches!(
            block_on(service.validate_measurement_date(UserID::nil(), "02.02.2020")),
            Err(ValidationError::Other(_))
        ));
    }

    #[rstest]
    #[case("80", Some(80.))]
    #[case("80,4", Some(80.4))]
    #[case("0", None)]
    #[case("heavy", None)]
    fn test_validate_measurement_weight(#[case] weight: &str, #[case] expected: Option<f64>) {
        assert_eq!(
            Measurements(vec![]).validate_measurement_weight(weight).ok(),
            expected
        );
    }

    #[rstest]
    #[case("", Some(None))]
    #[case("  ", Some(None))]
    #[case("18,5", Some(Some(18.5)))]
    #[case("0", Some(Some(0.)))]
    #[case("100", Some(Some(100.)))]
    #[case("100.1", None)]
    #[case("-1", None)]
    #[case("a lot", None)]
    fn test_validate_measurement_percentage(
        #[case] percentage: &str,
        #[case] expected: Option<Option<f64>>,
    ) {
        assert_eq!(
            Measurements(vec![])
                .validate_measurement_percentage(percentage)
                .ok(),
            expected
        );
    }

    #[rstest]
    #[case("", Some(None))]
    #[case("85.5", Some(Some(85.5)))]
    #[case("0", None)]
    #[case("wide", None)]
    fn test_validate_measurement_circumference(
        #[case] circumference: &str,
        #[case] expected: Option<Option<f64>>,
    ) {
        assert_eq!(
            Measurements(vec![])
                .validate_measurement_circumference(circumference)
                .ok(),
            expected
        );
    }
}
