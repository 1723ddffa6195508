use std::fmt;

use crate::Sex;

/// Body mass index.
///
/// No bounds checks are done: a height of zero results in an infinite value.
/// Use [`is_available`] before displaying the result.
#[must_use]
pub fn bmi(weight: f64, height: f64) -> f64 {
    let height_m = height / 100.;
    weight / (height_m * height_m)
}

/// Body fat percentage estimated from circumferences in cm (U.S. Navy method).
///
/// Hips are only taken into account for women. Returns `None` if the
/// circumferences do not allow an estimate.
#[must_use]
pub fn bfp(sex: Sex, height: f64, waist: f64, neck: f64, hips: f64) -> Option<f64> {
    let (circumference, k0, k1, k2) = match sex {
        Sex::FEMALE => (waist + hips - neck, 1.295_79, 0.350_04, 0.221_00),
        Sex::MALE => (waist - neck, 1.0324, 0.190_77, 0.154_56),
    };
    if circumference <= 0. || height <= 0. {
        return None;
    }
    let value = 495. / (k0 - k1 * circumference.log10() + k2 * height.log10()) - 450.;
    value.is_finite().then_some(value)
}

/// Basal metabolic rate in kcal/day (Mifflin-St Jeor).
#[must_use]
pub fn bmr(weight: f64, height: f64, age: i32, sex: Sex) -> f64 {
    let offset = match sex {
        Sex::FEMALE => -161.,
        Sex::MALE => 5.,
    };
    10. * weight + 6.25 * height - 5. * f64::from(age) + offset
}

#[must_use]
pub fn is_available(value: f64) -> bool {
    value.is_finite()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub optimal: f64,
}

impl Range {
    const fn new(min: f64, max: f64, optimal: f64) -> Self {
        Self { min, max, optimal }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositionRanges {
    pub body_fat: Range,
    pub water: Range,
    pub muscle: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBracket {
    Under30,
    From30To49,
    From50,
}

impl From<i32> for AgeBracket {
    fn from(age: i32) -> Self {
        match age {
            ..30 => AgeBracket::Under30,
            30..50 => AgeBracket::From30To49,
            _ => AgeBracket::From50,
        }
    }
}

/// Reference ranges in percent for the given age and sex.
///
/// There is no interpolation between the age brackets.
#[must_use]
pub fn body_composition_ranges(age: i32, sex: Sex) -> CompositionRanges {
    let (body_fat, water, muscle) = match (AgeBracket::from(age), sex) {
        (AgeBracket::Under30, Sex::MALE) => (
            Range::new(8., 20., 14.),
            Range::new(55., 65., 60.),
            Range::new(40., 52., 46.),
        ),
        (AgeBracket::From30To49, Sex::MALE) => (
            Range::new(11., 22., 16.),
            Range::new(53., 63., 58.),
            Range::new(38., 50., 44.),
        ),
        (AgeBracket::From50, Sex::MALE) => (
            Range::new(13., 25., 19.),
            Range::new(50., 60., 55.),
            Range::new(36., 47., 41.),
        ),
        (AgeBracket::Under30, Sex::FEMALE) => (
            Range::new(21., 33., 27.),
            Range::new(50., 60., 55.),
            Range::new(30., 40., 35.),
        ),
        (AgeBracket::From30To49, Sex::FEMALE) => (
            Range::new(23., 35., 29.),
            Range::new(48., 58., 53.),
            Range::new(28., 38., 33.),
        ),
        (AgeBracket::From50, Sex::FEMALE) => (
            Range::new(24., 36., 30.),
            Range::new(45., 55., 50.),
            Range::new(26., 36., 31.),
        ),
    };
    CompositionRanges {
        body_fat,
        water,
        muscle,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Low,
    Normal,
    Optimal,
    High,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Status::Low => "low",
                Status::Normal => "normal",
                Status::Optimal => "optimal",
                Status::High => "high",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositionStatus {
    pub status: Status,
    pub color: &'static str,
    pub bg_color: &'static str,
}

impl From<Status> for CompositionStatus {
    fn from(status: Status) -> Self {
        let (color, bg_color) = match status {
            Status::Low => ("#2563eb", "#dbeafe"),
            Status::Normal => ("#ca8a04", "#fef9c3"),
            Status::Optimal => ("#16a34a", "#dcfce7"),
            Status::High => ("#dc2626", "#fee2e2"),
        };
        Self {
            status,
            color,
            bg_color,
        }
    }
}

/// Maximum distance to the optimal value which is still considered optimal.
const OPTIMAL_TOLERANCE: f64 = 2.;

/// Classify a value against a range.
///
/// Values outside the range are never considered optimal.
#[must_use]
pub fn classify(value: f64, range: &Range) -> CompositionStatus {
    let status = if value < range.min {
        Status::Low
    } else if value > range.max {
        Status::High
    } else if (value - range.optimal).abs() <= OPTIMAL_TOLERANCE {
        Status::Optimal
    } else {
        Status::Normal
    };
    status.into()
}

#[must_use]
pub fn bfp_status(value: f64, age: i32, sex: Sex) -> CompositionStatus {
    classify(value, &body_composition_ranges(age, sex).body_fat)
}

#[must_use]
pub fn water_status(value: f64, age: i32, sex: Sex) -> CompositionStatus {
    classify(value, &body_composition_ranges(age, sex).water)
}

#[must_use]
pub fn muscle_status(value: f64, age: i32, sex: Sex) -> CompositionStatus {
    classify(value, &body_composition_ranges(age, sex).muscle)
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(80., 180.)]
    #[case(61.5, 168.)]
    #[case(120.3, 201.5)]
    fn test_bmi(#[case] weight: f64, #[case] height: f64) {
        assert_approx_eq!(bmi(weight, height), weight / (height / 100.).powi(2), 1e-9);
        assert_eq!(bmi(weight, height), bmi(weight, height));
    }

    #[test]
    fn test_bmi_zero_height() {
        assert_eq!(bmi(80., 0.), f64::INFINITY);
        assert!(!is_available(bmi(80., 0.)));
        assert!(is_available(bmi(80., 180.)));
    }

    #[test]
    fn test_bfp_male() {
        let value = bfp(Sex::MALE, 180., 85., 38., 0.).unwrap();
        assert!(value.is_finite());
        assert_approx_eq!(
            value,
            495. / (1.0324 - 0.19077 * 47_f64.log10() + 0.15456 * 180_f64.log10()) - 450.,
            1e-9
        );
        assert_approx_eq!(value, 16.107, 0.001);
    }

    #[test]
    fn test_bfp_male_ignores_hips() {
        assert_eq!(
            bfp(Sex::MALE, 180., 85., 38., 0.),
            bfp(Sex::MALE, 180., 85., 38., 100.)
        );
    }

    #[test]
    fn test_bfp_female() {
        let value = bfp(Sex::FEMALE, 165., 70., 32., 97.).unwrap();
        assert_approx_eq!(
            value,
            495. / (1.29579 - 0.35004 * 135_f64.log10() + 0.221 * 165_f64.log10()) - 450.,
            1e-9
        );
        assert!(value > 20. && value < 35.);
    }

    #[rstest]
    #[case::waist_below_neck(Sex::MALE, 180., 36., 38., 0.)]
    #[case::waist_equals_neck(Sex::MALE, 180., 38., 38., 0.)]
    #[case::female_without_circumferences(Sex::FEMALE, 165., 0., 32., 0.)]
    #[case::zero_height(Sex::MALE, 0., 85., 38., 0.)]
    fn test_bfp_unavailable(
        #[case] sex: Sex,
        #[case] height: f64,
        #[case] waist: f64,
        #[case] neck: f64,
        #[case] hips: f64,
    ) {
        assert_eq!(bfp(sex, height, waist, neck, hips), None);
    }

    #[rstest]
    #[case(70., 175., 30, Sex::MALE, 1648.75)]
    #[case(70., 175., 30, Sex::FEMALE, 1482.75)]
    #[case(55.5, 160., 52, Sex::FEMALE, 1134.)]
    fn test_bmr(
        #[case] weight: f64,
        #[case] height: f64,
        #[case] age: i32,
        #[case] sex: Sex,
        #[case] expected: f64,
    ) {
        assert_approx_eq!(bmr(weight, height, age, sex), expected, 1e-9);
    }

    #[rstest]
    #[case(-1, AgeBracket::Under30)]
    #[case(29, AgeBracket::Under30)]
    #[case(30, AgeBracket::From30To49)]
    #[case(49, AgeBracket::From30To49)]
    #[case(50, AgeBracket::From50)]
    #[case(151, AgeBracket::From50)]
    fn test_age_bracket(#[case] age: i32, #[case] expected: AgeBracket) {
        assert_eq!(AgeBracket::from(age), expected);
    }

    #[test]
    fn test_body_composition_ranges() {
        assert_eq!(
            body_composition_ranges(25, Sex::MALE).body_fat,
            Range {
                min: 8.,
                max: 20.,
                optimal: 14.
            }
        );
        assert_eq!(
            body_composition_ranges(35, Sex::MALE).body_fat,
            Range {
                min: 11.,
                max: 22.,
                optimal: 16.
            }
        );
        assert_eq!(
            body_composition_ranges(30, Sex::MALE),
            body_composition_ranges(49, Sex::MALE)
        );
        assert_ne!(
            body_composition_ranges(29, Sex::MALE),
            body_composition_ranges(30, Sex::MALE)
        );
        assert_ne!(
            body_composition_ranges(25, Sex::MALE),
            body_composition_ranges(25, Sex::FEMALE)
        );
    }

    #[rstest]
    #[case(0, Sex::FEMALE)]
    #[case(40, Sex::FEMALE)]
    #[case(70, Sex::FEMALE)]
    #[case(0, Sex::MALE)]
    #[case(40, Sex::MALE)]
    #[case(70, Sex::MALE)]
    fn test_body_composition_ranges_are_ordered(#[case] age: i32, #[case] sex: Sex) {
        let ranges = body_composition_ranges(age, sex);
        for range in [ranges.body_fat, ranges.water, ranges.muscle] {
            assert!(range.min <= range.optimal && range.optimal <= range.max);
        }
    }

    #[rstest]
    #[case(7., Status::Low)]
    #[case(8., Status::Normal)]
    #[case(12., Status::Optimal)]
    #[case(14., Status::Optimal)]
    #[case(16., Status::Optimal)]
    #[case(18., Status::Normal)]
    #[case(20., Status::Normal)]
    #[case(25., Status::High)]
    fn test_bfp_status(#[case] value: f64, #[case] expected: Status) {
        assert_eq!(bfp_status(value, 25, Sex::MALE).status, expected);
    }

    #[test]
    fn test_classify_prefers_bounds_over_optimal() {
        let range = Range {
            min: 10.,
            max: 12.,
            optimal: 11.,
        };
        assert_eq!(classify(9.5, &range).status, Status::Low);
        assert_eq!(classify(12.5, &range).status, Status::High);
        assert_eq!(classify(11.5, &range).status, Status::Optimal);
    }

    #[test]
    fn test_classify_nan() {
        let range = body_composition_ranges(25, Sex::MALE).body_fat;
        assert_eq!(classify(f64::NAN, &range).status, Status::Normal);
    }

    #[test]
    fn test_water_and_muscle_status() {
        assert_eq!(water_status(60., 25, Sex::MALE).status, Status::Optimal);
        assert_eq!(water_status(45., 25, Sex::MALE).status, Status::Low);
        assert_eq!(muscle_status(39., 40, Sex::FEMALE).status, Status::High);
    }

    #[test]
    fn test_composition_status_colors() {
        let status = CompositionStatus::from(Status::Optimal);
        assert_eq!(status.status, Status::Optimal);
        assert_eq!(status.color, "#16a34a");
        assert_eq!(status.bg_color, "#dcfce7");
        assert_eq!(Status::High.to_string(), "high");
    }
}
