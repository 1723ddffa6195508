use strum::{AsRefStr, EnumIter, EnumString};

/// Physical activity level used to scale the basal metabolic rate.
///
/// This is the only place where activity factors are defined.
#[derive(AsRefStr, EnumIter, EnumString, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    #[default]
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.4,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }
}

/// Total daily energy expenditure in kcal/day.
#[must_use]
pub fn daily_energy(bmr: f64, activity_level: ActivityLevel) -> f64 {
    bmr * activity_level.factor()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_default_activity_level() {
        assert_eq!(ActivityLevel::default(), ActivityLevel::LightlyActive);
        assert_approx_eq!(ActivityLevel::default().factor(), 1.4, 1e-12);
    }

    #[test]
    fn test_factors_increase_with_activity() {
        let factors = ActivityLevel::iter()
            .map(ActivityLevel::factor)
            .collect::<Vec<_>>();
        assert_eq!(factors.len(), 5);
        assert!(factors.windows(2).all(|w| w[0] < w[1]));
    }

    #[rstest]
    #[case(ActivityLevel::Sedentary, 1978.5)]
    #[case(ActivityLevel::LightlyActive, 2308.25)]
    #[case(ActivityLevel::ExtraActive, 3132.625)]
    fn test_daily_energy(#[case] activity_level: ActivityLevel, #[case] expected: f64) {
        assert_approx_eq!(daily_energy(1648.75, activity_level), expected, 1e-9);
    }

    #[rstest]
    #[case("sedentary", ActivityLevel::Sedentary)]
    #[case("lightly_active", ActivityLevel::LightlyActive)]
    #[case("very_active", ActivityLevel::VeryActive)]
    fn test_activity_level_from_str(#[case] value: &str, #[case] expected: ActivityLevel) {
        assert_eq!(ActivityLevel::from_str(value).unwrap(), expected);
        assert_eq!(expected.as_ref(), value);
    }
}
