use std::str::FromStr;

use bodytrack_domain::ActivityLevel;

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Settings {
    #[serde(with = "activity_level")]
    pub activity_level: ActivityLevel,
    /// Include the water and muscle status in reports.
    pub show_water: bool,
    pub show_muscle: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            activity_level: ActivityLevel::default(),
            show_water: true,
            show_muscle: true,
        }
    }
}

mod activity_level {
    use super::{ActivityLevel, FromStr};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        value: &ActivityLevel,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_ref())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<ActivityLevel, D::Error> {
        let value = String::deserialize(deserializer)?;
        ActivityLevel::from_str(&value)
            .map_err(|_| D::Error::custom(format!("unknown activity level: {value}")))
    }
}
