use std::collections::VecDeque;

use bodytrack_app::{Settings, log};
use bodytrack_domain as domain;
use chrono::NaiveDate;
use uuid::Uuid;

/// Everything stored by the application.
#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Document {
    pub users: Vec<User>,
    pub measurements: Vec<Measurement>,
    pub settings: Option<Settings>,
    pub log: VecDeque<log::Entry>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub sex: u8,
    pub birth_date: NaiveDate,
    pub height: f64,
    pub weight: f64,
}

impl From<&domain::UserProfile> for User {
    fn from(value: &domain::UserProfile) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            sex: value.sex.into(),
            birth_date: value.birth_date,
            height: value.height,
            weight: value.weight,
        }
    }
}

impl TryFrom<User> for domain::UserProfile {
    type Error = domain::NameError;

    fn try_from(value: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            sex: value.sex.into(),
            birth_date: value.birth_date,
            height: value.height,
            weight: value.weight,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Measurement {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neck: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hips: Option<f64>,
}

impl Measurement {
    pub fn new(user_id: domain::UserID, value: &domain::BodyMeasurement) -> Self {
        Self {
            user_id: *user_id,
            date: value.date,
            weight: value.weight,
            body_fat: value.body_fat,
            water: value.water,
            muscle: value.muscle,
            waist: value.circumference.waist,
            neck: value.circumference.neck,
            hips: value.circumference.hips,
        }
    }

    pub fn belongs_to(&self, user_id: domain::UserID, date: NaiveDate) -> bool {
        self.user_id == *user_id && self.date == date
    }
}

impl From<&Measurement> for domain::BodyMeasurement {
    fn from(value: &Measurement) -> Self {
        Self {
            date: value.date,
            weight: value.weight,
            body_fat: value.body_fat,
            water: value.water,
            muscle: value.muscle,
            circumference: domain::Circumference {
                waist: value.waist,
                neck: value.neck,
                hips: value.hips,
            },
        }
    }
}
