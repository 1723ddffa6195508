use std::fmt;

use chrono::{Local, NaiveDate};
use derive_more::{AsRef, Deref, Display};
use uuid::Uuid;

use crate::{CreateError, DeleteError, ReadError, UpdateError, ValidationError, parse_decimal};

#[allow(async_fn_in_trait)]
pub trait UserService {
    async fn get_users(&self) -> Result<Vec<UserProfile>, ReadError>;
    async fn get_user(&self, id: UserID) -> Result<UserProfile, ReadError>;
    async fn create_user(&self, user: UserProfile) -> Result<UserProfile, CreateError>;
    async fn replace_user(&self, user: UserProfile) -> Result<UserProfile, UpdateError>;
    async fn delete_user(&self, id: UserID) -> Result<UserID, DeleteError>;

    async fn validate_user_name(&self, name: &str, id: UserID) -> Result<Name, ValidationError> {
        let name = Name::new(name).map_err(|err| ValidationError::Other(err.into()))?;
        let users = self.get_users().await?;
        if users.iter().all(|u| u.id == id || u.name != name) {
            Ok(name)
        } else {
            Err(ValidationError::Conflict("name".to_string()))
        }
    }

    fn validate_user_height(&self, height: &str) -> Result<f64, ValidationError> {
        match parse_decimal(height) {
            Some(height) if height > 0.0 && height < 300.0 => Ok(height),
            Some(_) => Err(ValidationError::Other(
                "Height must be between 0 and 300 cm".into(),
            )),
            None => Err(ValidationError::Other(
                "Height must be a decimal number".into(),
            )),
        }
    }

    fn validate_user_weight(&self, weight: &str) -> Result<f64, ValidationError> {
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

    fn validate_user_birth_date(&self, birth_date: &str) -> Result<NaiveDate, ValidationError> {
        match NaiveDate::parse_from_str(birth_date.trim(), "%Y-%m-%d") {
            Ok(date) => {
                if date <= Local::now().date_naive() {
                    Ok(date)
                } else {
                    Err(ValidationError::Other(
                        "Birth date must not be in the future".into(),
                    ))
                }
            }
            Err(_) => Err(ValidationError::Other("Invalid date".into())),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait UserRepository {
    async fn read_users(&self) -> Result<Vec<UserProfile>, ReadError>;
    async fn create_user(&self, user: UserProfile) -> Result<UserProfile, CreateError>;
    async fn replace_user(&self, user: UserProfile) -> Result<UserProfile, UpdateError>;
    async fn delete_user(&self, id: UserID) -> Result<UserID, DeleteError>;
}

/// The body data of a user which all derived figures are based on.
///
/// Height is given in cm and weight in kg. The values are not validated here,
/// use the validation methods of [`UserService`] on user input.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: UserID,
    pub name: Name,
    pub sex: Sex,
    pub birth_date: NaiveDate,
    pub height: f64,
    pub weight: f64,
}

impl UserProfile {
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        crate::age(self.birth_date, today)
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserID(Uuid);

impl UserID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for UserID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for UserID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl fmt::Display for UserID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed.chars().count();

        if len > 64 {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 64 characters or fewer ({0} > 64)")]
    TooLong(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Sex {
    FEMALE,
    MALE,
}

impl From<u8> for Sex {
    fn from(value: u8) -> Self {
        match value {
            0 => Sex::FEMALE,
            _ => Sex::MALE,
        }
    }
}

impl From<Sex> for u8 {
    fn from(value: Sex) -> Self {
        match value {
            Sex::FEMALE => 0,
            Sex::MALE => 1,
        }
    }
}

impl TryFrom<&str> for Sex {
    type Error = SexError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "female" => Ok(Sex::FEMALE),
            "male" => Ok(Sex::MALE),
            _ => Err(SexError::Unknown(value.to_string())),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Sex::FEMALE => "female",
                Sex::MALE => "male",
            }
        )
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SexError {
    #[error("Unknown sex: {0}")]
    Unknown(String),
}
