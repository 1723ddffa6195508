use chrono::NaiveDate;
use log::{debug, error};

use crate::{
    BodyMeasurement, CreateError, DeleteError, MeasurementRepository, MeasurementService,
    ReadError, StorageError, UpdateError, UserID, UserProfile, UserRepository, UserService,
    latest_measurement,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        if let Err(ref err) = result {
            match err {
                $error::Storage(StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            }
        }
        result
    }};
}

impl<R: UserRepository> UserService for Service<R> {
    async fn get_users(&self) -> Result<Vec<UserProfile>, ReadError> {
        log_on_error!(self.repository.read_users(), ReadError, "get", "users")
    }

    async fn get_user(&self, id: UserID) -> Result<UserProfile, ReadError> {
        self.get_users()
            .await?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or(ReadError::Storage(StorageError::NotFound))
    }

    async fn create_user(&self, user: UserProfile) -> Result<UserProfile, CreateError> {
        log_on_error!(
            self.repository.create_user(user),
            CreateError,
            "create",
            "user"
        )
    }

    async fn replace_user(&self, user: UserProfile) -> Result<UserProfile, UpdateError> {
        log_on_error!(
            self.repository.replace_user(user),
            UpdateError,
            "replace",
            "user"
        )
    }

    async fn delete_user(&self, id: UserID) -> Result<UserID, DeleteError> {
        log_on_error!(
            self.repository.delete_user(id),
            DeleteError,
            "delete",
            "user"
        )
    }
}

impl<R: MeasurementRepository> MeasurementService for Service<R> {
    async fn get_measurements(&self, user_id: UserID) -> Result<Vec<BodyMeasurement>, ReadError> {
        log_on_error!(
            self.repository.read_measurements(user_id),
            ReadError,
            "get",
            "measurements"
        )
    }

    async fn get_measurement_on(
        &self,
        user_id: UserID,
        date: NaiveDate,
    ) -> Result<BodyMeasurement, ReadError> {
        self.get_measurements(user_id)
            .await?
            .into_iter()
            .find(|m| m.date == date)
            .ok_or(ReadError::Storage(StorageError::NotFound))
    }

    async fn get_latest_measurement(
        &self,
        user_id: UserID,
    ) -> Result<Option<BodyMeasurement>, ReadError> {
        let measurements = self.get_measurements(user_id).await?;
        Ok(latest_measurement(&measurements).cloned())
    }

    async fn create_measurement(
        &self,
        user_id: UserID,
        measurement: BodyMeasurement,
    ) -> Result<BodyMeasurement, CreateError> {
        log_on_error!(
            self.repository.create_measurement(user_id, measurement),
            CreateError,
            "create",
            "measurement"
        )
    }

    async fn replace_measurement(
        &self,
        user_id: UserID,
        measurement: BodyMeasurement,
    ) -> Result<BodyMeasurement, UpdateError> {
        log_on_error!(
            self.repository.replace_measurement(user_id, measurement),
            UpdateError,
            "replace",
            "measurement"
        )
    }

    async fn delete_measurement(
        &self,
        user_id: UserID,
        date: NaiveDate,
    ) -> Result<NaiveDate, DeleteError> {
        log_on_error!(
            self.repository.delete_measurement(user_id, date),
            DeleteError,
            "delete",
            "measurement"
        )
    }
}
