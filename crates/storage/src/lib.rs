#![warn(clippy::pedantic)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;

use bodytrack_app::{Settings, SettingsRepository, log};
use bodytrack_domain::{
    BodyMeasurement, CreateError, DeleteError, MeasurementRepository, ReadError, StorageError,
    UpdateError, UserID, UserProfile, UserRepository,
};

pub mod json_file;
pub mod memory;
pub mod model;

pub use model::Document;

/// A place the whole [`Document`] can be loaded from and stored to.
#[allow(clippy::missing_errors_doc)]
pub trait Backend: Send + Sync + 'static {
    fn load(&self) -> Result<Document, StorageError>;
    fn store(&self, document: &Document) -> Result<(), StorageError>;
}

/// Repository implementation on top of a [`Backend`].
///
/// Every operation loads the document, applies the change and stores the
/// document again while holding a lock, so concurrent writers cannot lose
/// updates. Clones share the same backend.
pub struct Storage<B> {
    inner: Arc<Inner<B>>,
}

struct Inner<B> {
    backend: B,
    lock: Mutex<()>,
}

impl<B> Clone for Storage<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backend> Storage<B> {
    pub fn new(backend: B) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                lock: Mutex::new(()),
            }),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> Result<T, StorageError> {
        let _guard = self.inner.lock.lock().map_err(|_| poisoned())?;
        Ok(f(&self.inner.backend.load()?))
    }

    fn modify<T, E>(&self, f: impl FnOnce(&mut Document) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let _guard = self.inner.lock.lock().map_err(|_| poisoned())?;
        let mut document = self.inner.backend.load()?;
        let result = f(&mut document)?;
        self.inner.backend.store(&document)?;
        Ok(result)
    }
}

fn poisoned() -> StorageError {
    StorageError::Other("storage lock poisoned".into())
}

impl<B: Backend> UserRepository for Storage<B> {
    async fn read_users(&self) -> Result<Vec<UserProfile>, ReadError> {
        self.read(|document| {
            document
                .users
                .iter()
                .cloned()
                .map(UserProfile::try_from)
                .collect::<Result<Vec<_>, _>>()
        })?
        .map_err(|err| ReadError::Other(Box::new(err)))
    }

    async fn create_user(&self, user: UserProfile) -> Result<UserProfile, CreateError> {
        let user = if user.id.is_nil() {
            UserProfile {
                id: UserID::new_random(),
                ..user
            }
        } else {
            user
        };
        let name = user.name.to_string();
        self.modify(|document| {
            if document
                .users
                .iter()
                .any(|u| u.id == *user.id || u.name == name)
            {
                return Err(CreateError::Conflict);
            }
            document.users.push(model::User::from(&user));
            Ok(user)
        })
    }

    async fn replace_user(&self, user: UserProfile) -> Result<UserProfile, UpdateError> {
        let name = user.name.to_string();
        self.modify(|document| {
            if document
                .users
                .iter()
                .any(|u| u.id != *user.id && u.name == name)
            {
                return Err(UpdateError::Conflict);
            }
            let stored = document
                .users
                .iter_mut()
                .find(|u| u.id == *user.id)
                .ok_or(StorageError::NotFound)?;
            *stored = model::User::from(&user);
            Ok(user)
        })
    }

    async fn delete_user(&self, id: UserID) -> Result<UserID, DeleteError> {
        self.modify(|document| {
            let len = document.users.len();
            document.users.retain(|u| u.id != *id);
            if document.users.len() == len {
                return Err(StorageError::NotFound.into());
            }
            document.measurements.retain(|m| m.user_id != *id);
            Ok(id)
        })
    }
}

impl<B: Backend> MeasurementRepository for Storage<B> {
    async fn read_measurements(&self, user_id: UserID) -> Result<Vec<BodyMeasurement>, ReadError> {
        Ok(self.read(|document| {
            let mut measurements = document
                .measurements
                .iter()
                .filter(|m| m.user_id == *user_id)
                .map(BodyMeasurement::from)
                .collect::<Vec<_>>();
            measurements.sort_by_key(|m| m.date);
            measurements
        })?)
    }

    async fn create_measurement(
        &self,
        user_id: UserID,
        measurement: BodyMeasurement,
    ) -> Result<BodyMeasurement, CreateError> {
        self.modify(|document| {
            if !document.users.iter().any(|u| u.id == *user_id) {
                return Err(StorageError::NotFound.into());
            }
            if document
                .measurements
                .iter()
                .any(|m| m.belongs_to(user_id, measurement.date))
            {
                return Err(CreateError::Conflict);
            }
            document
                .measurements
                .push(model::Measurement::new(user_id, &measurement));
            Ok(measurement)
        })
    }

    async fn replace_measurement(
        &self,
        user_id: UserID,
        measurement: BodyMeasurement,
    ) -> Result<BodyMeasurement, UpdateError> {
        self.modify(|document| {
            let stored = document
                .measurements
                .iter_mut()
                .find(|m| m.belongs_to(user_id, measurement.date))
                .ok_or(StorageError::NotFound)?;
            *stored = model::Measurement::new(user_id, &measurement);
            Ok(measurement)
        })
    }

    async fn delete_measurement(
        &self,
        user_id: UserID,
        date: NaiveDate,
    ) -> Result<NaiveDate, DeleteError> {
        self.modify(|document| {
            let len = document.measurements.len();
            document.measurements.retain(|m| !m.belongs_to(user_id, date));
            if document.measurements.len() == len {
                return Err(StorageError::NotFound.into());
            }
            Ok(date)
        })
    }
}

impl<B: Backend> SettingsRepository for Storage<B> {
    async fn read_settings(&self) -> Result<Settings, String> {
        self.read(|document| document.settings.unwrap_or_default())
            .map_err(|err| err.to_string())
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        self.modify(|document| {
            document.settings = Some(settings);
            Ok::<_, StorageError>(())
        })
        .map_err(|err| err.to_string())
    }
}

impl<B: Backend> log::Repository for Storage<B> {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.read(|document| document.log.clone())
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        self.modify(|document| {
            log::push_entry(&mut document.log, entry);
            Ok::<_, StorageError>(())
        })
        .map_err(|err| log::Error::Unknown(err.to_string()))
    }
}
