use std::collections::BTreeMap;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use log::info;

use bodytrack_domain::{
    BodyFatPoint, BodyMeasurement, Circumference, CompositionReport, MeasurementService,
    SponsorTree, TeamAggregate, UserID, UserService, avg_weekly_change, body_fat_series,
    weight_change,
};

use crate::SettingsService;

/// Raw user input of a measurement form.
#[derive(Debug, Default, Clone)]
pub struct MeasurementForm {
    pub date: String,
    pub weight: String,
    pub body_fat: String,
    pub water: String,
    pub muscle: String,
    pub waist: String,
    pub neck: String,
    pub hips: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub weight_change: Option<f64>,
    pub avg_weekly_change: Option<f64>,
}

/// Combines the stored user data with the settings to the figures shown on
/// the dashboard.
pub struct Dashboard<S, D> {
    settings: S,
    domain: D,
}

impl<S, D> Dashboard<S, D>
where
    S: SettingsService,
    D: UserService + MeasurementService,
{
    pub fn new(settings: S, domain: D) -> Self {
        Self { settings, domain }
    }

    pub async fn report(
        &self,
        user_id: UserID,
        today: NaiveDate,
    ) -> anyhow::Result<CompositionReport> {
        let settings = self
            .settings
            .get_settings()
            .await
            .map_err(|err| anyhow!(err))?;
        let profile = self
            .domain
            .get_user(user_id)
            .await
            .context("failed to get user")?;
        let measurement = self
            .domain
            .get_latest_measurement(user_id)
            .await
            .context("failed to get measurements")?;
        let mut report = CompositionReport::new(
            &profile,
            measurement.as_ref(),
            today,
            settings.activity_level,
        );
        if !settings.show_water {
            report.water_status = None;
        }
        if !settings.show_muscle {
            report.muscle_status = None;
        }
        Ok(report)
    }

    pub async fn body_fat(&self, user_id: UserID) -> anyhow::Result<Vec<BodyFatPoint>> {
        let profile = self
            .domain
            .get_user(user_id)
            .await
            .context("failed to get user")?;
        let measurements = self.domain.get_measurements(user_id).await?;
        Ok(body_fat_series(&measurements, profile.sex, profile.height))
    }

    pub async fn progress(&self, user_id: UserID) -> anyhow::Result<Progress> {
        let measurements = self.domain.get_measurements(user_id).await?;
        Ok(Progress {
            weight_change: weight_change(&measurements),
            avg_weekly_change: avg_weekly_change(&measurements),
        })
    }

    /// Aggregate the weight change of all members in the team of `manager`.
    pub async fn team_weight_change(
        &self,
        tree: &SponsorTree,
        manager: UserID,
    ) -> anyhow::Result<Option<TeamAggregate>> {
        let mut changes = BTreeMap::new();
        for member in tree.team(manager)? {
            let measurements = self
                .domain
                .get_measurements(member)
                .await
                .with_context(|| format!("failed to get measurements of {member}"))?;
            if let Some(change) = weight_change(&measurements) {
                changes.insert(member, change);
            }
        }
        Ok(tree.aggregate(manager, |member| changes.get(&member).copied())?)
    }

    /// Validate a measurement form and store the measurement.
    pub async fn log_measurement(
        &self,
        user_id: UserID,
        form: &MeasurementForm,
    ) -> anyhow::Result<BodyMeasurement> {
        let measurement = BodyMeasurement {
            date: self
                .domain
                .validate_measurement_date(user_id, &form.date)
                .await?,
            weight: self.domain.validate_measurement_weight(&form.weight)?,
            body_fat: self.domain.validate_measurement_percentage(&form.body_fat)?,
            water: self.domain.validate_measurement_percentage(&form.water)?,
            muscle: self.domain.validate_measurement_percentage(&form.muscle)?,
            circumference: Circumference {
                waist: self.domain.validate_measurement_circumference(&form.waist)?,
                neck: self.domain.validate_measurement_circumference(&form.neck)?,
                hips: self.domain.validate_measurement_circumference(&form.hips)?,
            },
        };
        let measurement = self
            .domain
            .create_measurement(user_id, measurement)
            .await?;
        info!("logged measurement of {user_id} on {}", measurement.date);
        Ok(measurement)
    }
}
