//! Scheduler config service.

use chrono::Utc;
use domain::models::{AuthContext, SchedulerConfig, SchedulerConfigInput};
use persistence::repositories::SchedulerConfigRepository;
use persistence::TxManager;
use tracing::info;
use uuid::Uuid;

use super::schedules::ScheduleServiceError;

#[derive(Clone)]
pub struct SchedulerConfigService {
    tx: TxManager,
}

impl SchedulerConfigService {
    pub fn new(tx: TxManager) -> Self {
        Self { tx }
    }

    pub async fn create(
        &self,
        input: SchedulerConfigInput,
    ) -> Result<SchedulerConfig, ScheduleServiceError> {
        let config = SchedulerConfig::new(input)?;

        let created = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let entity = SchedulerConfigRepository::create(conn, &config).await?;
                    Ok::<_, ScheduleServiceError>(SchedulerConfig::from(entity))
                })
            })
            .await?;

        info!(config_id = %created.id, "Scheduler config created");
        Ok(created)
    }

    pub async fn list(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<SchedulerConfig>, ScheduleServiceError> {
        self.tx
            .run_authenticated(auth, |conn| {
                Box::pin(async move {
                    let rows = SchedulerConfigRepository::list(conn).await?;
                    Ok::<_, ScheduleServiceError>(
                        rows.into_iter().map(SchedulerConfig::from).collect(),
                    )
                })
            })
            .await
    }

    pub async fn get_default(
        &self,
        auth: &AuthContext,
    ) -> Result<SchedulerConfig, ScheduleServiceError> {
        self.tx
            .run_authenticated(auth, |conn| {
                Box::pin(async move {
                    let entity = SchedulerConfigRepository::find_default(conn)
                        .await?
                        .ok_or(ScheduleServiceError::SchedulerConfigNotFound)?;
                    Ok::<_, ScheduleServiceError>(SchedulerConfig::from(entity))
                })
            })
            .await
    }

    pub async fn get(
        &self,
        auth: &AuthContext,
        id: Uuid,
    ) -> Result<SchedulerConfig, ScheduleServiceError> {
        self.tx
            .run_authenticated(auth, move |conn| {
                Box::pin(async move {
                    let entity = SchedulerConfigRepository::find_by_id(conn, id)
                        .await?
                        .ok_or(ScheduleServiceError::SchedulerConfigNotFound)?;
                    Ok::<_, ScheduleServiceError>(SchedulerConfig::from(entity))
                })
            })
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: SchedulerConfigInput,
    ) -> Result<SchedulerConfig, ScheduleServiceError> {
        input.validate()?;

        self.tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let mut config: SchedulerConfig =
                        SchedulerConfigRepository::find_by_id(conn, id)
                            .await?
                            .ok_or(ScheduleServiceError::SchedulerConfigNotFound)?
                            .into();

                    config.update(input)?;
                    config.updated_at = Some(Utc::now());

                    let entity = SchedulerConfigRepository::update(conn, &config)
                        .await?
                        .ok_or(ScheduleServiceError::SchedulerConfigNotFound)?;
                    Ok::<_, ScheduleServiceError>(SchedulerConfig::from(entity))
                })
            })
            .await
    }

    /// Makes `id` the only default config.
    pub async fn set_default(&self, id: Uuid) -> Result<SchedulerConfig, ScheduleServiceError> {
        let config = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let entity = SchedulerConfigRepository::set_default(conn, id)
                        .await?
                        .ok_or(ScheduleServiceError::SchedulerConfigNotFound)?;
                    Ok::<_, ScheduleServiceError>(SchedulerConfig::from(entity))
                })
            })
            .await?;

        info!(config_id = %config.id, "Default scheduler config changed");
        Ok(config)
    }
}
