//! Shift template service.

use chrono::Utc;
use domain::models::{AuthContext, ShiftTemplate, ShiftTemplateInput};
use persistence::repositories::ShiftTemplateRepository;
use persistence::TxManager;
use tracing::info;
use uuid::Uuid;

use super::schedules::ScheduleServiceError;

#[derive(Clone)]
pub struct ShiftTemplateService {
    tx: TxManager,
}

impl ShiftTemplateService {
    pub fn new(tx: TxManager) -> Self {
        Self { tx }
    }

    pub async fn create(
        &self,
        input: ShiftTemplateInput,
    ) -> Result<ShiftTemplate, ScheduleServiceError> {
        let template = ShiftTemplate::new(input)?;

        let created = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let entity = ShiftTemplateRepository::create(conn, &template).await?;
                    Ok::<_, ScheduleServiceError>(ShiftTemplate::from(entity))
                })
            })
            .await?;

        info!(template_id = %created.id, "Shift template created");
        Ok(created)
    }

    /// Creates every template or none. All inputs are validated before the
    /// transaction opens.
    pub async fn create_bulk(
        &self,
        inputs: Vec<ShiftTemplateInput>,
    ) -> Result<Vec<ShiftTemplate>, ScheduleServiceError> {
        let templates = inputs
            .into_iter()
            .map(ShiftTemplate::new)
            .collect::<Result<Vec<_>, _>>()?;

        let created = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let mut created = Vec::with_capacity(templates.len());
                    for template in &templates {
                        let entity = ShiftTemplateRepository::create(conn, template).await?;
                        created.push(ShiftTemplate::from(entity));
                    }
                    Ok::<_, ScheduleServiceError>(created)
                })
            })
            .await?;

        info!(count = created.len(), "Shift templates created in bulk");
        Ok(created)
    }

    /// Active templates ordered by day, then start time.
    pub async fn list_active(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<ShiftTemplate>, ScheduleServiceError> {
        self.tx
            .run_authenticated(auth, |conn| {
                Box::pin(async move {
                    let rows = ShiftTemplateRepository::list_active(conn).await?;
                    Ok::<_, ScheduleServiceError>(
                        rows.into_iter().map(ShiftTemplate::from).collect(),
                    )
                })
            })
            .await
    }

    pub async fn list_all(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<ShiftTemplate>, ScheduleServiceError> {
        self.tx
            .run_authenticated(auth, |conn| {
                Box::pin(async move {
                    let rows = ShiftTemplateRepository::list_all(conn).await?;
                    Ok::<_, ScheduleServiceError>(
                        rows.into_iter().map(ShiftTemplate::from).collect(),
                    )
                })
            })
            .await
    }

    pub async fn get(
        &self,
        auth: &AuthContext,
        id: Uuid,
    ) -> Result<ShiftTemplate, ScheduleServiceError> {
        self.tx
            .run_authenticated(auth, move |conn| {
                Box::pin(async move {
                    let entity = ShiftTemplateRepository::find_by_id(conn, id)
                        .await?
                        .ok_or(ScheduleServiceError::ShiftTemplateNotFound)?;
                    Ok::<_, ScheduleServiceError>(ShiftTemplate::from(entity))
                })
            })
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: ShiftTemplateInput,
    ) -> Result<ShiftTemplate, ScheduleServiceError> {
        input.validate()?;

        self.tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let mut template: ShiftTemplate =
                        ShiftTemplateRepository::find_by_id(conn, id)
                            .await?
                            .ok_or(ScheduleServiceError::ShiftTemplateNotFound)?
                            .into();

                    template.update(input)?;
                    template.updated_at = Some(Utc::now());

                    let entity = ShiftTemplateRepository::update(conn, &template)
                        .await?
                        .ok_or(ScheduleServiceError::ShiftTemplateNotFound)?;
                    Ok::<_, ScheduleServiceError>(ShiftTemplate::from(entity))
                })
            })
            .await
    }

    pub async fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> Result<ShiftTemplate, ScheduleServiceError> {
        let template = self
            .tx
            .run_system(move |conn| {
                Box::pin(async move {
                    let entity = ShiftTemplateRepository::set_active(conn, id, is_active)
                        .await?
                        .ok_or(ScheduleServiceError::ShiftTemplateNotFound)?;
                    Ok::<_, ScheduleServiceError>(ShiftTemplate::from(entity))
                })
            })
            .await?;

        info!(template_id = %template.id, is_active, "Shift template activation changed");
        Ok(template)
    }
}
