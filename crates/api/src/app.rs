use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use domain::services::{EmailSender, SchedulerClient, TranscriptExtractor};
use persistence::TxManager;
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin, require_auth,
    trace_id, RateLimiterState,
};
use crate::routes::{
    auth, health, schedule_generations, scheduler_configs, schedules, shift_templates,
};
use crate::services::{
    AuthService, AuthSettings, ScheduleGenerationService, ScheduleService,
    SchedulerConfigService, ShiftTemplateService,
};

/// Adapters for the services this process talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub email_sender: Arc<dyn EmailSender>,
    pub scheduler: Arc<dyn SchedulerClient>,
    pub transcripts: Option<Arc<dyn TranscriptExtractor>>,
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub tx: TxManager,
    pub auth: Arc<AuthService>,
    pub schedules: ScheduleService,
    pub generations: ScheduleGenerationService,
    pub shift_templates: ShiftTemplateService,
    pub scheduler_configs: SchedulerConfigService,
    pub email_sender: Arc<dyn EmailSender>,
    pub scheduler: Arc<dyn SchedulerClient>,
    /// Constructed when `transcripts.base_url` is set. Not routed yet.
    pub transcripts: Option<Arc<dyn TranscriptExtractor>>,
    pub auth_rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    /// Wires the process singletons around one pool.
    pub fn new(
        config: Config,
        pool: PgPool,
        collaborators: Collaborators,
    ) -> Result<Self, JwtError> {
        let config = Arc::new(config);
        let tx = TxManager::new(pool.clone());

        let jwt = Arc::new(JwtConfig::with_leeway(
            &config.jwt.secret,
            &config.jwt.issuer,
            config.jwt.access_token_ttl_secs,
            config.jwt.leeway_secs,
        )?);

        let auth = Arc::new(AuthService::new(
            tx.clone(),
            jwt,
            Arc::clone(&collaborators.email_sender),
            AuthSettings::from_config(&config),
        ));

        let auth_rate_limiter =
            RateLimiterState::new(config.security.auth_rate_limit_per_minute).map(Arc::new);

        Ok(Self {
            schedules: ScheduleService::new(tx.clone()),
            generations: ScheduleGenerationService::new(
                tx.clone(),
                Arc::clone(&collaborators.scheduler),
            ),
            shift_templates: ShiftTemplateService::new(tx.clone()),
            scheduler_configs: SchedulerConfigService::new(tx.clone()),
            pool,
            config,
            tx,
            auth,
            email_sender: collaborators.email_sender,
            scheduler: collaborators.scheduler,
            transcripts: collaborators.transcripts,
            auth_rate_limiter,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Credential endpoints that can be brute forced or used to spam mail.
    let rate_limited_auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
        .route(
            "/api/v1/auth/resend-verification",
            post(auth::resend_verification),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let public_auth_routes = Router::new()
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/verify-email", post(auth::verify_email))
        .route("/api/v1/auth/reset-password", post(auth::reset_password))
        .merge(rate_limited_auth_routes);

    // Writes on the schedule domain. Runs inside require_auth.
    let admin_routes = Router::new()
        .route("/api/v1/schedules", post(schedules::create))
        .route("/api/v1/schedules/generate", post(schedules::generate))
        .route("/api/v1/schedules/:id/archive", patch(schedules::archive))
        .route("/api/v1/schedules/:id/unarchive", patch(schedules::unarchive))
        .route("/api/v1/schedules/:id/activate", patch(schedules::activate))
        .route(
            "/api/v1/schedules/:id/deactivate",
            patch(schedules::deactivate),
        )
        .route("/api/v1/shift-templates", post(shift_templates::create))
        .route(
            "/api/v1/shift-templates/bulk",
            post(shift_templates::create_bulk),
        )
        .route("/api/v1/shift-templates/:id", put(shift_templates::update))
        .route(
            "/api/v1/shift-templates/:id/activate",
            patch(shift_templates::activate),
        )
        .route(
            "/api/v1/shift-templates/:id/deactivate",
            patch(shift_templates::deactivate),
        )
        .route("/api/v1/scheduler-configs", post(scheduler_configs::create))
        .route(
            "/api/v1/scheduler-configs/:id",
            put(scheduler_configs::update),
        )
        .route(
            "/api/v1/scheduler-configs/:id/set-default",
            patch(scheduler_configs::set_default),
        )
        .route_layer(middleware::from_fn(require_admin));

    let protected_routes = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/change-password", patch(auth::change_password))
        .route("/api/v1/schedules", get(schedules::list))
        .route("/api/v1/schedules/archived", get(schedules::list_archived))
        .route("/api/v1/schedules/active", get(schedules::get_active))
        .route("/api/v1/schedules/:id", get(schedules::get))
        .route(
            "/api/v1/schedule-generations",
            get(schedule_generations::list),
        )
        .route(
            "/api/v1/schedule-generations/:id",
            get(schedule_generations::get),
        )
        .route("/api/v1/shift-templates", get(shift_templates::list_active))
        .route("/api/v1/shift-templates/all", get(shift_templates::list_all))
        .route("/api/v1/shift-templates/:id", get(shift_templates::get))
        .route("/api/v1/scheduler-configs", get(scheduler_configs::list))
        .route(
            "/api/v1/scheduler-configs/default",
            get(scheduler_configs::get_default),
        )
        .route("/api/v1/scheduler-configs/:id", get(scheduler_configs::get))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let operational_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(operational_routes)
        .merge(public_auth_routes)
        .merge(protected_routes)
        // Bottom layers run first.
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}
