use crate::auth::AuthService;
use crate::domains::analytics::{AnalyticsService, AnalyticsServiceImpl};
use crate::domains::export::{ExportService, ExportServiceImpl};
use crate::domains::member::{
    MemberRepository, MemberService, MemberServiceImpl, SqliteMemberRepository,
};
use crate::domains::submission::{
    SqliteSubmissionRepository, SubmissionRepository, SubmissionService, SubmissionServiceImpl,
};
use crate::ffi::error::{FFIError, FFIResult};
use lazy_static::lazy_static;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// Global state definitions
lazy_static! {
    static ref INIT_MUTEX: tokio::sync::Mutex<()> = tokio::sync::Mutex::new(());
    static ref INITIALIZED: AtomicBool = AtomicBool::new(false);

    static ref DB_POOL: Mutex<Option<SqlitePool>> = Mutex::new(None);

    static ref AUTH_SERVICE: Mutex<Option<Arc<AuthService>>> = Mutex::new(None);

    // Member domain
    static ref MEMBER_REPO: Mutex<Option<Arc<dyn MemberRepository>>> = Mutex::new(None);
    static ref MEMBER_SERVICE: Mutex<Option<Arc<dyn MemberService>>> = Mutex::new(None);

    // Submission domain
    static ref SUBMISSION_REPO: Mutex<Option<Arc<dyn SubmissionRepository>>> = Mutex::new(None);
    static ref SUBMISSION_SERVICE: Mutex<Option<Arc<dyn SubmissionService>>> = Mutex::new(None);

    // Aggregation and export
    static ref ANALYTICS_SERVICE: Mutex<Option<Arc<dyn AnalyticsService>>> = Mutex::new(None);
    static ref EXPORT_SERVICE: Mutex<Option<Arc<dyn ExportService>>> = Mutex::new(None);
}

// --- Getter Functions ---

pub fn get_db_pool() -> FFIResult<SqlitePool> {
    DB_POOL
        .lock()
        .map_err(|_| FFIError::internal("DB_POOL lock poisoned".to_string()))?
        .clone()
        .ok_or_else(|| FFIError::internal("Database pool not initialized".to_string()))
}

pub fn get_auth_service() -> FFIResult<Arc<AuthService>> {
    AUTH_SERVICE
        .lock()
        .map_err(|_| FFIError::internal("AUTH_SERVICE lock poisoned".to_string()))?
        .clone()
        .ok_or_else(|| FFIError::internal("AuthService not initialized".to_string()))
}

pub fn get_member_repo() -> FFIResult<Arc<dyn MemberRepository>> {
    MEMBER_REPO
        .lock()
        .map_err(|_| FFIError::internal("MEMBER_REPO lock poisoned".to_string()))?
        .clone()
        .ok_or_else(|| FFIError::internal("MemberRepository not initialized".to_string()))
}

pub fn get_member_service() -> FFIResult<Arc<dyn MemberService>> {
    MEMBER_SERVICE
        .lock()
        .map_err(|_| FFIError::internal("MEMBER_SERVICE lock poisoned".to_string()))?
        .clone()
        .ok_or_else(|| FFIError::internal("MemberService not initialized".to_string()))
}

pub fn get_submission_repo() -> FFIResult<Arc<dyn SubmissionRepository>> {
    SUBMISSION_REPO
        .lock()
        .map_err(|_| FFIError::internal("SUBMISSION_REPO lock poisoned".to_string()))?
        .clone()
        .ok_or_else(|| FFIError::internal("SubmissionRepository not initialized".to_string()))
}

pub fn get_submission_service() -> FFIResult<Arc<dyn SubmissionService>> {
    SUBMISSION_SERVICE
        .lock()
        .map_err(|_| FFIError::internal("SUBMISSION_SERVICE lock poisoned".to_string()))?
        .clone()
        .ok_or_else(|| FFIError::internal("SubmissionService not initialized".to_string()))
}

pub fn get_analytics_service() -> FFIResult<Arc<dyn AnalyticsService>> {
    ANALYTICS_SERVICE
        .lock()
        .map_err(|_| FFIError::internal("ANALYTICS_SERVICE lock poisoned".to_string()))?
        .clone()
        .ok_or_else(|| FFIError::internal("AnalyticsService not initialized".to_string()))
}

pub fn get_export_service() -> FFIResult<Arc<dyn ExportService>> {
    EXPORT_SERVICE
        .lock()
        .map_err(|_| FFIError::internal("EXPORT_SERVICE lock poisoned".to_string()))?
        .clone()
        .ok_or_else(|| FFIError::internal("ExportService not initialized".to_string()))
}

/// Initialize global services
pub async fn initialize(db_url: &str, jwt_secret: &str) -> FFIResult<()> {
    // Acquire the async mutex to ensure single initialization
    let _guard = INIT_MUTEX.lock().await;

    // Check if already initialized
    if INITIALIZED.load(Ordering::Acquire) {
        return Ok(());
    }

    let result = initialize_internal(db_url, jwt_secret).await;

    // Mark as initialized only if successful
    if result.is_ok() {
        INITIALIZED.store(true, Ordering::Release);
    }

    result
}

async fn initialize_internal(db_url: &str, jwt_secret: &str) -> FFIResult<()> {
    // Pick up a local .env in development builds; harmless when absent
    dotenv::dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        #[cfg(debug_assertions)]
        std::env::set_var("RUST_LOG", "debug");
        #[cfg(not(debug_assertions))]
        std::env::set_var("RUST_LOG", "info");
    }

    // Initialize env_logger if not already initialized
    let _ = env_logger::try_init();

    log::info!("Starting internal initialization");
    log::debug!("Database URL: {}", db_url);

    crate::auth::jwt::initialize(jwt_secret);
    log::debug!("JWT initialized");

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .map_err(|e| FFIError::internal(format!("Database connection failed: {}", e)))?;
    log::info!("Database connection established");

    // Store the pool first so getters work during the rest of init
    *DB_POOL
        .lock()
        .map_err(|_| FFIError::internal("DB_POOL lock poisoned".to_string()))? = Some(pool.clone());

    // Run database migrations BEFORE creating services
    crate::db_migration::run_migrations(&pool)
        .await
        .map_err(|e| FFIError::from(e))?;
    log::info!("Database schema ready");

    // Repositories
    let member_repo: Arc<dyn MemberRepository> = Arc::new(SqliteMemberRepository::new(pool.clone()));
    let submission_repo: Arc<dyn SubmissionRepository> =
        Arc::new(SqliteSubmissionRepository::new(pool.clone()));

    // Services
    let auth_service = Arc::new(AuthService::new(pool.clone()));
    let member_service: Arc<dyn MemberService> =
        Arc::new(MemberServiceImpl::new(pool.clone(), member_repo.clone()));
    let submission_service: Arc<dyn SubmissionService> =
        Arc::new(SubmissionServiceImpl::new(submission_repo.clone()));
    let analytics_service: Arc<dyn AnalyticsService> = Arc::new(AnalyticsServiceImpl::new(
        member_repo.clone(),
        submission_repo.clone(),
    ));
    let export_service: Arc<dyn ExportService> = Arc::new(ExportServiceImpl::new());

    // Store everything
    *AUTH_SERVICE
        .lock()
        .map_err(|_| FFIError::internal("AUTH_SERVICE lock poisoned".to_string()))? =
        Some(auth_service);
    *MEMBER_REPO
        .lock()
        .map_err(|_| FFIError::internal("MEMBER_REPO lock poisoned".to_string()))? =
        Some(member_repo);
    *MEMBER_SERVICE
        .lock()
        .map_err(|_| FFIError::internal("MEMBER_SERVICE lock poisoned".to_string()))? =
        Some(member_service);
    *SUBMISSION_REPO
        .lock()
        .map_err(|_| FFIError::internal("SUBMISSION_REPO lock poisoned".to_string()))? =
        Some(submission_repo);
    *SUBMISSION_SERVICE
        .lock()
        .map_err(|_| FFIError::internal("SUBMISSION_SERVICE lock poisoned".to_string()))? =
        Some(submission_service);
    *ANALYTICS_SERVICE
        .lock()
        .map_err(|_| FFIError::internal("ANALYTICS_SERVICE lock poisoned".to_string()))? =
        Some(analytics_service);
    *EXPORT_SERVICE
        .lock()
        .map_err(|_| FFIError::internal("EXPORT_SERVICE lock poisoned".to_string()))? =
        Some(export_service);

    log::info!("Initialization complete");
    Ok(())
}
