// Public modules
pub mod auth;
pub mod domains;
pub mod errors;
pub mod ffi;
pub mod globals;
pub mod types;
pub mod validation;

// Private modules
mod db_migration;

// Entry point for initialization
/// Initialize the library with the given database URL and JWT secret.
/// This function must be called before any other function in the library.
pub async fn initialize(db_url: &str, jwt_secret: &str) -> ffi::FFIResult<()> {
    // Initialize global services and run pending migrations, passing the secret
    globals::initialize(db_url, jwt_secret).await
}

/// Get a reference to the SQLite connection pool
/// This is primarily for internal use
pub fn get_db_pool() -> ffi::FFIResult<sqlx::SqlitePool> {
    globals::get_db_pool()
}
