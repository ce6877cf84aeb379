//! Repository implementations for database operations.
//!
//! Methods on a repository run against its pool. Associated functions taking a
//! `PgConnection` run inside a caller-owned transaction.

pub mod environment;
pub mod flag;
pub mod flag_setting;
pub mod project;
pub mod user;

pub use environment::EnvironmentRepository;
pub use flag::FlagRepository;
pub use flag_setting::FlagSettingRepository;
pub use project::ProjectRepository;
pub use user::UserRepository;
