//! Database entity definitions.

pub mod environment;
pub mod flag;
pub mod flag_setting;
pub mod project;
pub mod user;

pub use environment::EnvironmentEntity;
pub use flag::FlagEntity;
pub use flag_setting::{FlagDetailsEntity, FlagSettingEntity, FlagSettingViewEntity};
pub use project::ProjectEntity;
pub use user::UserEntity;
