//! Domain models for Flagger.

pub mod environment;
pub mod flag;
pub mod flag_setting;
pub mod project;
pub mod user;

pub use environment::{Environment, NewEnvironment};
pub use flag::{Flag, NewFlag};
pub use flag_setting::{FlagDetails, FlagSetting, FlagSettingView, NewFlagSetting};
pub use project::{NewProject, Project};
pub use user::{NewUser, User};
