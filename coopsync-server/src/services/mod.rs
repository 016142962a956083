mod analytics_service;
mod auth_service;
mod camera_service;
mod clock;
mod command_service;
mod context_service;
mod control_service;
mod event_log_service;
mod mirror_service;
mod schedule_service;
mod token_service;

pub use analytics_service::*;
pub use auth_service::*;
pub use camera_service::*;
pub use clock::*;
pub use command_service::*;
pub use context_service::*;
pub use control_service::*;
pub use event_log_service::*;
pub use mirror_service::*;
pub use schedule_service::*;
pub use token_service::*;
