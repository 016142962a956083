mod analytics_handle;
mod auth_handle;
mod camera_handle;
mod control_handle;
mod dashboard_handle;
mod event_handle;
mod preference_handle;
mod schedule_handle;

pub use analytics_handle::*;
pub use auth_handle::*;
pub use camera_handle::*;
pub use control_handle::*;
pub use dashboard_handle::*;
pub use event_handle::*;
pub use preference_handle::*;
pub use schedule_handle::*;
