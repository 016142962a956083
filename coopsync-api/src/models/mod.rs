mod analytics;
mod auth;
mod camera;
mod control;
mod dashboard;
mod event;
mod record;
mod settings;

pub use analytics::*;
pub use auth::*;
pub use camera::*;
pub use control::*;
pub use dashboard::*;
pub use event::*;
pub use record::*;
pub use settings::*;
