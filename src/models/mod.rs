pub mod blocked_app;
pub mod setting;
pub mod schedule;
pub mod visit;

pub use blocked_app::BlockedApp;
pub use setting::Setting;
pub use schedule::Schedule;
pub use visit::Visit;
