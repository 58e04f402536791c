pub mod models;
pub mod store;

pub use models::Notification;
pub use store::NotificationStore;
