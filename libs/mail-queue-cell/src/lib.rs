pub mod error;
pub mod models;
pub mod services;

pub use error::MailQueueError;
pub use models::CancellationMailJob;
pub use services::queue::CancellationMailQueue;
