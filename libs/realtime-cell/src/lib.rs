pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::RealtimeError;
pub use models::*;
pub use router::create_realtime_router;
pub use services::hub::ChannelHub;
pub use services::notifier::NotificationRouter;
pub use services::registry::SubscriptionRegistry;
