//! Built-in consumer services, one per relay direction.

pub mod discord;
pub mod minecraft;
pub mod web;

pub use discord::DiscordNotifyService;
pub use minecraft::McBridgeService;
pub use web::WebSessionService;
