pub mod auth_user;
pub mod coordinator;
pub mod rooms;
pub mod store;
pub mod websocket;
