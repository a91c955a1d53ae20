pub mod csrf_token;
pub mod health;
pub mod login;
pub mod posts;
pub mod upload;
pub mod verify;
