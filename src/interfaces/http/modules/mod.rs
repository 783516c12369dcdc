pub mod health;
pub mod ratings;
pub mod request_id;
