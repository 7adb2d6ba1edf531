pub mod application;
pub mod auth;
pub mod company;
pub mod job;
pub mod user;
