// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod leaderboard;
pub mod questions;
pub mod submissions;
pub mod users;
