//! Palace Portal Server
//!
//! Role-gated content and community backend for a traditional palace:
//! rulers and chiefs, announcements, events, gallery and history, plus
//! contact and feedback moderation.

pub mod accounts;
pub mod announcements;
pub mod api;
pub mod auth;
pub mod community;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod listing;
pub mod moderation;
pub mod palace;
pub mod permissions;
pub mod util;
