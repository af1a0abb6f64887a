//! Feed synchronization for the Nexora social client.
//!
//! A [`services::view::FeedView`] loads a feed through the
//! [`services::feed::FeedLoader`], applies comment and post changes locally
//! through the [`services::mutations::MutationEngine`], and confirms them
//! against a [`repositories::api::RemoteApi`]. Every operation is gated on a
//! session read from a [`repositories::session::SessionStore`].

pub mod config;
pub mod error;
pub mod state;

pub mod models {
    pub mod account;
    pub mod comment;
    pub mod feed;
    pub mod media;
    pub mod post;
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod api;
    pub mod http;
    pub mod session;
    pub mod wire;
}

pub mod services {
    pub mod auth;
    pub mod feed;
    pub mod mutations;
    pub mod posts;
    pub mod session;
    pub mod view;
}

pub mod validation {
    pub mod auth;
    pub mod content;
}

pub use config::Config;
pub use error::{FeedError, Result};
pub use state::AppState;
