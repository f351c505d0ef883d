//! Outbound image search adapter for the Unsplash API.

mod dto;
mod unsplash;

pub use unsplash::UnsplashSearchGateway;
