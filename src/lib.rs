//! Brew API gateway.
//!
//! Thin HTTP front for the profile-matching ML service: validates search,
//! profile and message-generation requests, forwards each one as a single
//! upstream call with a bounded timeout, and translates the outcome into a
//! small, stable set of client-facing responses.
//!
//! | Method | Path                    | Failure codes |
//! |--------|-------------------------|---------------|
//! | GET    | `/health`               | none          |
//! | GET    | `/api/search`           | 400, 503, 500 |
//! | GET    | `/api/profile/{id}`     | 500           |
//! | GET    | `/api/profiles`         | 500           |
//! | POST   | `/api/generate-message` | 400, 503, 500 |

pub mod config;
pub mod service;

#[cfg(any(feature = "server-http2", feature = "client-http2"))]
pub mod dto;

#[cfg(feature = "client-http2")]
pub mod upstream;

#[cfg(all(feature = "server-http2", feature = "client-http2"))]
pub mod gateway;
