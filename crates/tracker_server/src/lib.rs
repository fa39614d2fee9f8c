//! HTTP proxy exposing the first sheet of a spreadsheet as JSON.
pub mod errors;
pub mod handlers;
pub mod server;

pub use server::{TrackerServer, router};
