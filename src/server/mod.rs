pub mod builder;
pub mod cors;
pub mod handler;
pub mod listener;
pub mod routes;

pub use builder::ServerBuilder;
pub use cors::Cors;
pub use handler::{RequestHandler, REQUEST_ID};
pub use listener::bind_tcp;
