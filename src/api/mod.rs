pub mod http;

pub use http::{HttpServer, USER_HEADER};
