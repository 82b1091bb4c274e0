pub mod graphql;
pub mod http;
pub mod json;
pub mod session;
