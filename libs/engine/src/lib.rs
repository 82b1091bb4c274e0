pub mod callback;
pub mod client;
pub mod error;
pub mod extractor;
pub mod operations;
pub mod pipeline;
pub mod request_builder;
pub mod transport;
pub mod validator;

#[cfg(any(test, feature = "test_utils"))]
pub mod testing;
