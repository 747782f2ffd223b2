mod endpoint;
mod http;

pub use http::{ConsentPolicy, HttpLocationSource};
