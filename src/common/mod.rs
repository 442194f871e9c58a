//! Common utilities shared by the CLI and the runner

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Join a base URL and an endpoint path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:8080/api", "/login"),
            "http://localhost:8080/api/login"
        );
        assert_eq!(
            join_url("http://localhost:8080/api/", "products"),
            "http://localhost:8080/api/products"
        );
        assert_eq!(join_url("http://h/api/", ""), "http://h/api");
    }
}
