use crate::error::AppError;
use reqwest::Url;

/// Joins `path` onto `base`, treating `base` as a directory even without a
/// trailing slash.
pub fn endpoint(base: &str, path: &str) -> Result<Url, AppError> {
    let mut base = base.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|url| url.join(path.trim_start_matches('/')))
        .map_err(|e| AppError::config(format!("Invalid service URL {}: {}", base, e)))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_with_or_without_trailing_slash() {
        assert_eq!(
            endpoint("http://10.207.136.100:8000/", "predict").unwrap().as_str(),
            "http://10.207.136.100:8000/predict"
        );
        assert_eq!(
            endpoint("https://example.org/api", "/predict").unwrap().as_str(),
            "https://example.org/api/predict"
        );
    }

    #[test]
    fn rejects_garbage_base() {
        assert!(endpoint("not a url", "predict").is_err());
    }
}
