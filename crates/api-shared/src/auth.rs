use std::env;
use tonic::metadata::MetadataMap;

/// Metadata key carrying the API key on gRPC calls.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Validates the provided API key against the expected API key from environment.
///
/// Returns `Ok(())` if the key is valid, or an error if invalid or missing.
#[allow(clippy::result_large_err)]
pub fn validate_api_key(provided_key: &str) -> Result<(), tonic::Status> {
    let expected_key = env::var("API_KEY")
        .map_err(|_| tonic::Status::internal("API_KEY not set in environment"))?;

    check_api_key(provided_key, &expected_key)
}

/// Extracts the API key from request metadata and validates it.
#[allow(clippy::result_large_err)]
pub fn validate_metadata(metadata: &MetadataMap) -> Result<(), tonic::Status> {
    let api_key = metadata
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| tonic::Status::unauthenticated("Missing x-api-key header"))?;

    validate_api_key(api_key)
}

#[allow(clippy::result_large_err)]
fn check_api_key(provided_key: &str, expected_key: &str) -> Result<(), tonic::Status> {
    if !expected_key.is_empty() && provided_key == expected_key {
        Ok(())
    } else {
        Err(tonic::Status::unauthenticated("Invalid API key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_api_key() {
        assert!(check_api_key("secret", "secret").is_ok());

        let status = check_api_key("guess", "secret").expect_err("wrong key should fail");
        assert_eq!(status.code(), tonic::Code::Unauthenticated);

        assert!(
            check_api_key("", "").is_err(),
            "an empty configured key must not match an empty header"
        );
    }

    #[test]
    fn test_validate_metadata_requires_header() {
        let status = validate_metadata(&MetadataMap::new()).expect_err("missing header");
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert_eq!(status.message(), "Missing x-api-key header");
    }
}
