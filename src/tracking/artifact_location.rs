//! Where a run's artifacts physically go, derived from its artifact URI.

use std::path::PathBuf;

use crate::{Error, Result};

/// Destination of a run's artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLocation {
    /// Served by the tracking server's artifact proxy
    /// (`mlflow-artifacts:/<path>`); holds `<path>` without leading slashes.
    Proxied(String),
    /// Directory on the local filesystem (`file://` URI or bare path).
    Local(PathBuf),
}

impl ArtifactLocation {
    /// Classify an artifact URI.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedArtifactUri` for schemes the client cannot write
    /// to directly (`s3://`, `gs://`, ...).
    pub fn parse(uri: &str) -> Result<Self> {
        if let Some(rest) = uri.strip_prefix("mlflow-artifacts:") {
            // mlflow-artifacts://host:port/path carries an authority; the proxy path follows it
            let path = match rest.strip_prefix("//") {
                Some(with_authority) => with_authority
                    .split_once('/')
                    .map_or("", |(_, path)| path),
                None => rest,
            };
            return Ok(Self::Proxied(path.trim_matches('/').to_string()));
        }
        if let Some(path) = uri.strip_prefix("file://") {
            return Ok(Self::Local(PathBuf::from(path)));
        }
        if uri.contains("://") || uri.is_empty() {
            return Err(Error::UnsupportedArtifactUri(uri.to_string()));
        }
        Ok(Self::Local(PathBuf::from(uri)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxied_uri() {
        let loc = ArtifactLocation::parse("mlflow-artifacts:/1/abc/artifacts").unwrap();
        assert_eq!(loc, ArtifactLocation::Proxied("1/abc/artifacts".to_string()));
    }

    #[test]
    fn test_proxied_uri_with_authority() {
        let loc =
            ArtifactLocation::parse("mlflow-artifacts://tracker:5000/1/abc/artifacts").unwrap();
        assert_eq!(loc, ArtifactLocation::Proxied("1/abc/artifacts".to_string()));
    }

    #[test]
    fn test_file_uri_and_bare_path() {
        assert_eq!(
            ArtifactLocation::parse("file:///srv/mlruns/1/abc/artifacts").unwrap(),
            ArtifactLocation::Local(PathBuf::from("/srv/mlruns/1/abc/artifacts"))
        );
        assert_eq!(
            ArtifactLocation::parse("./mlruns/0/abc/artifacts").unwrap(),
            ArtifactLocation::Local(PathBuf::from("./mlruns/0/abc/artifacts"))
        );
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = ArtifactLocation::parse("s3://bucket/1/abc/artifacts").unwrap_err();
        assert!(matches!(err, Error::UnsupportedArtifactUri(uri) if uri.starts_with("s3://")));
    }
}
