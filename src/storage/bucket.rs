use s3::creds::Credentials;
use s3::{Bucket, Region};

use super::{ObjectStore, S3Target};
use crate::error::{ExportError, Result};

/// Region name sent to S3-compatible servers that do not care about regions
const DEFAULT_REGION: &str = "us-east-1";

/// S3-compatible bucket, addressed path-style
pub struct S3Store {
    bucket: Box<Bucket>,
}

impl S3Store {
    pub fn connect(target: &S3Target) -> Result<Self> {
        let credentials = Credentials::new(
            Some(target.access_key.as_str()),
            Some(target.secret_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| ExportError::Upload(format!("invalid credentials: {}", e)))?;

        let region = Region::Custom {
            region: DEFAULT_REGION.to_string(),
            endpoint: target.endpoint.clone(),
        };

        let bucket = Bucket::new(&target.bucket, region, credentials)
            .map_err(|e| ExportError::Upload(format!("cannot open bucket '{}': {}", target.bucket, e)))?
            .with_path_style();

        Ok(Self { bucket })
    }
}

impl ObjectStore for S3Store {
    fn put(&self, key: &str, content: &[u8]) -> Result<()> {
        let response = self
            .bucket
            .put_object(key, content)
            .map_err(|e| ExportError::Upload(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(ExportError::Upload(format!(
                "bucket '{}' rejected '{}' with status {}",
                self.bucket.name(),
                key,
                status
            )));
        }
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        let name = self.bucket.name();
        format!("{}/buckets/{}/browse/{}", name, name, key)
    }
}
