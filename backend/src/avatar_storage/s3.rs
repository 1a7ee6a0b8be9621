//! S3-backed avatar store

use std::sync::Arc;

use aws_sdk_s3::{
    error::SdkError,
    operation::head_bucket::HeadBucketError,
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration, PublicAccessBlockConfiguration},
    Client as S3Client,
};
use tracing::{debug, info};

use super::{AvatarStore, BucketError, BucketResult, BucketStatus, MAX_OBJECT_BYTES};

/// Cache lifetime advertised on uploaded avatars
const CACHE_CONTROL: &str = "max-age=3600";

/// Region that rejects an explicit location constraint
const DEFAULT_REGION: &str = "us-east-1";

/// Avatar storage client for S3 operations
pub struct S3AvatarStore {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    public_base_url: String,
}

impl S3AvatarStore {
    /// Creates a new avatar store
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for avatar storage
    /// * `public_base_url` - URL prefix under which objects of the bucket are publicly readable
    #[must_use]
    pub const fn new(
        s3_client: Arc<S3Client>,
        bucket_name: String,
        public_base_url: String,
    ) -> Self {
        Self {
            s3_client,
            bucket_name,
            public_base_url,
        }
    }

    /// Creates the bucket and opens it for anonymous reads
    async fn create_public_bucket(&self) -> BucketResult<()> {
        let mut request = self.s3_client.create_bucket().bucket(&self.bucket_name);

        if let Some(region) = self.s3_client.config().region().map(AsRef::<str>::as_ref) {
            if region != DEFAULT_REGION {
                request = request.create_bucket_configuration(
                    CreateBucketConfiguration::builder()
                        .location_constraint(BucketLocationConstraint::from(region))
                        .build(),
                );
            }
        }

        match request.send().await {
            Ok(_) => {}
            // Another request created it between our lookup and now
            Err(SdkError::ServiceError(ref service_err))
                if service_err.err().is_bucket_already_owned_by_you() =>
            {
                debug!("Bucket {} created concurrently", self.bucket_name);
            }
            Err(e) => return Err(BucketError::from(e)),
        }

        // New buckets block public policies by default
        self.s3_client
            .put_public_access_block()
            .bucket(&self.bucket_name)
            .public_access_block_configuration(
                PublicAccessBlockConfiguration::builder()
                    .block_public_acls(true)
                    .ignore_public_acls(true)
                    .block_public_policy(false)
                    .restrict_public_buckets(false)
                    .build(),
            )
            .send()
            .await?;

        self.s3_client
            .put_bucket_policy()
            .bucket(&self.bucket_name)
            .policy(public_read_policy(&self.bucket_name))
            .send()
            .await?;

        info!("Created public avatar bucket {}", self.bucket_name);

        Ok(())
    }
}

fn object_url(public_base_url: &str, key: &str) -> String {
    format!("{}/{key}", public_base_url.trim_end_matches('/'))
}

/// Bucket policy granting anonymous `GetObject` on every key
fn public_read_policy(bucket_name: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "PublicReadAvatars",
            "Effect": "Allow",
            "Principal": "*",
            "Action": "s3:GetObject",
            "Resource": format!("arn:aws:s3:::{bucket_name}/*"),
        }],
    })
    .to_string()
}

#[async_trait::async_trait]
impl AvatarStore for S3AvatarStore {
    async fn ensure_bucket(&self) -> BucketResult<BucketStatus> {
        {
            let result = self
                .s3_client
                .head_bucket()
                .bucket(&self.bucket_name)
                .send()
                .await;

            match result {
                Ok(_) => return Ok(BucketStatus::Exists),
                Err(SdkError::ServiceError(ref service_err))
                    if matches!(service_err.err(), HeadBucketError::NotFound(_)) =>
                {
                    debug!("Bucket {} not found", self.bucket_name);
                }
                Err(e) => return Err(BucketError::from(e)),
            }
        }

        self.create_public_bucket().await?;
        Ok(BucketStatus::Created)
    }

    async fn delete_objects(&self, keys: &[String]) -> BucketResult<()> {
        for key in keys {
            self.s3_client
                .delete_object()
                .bucket(&self.bucket_name)
                .key(key)
                .send()
                .await?;
        }

        Ok(())
    }

    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> BucketResult<()> {
        if body.len() > MAX_OBJECT_BYTES {
            return Err(BucketError::ObjectTooLarge {
                key: key.to_string(),
                size: body.len(),
                limit: MAX_OBJECT_BYTES,
            });
        }

        debug!("Uploading {} ({} bytes)", key, body.len());

        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .cache_control(CACHE_CONTROL)
            .body(ByteStream::from(body))
            .send()
            .await?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        object_url(&self.public_base_url, key)
    }
}
