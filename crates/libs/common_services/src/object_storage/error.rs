use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStorageError {
    #[error("object storage error: {0}")]
    S3(#[from] s3::error::S3Error),

    #[error("invalid object storage credentials: {0}")]
    Credentials(#[from] s3::creds::error::CredentialsError),

    #[error("object storage rejected {key} with status {status}")]
    Rejected { key: String, status: u16 },
}
