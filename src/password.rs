use crate::error::ApiError;

/// Fixed bcrypt work factor. Applied on every user creation; raising it only
/// affects digests produced afterwards, existing ones keep their embedded cost.
const WORK_FACTOR: u32 = 10;

/// Derives a salted one-way digest from a plaintext password.
pub fn hash(plaintext: &str) -> Result<String, ApiError> {
    Ok(bcrypt::hash(plaintext, WORK_FACTOR)?)
}

/// Compares a candidate plaintext against a stored digest. bcrypt performs the
/// comparison against the digest's embedded salt and cost, so digests hashed
/// under an older work factor still verify.
pub fn verify(plaintext: &str, digest: &str) -> Result<bool, ApiError> {
    Ok(bcrypt::verify(plaintext, digest)?)
}
