//! Value serialization for the disk tier

/// Boxed error type returned by codec implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Conversion between a cached value and its on-disk byte representation.
///
/// Implemented once per cached type; the cache itself never interprets the
/// bytes. A decode failure is treated as a cache miss, an encode failure as a
/// failed write.
pub trait Cacheable: Sized {
    fn from_cached(bytes: &[u8]) -> Result<Self, BoxError>;
    fn to_cached(&self) -> Result<Vec<u8>, BoxError>;
}

impl Cacheable for Vec<u8> {
    fn from_cached(bytes: &[u8]) -> Result<Self, BoxError> {
        Ok(bytes.to_vec())
    }

    fn to_cached(&self) -> Result<Vec<u8>, BoxError> {
        Ok(self.clone())
    }
}

impl Cacheable for String {
    fn from_cached(bytes: &[u8]) -> Result<Self, BoxError> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    fn to_cached(&self) -> Result<Vec<u8>, BoxError> {
        Ok(self.as_bytes().to_vec())
    }
}
