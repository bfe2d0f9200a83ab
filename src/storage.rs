//! Storage contract consumed by the cart, plus the snapshot codec shared by the backends
use super::error::{StorageError, StorageOperation};
use super::product::Product;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Key holding the encoded cart snapshot.
pub const SNAPSHOT_KEY: &str = "cart";
/// Ancillary key holding the sha256 digest of the snapshot blob.
pub const DIGEST_KEY: &str = "cart.digest";

/// Persists the cart's line items. The cart never sees the backing mechanism.
pub trait Storage: Send + Sync {
    /// Replaces any previous snapshot with `products`.
    fn save(&self, products: &[Product]) -> Result<(), StorageError>;
    /// Last saved snapshot, or an empty list when nothing was saved.
    fn load(&self) -> Result<Vec<Product>, StorageError>;
    /// Removes the persisted snapshot entirely.
    fn clear(&self) -> Result<(), StorageError>;
    /// Removes one named key. Absent keys are not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp(DateTime<Utc>);

impl TimeStamp {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> minicbor::Encode<C> for TimeStamp {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

// What actually lands under SNAPSHOT_KEY
#[derive(minicbor::Encode, minicbor::Decode, Debug, PartialEq)]
pub struct Snapshot {
    #[n(0)]
    pub saved_at: TimeStamp,
    #[n(1)]
    pub products: Vec<Product>,
}

impl Snapshot {
    pub fn new(products: &[Product]) -> Self {
        Self {
            saved_at: TimeStamp::new(),
            products: products.to_vec(),
        }
    }

    /// Serialises the snapshot to cbor. Returns the sha256 digest of the blob and the blob itself.
    pub fn encode(&self) -> Result<(String, Vec<u8>), StorageError> {
        let blob = minicbor::to_vec(self).map_err(|err| {
            StorageError::new("Failed to serialize cart snapshot.")
                .with_operation(StorageOperation::Save)
                .with_source(err)
        })?;
        let digest = sha256::digest(&blob);

        Ok((digest, blob))
    }

    /// Decodes a blob written by [`Snapshot::encode`] and re-checks every line item.
    ///
    /// `digest` is compared against the blob when present. A mismatch, a product that
    /// breaks its invariants (rejected while decoding), or a repeated article number
    /// all fail as a load error.
    pub fn decode(blob: &[u8], digest: Option<&[u8]>) -> Result<Self, StorageError> {
        if let Some(expected) = digest {
            let actual = sha256::digest(blob);
            if actual.as_bytes() != expected {
                tracing::warn!(expected = %String::from_utf8_lossy(expected), actual = %actual, "Cart snapshot digest mismatch");
                return Err(load_error("Cart snapshot failed its integrity check."));
            }
        }

        let snapshot: Snapshot = minicbor::decode(blob).map_err(|err| {
            load_error("Failed to unserialize cart snapshot.").with_source(err)
        })?;

        ensure_unique_article_numbers(&snapshot.products)?;

        Ok(snapshot)
    }
}

/// Fails with a load error when two line items share an article number.
pub fn ensure_unique_article_numbers(products: &[Product]) -> Result<(), StorageError> {
    let mut seen = HashSet::new();
    for product in products {
        if !seen.insert(product.article_number()) {
            return Err(load_error(format!(
                "Cart snapshot holds article number {} twice.",
                product.article_number()
            )));
        }
    }
    Ok(())
}

fn load_error(message: impl Into<String>) -> StorageError {
    StorageError::new(message).with_operation(StorageOperation::Load)
}
