//! Inventory verification at each checkpoint.

use tracing::info;

use fpkit_common::{ComponentType, Leaf, SampleStream};

use crate::error::{InventoryError, Result};

/// Pull the next sample of every stream and check it.
///
/// Fails on the first stream that streamed nothing within its sampling
/// interval, or whose value is absent or not of the stream's leaf type.
/// String streams are checked before union streams.
pub async fn verify_all_inventory_values(
    strings: &mut [SampleStream<String>],
    unions: &mut [SampleStream<ComponentType>],
) -> Result<()> {
    for stream in strings.iter_mut() {
        verify_stream(stream).await?;
    }
    for stream in unions.iter_mut() {
        verify_stream(stream).await?;
    }
    Ok(())
}

async fn verify_stream<T: Leaf>(stream: &mut SampleStream<T>) -> Result<()> {
    let sample = stream
        .next()
        .await
        .ok_or_else(|| InventoryError::NotStreamed {
            stream: stream.to_string(),
        })?;

    let value = sample.val().map_err(|reason| InventoryError::InvalidValue {
        stream: stream.path().to_string(),
        expected: T::KIND,
        reason,
    })?;

    info!("Inventory telemetry {} is valid: {}", stream.path(), value);
    Ok(())
}
