use portcullis_core::constants::{BLOCK_SIZE, BLOCKS_PER_RECORD, DEFAULT_FIRST_BLOCK, PAYLOAD_LEN};
use portcullis_core::{BlockKey, CredentialRecord, ReaderId};
use portcullis_hardware::CredentialReader;
use tracing::{debug, instrument};

use crate::error::{PipelineError, Result};

/// Reads one credential record from a fixed, contiguous range of blocks.
///
/// # Examples
///
/// ```
/// use portcullis_core::{CredentialId, ReaderId};
/// use portcullis_hardware::mock::{MockCard, MockCredentialReader};
/// use portcullis_rfid::CredentialPipeline;
///
/// #[tokio::main]
/// async fn main() {
///     let (mut reader, handle) = MockCredentialReader::new();
///     let id = CredentialId::new(&[0xAA, 0xBB, 0xCC, 0xDD]).unwrap();
///     handle.present(MockCard::new(id).with_block(4, [0x11; 16])).await.unwrap();
///
///     let pipeline = CredentialPipeline::default();
///     let record = pipeline.log_credential(&mut reader, &ReaderId::default()).await.unwrap();
///     assert_eq!(record.credential_id, id);
///     assert_eq!(&record.payload[..16], &[0x11; 16]);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPipeline {
    first_block: u8,
    block_key: BlockKey,
}

impl Default for CredentialPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_FIRST_BLOCK, BlockKey::default())
    }
}

impl CredentialPipeline {
    pub fn new(first_block: u8, block_key: BlockKey) -> Self {
        Self {
            first_block,
            block_key,
        }
    }

    pub fn first_block(&self) -> u8 {
        self.first_block
    }

    /// Block numbers making up a record, ascending.
    pub fn blocks(&self) -> impl Iterator<Item = u8> + use<> {
        let first = self.first_block;
        (0..BLOCKS_PER_RECORD as u8).map(move |i| first.wrapping_add(i))
    }

    /// Wait for a credential and read its record.
    ///
    /// Waits without a timeout for a credential to be presented. Stops at the
    /// first block that fails to authenticate or read; later blocks are never
    /// touched and no partial payload escapes.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NoCredential`] if the read attempt ends without a credential
    /// - [`PipelineError::AuthFailed`] naming the block whose authentication failed
    /// - [`PipelineError::ReadFailed`] naming the block that could not be read
    #[instrument(skip_all, fields(reader_id = %reader_id))]
    pub async fn log_credential<R: CredentialReader>(
        &self,
        reader: &mut R,
        reader_id: &ReaderId,
    ) -> Result<CredentialRecord> {
        let credential_id = reader
            .detect()
            .await
            .map_err(|source| PipelineError::NoCredential { source })?;
        debug!(credential_id = %credential_id, "credential detected");

        let mut payload = [0u8; PAYLOAD_LEN];
        for (chunk, block) in payload.chunks_exact_mut(BLOCK_SIZE).zip(self.blocks()) {
            reader
                .authenticate_block(&credential_id, block, &self.block_key)
                .await
                .map_err(|source| PipelineError::AuthFailed { block, source })?;

            let data = reader
                .read_block(block)
                .await
                .map_err(|source| PipelineError::ReadFailed { block, source })?;
            chunk.copy_from_slice(&data);
            debug!(block, "block read");
        }

        Ok(CredentialRecord::new(credential_id, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_blocks() {
        let pipeline = CredentialPipeline::default();
        assert_eq!(pipeline.blocks().collect::<Vec<_>>(), vec![4, 5]);
    }

    #[rstest]
    #[case(0, vec![0, 1])]
    #[case(1, vec![1, 2])]
    #[case(8, vec![8, 9])]
    fn test_blocks_ascending(#[case] first: u8, #[case] expected: Vec<u8>) {
        let pipeline = CredentialPipeline::new(first, BlockKey::default());
        assert_eq!(pipeline.blocks().collect::<Vec<_>>(), expected);
    }
}
