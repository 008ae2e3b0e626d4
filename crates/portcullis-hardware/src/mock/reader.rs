//! Mock credential reader for testing and development.
//!
//! Credentials are scripted as [`MockCard`] values and presented through a
//! [`MockCredentialReaderHandle`]. Every device operation is recorded so tests
//! can assert exactly which blocks were touched.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};

use portcullis_core::constants::BLOCK_SIZE;
use portcullis_core::{BlockKey, CredentialId};
use tokio::sync::mpsc;

use crate::{HardwareError, Result, traits::CredentialReader};

/// A scripted credential.
///
/// Blocks that were never written read back as zeros.
///
/// # Examples
///
/// ```
/// use portcullis_core::CredentialId;
/// use portcullis_hardware::mock::MockCard;
///
/// let id = CredentialId::new(&[0xAA, 0xBB, 0xCC, 0xDD]).unwrap();
/// let card = MockCard::new(id)
///     .with_block(4, [0x11; 16])
///     .with_auth_failure(5);
/// assert_eq!(card.id(), id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCard {
    id: CredentialId,
    key: BlockKey,
    blocks: BTreeMap<u8, [u8; BLOCK_SIZE]>,
    auth_failures: BTreeSet<u8>,
    read_failures: BTreeSet<u8>,
}

impl MockCard {
    /// Create a card with the factory key and empty blocks.
    pub fn new(id: CredentialId) -> Self {
        Self {
            id,
            key: BlockKey::default(),
            blocks: BTreeMap::new(),
            auth_failures: BTreeSet::new(),
            read_failures: BTreeSet::new(),
        }
    }

    /// Set the key the card accepts for every block.
    pub fn with_key(mut self, key: BlockKey) -> Self {
        self.key = key;
        self
    }

    /// Set the content of one block.
    pub fn with_block(mut self, block: u8, data: [u8; BLOCK_SIZE]) -> Self {
        self.blocks.insert(block, data);
        self
    }

    /// Make authentication of `block` fail.
    pub fn with_auth_failure(mut self, block: u8) -> Self {
        self.auth_failures.insert(block);
        self
    }

    /// Make reading of `block` fail after a successful authentication.
    pub fn with_read_failure(mut self, block: u8) -> Self {
        self.read_failures.insert(block);
        self
    }

    pub fn id(&self) -> CredentialId {
        self.id
    }
}

/// One recorded reader operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderOp {
    Detect,
    Authenticate(u8),
    Read(u8),
}

#[derive(Debug)]
enum ReaderEvent {
    Present(MockCard),
    Empty,
}

/// Mock credential reader.
///
/// `detect` waits for the next event from the handle. When every handle has
/// been dropped the reader behaves like an empty field and waits forever.
///
/// # Examples
///
/// ```
/// use portcullis_core::{BlockKey, CredentialId};
/// use portcullis_hardware::mock::{MockCard, MockCredentialReader};
/// use portcullis_hardware::traits::CredentialReader;
///
/// #[tokio::main]
/// async fn main() -> portcullis_hardware::Result<()> {
///     let (mut reader, handle) = MockCredentialReader::new();
///     let id = CredentialId::new(&[0x01, 0x02, 0x03, 0x04]).unwrap();
///     handle.present(MockCard::new(id).with_block(4, [0x42; 16])).await?;
///
///     let detected = reader.detect().await?;
///     reader.authenticate_block(&detected, 4, &BlockKey::default()).await?;
///     assert_eq!(reader.read_block(4).await?, [0x42; 16]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCredentialReader {
    event_rx: mpsc::Receiver<ReaderEvent>,
    name: String,
    current: Option<MockCard>,
    authenticated: BTreeSet<u8>,
    ops: Arc<Mutex<Vec<ReaderOp>>>,
}

impl MockCredentialReader {
    /// Create a new mock reader with the default name.
    pub fn new() -> (Self, MockCredentialReaderHandle) {
        Self::with_name("Mock Credential Reader".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockCredentialReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let ops = Arc::new(Mutex::new(Vec::new()));

        let reader = Self {
            event_rx,
            name: name.clone(),
            current: None,
            authenticated: BTreeSet::new(),
            ops: Arc::clone(&ops),
        };

        let handle = MockCredentialReaderHandle {
            event_tx,
            name,
            ops,
        };

        (reader, handle)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn record(&self, op: ReaderOp) {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
    }

    fn card_in_field(&self) -> Result<&MockCard> {
        self.current.as_ref().ok_or(HardwareError::NoCredential)
    }
}

impl Default for MockCredentialReader {
    fn default() -> Self {
        Self::new().0
    }
}

impl CredentialReader for MockCredentialReader {
    async fn detect(&mut self) -> Result<CredentialId> {
        self.record(ReaderOp::Detect);
        self.current = None;
        self.authenticated.clear();

        let Some(event) = self.event_rx.recv().await else {
            tracing::debug!(reader = %self.name, "event channel closed, field stays empty");
            return std::future::pending().await;
        };

        match event {
            ReaderEvent::Present(card) => {
                let id = card.id;
                self.current = Some(card);
                Ok(id)
            }
            ReaderEvent::Empty => Err(HardwareError::NoCredential),
        }
    }

    async fn authenticate_block(
        &mut self,
        credential: &CredentialId,
        block: u8,
        key: &BlockKey,
    ) -> Result<()> {
        self.record(ReaderOp::Authenticate(block));
        let card = self.card_in_field()?;

        if card.id != *credential || card.key != *key || card.auth_failures.contains(&block) {
            return Err(HardwareError::authentication(block));
        }

        self.authenticated.insert(block);
        Ok(())
    }

    async fn read_block(&mut self, block: u8) -> Result<[u8; BLOCK_SIZE]> {
        self.record(ReaderOp::Read(block));
        let card = self.card_in_field()?;

        if !self.authenticated.contains(&block) {
            return Err(HardwareError::card_read(block, "block not authenticated"));
        }
        if card.read_failures.contains(&block) {
            return Err(HardwareError::card_read(block, "no response"));
        }

        Ok(card.blocks.get(&block).copied().unwrap_or([0; BLOCK_SIZE]))
    }
}

/// Handle for controlling a mock credential reader.
#[derive(Debug, Clone)]
pub struct MockCredentialReaderHandle {
    event_tx: mpsc::Sender<ReaderEvent>,
    name: String,
    ops: Arc<Mutex<Vec<ReaderOp>>>,
}

impl MockCredentialReaderHandle {
    /// Present a credential to the reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present(&self, card: MockCard) -> Result<()> {
        self.send(ReaderEvent::Present(card)).await
    }

    /// End the next read attempt without a credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn empty_read(&self) -> Result<()> {
        self.send(ReaderEvent::Empty).await
    }

    /// Operations performed by the reader so far.
    pub fn operations(&self) -> Vec<ReaderOp> {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Blocks read so far, in order.
    pub fn blocks_read(&self) -> Vec<u8> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                ReaderOp::Read(block) => Some(block),
                _ => None,
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, event: ReaderEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected(format!("{} event channel closed", self.name)))
    }
}
