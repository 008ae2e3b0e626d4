//! Console stand-ins for the terminal peripherals.
//!
//! Credentials are typed on standard input, one per line:
//!
//! ```text
//! aabbccdd                       credential with an all-zero record
//! aabbccdd 00112233...           credential with a 32-byte record
//!                                empty line: a read with nothing in the field
//! ```
//!
//! The indicator is rendered as log lines.

use anyhow::{Context, Result, bail};
use portcullis_core::constants::{BLOCK_SIZE, PAYLOAD_LEN};
use portcullis_core::{BlockKey, CredentialId};
use portcullis_hardware::mock::{MockCard, MockCredentialReaderHandle};
use portcullis_hardware::{Indicator, IndicatorState};
use portcullis_rfid::CredentialPipeline;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Indicator that logs every state change.
#[derive(Debug, Default)]
pub struct ConsoleIndicator;

impl Indicator for ConsoleIndicator {
    async fn set(&mut self, state: IndicatorState) -> portcullis_hardware::Result<()> {
        let (green, red) = state.pin_levels();
        info!(%state, green, red, "Indicator");
        Ok(())
    }
}

/// Card layout shared by every credential typed on the console.
#[derive(Debug, Clone, Copy)]
pub struct CardLayout {
    pub first_block: u8,
    pub block_key: BlockKey,
}

impl CardLayout {
    /// Parse one console line. `None` stands for an empty read.
    pub fn parse_line(&self, line: &str) -> Result<Option<MockCard>> {
        let mut fields = line.split_whitespace();
        let Some(id) = fields.next() else {
            return Ok(None);
        };

        let id: CredentialId = id.parse().context("invalid credential identifier")?;
        let payload = match fields.next() {
            Some(data) => decode_payload(data)?,
            None => [0; PAYLOAD_LEN],
        };
        if fields.next().is_some() {
            bail!("expected `<credential-id> [record]`");
        }

        let card = payload
            .chunks_exact(BLOCK_SIZE)
            .zip(CredentialPipeline::new(self.first_block, self.block_key).blocks())
            .fold(MockCard::new(id).with_key(self.block_key), |card, (chunk, block)| {
                let mut data = [0; BLOCK_SIZE];
                data.copy_from_slice(chunk);
                card.with_block(block, data)
            });
        Ok(Some(card))
    }
}

fn decode_payload(data: &str) -> Result<[u8; PAYLOAD_LEN]> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    let bytes = hex::decode(digits).context("record is not valid hex")?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| anyhow::anyhow!("record must be {PAYLOAD_LEN} bytes, got {}", bytes.len()))
}

/// Present every credential typed on standard input until it closes.
pub async fn feed_credentials(reader: MockCredentialReaderHandle, layout: CardLayout) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Console input failed");
                break;
            }
        };

        let presented = match layout.parse_line(&line) {
            Ok(Some(card)) => {
                info!(credential_id = %card.id(), "Presenting credential");
                reader.present(card).await
            }
            Ok(None) => reader.empty_read().await,
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(error = %reason, "Ignoring console line");
                continue;
            }
        };
        if presented.is_err() {
            break;
        }
    }
    info!("Console input closed");
}
