//! Shared harness for terminal integration tests.

#![allow(dead_code)]

use std::time::Duration;

use portcullis_core::{CredentialId, Identity, ReaderId};
use portcullis_hardware::mock::{
    MockCard, MockCredentialReader, MockCredentialReaderHandle, MockIndicator,
    MockIndicatorHandle, MockPowerSensor, MockPowerSensorHandle,
};
use portcullis_hardware::{IndicatorState, PowerReading};
use portcullis_network::mock::{MockTransport, MockTransportHandle};
use portcullis_terminal::{Peripherals, Terminal, TerminalConfig, TerminalHandle};

pub const SEED: &[u8] = b"integration seed";

/// Battery reading below the default critical threshold, on battery.
pub const CRITICAL_READING: PowerReading = PowerReading {
    externally_powered: false,
    battery_mv: 3_200,
};

/// Credential `0xAABBCCDD`.
pub fn credential_id() -> CredentialId {
    CredentialId::new(&[0xAA, 0xBB, 0xCC, 0xDD]).unwrap()
}

pub fn card() -> MockCard {
    MockCard::new(credential_id())
        .with_block(4, [0x11; 16])
        .with_block(5, [0x22; 16])
}

pub fn identity() -> Identity {
    Identity::derive(ReaderId::default(), SEED).unwrap()
}

/// Defaults with liveness pushed out of the way.
pub fn config() -> TerminalConfig {
    TerminalConfig {
        liveness_interval_ms: 3_600_000,
        ..Default::default()
    }
}

pub struct Harness {
    pub reader: MockCredentialReaderHandle,
    pub indicator: MockIndicatorHandle,
    pub power: MockPowerSensorHandle,
    pub transport: MockTransportHandle,
    pub terminal: TerminalHandle,
}

impl Harness {
    /// Start a terminal on mock peripherals. The boot blink is cleared from
    /// the indicator history.
    pub async fn start(config: TerminalConfig) -> Self {
        let (reader, reader_handle) = MockCredentialReader::new();
        let (indicator, indicator_handle) = MockIndicator::new();
        let (power, power_handle) = MockPowerSensor::new();
        let (transport, transport_handle) = MockTransport::new();

        let terminal = Terminal::new(
            identity(),
            config,
            Peripherals {
                reader,
                indicator,
                power,
            },
            transport,
        )
        .start()
        .await
        .unwrap();
        indicator_handle.clear();

        Self {
            reader: reader_handle,
            indicator: indicator_handle,
            power: power_handle,
            transport: transport_handle,
            terminal,
        }
    }

    pub async fn present(&self, card: MockCard) {
        self.reader.present(card).await.unwrap();
    }

    pub fn states(&self) -> Vec<IndicatorState> {
        self.indicator.states()
    }

    /// Offsets of each indicator change from the first one.
    pub fn offsets(&self) -> Vec<Duration> {
        let history = self.indicator.history();
        let Some(first) = history.first() else {
            return Vec::new();
        };
        history.iter().map(|change| change.at - first.at).collect()
    }
}

pub async fn settle(duration_ms: u64) {
    tokio::time::sleep(Duration::from_millis(duration_ms)).await;
}
