//! Error types for the Aim-TTi power supply driver.

use std::io;

use thiserror::Error;

pub type Result<T, E = PsuError> = core::result::Result<T, E>;

/// Which quantity a range check was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Voltage,
    Current,
}

impl Quantity {
    pub fn unit(self) -> &'static str {
        match self {
            Quantity::Voltage => "V",
            Quantity::Current => "A",
        }
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Quantity::Voltage => f.write_str("voltage"),
            Quantity::Current => f.write_str("current"),
        }
    }
}

/// Errors raised by instrument operations.
///
/// `ChannelRange` and `ValueRange` are always raised before anything is written
/// to the transport.
#[derive(Error, Debug)]
pub enum PsuError {
    #[error("channel {channel} is out of range, this power supply has channels 1..={channels}")]
    ChannelRange { channel: u16, channels: u16 },

    #[error(
        "{quantity} {value}{unit} for channel {channel} is outside the allowed range [{min}, {max}]{unit}",
        unit = .quantity.unit()
    )]
    ValueRange {
        quantity: Quantity,
        channel: u16,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error(
        "unsupported instrument: expected brand {expected_brand:?} model {expected_model:?}, device identified as {identity:?}"
    )]
    UnsupportedDevice {
        expected_brand: String,
        expected_model: String,
        identity: String,
    },

    #[error("instrument is not connected (state: {state})")]
    NotConnected { state: &'static str },

    #[error("communication failure while sending {command:?}")]
    Communication {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse reply {reply:?} to {command:?}: {reason}")]
    Parse {
        command: String,
        reply: String,
        reason: String,
    },

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Errors raised while building a [`crate::profile::DeviceProfile`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("power supply brand can't be empty")]
    EmptyBrand,
    #[error("power supply model can't be empty")]
    EmptyModel,
    #[error("channel count {0} is not supported, expected 1..=4")]
    ChannelCount(usize),
    #[error("{quantity} range of channel {channel} is inverted: min {min} > max {max}")]
    InvertedRange {
        quantity: Quantity,
        channel: u16,
        min: f64,
        max: f64,
    },
    #[error(
        "{quantity} range [{min}, {max}] of channel {channel} exceeds the family limits [{limit_min}, {limit_max}]"
    )]
    OutsideFamily {
        quantity: Quantity,
        channel: u16,
        min: f64,
        max: f64,
        limit_min: f64,
        limit_max: f64,
    },
}
