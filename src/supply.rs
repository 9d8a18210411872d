//! Operations every supported power supply offers.
//!
//! Channels are 1-based; single-output callers pass [`DEFAULT_CHANNEL`].
//! "get" reads back a commanded setting, "measure" reads the live output.

use async_trait::async_trait;

use crate::error::Result;
use crate::profile::DeviceProfile;

pub const DEFAULT_CHANNEL: u16 = 1;

/// Outcome of [`PowerSupply::self_test`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfTest {
    /// 0 means no error was latched.
    pub fault_code: i32,
    pub message: String,
}

impl SelfTest {
    pub fn from_code(fault_code: i32) -> Self {
        let message = if fault_code == 0 {
            "No error detected."
        } else {
            "Consult the power supply manual for error code clarification."
        };
        Self {
            fault_code,
            message: message.to_string(),
        }
    }

    pub fn passed(&self) -> bool {
        self.fault_code == 0
    }
}

/// Setpoints, readings and output state of one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStatus {
    pub channel: u16,
    pub set_voltage_v: f64,
    pub set_current_a: f64,
    pub measured_voltage_v: f64,
    pub measured_current_a: f64,
    pub output_on: bool,
}

#[async_trait]
pub trait PowerSupply: Send {
    fn profile(&self) -> &DeviceProfile;

    fn channel_count(&self) -> u16 {
        self.profile().channel_count()
    }

    async fn identify(&mut self) -> Result<String>;

    /// Reset to power-on defaults. The resulting state is not verified.
    async fn reset(&mut self) -> Result<()>;

    async fn self_test(&mut self) -> Result<SelfTest>;

    async fn get_voltage(&mut self, channel: u16) -> Result<f64>;

    async fn measure_voltage(&mut self, channel: u16) -> Result<f64>;

    /// Fails with `ValueRange` when `volts` is outside the channel's limits.
    /// Nothing is read back.
    async fn set_voltage(&mut self, volts: f64, channel: u16) -> Result<()>;

    async fn get_current(&mut self, channel: u16) -> Result<f64>;

    async fn measure_current(&mut self, channel: u16) -> Result<f64>;

    /// Fails with `ValueRange` when `amps` is outside the channel's limits.
    async fn set_current(&mut self, amps: f64, channel: u16) -> Result<()>;

    async fn get_over_voltage_protection(&mut self, channel: u16) -> Result<f64>;

    /// Checked against the channel's voltage limits.
    async fn set_over_voltage_protection(&mut self, volts: f64, channel: u16) -> Result<()>;

    async fn get_over_current_protection(&mut self, channel: u16) -> Result<f64>;

    /// Checked against the channel's current limits.
    async fn set_over_current_protection(&mut self, amps: f64, channel: u16) -> Result<()>;

    async fn get_output_state(&mut self, channel: u16) -> Result<bool>;

    async fn set_output_state(&mut self, enabled: bool, channel: u16) -> Result<()>;

    async fn channel_status(&mut self, channel: u16) -> Result<ChannelStatus> {
        Ok(ChannelStatus {
            channel,
            set_voltage_v: self.get_voltage(channel).await?,
            set_current_a: self.get_current(channel).await?,
            measured_voltage_v: self.measure_voltage(channel).await?,
            measured_current_a: self.measure_current(channel).await?,
            output_on: self.get_output_state(channel).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_test_messages() {
        let ok = SelfTest::from_code(0);
        assert!(ok.passed());
        assert_eq!(ok.message, "No error detected.");

        let fault = SelfTest::from_code(117);
        assert!(!fault.passed());
        assert_eq!(fault.fault_code, 117);
        assert!(fault.message.contains("manual"));
    }
}
