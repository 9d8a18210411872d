use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::command::{self, Command, ReplyError};
use crate::error::{PsuError, Quantity, Result};
use crate::profile::{ChannelLimits, DeviceProfile};
use crate::supply::{PowerSupply, SelfTest};
use crate::transport::Transport;

/// An instrument shared between tasks. The transport is not reentrant, so
/// every operation holds the lock for its whole round trip.
pub type SharedPsu<T> = Arc<Mutex<TtiPsu<T>>>;

/// Lifecycle of a [`TtiPsu`]. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unopened,
    Open,
    Closed,
}

impl ConnectionState {
    fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Unopened => "unopened",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        }
    }
}

/// What happens to the outputs when the connection closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CloseBehavior {
    /// Send `OPALL0` so no output is left energised.
    #[default]
    SwitchOff,
    /// Leave every output as it is.
    PreserveOutput,
}

/// SCPI driver for Aim-TTi supplies.
///
/// One driver serves every model; the [`DeviceProfile`] supplies the channel
/// count and limits. Setters validate the channel and value before anything is
/// written, so a rejected request never reaches the instrument.
pub struct TtiPsu<T: Transport> {
    transport: T,
    profile: DeviceProfile,
    state: ConnectionState,
    identity: Option<String>,
}

impl<T: Transport> TtiPsu<T> {
    pub fn new(transport: T, profile: DeviceProfile) -> Self {
        Self {
            transport,
            profile,
            state: ConnectionState::Unopened,
            identity: None,
        }
    }

    /// Verify the attached device and start accepting operations.
    ///
    /// The `*IDN?` reply must mention the profile's brand or model. On a
    /// mismatch the instrument stays unopened.
    pub async fn open(&mut self) -> Result<()> {
        if self.state != ConnectionState::Unopened {
            return Err(PsuError::NotConnected {
                state: self.state.as_str(),
            });
        }

        let identity = self.query(Command::Identify).await?;
        if !self.profile.matches_identity(&identity) {
            error!("this driver does not support the connected instrument");
            error!(
                "expected instrument brand {}, model {}",
                self.profile.brand(),
                self.profile.model()
            );
            error!("connected instrument identification is: {identity}");
            return Err(PsuError::UnsupportedDevice {
                expected_brand: self.profile.brand().to_string(),
                expected_model: self.profile.model().to_string(),
                identity,
            });
        }

        info!("opened {} {}: {identity}", self.profile.brand(), self.profile.model());
        self.identity = Some(identity);
        self.state = ConnectionState::Open;
        Ok(())
    }

    /// Close, switching every output off first.
    pub async fn close(&mut self) -> Result<()> {
        self.close_with(CloseBehavior::default()).await
    }

    /// Close the connection. The transport is released and the instrument
    /// becomes `Closed` even if switching the outputs off failed; that error
    /// is still returned.
    pub async fn close_with(&mut self, behavior: CloseBehavior) -> Result<()> {
        self.ensure_open()?;

        let switched_off = match behavior {
            CloseBehavior::SwitchOff => self.write(Command::AllOutputsOff).await,
            CloseBehavior::PreserveOutput => {
                warn!(
                    "closing {} with outputs left in their last state",
                    self.profile.model()
                );
                Ok(())
            }
        };

        let released = self.transport.close().await.map_err(|source| PsuError::Communication {
            command: "<close>".to_string(),
            source,
        });
        self.state = ConnectionState::Closed;
        info!("closed {}", self.profile.model());

        switched_off.and(released)
    }

    /// Switch every output off at once.
    pub async fn all_outputs_off(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.write(Command::AllOutputsOff).await
    }

    /// Raw Execution Error Register. Reading it clears it on the instrument.
    pub async fn execution_error_register(&mut self) -> Result<i32> {
        self.ensure_open()?;
        self.query_with(Command::ExecutionErrorRegister, command::parse_register)
            .await
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The `*IDN?` reply accepted by [`Self::open`].
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_shared(self) -> SharedPsu<T> {
        Arc::new(Mutex::new(self))
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            ConnectionState::Open => Ok(()),
            state => Err(PsuError::NotConnected {
                state: state.as_str(),
            }),
        }
    }

    fn channel_limits(&self, channel: u16) -> Result<&ChannelLimits> {
        self.ensure_open()?;
        self.profile
            .limits(channel)
            .ok_or(PsuError::ChannelRange {
                channel,
                channels: self.profile.channel_count(),
            })
    }

    fn check_setting(&self, quantity: Quantity, value: f64, channel: u16) -> Result<()> {
        let range = self.channel_limits(channel)?.range(quantity);
        if range.contains(value) {
            Ok(())
        } else {
            Err(PsuError::ValueRange {
                quantity,
                channel,
                value,
                min: range.min,
                max: range.max,
            })
        }
    }

    async fn write(&mut self, command: Command) -> Result<()> {
        let line = command.to_string();
        debug!("SCPI write  -> {line}");
        self.transport
            .send_line(&line)
            .await
            .map_err(|source| PsuError::Communication {
                command: line,
                source,
            })
    }

    async fn query(&mut self, command: Command) -> Result<String> {
        self.write(command).await?;
        let reply = self
            .transport
            .read_line()
            .await
            .map_err(|source| PsuError::Communication {
                command: command.to_string(),
                source,
            })?;

        debug!("SCPI result <- {reply}");

        if reply.is_empty() {
            return Err(PsuError::Parse {
                command: command.to_string(),
                reply,
                reason: "empty response from device".to_string(),
            });
        }

        Ok(reply)
    }

    async fn query_with<V>(
        &mut self,
        command: Command,
        parse: fn(&str) -> core::result::Result<V, ReplyError>,
    ) -> Result<V> {
        let reply = self.query(command).await?;
        parse(&reply).map_err(|ReplyError(reason)| PsuError::Parse {
            command: command.to_string(),
            reply,
            reason,
        })
    }
}

impl<T: Transport> Drop for TtiPsu<T> {
    fn drop(&mut self) {
        if self.state == ConnectionState::Open {
            warn!(
                "{} dropped while open, outputs were not switched off",
                self.profile.model()
            );
        }
    }
}

#[async_trait]
impl<T: Transport> PowerSupply for TtiPsu<T> {
    fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    async fn identify(&mut self) -> Result<String> {
        self.ensure_open()?;
        self.query(Command::Identify).await
    }

    async fn reset(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.write(Command::Reset).await
    }

    /// Aim-TTi supplies have no self test; the Execution Error Register is
    /// read instead.
    async fn self_test(&mut self) -> Result<SelfTest> {
        let code = self.execution_error_register().await?;
        Ok(SelfTest::from_code(code))
    }

    async fn get_voltage(&mut self, channel: u16) -> Result<f64> {
        self.channel_limits(channel)?;
        self.query_with(Command::VoltageSetpoint(channel), command::parse_prefixed)
            .await
    }

    async fn measure_voltage(&mut self, channel: u16) -> Result<f64> {
        self.channel_limits(channel)?;
        self.query_with(Command::MeasureVoltage(channel), command::parse_unit_suffixed)
            .await
    }

    async fn set_voltage(&mut self, volts: f64, channel: u16) -> Result<()> {
        self.check_setting(Quantity::Voltage, volts, channel)?;
        self.write(Command::SetVoltage(channel, volts)).await
    }

    async fn get_current(&mut self, channel: u16) -> Result<f64> {
        self.channel_limits(channel)?;
        self.query_with(Command::CurrentSetpoint(channel), command::parse_prefixed)
            .await
    }

    async fn measure_current(&mut self, channel: u16) -> Result<f64> {
        self.channel_limits(channel)?;
        self.query_with(Command::MeasureCurrent(channel), command::parse_unit_suffixed)
            .await
    }

    async fn set_current(&mut self, amps: f64, channel: u16) -> Result<()> {
        self.check_setting(Quantity::Current, amps, channel)?;
        self.write(Command::SetCurrent(channel, amps)).await
    }

    async fn get_over_voltage_protection(&mut self, channel: u16) -> Result<f64> {
        self.channel_limits(channel)?;
        self.query_with(Command::OverVoltage(channel), command::parse_prefixed)
            .await
    }

    async fn set_over_voltage_protection(&mut self, volts: f64, channel: u16) -> Result<()> {
        self.check_setting(Quantity::Voltage, volts, channel)?;
        self.write(Command::SetOverVoltage(channel, volts)).await
    }

    async fn get_over_current_protection(&mut self, channel: u16) -> Result<f64> {
        self.channel_limits(channel)?;
        self.query_with(Command::OverCurrent(channel), command::parse_prefixed)
            .await
    }

    async fn set_over_current_protection(&mut self, amps: f64, channel: u16) -> Result<()> {
        self.check_setting(Quantity::Current, amps, channel)?;
        self.write(Command::SetOverCurrent(channel, amps)).await
    }

    async fn get_output_state(&mut self, channel: u16) -> Result<bool> {
        self.channel_limits(channel)?;
        self.query_with(Command::OutputState(channel), command::parse_output_state)
            .await
    }

    async fn set_output_state(&mut self, enabled: bool, channel: u16) -> Result<()> {
        self.channel_limits(channel)?;
        self.write(Command::SetOutputState(channel, enabled)).await
    }
}
