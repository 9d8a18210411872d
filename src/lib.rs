//! Driver for Aim-TTi (Thurlby Thandar) programmable DC power supplies.
//!
//! Supplies are controlled through their ASCII command set (`V1 12.5`,
//! `I1O?`, `OP1 1`, ...) over any line-oriented [`transport::Transport`]; a
//! VXI-11 implementation is included for LAN-connected units.
//!
//! ```no_run
//! use tti_psu_control::{ConnectionConfig, Model, PowerSupply, TtiPsu, Vxi11Transport};
//!
//! # async fn run() -> tti_psu_control::error::Result<()> {
//! let transport = Vxi11Transport::connect(&ConnectionConfig::new("192.168.0.40"))
//!     .await
//!     .map_err(|source| tti_psu_control::PsuError::Communication {
//!         command: "<connect>".to_string(),
//!         source,
//!     })?;
//! let mut psu = TtiPsu::new(transport, Model::Pl601P.profile());
//! psu.open().await?;
//! psu.set_voltage(12.0, 1).await?;
//! psu.set_output_state(true, 1).await?;
//! println!("{} V", psu.measure_voltage(1).await?);
//! psu.close().await?; // switches every output off
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod error;
pub mod instrument;
pub mod profile;
pub mod supply;
pub mod transport;

#[cfg(test)]
mod mock_transport;

// Re-export the primary types so users can depend on the crate
// without knowing the internal module layout.
pub use error::{ProfileError, PsuError, Quantity};
pub use instrument::{CloseBehavior, ConnectionState, SharedPsu, TtiPsu};
pub use profile::{ChannelLimits, DeviceProfile, Model, Range};
pub use supply::{ChannelStatus, DEFAULT_CHANNEL, PowerSupply, SelfTest};
pub use transport::{ConnectionConfig, Transport, Vxi11Transport};
