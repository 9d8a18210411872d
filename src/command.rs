//! The Aim-TTi command set and the parsers for its replies.
//!
//! Commands render to their exact wire text through `Display` (without the
//! line terminator, which the transport appends). Numbers use Rust's default
//! `f64` formatting: `.` as decimal point, no exponent, no grouping, and the
//! shortest text that parses back to the same value.

use core::fmt;

/// One outbound line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Identify,
    Reset,
    ExecutionErrorRegister,
    /// `V<ch>?`, reply `V<ch> <value>`.
    VoltageSetpoint(u16),
    /// `V<ch>O?`, reply `<value>V`.
    MeasureVoltage(u16),
    SetVoltage(u16, f64),
    /// `I<ch>?`, reply `I<ch> <value>`.
    CurrentSetpoint(u16),
    /// `I<ch>O?`, reply `<value>A`.
    MeasureCurrent(u16),
    SetCurrent(u16, f64),
    OverVoltage(u16),
    SetOverVoltage(u16, f64),
    OverCurrent(u16),
    SetOverCurrent(u16, f64),
    /// `OP<ch>?`, reply `1` or `0`.
    OutputState(u16),
    SetOutputState(u16, bool),
    AllOutputsOff,
}

impl Command {
    /// Whether the instrument answers this command with a line.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Command::Identify
                | Command::ExecutionErrorRegister
                | Command::VoltageSetpoint(_)
                | Command::MeasureVoltage(_)
                | Command::CurrentSetpoint(_)
                | Command::MeasureCurrent(_)
                | Command::OverVoltage(_)
                | Command::OverCurrent(_)
                | Command::OutputState(_)
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Command::Identify => f.write_str("*IDN?"),
            Command::Reset => f.write_str("*RST"),
            Command::ExecutionErrorRegister => f.write_str("EER?"),
            Command::VoltageSetpoint(ch) => write!(f, "V{ch}?"),
            Command::MeasureVoltage(ch) => write!(f, "V{ch}O?"),
            Command::SetVoltage(ch, volts) => write!(f, "V{ch} {volts}"),
            Command::CurrentSetpoint(ch) => write!(f, "I{ch}?"),
            Command::MeasureCurrent(ch) => write!(f, "I{ch}O?"),
            Command::SetCurrent(ch, amps) => write!(f, "I{ch} {amps}"),
            Command::OverVoltage(ch) => write!(f, "OVP{ch}?"),
            Command::SetOverVoltage(ch, volts) => write!(f, "OVP{ch} {volts}"),
            Command::OverCurrent(ch) => write!(f, "OCP{ch}?"),
            Command::SetOverCurrent(ch, amps) => write!(f, "OCP{ch} {amps}"),
            Command::OutputState(ch) => write!(f, "OP{ch}?"),
            Command::SetOutputState(ch, on) => write!(f, "OP{ch} {}", u8::from(on)),
            Command::AllOutputsOff => f.write_str("OPALL0"),
        }
    }
}

/// Why a reply could not be turned into a value. The adapter attaches the
/// command and raw reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyError(pub String);

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse replies shaped `<prefix> <value>`, e.g. `V1 10.000` or `VP1 10.000`.
///
/// Everything up to and including the first space is dropped. A reply
/// without a space is parsed whole.
pub fn parse_prefixed(reply: &str) -> Result<f64, ReplyError> {
    let value = reply.split_once(' ').map_or(reply, |(_, value)| value);
    parse_f64(value)
}

/// Parse measurement replies shaped `<value><unit>`, e.g. `10.123V`.
pub fn parse_unit_suffixed(reply: &str) -> Result<f64, ReplyError> {
    let mut chars = reply.chars();
    if chars.next_back().is_none() {
        return Err(ReplyError("empty reply".to_string()));
    }
    parse_f64(chars.as_str())
}

/// Output state replies are exactly `1` or `0`.
pub fn parse_output_state(reply: &str) -> Result<bool, ReplyError> {
    match reply {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(ReplyError(format!("expected \"1\" or \"0\", got {other:?}"))),
    }
}

pub fn parse_register(reply: &str) -> Result<i32, ReplyError> {
    reply
        .trim()
        .parse::<i32>()
        .map_err(|e| ReplyError(format!("not an integer: {e}")))
}

fn parse_f64(input: &str) -> Result<f64, ReplyError> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|e| ReplyError(format!("not a number: {input:?}: {e}")))
}
