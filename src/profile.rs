//! Device descriptions for the Aim-TTi (Thurlby Thandar) family.
//!
//! Every model is the same SCPI dialect with different limits, so a model is
//! data: a [`DeviceProfile`] handed to [`crate::instrument::TtiPsu`].

use clap::ValueEnum;

use crate::error::{ProfileError, Quantity};

/// Brand reported by `*IDN?` on Aim-TTi supplies.
pub const TTI_BRAND: &str = "THURLBY THANDAR";

/// Limits any supply of this family can be configured with.
pub const FAMILY_VOLTAGE: Range = Range { min: 0.0, max: 300.0 };
pub const FAMILY_CURRENT: Range = Range { min: 0.0, max: 100.0 };
pub const MAX_CHANNELS: usize = 4;

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn within(&self, outer: &Range) -> bool {
        self.min >= outer.min && self.max <= outer.max
    }
}

/// Programmable limits of one output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelLimits {
    pub voltage: Range,
    pub current: Range,
}

impl ChannelLimits {
    pub const fn new(voltage: Range, current: Range) -> Self {
        Self { voltage, current }
    }

    /// Outputs that program from zero up to `max_volts` / `max_amps`.
    pub const fn up_to(max_volts: f64, max_amps: f64) -> Self {
        Self {
            voltage: Range::new(0.0, max_volts),
            current: Range::new(0.0, max_amps),
        }
    }

    pub fn range(&self, quantity: Quantity) -> Range {
        match quantity {
            Quantity::Voltage => self.voltage,
            Quantity::Current => self.current,
        }
    }
}

/// Immutable description of a supply: identity strings plus per-channel limits.
///
/// Validated once in [`DeviceProfile::new`]; there is no way to mutate it
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    brand: String,
    model: String,
    channels: Vec<ChannelLimits>,
}

impl DeviceProfile {
    pub fn new(
        brand: impl Into<String>,
        model: impl Into<String>,
        channels: Vec<ChannelLimits>,
    ) -> Result<Self, ProfileError> {
        let brand = brand.into();
        let model = model.into();

        if brand.trim().is_empty() {
            return Err(ProfileError::EmptyBrand);
        }
        if model.trim().is_empty() {
            return Err(ProfileError::EmptyModel);
        }
        if channels.is_empty() || channels.len() > MAX_CHANNELS {
            return Err(ProfileError::ChannelCount(channels.len()));
        }

        for (idx, limits) in channels.iter().enumerate() {
            let channel = idx as u16 + 1;
            for (quantity, family) in [
                (Quantity::Voltage, FAMILY_VOLTAGE),
                (Quantity::Current, FAMILY_CURRENT),
            ] {
                let range = limits.range(quantity);
                // `!(a <= b)` also rejects NaN bounds.
                if !(range.min <= range.max) {
                    return Err(ProfileError::InvertedRange {
                        quantity,
                        channel,
                        min: range.min,
                        max: range.max,
                    });
                }
                if !range.within(&family) {
                    return Err(ProfileError::OutsideFamily {
                        quantity,
                        channel,
                        min: range.min,
                        max: range.max,
                        limit_min: family.min,
                        limit_max: family.max,
                    });
                }
            }
        }

        Ok(Self {
            brand,
            model,
            channels,
        })
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Limits for a 1-based channel, `None` when the channel does not exist.
    pub fn limits(&self, channel: u16) -> Option<&ChannelLimits> {
        let idx = usize::from(channel).checked_sub(1)?;
        self.channels.get(idx)
    }

    pub fn channels(&self) -> &[ChannelLimits] {
        &self.channels
    }

    pub fn min_voltage(&self) -> Vec<f64> {
        self.channels.iter().map(|c| c.voltage.min).collect()
    }

    pub fn max_voltage(&self) -> Vec<f64> {
        self.channels.iter().map(|c| c.voltage.max).collect()
    }

    pub fn min_current(&self) -> Vec<f64> {
        self.channels.iter().map(|c| c.current.min).collect()
    }

    pub fn max_current(&self) -> Vec<f64> {
        self.channels.iter().map(|c| c.current.max).collect()
    }

    /// Whether an `*IDN?` reply belongs to this profile.
    ///
    /// Matching is case-insensitive. A reply is only rejected when it mentions
    /// neither the brand nor the model, so a misspelt brand still accepts the
    /// right model.
    pub fn matches_identity(&self, identity: &str) -> bool {
        let identity = identity.to_lowercase();
        identity.contains(&self.brand.to_lowercase())
            || identity.contains(&self.model.to_lowercase())
    }
}

/// Supported Aim-TTi models.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Model {
    #[value(name = "pl068-p")]
    Pl068P,
    #[value(name = "pl155-p")]
    Pl155P,
    #[value(name = "pl303-p")]
    Pl303P,
    #[value(name = "pl601-p")]
    Pl601P,
    #[value(name = "pl303qmd-p")]
    Pl303QmdP,
    #[value(name = "cpx400dp")]
    Cpx400Dp,
}

impl Model {
    pub fn name(self) -> &'static str {
        match self {
            Model::Pl068P => "PL068-P",
            Model::Pl155P => "PL155-P",
            Model::Pl303P => "PL303-P",
            Model::Pl601P => "PL601-P",
            Model::Pl303QmdP => "PL303QMD-P",
            Model::Cpx400Dp => "CPX400DP",
        }
    }

    fn channel_limits(self) -> Vec<ChannelLimits> {
        match self {
            Model::Pl068P => vec![ChannelLimits::up_to(6.0, 8.0)],
            Model::Pl155P => vec![ChannelLimits::up_to(15.0, 5.0)],
            Model::Pl303P => vec![ChannelLimits::up_to(30.0, 3.0)],
            Model::Pl601P => vec![ChannelLimits::up_to(60.0, 1.5)],
            Model::Pl303QmdP => vec![ChannelLimits::up_to(30.0, 3.0); 2],
            Model::Cpx400Dp => vec![ChannelLimits::up_to(60.0, 20.0); 2],
        }
    }

    pub fn profile(self) -> DeviceProfile {
        DeviceProfile {
            brand: TTI_BRAND.to_string(),
            model: self.name().to_string(),
            channels: self.channel_limits(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_models_pass_validation() {
        for model in Model::value_variants() {
            let profile = model.profile();
            let rebuilt = DeviceProfile::new(
                profile.brand(),
                profile.model(),
                profile.channels().to_vec(),
            );
            assert_eq!(rebuilt, Ok(profile));
        }
    }

    #[test]
    fn pl601p_limits() {
        let profile = Model::Pl601P.profile();
        assert_eq!(profile.channel_count(), 1);
        assert_eq!(profile.max_voltage(), vec![60.0]);
        assert_eq!(profile.max_current(), vec![1.5]);
        assert_eq!(profile.min_voltage(), vec![0.0]);
        assert!(profile.limits(0).is_none());
        assert!(profile.limits(2).is_none());
    }

    #[test]
    fn rejects_bad_channel_counts() {
        assert_eq!(
            DeviceProfile::new("TTi", "X", vec![]),
            Err(ProfileError::ChannelCount(0))
        );
        assert_eq!(
            DeviceProfile::new("TTi", "X", vec![ChannelLimits::up_to(1.0, 1.0); 5]),
            Err(ProfileError::ChannelCount(5))
        );
    }

    #[test]
    fn rejects_empty_identity() {
        let limits = vec![ChannelLimits::up_to(1.0, 1.0)];
        assert_eq!(
            DeviceProfile::new(" ", "X", limits.clone()),
            Err(ProfileError::EmptyBrand)
        );
        assert_eq!(
            DeviceProfile::new("TTi", "", limits),
            Err(ProfileError::EmptyModel)
        );
    }

    #[test]
    fn rejects_inverted_and_out_of_family_ranges() {
        let inverted = ChannelLimits::new(Range::new(10.0, 5.0), Range::new(0.0, 1.0));
        assert!(matches!(
            DeviceProfile::new("TTi", "X", vec![inverted]),
            Err(ProfileError::InvertedRange {
                quantity: Quantity::Voltage,
                channel: 1,
                ..
            })
        ));

        let too_much_current = ChannelLimits::up_to(30.0, 120.0);
        assert!(matches!(
            DeviceProfile::new(
                "TTi",
                "X",
                vec![ChannelLimits::up_to(30.0, 3.0), too_much_current]
            ),
            Err(ProfileError::OutsideFamily {
                quantity: Quantity::Current,
                channel: 2,
                ..
            })
        ));

        let negative = ChannelLimits::new(Range::new(-1.0, 5.0), Range::new(0.0, 1.0));
        assert!(DeviceProfile::new("TTi", "X", vec![negative]).is_err());
    }

    #[test]
    fn identity_matching_is_case_insensitive() {
        let profile =
            DeviceProfile::new("Thurbly Thandar", "PL601-P", vec![ChannelLimits::up_to(60.0, 1.5)])
                .unwrap();
        assert!(profile.matches_identity("THURLBY THANDAR,PL601-P,0,1.10-1.00-1.00"));
        assert!(profile.matches_identity("thurbly thandar,other,0"));
        assert!(!profile.matches_identity("OTHERBRAND,X100"));
    }

    #[test]
    fn range_rejects_nan() {
        assert!(!Range::new(0.0, 1.0).contains(f64::NAN));
        assert!(Range::new(0.0, 1.0).contains(1.0));
        assert!(Range::new(0.0, 1.0).contains(0.0));
    }
}
