//! Measurement families, units, unit groups, and conversion arithmetic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Physical quantity measured by a conversion challenge.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum MeasurementFamily {
    /// Distances, from millimeters to kilometers.
    Length,
    /// Masses, from milligrams to tonnes.
    Weight,
    /// Durations, from seconds to weeks.
    Time,
    /// Volumes of liquid, from milliliters to gallons.
    Capacity,
}

impl MeasurementFamily {
    /// Every family in display order.
    pub const ALL: [MeasurementFamily; 4] = [
        MeasurementFamily::Length,
        MeasurementFamily::Weight,
        MeasurementFamily::Time,
        MeasurementFamily::Capacity,
    ];

    /// Returns the family's fixed, ordered unit roster.
    #[must_use]
    pub const fn units(self) -> &'static [Unit] {
        match self {
            MeasurementFamily::Length => &LENGTH_UNITS,
            MeasurementFamily::Weight => &WEIGHT_UNITS,
            MeasurementFamily::Time => &TIME_UNITS,
            MeasurementFamily::Capacity => &CAPACITY_UNITS,
        }
    }

    /// Returns the family's unit groups in unlock order.
    #[must_use]
    pub const fn groups(self) -> &'static [UnitGroup] {
        match self {
            MeasurementFamily::Length => &[UnitGroup::LengthImperial, UnitGroup::LengthMetric],
            MeasurementFamily::Weight => &[UnitGroup::WeightImperial, UnitGroup::WeightMetric],
            MeasurementFamily::Time => &[UnitGroup::TimeClock, UnitGroup::TimeCalendar],
            MeasurementFamily::Capacity => {
                &[UnitGroup::CapacityImperial, UnitGroup::CapacityMetric]
            }
        }
    }

    /// Returns the lowercase label used by hosts and config files.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            MeasurementFamily::Length => "length",
            MeasurementFamily::Weight => "weight",
            MeasurementFamily::Time => "time",
            MeasurementFamily::Capacity => "capacity",
        }
    }
}

const LENGTH_UNITS: [Unit; 8] = [
    Unit::Inch,
    Unit::Foot,
    Unit::Yard,
    Unit::Millimeter,
    Unit::Centimeter,
    Unit::Decimeter,
    Unit::Meter,
    Unit::Kilometer,
];

const WEIGHT_UNITS: [Unit; 6] = [
    Unit::Ounce,
    Unit::Pound,
    Unit::Milligram,
    Unit::Gram,
    Unit::Kilogram,
    Unit::Tonne,
];

const TIME_UNITS: [Unit; 5] = [
    Unit::Second,
    Unit::Minute,
    Unit::Hour,
    Unit::Day,
    Unit::Week,
];

const CAPACITY_UNITS: [Unit; 7] = [
    Unit::FluidOunce,
    Unit::Pint,
    Unit::Gallon,
    Unit::Milliliter,
    Unit::Centiliter,
    Unit::Deciliter,
    Unit::Liter,
];

/// Measurement unit. Every unit belongs to exactly one family.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Imperial inch, 25.4 mm.
    Inch,
    /// Imperial foot, 12 inches.
    Foot,
    /// Imperial yard, 3 feet.
    Yard,
    /// One thousandth of a meter.
    Millimeter,
    /// One hundredth of a meter.
    Centimeter,
    /// One tenth of a meter.
    Decimeter,
    /// SI base length.
    Meter,
    /// One thousand meters.
    Kilometer,
    /// Avoirdupois ounce, one sixteenth of a pound.
    Ounce,
    /// Avoirdupois pound, 453.59237 g.
    Pound,
    /// One thousandth of a gram.
    Milligram,
    /// Base mass for the weight family.
    Gram,
    /// One thousand grams.
    Kilogram,
    /// Metric tonne, one million grams.
    Tonne,
    /// SI base duration.
    Second,
    /// Sixty seconds.
    Minute,
    /// Sixty minutes.
    Hour,
    /// Twenty-four hours.
    Day,
    /// Seven days.
    Week,
    /// US fluid ounce, 1/128 gallon.
    FluidOunce,
    /// US pint, 16 fluid ounces.
    Pint,
    /// US gallon, 3.785411784 L.
    Gallon,
    /// One thousandth of a liter.
    Milliliter,
    /// One hundredth of a liter.
    Centiliter,
    /// One tenth of a liter.
    Deciliter,
    /// Base volume for the capacity family.
    Liter,
}

impl Unit {
    /// Returns the family that owns this unit.
    #[must_use]
    pub const fn family(self) -> MeasurementFamily {
        match self {
            Unit::Inch
            | Unit::Foot
            | Unit::Yard
            | Unit::Millimeter
            | Unit::Centimeter
            | Unit::Decimeter
            | Unit::Meter
            | Unit::Kilometer => MeasurementFamily::Length,
            Unit::Ounce
            | Unit::Pound
            | Unit::Milligram
            | Unit::Gram
            | Unit::Kilogram
            | Unit::Tonne => MeasurementFamily::Weight,
            Unit::Second | Unit::Minute | Unit::Hour | Unit::Day | Unit::Week => {
                MeasurementFamily::Time
            }
            Unit::FluidOunce
            | Unit::Pint
            | Unit::Gallon
            | Unit::Milliliter
            | Unit::Centiliter
            | Unit::Deciliter
            | Unit::Liter => MeasurementFamily::Capacity,
        }
    }

    /// Returns the short display symbol shown in question text.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Unit::Inch => "in",
            Unit::Foot => "ft",
            Unit::Yard => "yd",
            Unit::Millimeter => "mm",
            Unit::Centimeter => "cm",
            Unit::Decimeter => "dm",
            Unit::Meter => "m",
            Unit::Kilometer => "km",
            Unit::Ounce => "oz",
            Unit::Pound => "lb",
            Unit::Milligram => "mg",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Tonne => "t",
            Unit::Second => "s",
            Unit::Minute => "min",
            Unit::Hour => "h",
            Unit::Day => "d",
            Unit::Week => "wk",
            Unit::FluidOunce => "fl oz",
            Unit::Pint => "pt",
            Unit::Gallon => "gal",
            Unit::Milliliter => "ml",
            Unit::Centiliter => "cl",
            Unit::Deciliter => "dl",
            Unit::Liter => "l",
        }
    }

    /// Returns the full lowercase unit name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Unit::Inch => "inch",
            Unit::Foot => "foot",
            Unit::Yard => "yard",
            Unit::Millimeter => "millimeter",
            Unit::Centimeter => "centimeter",
            Unit::Decimeter => "decimeter",
            Unit::Meter => "meter",
            Unit::Kilometer => "kilometer",
            Unit::Ounce => "ounce",
            Unit::Pound => "pound",
            Unit::Milligram => "milligram",
            Unit::Gram => "gram",
            Unit::Kilogram => "kilogram",
            Unit::Tonne => "tonne",
            Unit::Second => "second",
            Unit::Minute => "minute",
            Unit::Hour => "hour",
            Unit::Day => "day",
            Unit::Week => "week",
            Unit::FluidOunce => "fluid ounce",
            Unit::Pint => "pint",
            Unit::Gallon => "gallon",
            Unit::Milliliter => "milliliter",
            Unit::Centiliter => "centiliter",
            Unit::Deciliter => "deciliter",
            Unit::Liter => "liter",
        }
    }

    /// Size of one of this unit expressed in the family base unit
    /// (meter, gram, second, or liter).
    const fn base_factor(self) -> f64 {
        match self {
            Unit::Inch => 0.0254,
            Unit::Foot => 0.3048,
            Unit::Yard => 0.9144,
            Unit::Millimeter => 0.001,
            Unit::Centimeter => 0.01,
            Unit::Decimeter => 0.1,
            Unit::Meter => 1.0,
            Unit::Kilometer => 1000.0,
            Unit::Ounce => 28.349_523_125,
            Unit::Pound => 453.592_37,
            Unit::Milligram => 0.001,
            Unit::Gram => 1.0,
            Unit::Kilogram => 1000.0,
            Unit::Tonne => 1_000_000.0,
            Unit::Second => 1.0,
            Unit::Minute => 60.0,
            Unit::Hour => 3600.0,
            Unit::Day => 86_400.0,
            Unit::Week => 604_800.0,
            Unit::FluidOunce => 0.029_573_529_562_5,
            Unit::Pint => 0.473_176_473,
            Unit::Gallon => 3.785_411_784,
            Unit::Milliliter => 0.001,
            Unit::Centiliter => 0.01,
            Unit::Deciliter => 0.1,
            Unit::Liter => 1.0,
        }
    }
}

/// Named subset of a family's units used for grouping and unlock gating.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum UnitGroup {
    /// Inch, foot, and yard.
    LengthImperial,
    /// Millimeter through kilometer.
    LengthMetric,
    /// Ounce and pound.
    WeightImperial,
    /// Milligram through tonne.
    WeightMetric,
    /// Second, minute, and hour.
    TimeClock,
    /// Day and week.
    TimeCalendar,
    /// Fluid ounce, pint, and gallon.
    CapacityImperial,
    /// Milliliter through liter.
    CapacityMetric,
}

impl UnitGroup {
    /// Returns the family the group belongs to.
    #[must_use]
    pub const fn family(self) -> MeasurementFamily {
        match self {
            UnitGroup::LengthImperial | UnitGroup::LengthMetric => MeasurementFamily::Length,
            UnitGroup::WeightImperial | UnitGroup::WeightMetric => MeasurementFamily::Weight,
            UnitGroup::TimeClock | UnitGroup::TimeCalendar => MeasurementFamily::Time,
            UnitGroup::CapacityImperial | UnitGroup::CapacityMetric => MeasurementFamily::Capacity,
        }
    }

    /// Returns the display label used by hosts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            UnitGroup::LengthImperial => "Length (Imperial)",
            UnitGroup::LengthMetric => "Length (Metric)",
            UnitGroup::WeightImperial => "Weight (Imperial)",
            UnitGroup::WeightMetric => "Weight (Metric)",
            UnitGroup::TimeClock => "Time (Clock)",
            UnitGroup::TimeCalendar => "Time (Calendar)",
            UnitGroup::CapacityImperial => "Capacity (Imperial)",
            UnitGroup::CapacityMetric => "Capacity (Metric)",
        }
    }

    /// Returns the units that make up the group.
    #[must_use]
    pub const fn members(self) -> &'static [Unit] {
        match self {
            UnitGroup::LengthImperial => &[Unit::Inch, Unit::Foot, Unit::Yard],
            UnitGroup::LengthMetric => &[
                Unit::Millimeter,
                Unit::Centimeter,
                Unit::Decimeter,
                Unit::Meter,
                Unit::Kilometer,
            ],
            UnitGroup::WeightImperial => &[Unit::Ounce, Unit::Pound],
            UnitGroup::WeightMetric => {
                &[Unit::Milligram, Unit::Gram, Unit::Kilogram, Unit::Tonne]
            }
            UnitGroup::TimeClock => &[Unit::Second, Unit::Minute, Unit::Hour],
            UnitGroup::TimeCalendar => &[Unit::Day, Unit::Week],
            UnitGroup::CapacityImperial => &[Unit::FluidOunce, Unit::Pint, Unit::Gallon],
            UnitGroup::CapacityMetric => &[
                Unit::Milliliter,
                Unit::Centiliter,
                Unit::Deciliter,
                Unit::Liter,
            ],
        }
    }

    /// Tests whether `unit` is a member of the group.
    #[must_use]
    pub fn contains(self, unit: Unit) -> bool {
        self.members().contains(&unit)
    }
}

/// Raised when conversion arguments span measurement families.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error, Serialize, Deserialize)]
pub enum ConversionError {
    /// At least one unit does not belong to the requested family.
    #[error("cannot convert {from:?} to {to:?} within the {family:?} family")]
    MismatchedFamily {
        /// Family the conversion was requested under.
        family: MeasurementFamily,
        /// Unit supplied as the conversion input.
        from: Unit,
        /// Unit supplied as the conversion output.
        to: Unit,
    },
}

fn raw_factor(family: MeasurementFamily, from: Unit, to: Unit) -> Result<f64, ConversionError> {
    if from.family() != family || to.family() != family {
        return Err(ConversionError::MismatchedFamily { family, from, to });
    }
    Ok(from.base_factor() / to.base_factor())
}

/// Returns the multiplier that rescales `from` quantities into `to`.
///
/// Factors are symmetric inverses: `try_factor(f, a, b)` multiplied by
/// `try_factor(f, b, a)` stays within floating-point tolerance of 1.
pub fn try_factor(
    family: MeasurementFamily,
    from: Unit,
    to: Unit,
) -> Result<f32, ConversionError> {
    Ok(raw_factor(family, from, to)? as f32)
}

/// Converts `value` from one unit of `family` into another.
///
/// Converting a unit into itself returns `value` unchanged. Factors are
/// computed in f64 and narrowed once at the boundary so every caller
/// observes the same arithmetic path.
pub fn try_convert(
    value: f32,
    family: MeasurementFamily,
    from: Unit,
    to: Unit,
) -> Result<f32, ConversionError> {
    let factor = raw_factor(family, from, to)?;
    Ok((f64::from(value) * factor) as f32)
}

/// Converts with the legacy fallback: mismatched units yield 0.0.
///
/// Gameplay call sites that cannot surface an error keep the original
/// behavior; validated paths use [`try_convert`] instead.
#[must_use]
pub fn convert(value: f32, family: MeasurementFamily, from: Unit, to: Unit) -> f32 {
    try_convert(value, family, from, to).unwrap_or(0.0)
}

/// Tests whether `unit` belongs to `group` within `family`.
///
/// A group from a different family contains nothing.
#[must_use]
pub fn group_contains(family: MeasurementFamily, group: UnitGroup, unit: Unit) -> bool {
    group.family() == family && group.contains(unit)
}

/// Returns the number of decimal places needed to print `value`,
/// capped at four.
#[must_use]
pub fn decimal_places(value: f32) -> u32 {
    let text = format!("{value:.4}");
    let trimmed = text.trim_end_matches('0');
    match trimmed.split_once('.') {
        Some((_, fraction)) => fraction.len() as u32,
        None => 0,
    }
}

/// Formats `value` for display with trailing zeros trimmed.
#[must_use]
pub fn format_value(value: f32) -> String {
    let text = format!("{value:.4}");
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

/// Splits a value strictly inside (0, 1) into fraction parts.
///
/// The denominator is ten raised to the value's decimal-place count and
/// the fraction is left unreduced, matching the downstream display rule.
/// Values at or outside the open interval render as decimals and yield
/// `None`.
#[must_use]
pub fn fraction_parts(value: f32) -> Option<(u32, u32)> {
    if value <= 0.0 || value >= 1.0 {
        return None;
    }
    let places = decimal_places(value).max(1);
    let denominator = 10_u32.pow(places);
    let numerator = (f64::from(value) * f64::from(denominator)).round() as u32;
    Some((numerator, denominator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_unit_reports_its_owning_family() {
        for family in MeasurementFamily::ALL {
            for unit in family.units() {
                assert_eq!(unit.family(), family);
            }
        }
    }

    #[test]
    fn groups_partition_each_family() {
        for family in MeasurementFamily::ALL {
            let mut grouped = Vec::new();
            for group in family.groups() {
                assert_eq!(group.family(), family);
                grouped.extend_from_slice(group.members());
            }
            assert_eq!(grouped.as_slice(), family.units());
        }
    }

    #[test]
    fn identity_conversion_returns_the_input() {
        for family in MeasurementFamily::ALL {
            for unit in family.units() {
                let converted = try_convert(0.37, family, *unit, *unit);
                assert_eq!(converted, Ok(0.37));
            }
        }
    }

    #[test]
    fn factors_are_symmetric_inverses() {
        for family in MeasurementFamily::ALL {
            for from in family.units() {
                for to in family.units() {
                    let forward = try_factor(family, *from, *to).unwrap();
                    let backward = try_factor(family, *to, *from).unwrap();
                    let product = f64::from(forward) * f64::from(backward);
                    assert!(
                        (product - 1.0).abs() < 1e-3,
                        "{from:?} -> {to:?} product {product}"
                    );
                }
            }
        }
    }

    #[test]
    fn round_trips_stay_within_tolerance() {
        for family in MeasurementFamily::ALL {
            for from in family.units() {
                for to in family.units() {
                    let out = try_convert(123.0, family, *from, *to).unwrap();
                    let back = try_convert(out, family, *to, *from).unwrap();
                    assert!(
                        (back - 123.0).abs() <= 123.0 * 1e-3,
                        "{from:?} -> {to:?} -> back gave {back}"
                    );
                }
            }
        }
    }

    #[test]
    fn twelve_inches_make_one_foot() {
        let out = try_convert(12.0, MeasurementFamily::Length, Unit::Inch, Unit::Foot);
        assert_eq!(out, Ok(1.0));
    }

    #[test]
    fn one_kilogram_is_roughly_two_point_two_pounds() {
        let out = try_convert(1.0, MeasurementFamily::Weight, Unit::Kilogram, Unit::Pound).unwrap();
        assert!((out - 2.204_622_6).abs() < 1e-4, "got {out}");
    }

    #[test]
    fn two_liters_make_two_thousand_milliliters() {
        let out = try_convert(2.0, MeasurementFamily::Capacity, Unit::Liter, Unit::Milliliter);
        assert_eq!(out, Ok(2000.0));
    }

    #[test]
    fn mismatched_family_is_rejected() {
        let out = try_convert(1.0, MeasurementFamily::Length, Unit::Inch, Unit::Gram);
        assert_eq!(
            out,
            Err(ConversionError::MismatchedFamily {
                family: MeasurementFamily::Length,
                from: Unit::Inch,
                to: Unit::Gram,
            })
        );
        assert_eq!(
            convert(1.0, MeasurementFamily::Length, Unit::Inch, Unit::Gram),
            0.0
        );
    }

    #[test]
    fn group_membership_respects_family_boundaries() {
        assert!(group_contains(
            MeasurementFamily::Length,
            UnitGroup::LengthImperial,
            Unit::Inch
        ));
        assert!(!group_contains(
            MeasurementFamily::Length,
            UnitGroup::LengthImperial,
            Unit::Meter
        ));
        assert!(!group_contains(
            MeasurementFamily::Weight,
            UnitGroup::LengthImperial,
            Unit::Inch
        ));
    }

    #[test]
    fn display_values_trim_trailing_zeros() {
        assert_eq!(format_value(12.0), "12");
        assert_eq!(format_value(3.5), "3.5");
        assert_eq!(format_value(0.25), "0.25");
    }

    #[test]
    fn fractions_cover_the_open_unit_interval_only() {
        assert_eq!(fraction_parts(0.25), Some((25, 100)));
        assert_eq!(fraction_parts(0.5), Some((5, 10)));
        assert_eq!(fraction_parts(1.0), None);
        assert_eq!(fraction_parts(0.0), None);
        assert_eq!(fraction_parts(2000.0), None);
    }
}
