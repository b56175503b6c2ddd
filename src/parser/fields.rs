use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Capacity, CapacityUnit, Weight, WeightUnit};

const WEIGHT_UNITS: &str = r"kilograms?|grams?|kg|g";
const CAPACITY_UNITS: &str = r"millilit(?:er|re)s?|ml|lit(?:er|re)s?|l|oz";

static WEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(\d+(?:\.\d+)?)\s*(?:({WEIGHT_UNITS})\b)?")).unwrap()
});
static CAPACITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(\d+(?:\.\d+)?)\s*(?:({CAPACITY_UNITS})\b)?")).unwrap()
});
static UNIT_WEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(\d+(?:\.\d+)?)\s*({WEIGHT_UNITS})\b")).unwrap()
});
static UNIT_CAPACITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(\d+(?:\.\d+)?)\s*({CAPACITY_UNITS})\b")).unwrap()
});
static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap());
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// First number in `text`, read as a weight. A missing unit means grams.
pub fn parse_weight(text: &str) -> Option<Weight> {
    let caps = WEIGHT_RE.captures(text)?;
    let value = caps[1].parse().ok()?;
    let unit = caps
        .get(2)
        .and_then(|m| WeightUnit::from_token(m.as_str()))
        .unwrap_or(WeightUnit::G);
    Some(Weight { value, unit })
}

/// First number in `text`, read as a capacity. A missing unit means millilitres.
pub fn parse_capacity(text: &str) -> Option<Capacity> {
    let caps = CAPACITY_RE.captures(text)?;
    let value = caps[1].parse().ok()?;
    let unit = caps
        .get(2)
        .and_then(|m| CapacityUnit::from_token(m.as_str()))
        .unwrap_or(CapacityUnit::Ml);
    Some(Capacity { value, unit })
}

/// `N%` anywhere in `text`; values above 100 are not percentages of anything.
pub fn parse_percentage(text: &str) -> Option<f64> {
    let caps = PERCENT_RE.captures(text)?;
    let value: f64 = caps[1].parse().ok()?;
    (value <= 100.0).then_some(value)
}

pub fn parse_number(text: &str) -> Option<f64> {
    NUMBER_RE.find(text)?.as_str().parse().ok()
}

/// Unlabeled weight in free text. Only matches when a unit is written out.
pub fn find_weight(text: &str) -> Option<Weight> {
    let caps = UNIT_WEIGHT_RE.captures(text)?;
    Some(Weight {
        value: caps[1].parse().ok()?,
        unit: WeightUnit::from_token(&caps[2])?,
    })
}

/// Unlabeled capacity in free text. Only matches when a unit is written out.
pub fn find_capacity(text: &str) -> Option<Capacity> {
    let caps = UNIT_CAPACITY_RE.captures(text)?;
    Some(Capacity {
        value: caps[1].parse().ok()?,
        unit: CapacityUnit::from_token(&caps[2])?,
    })
}
