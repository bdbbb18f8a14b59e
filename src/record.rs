//! The normalized thermochemical record shared by both pipelines.
//!
//! Every field is optional internally but always present in JSON: an absent
//! value is written as the empty string `""`, so consumers can rely on a fixed
//! key set in a fixed order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical state of a species, derived from a table's state column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Gas,
    Liquid,
    Solid,
    Aqueous,
}

impl Phase {
    /// Map a raw state cell to a phase.
    ///
    /// Exact tokens are matched first (`(g)`, `g`, `gas`, …); any value that
    /// contains `aq` is aqueous. Anything else is unrecognized.
    pub fn from_state(state: &str) -> Option<Self> {
        let st = state.trim().to_lowercase();
        match st.as_str() {
            "(g)" | "g" | "gas" => Some(Phase::Gas),
            "(l)" | "l" | "liquid" => Some(Phase::Liquid),
            "(s)" | "s" | "solid" => Some(Phase::Solid),
            _ if st.contains("aq") => Some(Phase::Aqueous),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Gas => "gas",
            Phase::Liquid => "liquid",
            Phase::Solid => "solid",
            Phase::Aqueous => "aqueous",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One thermochemical data entry in the output schema.
///
/// Field order here is the key order of the emitted JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(with = "sentinel")]
    pub common_name: Option<String>,
    #[serde(with = "sentinel")]
    pub structure: Option<String>,
    #[serde(rename = "enthalpy_of_formation_0K", with = "sentinel")]
    pub enthalpy_of_formation_0k: Option<f64>,
    #[serde(rename = "enthalpy_of_formation_298K", with = "sentinel")]
    pub enthalpy_of_formation_298k: Option<f64>,
    #[serde(rename = "entropy_298K", with = "sentinel")]
    pub entropy_298k: Option<f64>,
    #[serde(rename = "gibbs_free_energy_298K", with = "sentinel")]
    pub gibbs_free_energy_298k: Option<f64>,
    #[serde(with = "sentinel")]
    pub phase: Option<Phase>,
    #[serde(with = "sentinel")]
    pub uncertainty_value: Option<f64>,
    #[serde(with = "sentinel")]
    pub molecular_mass: Option<f64>,
    #[serde(with = "sentinel")]
    pub molecular_mass_uncertainty: Option<f64>,
    #[serde(with = "sentinel")]
    pub cas_rn: Option<String>,
    #[serde(with = "sentinel")]
    pub relative_rank: Option<i64>,
}

/// JSON keys of a [`Record`], in emission order.
pub const RECORD_KEYS: [&str; 12] = [
    "common_name",
    "structure",
    "enthalpy_of_formation_0K",
    "enthalpy_of_formation_298K",
    "entropy_298K",
    "gibbs_free_energy_298K",
    "phase",
    "uncertainty_value",
    "molecular_mass",
    "molecular_mass_uncertainty",
    "cas_rn",
    "relative_rank",
];

/// `Option<T>` ⇄ value-or-`""`.
mod sentinel {
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Slot<T> {
            Empty(Empty),
            Value(T),
        }

        match Slot::<T>::deserialize(deserializer)? {
            Slot::Empty(_) => Ok(None),
            Slot::Value(v) => Ok(Some(v)),
        }
    }

    /// Accepts only `""` (or `null`).
    struct Empty;

    impl<'de> Deserialize<'de> for Empty {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s: Option<String> = Option::deserialize(deserializer)?;
            match s.as_deref() {
                None | Some("") => Ok(Empty),
                Some(other) => Err(de::Error::custom(format!(
                    "expected empty sentinel, got {other:?}"
                ))),
            }
        }
    }
}
