use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Freshness/correctness verdict attached to every derived figure.
///
/// Variants are ordered by severity so that `max` yields the dominant verdict:
/// `Error` dominates `Stale`, which dominates `Ok`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Display,
    AsRefStr,
    EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    #[default]
    Ok,
    Stale,
    Error,
}

impl DataQuality {
    /// Combine two verdicts, keeping the most severe one.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }

    /// Fold any number of verdicts. An empty iterator is `Ok`.
    pub fn worst<I>(qualities: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        qualities.into_iter().fold(Self::Ok, Self::merge)
    }

    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_error_dominates_stale_dominates_ok() {
        assert_eq!(DataQuality::Ok.merge(DataQuality::Stale), DataQuality::Stale);
        assert_eq!(DataQuality::Stale.merge(DataQuality::Error), DataQuality::Error);
        assert_eq!(DataQuality::Error.merge(DataQuality::Ok), DataQuality::Error);
        assert_eq!(
            DataQuality::worst([DataQuality::Ok, DataQuality::Stale, DataQuality::Ok]),
            DataQuality::Stale
        );
        assert_eq!(DataQuality::worst([]), DataQuality::Ok);
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(
            serde_json::to_string(&DataQuality::Stale).unwrap(),
            "\"stale\""
        );
        assert_eq!(DataQuality::from_str("ERROR").unwrap(), DataQuality::Error);
        assert_eq!(DataQuality::Ok.to_string(), "ok");
    }
}
