//! Log output selection.
//!
//! The service writes to stderr on the device. Production builds feed a
//! line-oriented collector that expects JSON; bench sessions read the same
//! stream on a serial console.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How log records are rendered on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per record with event fields at the top level.
    #[default]
    Json,
    /// Single-line text for a serial console.
    Compact,
}

impl LogFormat {
    /// Returns `true` when records are parsed by a collector rather than
    /// read by a person. Such output never carries terminal colour codes.
    #[must_use]
    pub const fn is_machine_readable(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Error returned when a [`LogFormat`] name is not recognised.
pub type LogFormatParseError = strum::ParseError;
