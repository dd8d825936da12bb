use serde::{Deserialize, Serialize};

/// Signature written before the root value when [`Options::auto_signature`]
/// is set.
pub const AUTO_SIGNATURE: [u8; 4] = *b"GRF1";

/// Runtime switches for a read or write session.
///
/// Missing keys take their default when loaded through serde, so a config
/// file only needs to name what it changes.
///
/// ```
/// use graft_persist::Options;
///
/// let options = Options {
///     allow_unknown_fields: true,
///     ..Options::default()
/// };
/// assert!(options.report_error_position);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Skip stored fields the local type does not declare instead of
    /// failing with [`UnknownField`](crate::DecodeErrorKind::UnknownField).
    pub allow_unknown_fields: bool,
    /// Attach the byte offset to decode errors.
    pub report_error_position: bool,
    /// Write and expect [`AUTO_SIGNATURE`] before the root value.
    pub auto_signature: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allow_unknown_fields: false,
            report_error_position: true,
            auto_signature: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Options;

    #[test]
    fn loads_partial_json() {
        let options: Options = serde_json::from_str(r#"{ "allow_unknown_fields": true }"#).unwrap();
        assert_eq!(
            options,
            Options {
                allow_unknown_fields: true,
                ..Options::default()
            }
        );
    }

    #[test]
    fn loads_ron() {
        let options: Options = ron::from_str("(auto_signature: true, report_error_position: false)").unwrap();
        assert!(options.auto_signature);
        assert!(!options.report_error_position);
        assert!(!options.allow_unknown_fields);
    }

    #[test]
    fn json_round_trip_keeps_every_switch() {
        let options = Options {
            allow_unknown_fields: true,
            report_error_position: false,
            auto_signature: true,
        };
        let text = serde_json::to_string(&options).unwrap();
        assert_eq!(serde_json::from_str::<Options>(&text).unwrap(), options);
    }
}
