use std::fmt;

/// Result of a single unit primitive call.
///
/// Every generation reports a richer status set, but the stepping loop only
/// distinguishes three outcomes. Adapters collapse their raw statuses onto
/// this type; anything that is neither success nor a warning is `Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The call completed normally.
    Success,

    /// The call completed, but the unit flagged something worth reporting.
    Warning,

    /// The call failed and the unit can no longer be trusted.
    Fatal,
}

impl Status {
    /// Returns `true` for [`Status::Success`] and [`Status::Warning`].
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Success | Self::Warning)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Warning => f.write_str("warning"),
            Self::Fatal => f.write_str("fatal"),
        }
    }
}
