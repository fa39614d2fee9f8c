use std::fmt;

/// Human readable shipment progress derived from a row's status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayStatus {
    Received,
    InTransit,
    Delivered,
}

impl DisplayStatus {
    /// Derive the display status from the raw status code.
    ///
    /// Only exact "P" and "D" codes are recognized. Anything else, including
    /// an empty cell, means the vehicle has been received.
    pub fn from_code(code: &str) -> Self {
        match code {
            "P" => Self::InTransit,
            "D" => Self::Delivered,
            _ => Self::Received,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::InTransit => "In Transit",
            Self::Delivered => "Delivered",
        }
    }

    pub const fn glyph(&self) -> &'static str {
        match self {
            Self::Received => "📦",
            Self::InTransit => "🚚",
            Self::Delivered => "✔️",
        }
    }

    /// CSS class used for styling the status cell, keyed off the label.
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Received => "status-received",
            Self::InTransit => "status-in-transit",
            Self::Delivered => "status-delivered",
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.glyph(), self.label())
    }
}
