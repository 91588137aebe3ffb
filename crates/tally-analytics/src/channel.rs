use crate::store::CounterField;
use crate::types::TrackingError;

/// Traffic channel a view or click originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Web,
    Mobile,
}

impl Channel {
    pub fn parse(value: &str) -> Result<Self, TrackingError> {
        match value {
            "web" => Ok(Channel::Web),
            "mobile" => Ok(Channel::Mobile),
            other => Err(TrackingError::InvalidChannel(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Web => "web",
            Channel::Mobile => "mobile",
        }
    }

    /// Counter incremented by a page view on this channel
    pub fn view_field(&self) -> CounterField {
        match self {
            Channel::Web => CounterField::WebViews,
            Channel::Mobile => CounterField::MobileViews,
        }
    }

    /// Counter incremented by a click on this channel
    pub fn click_field(&self) -> CounterField {
        match self {
            Channel::Web => CounterField::WebClicks,
            Channel::Mobile => CounterField::MobileClicks,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
