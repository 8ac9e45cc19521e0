use std::fmt;

/// Device class inferred from the user-agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Mobile,
    Desktop,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Mobile => "Mobile",
            Device::Desktop => "Desktop",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-sensitive substring match on "Mobile"
pub fn classify_device(user_agent: &str) -> Device {
    if user_agent.contains("Mobile") {
        Device::Mobile
    } else {
        Device::Desktop
    }
}
