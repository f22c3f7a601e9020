use serde::Serialize;

/// Effective availability: a recorded attendance always wins over the
/// declared availability; otherwise the declaration; otherwise unknown.
pub fn effective_availability(attended: Option<bool>, available: Option<bool>) -> Option<bool> {
    attended.or(available)
}

/// Display symbol for a tri-state availability value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Yes,
    No,
    Unknown,
}

impl Mark {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Yes => "✔",
            Self::No => "✘",
            Self::Unknown => "",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl From<Option<bool>> for Mark {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
