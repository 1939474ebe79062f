/// Why a live provider call was replaced with static data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FallbackReason {
    #[error("provider returned an empty payload")]
    EmptyPayload,

    #[error("no candidates survived filtering")]
    NoSurvivors,

    #[error("industry has no screener mapping")]
    UnknownIndustry,

    #[error("not enough price points (got {found})")]
    InsufficientPrices { found: usize },

    #[error("price series starts at a non-positive price ({first})")]
    InvalidPrice { first: f64 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("generation failed: {0}")]
    Generation(String),
}

impl FallbackReason {
    pub fn transport(err: &anyhow::Error) -> Self {
        Self::Transport(format!("{err:#}"))
    }
}

/// A value from a live provider, or the static value that replaced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Sourced<T> {
    Live(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Sourced<T> {
    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        Self::Fallback { value, reason }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Self::Live(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Live(v) | Self::Fallback { value: v, .. } => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Live(v) | Self::Fallback { value: v, .. } => v,
        }
    }
}
