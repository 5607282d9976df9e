use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Card company name as submitted by API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    Visa,
    Mastercard,
    AmericanExpress,
}

impl ProviderName {
    pub const ALL: [ProviderName; 3] = [Self::Visa, Self::Mastercard, Self::AmericanExpress];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::AmericanExpress => "americanexpress",
        }
    }

    /// Internal routing key, if an adapter exists for this company.
    pub const fn key(self) -> Option<ProviderKey> {
        match self {
            Self::Visa => Some(ProviderKey::Visa),
            Self::Mastercard => Some(ProviderKey::Mastercard),
            Self::AmericanExpress => None,
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| GatewayError::UnsupportedProvider(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    Enabled,
    Disabled,
    Experimental,
}

/// Identifies a processor adapter and its endpoint.
///
/// Kept separate from [`ProviderName`] so the public vocabulary can change
/// without touching routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKey {
    Visa,
    Mastercard,
}

impl ProviderKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "visa_key",
            Self::Mastercard => "mastercard_key",
        }
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activation status of every known card company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRegistry {
    statuses: BTreeMap<ProviderName, ProviderStatus>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self {
            statuses: BTreeMap::from([
                (ProviderName::Visa, ProviderStatus::Enabled),
                (ProviderName::Mastercard, ProviderStatus::Enabled),
                (ProviderName::AmericanExpress, ProviderStatus::Disabled),
            ]),
        }
    }
}

impl ProviderRegistry {
    /// Builds a registry from explicit statuses. Companies left out are disabled.
    pub fn new(statuses: BTreeMap<ProviderName, ProviderStatus>) -> Self {
        Self { statuses }
    }

    pub fn with_status(mut self, name: ProviderName, status: ProviderStatus) -> Self {
        self.statuses.insert(name, status);
        self
    }

    pub fn status(&self, name: ProviderName) -> ProviderStatus {
        self.statuses
            .get(&name)
            .copied()
            .unwrap_or(ProviderStatus::Disabled)
    }

    pub fn is_enabled(&self, name: ProviderName) -> bool {
        self.status(name) == ProviderStatus::Enabled
    }

    /// Enabled companies that have no adapter to route to.
    pub fn unroutable(&self) -> impl Iterator<Item = ProviderName> + '_ {
        self.statuses
            .iter()
            .filter(|(name, status)| **status == ProviderStatus::Enabled && name.key().is_none())
            .map(|(name, _)| *name)
    }

    /// Resolves a caller-supplied company name to its routing key.
    pub fn resolve(&self, name: &str) -> Result<ProviderKey> {
        self.resolve_name(name.parse()?)
    }

    pub fn resolve_name(&self, name: ProviderName) -> Result<ProviderKey> {
        if !self.is_enabled(name) {
            return Err(GatewayError::UnsupportedProvider(name.to_string()));
        }
        name.key().ok_or(GatewayError::AdapterMismatch(name))
    }
}
