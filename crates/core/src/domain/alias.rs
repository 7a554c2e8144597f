//! Alias registry for leaf commands
//!
//! Every leaf command (`name`, `volume`, `connected`, ...) accepts a set of
//! historical spellings: terse forms, full words, common misspellings and
//! flag-style tokens. The registry maps each token to exactly one
//! [`CanonicalOperation`] and refuses to build if two operations share a
//! token, so a colliding table never reaches the dispatcher.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::domain::grammar::SELECTOR_FLAGS;

/// Errors raised while building the alias table
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AliasError {
    #[error("Alias '{token}' is registered for both '{first}' and '{second}'")]
    DuplicateToken {
        token: String,
        first: CanonicalOperation,
        second: CanonicalOperation,
    },

    #[error("Alias '{token}' for '{operation}' clashes with a selector flag")]
    ReservedToken {
        token: String,
        operation: CanonicalOperation,
    },

    #[error("Empty alias registered for '{0}'")]
    EmptyToken(CanonicalOperation),

    #[error("Unknown operation '{0}' in alias table")]
    UnknownOperation(String),
}

pub type Result<T> = std::result::Result<T, AliasError>;

/// The logical operation behind a leaf command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalOperation {
    Name,
    IsInput,
    IsMono,
    Volume,
    Balance,
    Connections,
    Connected,
    Monitored,
}

impl CanonicalOperation {
    pub const ALL: [CanonicalOperation; 8] = [
        CanonicalOperation::Name,
        CanonicalOperation::IsInput,
        CanonicalOperation::IsMono,
        CanonicalOperation::Volume,
        CanonicalOperation::Balance,
        CanonicalOperation::Connections,
        CanonicalOperation::Connected,
        CanonicalOperation::Monitored,
    ];

    /// Primary spelling, also used as the key in the config file
    pub fn canonical_name(&self) -> &'static str {
        match self {
            CanonicalOperation::Name => "name",
            CanonicalOperation::IsInput => "is-input",
            CanonicalOperation::IsMono => "is-mono",
            CanonicalOperation::Volume => "volume",
            CanonicalOperation::Balance => "balance",
            CanonicalOperation::Connections => "connections",
            CanonicalOperation::Connected => "connected",
            CanonicalOperation::Monitored => "monitored",
        }
    }

    pub fn from_canonical_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.canonical_name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            CanonicalOperation::Name => "a port's name",
            CanonicalOperation::IsInput => "whether a port is an input",
            CanonicalOperation::IsMono => "whether a port is mono",
            CanonicalOperation::Volume => "a port's volume",
            CanonicalOperation::Balance => "a port's balance",
            CanonicalOperation::Connections => "a port's connections",
            CanonicalOperation::Connected => "whether a port is connected to OTHER",
            CanonicalOperation::Monitored => "whether a port is monitored",
        }
    }

    /// Whether `set` accepts this operation
    pub fn is_settable(&self) -> bool {
        matches!(
            self,
            CanonicalOperation::Volume
                | CanonicalOperation::Balance
                | CanonicalOperation::Connected
                | CanonicalOperation::Monitored
        )
    }

    fn builtin_tokens(&self) -> &'static str {
        match self {
            CanonicalOperation::Name => "name n na nam -n --name",
            CanonicalOperation::IsInput => {
                "is-input isinput isin i in inp inpu input -in --is-input"
            }
            CanonicalOperation::IsMono => {
                "is-mono ismono ismo ismon ism mono m mo mon -mo --is-mono"
            }
            CanonicalOperation::Volume => "volume vol vo v -v --volume",
            CanonicalOperation::Balance => "balance bal ba b -b --balance",
            CanonicalOperation::Connections => "connections cons cs c -cs --connections",
            CanonicalOperation::Connected => "connected conned connd cond cnd cd -cd --connected",
            CanonicalOperation::Monitored => {
                "monitored monned monnd moned mond mnd md -md --monitored"
            }
        }
    }
}

impl fmt::Display for CanonicalOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Ordered set of tokens accepted for one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSet {
    operation: CanonicalOperation,
    tokens: Vec<String>,
}

impl AliasSet {
    pub fn operation(&self) -> CanonicalOperation {
        self.operation
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    fn push(&mut self, token: String) {
        if !self.contains(&token) {
            self.tokens.push(token);
        }
    }
}

/// Immutable token -> operation table, validated at construction
#[derive(Debug, Clone)]
pub struct AliasRegistry {
    sets: Vec<AliasSet>,
    lookup: HashMap<String, CanonicalOperation>,
}

impl AliasRegistry {
    /// Built-in table only
    pub fn standard() -> Result<Self> {
        AliasRegistryBuilder::new().build()
    }

    /// Built-in table plus extra tokens keyed by canonical operation name
    pub fn with_extra<S: AsRef<str>>(extra: &BTreeMap<String, Vec<S>>) -> Result<Self> {
        let mut builder = AliasRegistryBuilder::new();
        for (key, tokens) in extra {
            let operation = CanonicalOperation::from_canonical_name(key)
                .ok_or_else(|| AliasError::UnknownOperation(key.clone()))?;
            builder = builder.extend(operation, tokens.iter().map(|t| t.as_ref()));
        }
        builder.build()
    }

    /// Operation registered for `token`, if any
    pub fn resolve(&self, token: &str) -> Option<CanonicalOperation> {
        self.lookup.get(token).copied()
    }

    /// Alias set of one operation
    pub fn aliases(&self, operation: CanonicalOperation) -> &AliasSet {
        // Every operation gets a set in the builder
        &self.sets[operation as usize]
    }

    pub fn sets(&self) -> impl Iterator<Item = &AliasSet> {
        self.sets.iter()
    }
}

/// Collects alias tokens before validating them into an [`AliasRegistry`]
#[derive(Debug, Clone)]
pub struct AliasRegistryBuilder {
    sets: Vec<AliasSet>,
    reserved: Vec<String>,
}

impl AliasRegistryBuilder {
    /// Builder seeded with the built-in tokens and the grammar's selector flags
    pub fn new() -> Self {
        let sets = CanonicalOperation::ALL
            .into_iter()
            .map(|operation| AliasSet {
                operation,
                tokens: operation
                    .builtin_tokens()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
            })
            .collect();

        Self {
            sets,
            reserved: SELECTOR_FLAGS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Builder with no tokens at all
    pub fn empty() -> Self {
        Self {
            sets: CanonicalOperation::ALL
                .into_iter()
                .map(|operation| AliasSet {
                    operation,
                    tokens: Vec::new(),
                })
                .collect(),
            reserved: SELECTOR_FLAGS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Add tokens for an operation; repeats within the same set are ignored
    pub fn extend<'a>(
        mut self,
        operation: CanonicalOperation,
        tokens: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let set = &mut self.sets[operation as usize];
        for token in tokens {
            set.push(token.trim().to_string());
        }
        self
    }

    /// Validate and freeze the table
    pub fn build(self) -> Result<AliasRegistry> {
        let mut lookup: HashMap<String, CanonicalOperation> = HashMap::new();

        for set in &self.sets {
            for token in &set.tokens {
                if token.is_empty() {
                    return Err(AliasError::EmptyToken(set.operation));
                }
                if self.reserved.iter().any(|r| r == token) {
                    return Err(AliasError::ReservedToken {
                        token: token.clone(),
                        operation: set.operation,
                    });
                }
                if let Some(first) = lookup.insert(token.clone(), set.operation) {
                    return Err(AliasError::DuplicateToken {
                        token: token.clone(),
                        first,
                        second: set.operation,
                    });
                }
            }
        }

        debug!(tokens = lookup.len(), "Alias registry built");
        Ok(AliasRegistry {
            sets: self.sets,
            lookup,
        })
    }
}

impl Default for AliasRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
