//! Command grammar for `get` and `set`
//!
//! The tokens after `get`/`set` are read in two phases. The selector phase
//! collects `-i`/`-o`/`-m`, the PORT name and (on `get`) the wait flags,
//! and ends at the first token the alias registry knows. The leaf phase
//! reads the arguments of that leaf. The result is a single
//! [`GetRequest`]/[`SetRequest`]; any input that does not name exactly one
//! port and one operation is a [`UsageError`], raised before the daemon is
//! contacted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::alias::{AliasRegistry, CanonicalOperation};
use crate::domain::request::{ConnectionIntent, GetRequest, Mutation, Query, SetRequest};
use crate::domain::selector::SelectorFlags;
use crate::domain::wait::WaitMode;

/// Flags of the selector phase. Alias tokens may not reuse any of these.
pub const SELECTOR_FLAGS: &[&str] = &[
    "-i",
    "--input",
    "-o",
    "--output",
    "-m",
    "--monitor",
    "-V",
    "--monitor-vol",
    "-B",
    "--monitor-bal",
    "--",
];

/// Invalid command line: bad flag combination, missing or extra argument,
/// unparsable value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UsageError {
    message: String,
}

impl UsageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type Result<T> = std::result::Result<T, UsageError>;

/// Inclusive `[min, max]` range accepted for a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelRange(pub f32, pub f32);

impl LevelRange {
    pub fn min(&self) -> f32 {
        self.0
    }

    pub fn max(&self) -> f32 {
        self.1
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.0 && value <= self.1
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_finite() && self.1.is_finite() && self.0 <= self.1
    }
}

/// Accepted ranges for `set ... volume|balance --val F`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub volume: LevelRange,
    pub balance: LevelRange,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            volume: LevelRange(0.0, 1.0),
            balance: LevelRange(-1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Get,
    Set,
}

impl CommandKind {
    fn name(&self) -> &'static str {
        match self {
            CommandKind::Get => "get",
            CommandKind::Set => "set",
        }
    }
}

struct Cursor<'t> {
    tokens: Vec<&'t str>,
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn new<S: AsRef<str>>(tokens: &'t [S]) -> Self {
        Self {
            tokens: tokens.iter().map(AsRef::as_ref).collect(),
            pos: 0,
        }
    }

    /// Value following `flag`, taken verbatim even if it starts with `-`
    fn value_for(&mut self, flag: &str) -> Result<&'t str> {
        self.next()
            .ok_or_else(|| UsageError::new(format!("{flag} requires a value")))
    }
}

impl<'t> Iterator for Cursor<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }
}

/// Outcome of the selector phase
struct Selection {
    flags: SelectorFlags,
    wait_volume: bool,
    wait_balance: bool,
    leaf: Option<CanonicalOperation>,
}

/// Parser for the `get` and `set` token streams
#[derive(Debug, Clone, Copy)]
pub struct Grammar<'a> {
    aliases: &'a AliasRegistry,
    limits: Limits,
}

impl<'a> Grammar<'a> {
    pub fn new(aliases: &'a AliasRegistry, limits: Limits) -> Self {
        Self { aliases, limits }
    }

    /// Parse the tokens following `get`
    pub fn parse_get<S: AsRef<str>>(&self, tokens: &[S]) -> Result<GetRequest> {
        let mut cursor = Cursor::new(tokens);
        let mut selection = self.select(CommandKind::Get, &mut cursor)?;
        let selector = selection.flags.into_selector()?;
        let operation = self.require_leaf(CommandKind::Get, selection.leaf)?;

        let mut positionals = Vec::new();
        let mut escaped = false;
        for token in cursor {
            if escaped || !token.starts_with('-') {
                escaped = false;
                positionals.push(token);
                continue;
            }
            match token {
                "--" => escaped = true,
                "-V" | "--monitor-vol" => selection.wait_volume = true,
                "-B" | "--monitor-bal" => selection.wait_balance = true,
                _ => return Err(unknown_option(token, operation)),
            }
        }
        if escaped {
            return Err(UsageError::new("-- must be followed by a value"));
        }

        let query = match operation {
            CanonicalOperation::Name => Query::Name,
            CanonicalOperation::IsInput => Query::IsInput,
            CanonicalOperation::IsMono => Query::IsMono,
            CanonicalOperation::Volume => Query::Volume,
            CanonicalOperation::Balance => Query::Balance,
            CanonicalOperation::Connections => Query::Connections,
            CanonicalOperation::Monitored => Query::Monitored,
            CanonicalOperation::Connected => Query::Connected {
                other: single_other(operation, &mut positionals)?,
            },
        };
        no_extra(operation, &positionals)?;

        let wait = WaitMode::from_flags(selection.wait_volume, selection.wait_balance)?;
        let request = GetRequest {
            selector,
            wait,
            query,
        };
        Ok(request)
    }

    /// Parse the tokens following `set`
    pub fn parse_set<S: AsRef<str>>(&self, tokens: &[S]) -> Result<SetRequest> {
        let mut cursor = Cursor::new(tokens);
        let selection = self.select(CommandKind::Set, &mut cursor)?;
        let selector = selection.flags.into_selector()?;
        let operation = self.require_leaf(CommandKind::Set, selection.leaf)?;

        if !operation.is_settable() {
            return Err(UsageError::new(format!(
                "'{operation}' is read-only and cannot be set"
            )));
        }

        let mut positionals = Vec::new();
        let mut value: Option<&str> = None;
        let mut intents: Vec<ConnectionIntent> = Vec::new();
        let mut escaped = false;

        while let Some(token) = cursor.next() {
            if escaped || !token.starts_with('-') {
                escaped = false;
                positionals.push(token);
                continue;
            }

            let levels = matches!(
                operation,
                CanonicalOperation::Volume | CanonicalOperation::Balance
            );
            let connection = operation == CanonicalOperation::Connected;

            match token {
                "--" => escaped = true,
                "--val" | "-v" if levels => {
                    let raw = cursor.value_for(token)?;
                    set_value(&mut value, raw)?;
                }
                _ if levels && token.starts_with("--val=") => {
                    set_value(&mut value, &token["--val=".len()..])?;
                }
                "-t" | "--toggle" if connection => intents.push(ConnectionIntent::Toggle),
                "-c" | "--connect" if connection => intents.push(ConnectionIntent::Connect),
                "-d" | "--disconnect" if connection => intents.push(ConnectionIntent::Disconnect),
                "-V" | "--monitor-vol" | "-B" | "--monitor-bal" => {
                    return Err(UsageError::new(format!(
                        "{token} is only available on get"
                    )));
                }
                _ => return Err(unknown_option(token, operation)),
            }
        }
        if escaped {
            return Err(UsageError::new("-- must be followed by a value"));
        }

        let mutation = match operation {
            CanonicalOperation::Volume | CanonicalOperation::Balance => {
                let raw = value.ok_or_else(|| {
                    UsageError::new(format!("set {operation} requires --val F"))
                })?;
                let level = self.parse_level(operation, raw)?;
                if operation == CanonicalOperation::Volume {
                    Mutation::Volume(level)
                } else {
                    Mutation::Balance(level)
                }
            }
            CanonicalOperation::Connected => {
                let other = single_other(operation, &mut positionals)?;
                let intent = match intents.as_slice() {
                    [intent] => *intent,
                    [] => {
                        return Err(UsageError::new(
                            "set connected requires one of -t, -c or -d",
                        ))
                    }
                    _ => {
                        return Err(UsageError::new(
                            "-t, -c and -d are mutually exclusive",
                        ))
                    }
                };
                Mutation::Connection { other, intent }
            }
            CanonicalOperation::Monitored => Mutation::Monitor,
            _ => unreachable!("read-only operations are rejected above"),
        };
        no_extra(operation, &positionals)?;

        let request = SetRequest { selector, mutation };
        Ok(request)
    }

    fn select(&self, kind: CommandKind, cursor: &mut Cursor<'_>) -> Result<Selection> {
        let mut selection = Selection {
            flags: SelectorFlags::default(),
            wait_volume: false,
            wait_balance: false,
            leaf: None,
        };
        let mut escaped = false;

        for token in cursor.by_ref() {
            if escaped {
                escaped = false;
                set_name(&mut selection.flags, token)?;
                continue;
            }

            match token {
                "--" => escaped = true,
                "-i" | "--input" => set_flag(&mut selection.flags.input, token)?,
                "-o" | "--output" => set_flag(&mut selection.flags.output, token)?,
                "-m" | "--monitor" => set_flag(&mut selection.flags.monitor, token)?,
                "-V" | "--monitor-vol" | "-B" | "--monitor-bal" if kind == CommandKind::Set => {
                    return Err(UsageError::new(format!(
                        "{token} is only available on get"
                    )));
                }
                "-V" | "--monitor-vol" => set_flag(&mut selection.wait_volume, token)?,
                "-B" | "--monitor-bal" => set_flag(&mut selection.wait_balance, token)?,
                _ if selection.flags.wants_name() && !token.starts_with('-') => {
                    set_name(&mut selection.flags, token)?;
                }
                _ => {
                    if let Some(operation) = self.aliases.resolve(token) {
                        selection.leaf = Some(operation);
                        break;
                    }
                    if token.starts_with('-') {
                        return Err(UsageError::new(format!(
                            "unexpected option '{token}' for {}",
                            kind.name()
                        )));
                    }
                    set_name(&mut selection.flags, token)?;
                }
            }
        }

        if escaped {
            return Err(UsageError::new("-- must be followed by a value"));
        }
        Ok(selection)
    }

    fn require_leaf(
        &self,
        kind: CommandKind,
        leaf: Option<CanonicalOperation>,
    ) -> Result<CanonicalOperation> {
        leaf.ok_or_else(|| {
            let choices: Vec<&str> = CanonicalOperation::ALL
                .iter()
                .filter(|op| kind == CommandKind::Get || op.is_settable())
                .map(|op| op.canonical_name())
                .collect();
            UsageError::new(format!(
                "{} requires a command: one of {}",
                kind.name(),
                choices.join(", ")
            ))
        })
    }

    fn parse_level(&self, operation: CanonicalOperation, raw: &str) -> Result<f32> {
        let value: f32 = raw.trim().parse().map_err(|_| {
            UsageError::new(format!(
                "invalid value '{raw}' for --val: expected a decimal number"
            ))
        })?;
        if !value.is_finite() {
            return Err(UsageError::new(format!(
                "invalid value '{raw}' for --val: must be finite"
            )));
        }

        let range = match operation {
            CanonicalOperation::Balance => self.limits.balance,
            _ => self.limits.volume,
        };
        if !range.contains(value) {
            return Err(UsageError::new(format!(
                "{operation} {value} is out of range [{}, {}]",
                range.min(),
                range.max()
            )));
        }
        Ok(value)
    }
}

fn set_flag(flag: &mut bool, token: &str) -> Result<()> {
    if *flag {
        return Err(UsageError::new(format!("{token} given more than once")));
    }
    *flag = true;
    Ok(())
}

fn set_name(flags: &mut SelectorFlags, token: &str) -> Result<()> {
    if let Some(name) = &flags.name {
        return Err(UsageError::new(format!(
            "unexpected argument '{token}': PORT is already '{name}'"
        )));
    }
    flags.name = Some(token.to_string());
    Ok(())
}

fn set_value<'t>(value: &mut Option<&'t str>, raw: &'t str) -> Result<()> {
    if value.is_some() {
        return Err(UsageError::new("--val given more than once"));
    }
    *value = Some(raw);
    Ok(())
}

fn single_other(operation: CanonicalOperation, positionals: &mut Vec<&str>) -> Result<String> {
    if positionals.is_empty() {
        return Err(UsageError::new(format!("{operation} requires an OTHER port name")));
    }
    let other = positionals.remove(0);
    if other.is_empty() {
        return Err(UsageError::new("OTHER must not be empty"));
    }
    Ok(other.to_string())
}

fn no_extra(operation: CanonicalOperation, positionals: &[&str]) -> Result<()> {
    match positionals.first() {
        Some(extra) => Err(UsageError::new(format!(
            "unexpected argument '{extra}' for {operation}"
        ))),
        None => Ok(()),
    }
}

fn unknown_option(token: &str, operation: CanonicalOperation) -> UsageError {
    UsageError::new(format!("unexpected option '{token}' for {operation}"))
}
