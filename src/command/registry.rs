//! Command registry
//!
//! Name → handler table plus the request validation shared by live traffic
//! and AOF replay.

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;

use super::{builtin_commands, CommandError};
use crate::protocol::Value;
use crate::store::Store;

/// A command implementation
///
/// Receives the arguments after the command name, already checked against
/// the command's [`Arity`]. Any `Fn(&Store, &[Bytes]) -> Result<Value, CommandError>`
/// closure is a handler.
pub trait Handler: Send + Sync {
    fn call(&self, store: &Store, args: &[Bytes]) -> Result<Value, CommandError>;
}

impl<F> Handler for F
where
    F: Fn(&Store, &[Bytes]) -> Result<Value, CommandError> + Send + Sync,
{
    fn call(&self, store: &Store, args: &[Bytes]) -> Result<Value, CommandError> {
        self(store, args)
    }
}

/// Accepted argument counts (command name excluded)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range { min: usize, max: usize },
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Range { min, max } => (min..=max).contains(&count),
        }
    }
}

/// One registered command
pub struct CommandSpec {
    name: String,
    arity: Arity,
    mutating: bool,
    handler: Box<dyn Handler>,
}

impl CommandSpec {
    /// Create a read-only command; `name` is stored upper-cased
    pub fn new(name: &str, arity: Arity, handler: impl Handler + 'static) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            arity,
            mutating: false,
            handler: Box::new(handler),
        }
    }

    /// Mark the command as mutating: its requests are appended to the AOF
    pub fn mutating(mut self) -> Self {
        self.mutating = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn is_mutating(&self) -> bool {
        self.mutating
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("mutating", &self.mutating)
            .finish_non_exhaustive()
    }
}

/// A validated request, ready to run
#[derive(Debug)]
pub struct Invocation<'a> {
    spec: &'a CommandSpec,
    args: Vec<Bytes>,
}

impl<'a> Invocation<'a> {
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    pub fn is_mutating(&self) -> bool {
        self.spec.is_mutating()
    }

    /// Run the handler against the store
    pub fn apply(&self, store: &Store) -> Value {
        self.spec
            .handler
            .call(store, &self.args)
            .unwrap_or_else(Value::from)
    }
}

/// Table of commands keyed by upper-case name
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandSpec>,
}

impl CommandRegistry {
    /// Create a registry with no commands
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a registry with PING, SET, GET, DEL and EXISTS
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for spec in builtin_commands() {
            registry.register(spec);
        }
        registry
    }

    /// Add a command, replacing any previous one with the same name
    pub fn register(&mut self, spec: CommandSpec) {
        self.commands.insert(spec.name.clone(), spec);
    }

    /// Look up a command by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(&name.to_ascii_uppercase())
    }

    /// Whether requests for `name` belong in the AOF
    pub fn is_mutating(&self, name: &str) -> bool {
        self.get(name).is_some_and(CommandSpec::is_mutating)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Validate a decoded request against the table
    ///
    /// Checks, in order: shape (non-empty array of bulk strings), command
    /// name, argument count. The store is never consulted.
    pub fn resolve(&self, request: &Value) -> Result<Invocation<'_>, CommandError> {
        let parts = request
            .as_array()
            .filter(|items| !items.is_empty())
            .ok_or(CommandError::InvalidRequest)?;

        let mut words = parts
            .iter()
            .map(|part| part.as_bulk().cloned().ok_or(CommandError::InvalidRequest))
            .collect::<Result<Vec<Bytes>, _>>()?;
        let args = words.split_off(1);
        let raw_name = String::from_utf8_lossy(&words[0]);

        let spec = self
            .get(&raw_name)
            .ok_or_else(|| CommandError::UnknownCommand(raw_name.to_string()))?;

        if !spec.arity.accepts(args.len()) {
            return Err(CommandError::WrongArity(spec.name.to_ascii_lowercase()));
        }

        Ok(Invocation { spec, args })
    }

    /// Resolve and apply in one step, folding validation errors into the reply
    ///
    /// This is the path AOF replay takes; it never writes to the log.
    pub fn dispatch(&self, store: &Store, request: &Value) -> Value {
        match self.resolve(request) {
            Ok(invocation) => invocation.apply(store),
            Err(err) => err.into(),
        }
    }
}
