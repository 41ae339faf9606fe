#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Name-to-constructor registry that turns queued [`MobSpec`] values into
//! live [`Mob`] instances.
//!
//! The factory is an ordinary value: hosts construct it, optionally register
//! additional constructors, and hand it to the wave scheduler.

use std::{collections::BTreeMap, fmt};

use tracing::debug;
use typer_drive_core::{ConfigurationError, Mob, MobKind, MobSpec};

/// Alias accepted for the plain variant.
pub const PLAIN_ALIAS: &str = "normal";

/// Function that builds a mob from a validated spec.
pub type MobConstructor = fn(&MobSpec) -> Mob;

/// Registry resolving variant names into constructors.
#[derive(Clone, Default)]
pub struct MobFactory {
    constructors: BTreeMap<String, MobConstructor>,
}

impl fmt::Debug for MobFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MobFactory")
            .field("variants", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MobFactory {
    /// Creates a factory with no registered variants.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a factory with every built-in variant registered under its
    /// canonical name, plus [`PLAIN_ALIAS`].
    #[must_use]
    pub fn with_default_variants() -> Self {
        let mut factory = Self::empty();
        for kind in MobKind::ALL {
            factory.register(kind.name(), constructor_for(kind));
        }
        factory.register(PLAIN_ALIAS, constructor_for(MobKind::Plain));
        factory
    }

    /// Registers `constructor` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, constructor: MobConstructor) {
        let name = name.into();
        if self.constructors.insert(name.clone(), constructor).is_some() {
            debug!(variant = %name, "replaced mob constructor");
        }
    }

    /// Reports whether a constructor is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Names of every registered variant in lexical order.
    pub fn registered_variants(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Instantiates the mob described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownVariant`] when no constructor is
    /// registered under the spec's variant name and
    /// [`ConfigurationError::EmptyLetters`] when the spec has no letters.
    pub fn create(&self, spec: &MobSpec) -> Result<Mob, ConfigurationError> {
        let constructor =
            self.constructors
                .get(&spec.variant)
                .ok_or_else(|| ConfigurationError::UnknownVariant {
                    name: spec.variant.clone(),
                })?;
        if spec.letters.is_empty() {
            return Err(ConfigurationError::EmptyLetters {
                variant: spec.variant.clone(),
            });
        }
        Ok(constructor(spec))
    }
}

fn constructor_for(kind: MobKind) -> MobConstructor {
    match kind {
        MobKind::Plain => |spec| Mob::new(MobKind::Plain, spec),
        MobKind::Tank => |spec| Mob::new(MobKind::Tank, spec),
        MobKind::Armored => |spec| Mob::new(MobKind::Armored, spec),
        MobKind::Shielded => |spec| Mob::new(MobKind::Shielded, spec),
        MobKind::Regenerator => |spec| Mob::new(MobKind::Regenerator, spec),
        MobKind::Split => |spec| Mob::new(MobKind::Split, spec),
        MobKind::Stealth => |spec| Mob::new(MobKind::Stealth, spec),
        MobKind::Speedster => |spec| Mob::new(MobKind::Speedster, spec),
        MobKind::Boss => |spec| Mob::new(MobKind::Boss, spec),
    }
}
