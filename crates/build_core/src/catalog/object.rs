//! Buildable object definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// Stable identifier of a catalog object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(u16);

impl ObjectId {
    /// Create an object ID from its catalog index.
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Index into the catalog table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Playable race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    /// Protoss.
    Protoss,
    /// Terran.
    Terran,
    /// Zerg.
    Zerg,
}

impl Race {
    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Protoss => "Protoss",
            Self::Terran => "Terran",
            Self::Zerg => "Zerg",
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What kind of thing an object is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A unit.
    Unit,
    /// A structure.
    Structure,
    /// A research upgrade.
    Upgrade,
    /// A transformation of one or more production queues.
    ///
    /// `yields` lists the queue types created in place of the expended
    /// ones, positionally. `None` entries destroy a queue without
    /// replacing it.
    Morph {
        /// Queue types created.
        yields: Vec<Option<ObjectId>>,
    },
    /// An ability cast by a caster.
    Ability {
        /// Caster type.
        caster: ObjectId,
    },
}

/// Costs of building an object once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cost {
    /// Minerals.
    pub minerals: i32,
    /// Gas.
    pub gas: i32,
    /// Larvae.
    pub larva: u32,
    /// Supply. Negative when the object consumes a unit, such as a drone
    /// morphing into a structure.
    pub supply: i32,
    /// Caster energy.
    pub energy: i32,
}

/// Production queues an object is built from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Producers {
    /// Accepted queue types.
    pub types: Vec<ObjectId>,
    /// Whether one queue of every listed type is needed, rather than one of any.
    pub needs_all: bool,
}

/// Economic roles the scheduler needs to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Roles {
    /// Mines minerals once built.
    pub worker: bool,
    /// A town hall: a new mineral line.
    pub base: bool,
    /// A gas extraction point.
    pub extractor: bool,
    /// The race's production booster.
    pub booster: bool,
}

/// Energy profile of a caster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyProfile {
    /// Energy when the caster is created.
    pub start: i32,
    /// Energy cap.
    pub max: i32,
}

/// Objects with mechanics of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialRole {
    /// Speeds up a production queue.
    ChronoBoost,
    /// Makes a hatchery spit out extra larvae after a while.
    SpawnLarvae,
    /// Calls down a temporary harvester.
    Mule,
    /// Production queue with shortened build times.
    Warpgate,
    /// A worker sent out of the mineral line.
    ScoutingWorker,
}

/// Definition of a buildable object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDef {
    /// Catalog identifier. Assigned on registration.
    pub id: ObjectId,
    /// Display name.
    pub name: String,
    /// Owning race. `None` for race-neutral objects.
    pub race: Option<Race>,
    /// Kind of object.
    pub kind: ObjectKind,
    /// Costs.
    pub cost: Cost,
    /// Build time in seconds. For abilities, the duration of the effect.
    #[serde(with = "fixed_serde")]
    pub build_time: Fixed,
    /// Objects that must exist before this one can start.
    pub prerequisites: Vec<ObjectId>,
    /// Production queues used.
    pub producers: Producers,
    /// Supply provided once complete.
    pub supply_capacity: i32,
    /// Economic roles.
    pub roles: Roles,
    /// Present when the object is a caster.
    pub energy: Option<EnergyProfile>,
    /// Special mechanics.
    pub special: Option<SpecialRole>,
}

impl ObjectDef {
    /// Create a new object definition with no costs and no requirements.
    #[must_use]
    pub fn new(name: impl Into<String>, race: Option<Race>, kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::new(0),
            name: name.into(),
            race,
            kind,
            cost: Cost::default(),
            build_time: Fixed::ZERO,
            prerequisites: Vec::new(),
            producers: Producers::default(),
            supply_capacity: 0,
            roles: Roles::default(),
            energy: None,
            special: None,
        }
    }

    /// A unit of `race`.
    #[must_use]
    pub fn unit(name: impl Into<String>, race: Race) -> Self {
        Self::new(name, Some(race), ObjectKind::Unit)
    }

    /// A structure of `race`.
    #[must_use]
    pub fn structure(name: impl Into<String>, race: Race) -> Self {
        Self::new(name, Some(race), ObjectKind::Structure)
    }

    /// An upgrade of `race`.
    #[must_use]
    pub fn upgrade(name: impl Into<String>, race: Race) -> Self {
        Self::new(name, Some(race), ObjectKind::Upgrade)
    }

    /// A morph of `race` turning the expended queues into `yields`.
    #[must_use]
    pub fn morph(name: impl Into<String>, race: Race, yields: Vec<Option<ObjectId>>) -> Self {
        let mut def = Self::new(name, Some(race), ObjectKind::Morph { yields });
        def.producers.needs_all = true;
        def
    }

    /// An ability of `race` cast by `caster`.
    #[must_use]
    pub fn ability(name: impl Into<String>, race: Race, caster: ObjectId) -> Self {
        Self::new(name, Some(race), ObjectKind::Ability { caster })
    }

    /// Set mineral and gas costs.
    #[must_use]
    pub fn with_cost(mut self, minerals: i32, gas: i32) -> Self {
        self.cost.minerals = minerals;
        self.cost.gas = gas;
        self
    }

    /// Set supply cost.
    #[must_use]
    pub fn with_supply(mut self, supply: i32) -> Self {
        self.cost.supply = supply;
        self
    }

    /// Set larva cost.
    #[must_use]
    pub fn with_larva(mut self, larva: u32) -> Self {
        self.cost.larva = larva;
        self
    }

    /// Set energy cost.
    #[must_use]
    pub fn with_energy_cost(mut self, energy: i32) -> Self {
        self.cost.energy = energy;
        self
    }

    /// Set build time in whole seconds.
    #[must_use]
    pub fn with_build_time(mut self, secs: i32) -> Self {
        self.build_time = Fixed::from_num(secs);
        self
    }

    /// Set prerequisites.
    #[must_use]
    pub fn with_prerequisites(mut self, prerequisites: Vec<ObjectId>) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    /// Set the production queues used.
    #[must_use]
    pub fn with_producers(mut self, types: Vec<ObjectId>) -> Self {
        self.producers.types = types;
        self
    }

    /// Set supply provided.
    #[must_use]
    pub fn with_supply_capacity(mut self, capacity: i32) -> Self {
        self.supply_capacity = capacity;
        self
    }

    /// Make this object a caster.
    #[must_use]
    pub fn with_energy(mut self, start: i32, max: i32) -> Self {
        self.energy = Some(EnergyProfile { start, max });
        self
    }

    /// Set economic roles.
    #[must_use]
    pub fn with_roles(mut self, roles: Roles) -> Self {
        self.roles = roles;
        self
    }

    /// Mark special mechanics.
    #[must_use]
    pub fn with_special(mut self, special: SpecialRole) -> Self {
        self.special = Some(special);
        self
    }

    /// Whether this is a morph.
    #[must_use]
    pub fn is_morph(&self) -> bool {
        matches!(self.kind, ObjectKind::Morph { .. })
    }

    /// Whether this is a structure.
    #[must_use]
    pub fn is_structure(&self) -> bool {
        matches!(self.kind, ObjectKind::Structure)
    }

    /// Whether this object has an energy bar.
    #[must_use]
    pub fn is_caster(&self) -> bool {
        self.energy.is_some()
    }

    /// Whether this object produces larvae once complete.
    #[must_use]
    pub fn spawns_larvae(&self) -> bool {
        self.roles.base && self.race == Some(Race::Zerg)
    }

    /// Whether this object has the given special role.
    #[must_use]
    pub fn is(&self, role: SpecialRole) -> bool {
        self.special == Some(role)
    }

    /// Queue types created by a morph.
    #[must_use]
    pub fn yields(&self) -> &[Option<ObjectId>] {
        match &self.kind {
            ObjectKind::Morph { yields } => yields,
            _ => &[],
        }
    }

    /// Caster type of an ability.
    #[must_use]
    pub fn caster(&self) -> Option<ObjectId> {
        match self.kind {
            ObjectKind::Ability { caster } => Some(caster),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
