//! Catalog file format.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{
    Catalog, Cost, EnergyProfile, ObjectDef, ObjectId, ObjectKind, Producers, Race, Roles, SpecialRole,
};
use crate::error::{BuildError, Result};
use crate::math::Fixed;

/// Kind of object, with references by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KindData {
    /// A unit.
    Unit,
    /// A structure.
    Structure,
    /// A research upgrade.
    Upgrade,
    /// A morph yielding these queue types; `None` destroys a queue.
    Morph(Vec<Option<String>>),
    /// An ability cast by the named caster.
    Ability(String),
}

/// One buildable object.
///
/// # Example RON
///
/// ```ron
/// (
///     name: "Probe",
///     race: Some(Protoss),
///     kind: Unit,
///     minerals: 50,
///     supply: 1,
///     build_time: 17,
///     producers: ["Nexus"],
///     roles: (worker: true),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectData {
    /// Display name, unique ignoring case.
    pub name: String,
    /// Owning race.
    #[serde(default)]
    pub race: Option<Race>,
    /// Kind of object.
    pub kind: KindData,
    /// Mineral cost.
    #[serde(default)]
    pub minerals: i32,
    /// Gas cost.
    #[serde(default)]
    pub gas: i32,
    /// Larva cost.
    #[serde(default)]
    pub larva: u32,
    /// Supply cost.
    #[serde(default)]
    pub supply: i32,
    /// Energy cost.
    #[serde(default)]
    pub energy: i32,
    /// Build time in whole seconds.
    #[serde(default)]
    pub build_time: i32,
    /// Names of objects needed first.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Names of the production queue types used.
    #[serde(default)]
    pub producers: Vec<String>,
    /// Whether one queue of every type is needed. Morphs default to yes.
    #[serde(default)]
    pub needs_all: Option<bool>,
    /// Supply provided.
    #[serde(default)]
    pub supply_capacity: i32,
    /// Economic roles.
    #[serde(default)]
    pub roles: Roles,
    /// Energy bar, for casters.
    #[serde(default)]
    pub caster: Option<EnergyProfile>,
    /// Special mechanics.
    #[serde(default)]
    pub special: Option<SpecialRole>,
}

/// A whole catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogData {
    /// Objects in registration order.
    pub objects: Vec<ObjectData>,
}

impl CatalogData {
    /// Parse RON text read from `origin`.
    pub fn from_ron(text: &str, origin: &str) -> Result<Self> {
        super::from_ron(text, origin)
    }

    /// Resolve names and build the catalog.
    ///
    /// The catalog is validated; any problem is returned as an error.
    pub fn resolve(&self) -> Result<Catalog> {
        let catalog = self.build()?;
        let problems = catalog.validate();
        if let Some(first) = problems.first() {
            return Err(BuildError::InvalidState(format!(
                "catalog has {} problem(s), first: {first}",
                problems.len()
            )));
        }
        tracing::debug!(objects = catalog.len(), "catalog resolved");
        Ok(catalog)
    }

    /// Resolve names into a catalog without validating it.
    ///
    /// Only unknown names are errors here; everything else is left to
    /// [`Catalog::validate`].
    pub fn build(&self) -> Result<Catalog> {
        let mut ids: HashMap<String, ObjectId> = HashMap::new();
        for (index, object) in self.objects.iter().enumerate() {
            let index = u16::try_from(index)
                .map_err(|_| BuildError::InvalidState("catalog holds too many objects".into()))?;
            ids.insert(object.name.to_lowercase(), ObjectId::new(index));
        }
        let resolve = |name: &str| {
            ids.get(&name.to_lowercase())
                .copied()
                .ok_or_else(|| BuildError::UnknownObject(name.to_string()))
        };
        let resolve_all = |names: &[String]| names.iter().map(|n| resolve(n)).collect::<Result<Vec<_>>>();

        let mut catalog = Catalog::new();
        for object in &self.objects {
            let kind = match &object.kind {
                KindData::Unit => ObjectKind::Unit,
                KindData::Structure => ObjectKind::Structure,
                KindData::Upgrade => ObjectKind::Upgrade,
                KindData::Morph(yields) => ObjectKind::Morph {
                    yields: yields
                        .iter()
                        .map(|name| name.as_deref().map(resolve).transpose())
                        .collect::<Result<_>>()?,
                },
                KindData::Ability(caster) => ObjectKind::Ability { caster: resolve(caster)? },
            };
            let needs_all = object
                .needs_all
                .unwrap_or(matches!(kind, ObjectKind::Morph { .. }));

            let mut def = ObjectDef::new(object.name.clone(), object.race, kind);
            def.cost = Cost {
                minerals: object.minerals,
                gas: object.gas,
                larva: object.larva,
                supply: object.supply,
                energy: object.energy,
            };
            def.build_time = Fixed::from_num(object.build_time);
            def.prerequisites = resolve_all(&object.prerequisites)?;
            def.producers = Producers {
                types: resolve_all(&object.producers)?,
                needs_all,
            };
            def.supply_capacity = object.supply_capacity;
            def.roles = object.roles;
            def.energy = object.caster;
            def.special = object.special;
            catalog.register(def);
        }
        Ok(catalog)
    }
}
