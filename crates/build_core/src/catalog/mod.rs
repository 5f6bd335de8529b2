//! Read-only catalog of buildable objects.
//!
//! The catalog is built once, validated, and then passed by shared
//! reference to everything that needs object data. Objects are addressed
//! by [`ObjectId`], which is the object's index in the table.

mod object;

use std::collections::HashMap;

pub use object::{
    Cost, EnergyProfile, ObjectDef, ObjectId, ObjectKind, Producers, Race, Roles, SpecialRole,
};

use crate::error::{BuildError, Result};
use crate::math::Fixed;

/// Immutable table of object definitions.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    objects: Vec<ObjectDef>,
    by_name: HashMap<String, ObjectId>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and return its identifier.
    pub fn register(&mut self, mut def: ObjectDef) -> ObjectId {
        let id = ObjectId::new(self.objects.len() as u16);
        def.id = id;
        self.by_name.insert(def.name.to_lowercase(), id);
        self.objects.push(def);
        id
    }

    /// Look up an object by identifier.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&ObjectDef> {
        self.objects.get(id.index())
    }

    /// Look up an object known to be in this catalog.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this catalog.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> &ObjectDef {
        &self.objects[id.index()]
    }

    /// Display name of an object.
    #[must_use]
    pub fn name(&self, id: ObjectId) -> &str {
        self.get(id).map_or("?", |def| def.name.as_str())
    }

    /// Find an object by name, ignoring case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ObjectDef> {
        self.by_name
            .get(&name.to_lowercase())
            .and_then(|id| self.get(*id))
    }

    /// Resolve a name to an identifier.
    pub fn lookup(&self, name: &str) -> Result<ObjectId> {
        self.find(name)
            .map(|def| def.id)
            .ok_or_else(|| BuildError::UnknownObject(name.to_string()))
    }

    /// All objects in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ObjectDef> {
        self.objects.iter()
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the catalog has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn designated(&self, race: Race, role: impl Fn(&Roles) -> bool) -> Option<&ObjectDef> {
        self.objects
            .iter()
            .find(|def| def.race == Some(race) && role(&def.roles))
    }

    /// The race's town hall.
    #[must_use]
    pub fn base(&self, race: Race) -> Option<&ObjectDef> {
        self.designated(race, |r| r.base)
    }

    /// The race's worker.
    #[must_use]
    pub fn worker(&self, race: Race) -> Option<&ObjectDef> {
        self.designated(race, |r| r.worker)
    }

    /// The race's gas extraction point.
    #[must_use]
    pub fn extractor(&self, race: Race) -> Option<&ObjectDef> {
        self.designated(race, |r| r.extractor)
    }

    /// The race's production booster.
    #[must_use]
    pub fn booster(&self, race: Race) -> Option<&ObjectDef> {
        self.designated(race, |r| r.booster)
    }

    /// The object carrying a special mechanic.
    #[must_use]
    pub fn special(&self, role: SpecialRole) -> Option<&ObjectDef> {
        self.objects.iter().find(|def| def.is(role))
    }

    /// Check every cross reference in the catalog.
    ///
    /// Returns a list of problems; an empty list means the catalog is
    /// safe to hand to the engine.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let known = |id: ObjectId| id.index() < self.objects.len();

        let mut seen = HashMap::new();
        for def in &self.objects {
            if let Some(previous) = seen.insert(def.name.to_lowercase(), def.id) {
                errors.push(format!(
                    "{} is defined twice (#{} and #{})",
                    def.name,
                    previous.index(),
                    def.id.index()
                ));
            }

            for id in def.prerequisites.iter().chain(&def.producers.types) {
                if !known(*id) {
                    errors.push(format!("{} references unknown object #{}", def.name, id.index()));
                }
            }
            for id in def.yields().iter().flatten() {
                if !known(*id) {
                    errors.push(format!("{} yields unknown object #{}", def.name, id.index()));
                }
            }

            if let Some(caster) = def.caster() {
                match self.get(caster) {
                    Some(c) if c.is_caster() => {}
                    Some(c) => errors.push(format!("{} is cast by {}, which has no energy", def.name, c.name)),
                    None => errors.push(format!("{} is cast by unknown object #{}", def.name, caster.index())),
                }
            } else if def.cost.energy > 0 {
                errors.push(format!("{} costs energy but has no caster", def.name));
            }

            if def.build_time < Fixed::ZERO {
                errors.push(format!("{} has a negative build time", def.name));
            }
        }

        for race in [Race::Protoss, Race::Terran, Race::Zerg] {
            if !self.objects.iter().any(|def| def.race == Some(race)) {
                continue;
            }
            if self.base(race).is_none() {
                errors.push(format!("{race} has no designated base"));
            }
            if self.worker(race).is_none() {
                errors.push(format!("{race} has no designated worker"));
            }
        }

        errors
    }
}
