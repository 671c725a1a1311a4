//! Material tables loaded from RON
//!
//! A table lists material definitions and reaction rules. Loading validates
//! the whole table up front so that an unknown id can never reach the grid.

use ahash::HashSet;
use serde::{Deserialize, Serialize};

use crate::materials::MAX_MATERIAL_ID;
use crate::{
    AIR_DENSITY, ConfigError, EndOfLife, MaterialDef, MaterialId, MaterialType, Materials,
    Reaction,
};

/// Serializable description of a material registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialTable {
    pub materials: Vec<MaterialDef>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl MaterialTable {
    /// Parse a table from RON text without validating it
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    /// Check ids, properties and references; air may be omitted
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut ids = HashSet::default();
        ids.insert(MaterialId::AIR);

        for material in &self.materials {
            if material.id == MaterialId::AIR {
                if material.material_type != MaterialType::Empty
                    || material.density != AIR_DENSITY
                {
                    return Err(ConfigError::AirRedefined);
                }
                continue;
            }
            if material.material_type == MaterialType::Empty {
                return Err(ConfigError::AirRedefined);
            }
            if material.id > MAX_MATERIAL_ID {
                return Err(ConfigError::InvalidProperty {
                    id: material.id,
                    property: "id",
                    value: material.id as f32,
                });
            }
            if !ids.insert(material.id) {
                return Err(ConfigError::DuplicateMaterial { id: material.id });
            }
            validate_properties(material)?;
        }

        for material in &self.materials {
            if let EndOfLife::Chance { into, .. } = material.end_of_life
                && !ids.contains(&into)
            {
                return Err(ConfigError::UnknownMaterial {
                    id: into,
                    context: format!("end of life of '{}'", material.name),
                });
            }
        }

        for reaction in &self.reactions {
            let mut referenced = vec![reaction.owner, reaction.other];
            if let Some((dst, src)) = reaction.outcome.products() {
                referenced.push(dst);
                referenced.push(src);
            }
            if let Some(&id) = referenced.iter().find(|id| !ids.contains(id)) {
                return Err(ConfigError::UnknownMaterial {
                    id,
                    context: format!("reaction {} + {}", reaction.owner, reaction.other),
                });
            }
        }

        Ok(())
    }
}

fn validate_properties(material: &MaterialDef) -> Result<(), ConfigError> {
    let invalid = |property: &'static str, value: f32| ConfigError::InvalidProperty {
        id: material.id,
        property,
        value,
    };

    if !(material.density >= 0.0) {
        return Err(invalid("density", material.density));
    }
    if !(0.0..=1.0).contains(&material.viscosity) {
        return Err(invalid("viscosity", material.viscosity));
    }
    if let Some(decay) = material.boundary_decay
        && !(0.0..=1.0).contains(&decay)
    {
        return Err(invalid("boundary_decay", decay));
    }
    if let EndOfLife::Chance { probability, .. } = material.end_of_life
        && !(0.0..=1.0).contains(&probability)
    {
        return Err(invalid("end_of_life probability", probability));
    }
    Ok(())
}

impl Materials {
    /// Build a registry from a validated table
    pub fn from_table(table: MaterialTable) -> Result<Self, ConfigError> {
        table.validate()?;

        let mut materials = Materials::empty();
        for material in table.materials {
            if material.id != MaterialId::AIR {
                materials.register(material);
            }
        }
        for reaction in table.reactions {
            materials.reactions_mut().register(reaction);
        }

        log::info!(
            "Loaded material table: {} materials, {} reactions",
            materials.len(),
            materials.reactions().len()
        );
        Ok(materials)
    }

    /// Parse and validate a RON material table
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Self::from_table(MaterialTable::from_ron_str(source)?)
    }

    /// Export the registry as a table (air included)
    pub fn to_table(&self) -> MaterialTable {
        let mut reactions: Vec<Reaction> = self.reactions().iter().collect();
        reactions.sort_by_key(|r| (r.owner, r.other));
        MaterialTable {
            materials: self.iter().cloned().collect(),
            reactions,
        }
    }
}
