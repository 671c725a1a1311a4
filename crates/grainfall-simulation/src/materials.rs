//! Material definitions and registry

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ReactionOutcome, ReactionRegistry};

/// Density of air; everything heavier sinks through it
pub const AIR_DENSITY: f32 = 0.1;

/// Density assumed for the grid edge, so cells at the border rest on it
pub const BOUNDARY_DENSITY: f32 = 1000.0;

/// Scales horizontal fluid spread
pub const GRAVITY: f32 = 1.0;

/// Highest material id a table may register
pub const MAX_MATERIAL_ID: u16 = 1023;

/// Built-in material IDs
pub struct MaterialId;

impl MaterialId {
    pub const AIR: u16 = 0;
    pub const SAND: u16 = 1;
    pub const WATER: u16 = 2;
    pub const STEAM: u16 = 3;
    pub const LAVA: u16 = 4;
    pub const STONE: u16 = 5;
    pub const MUD: u16 = 6;
    pub const WALL: u16 = 7;
}

/// How a material behaves physically
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialType {
    /// Air only; never updated
    Empty,
    /// Doesn't move (walls)
    Solid,
    /// Falls, piles up (sand, stone)
    #[default]
    Powder,
    /// Falls, then spreads sideways (water, lava, mud, steam)
    Fluid,
}

/// What a cell turns into once its age exceeds the material's lifespan
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum EndOfLife {
    /// Becomes air
    #[default]
    Vanish,
    /// Becomes `into` with `probability`, air otherwise
    Chance { into: u16, probability: f32 },
}

/// Definition of a material's properties
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDef {
    pub id: u16,
    pub name: String,
    pub material_type: MaterialType,

    /// Comparative density - decides sinking, floating and fall speed
    pub density: f32,
    /// Probability of not spreading in a tick (fluids)
    pub viscosity: f32,

    // Rigid-body properties, carried but unused by the grid
    pub friction: f32,
    pub elasticity: f32,

    /// Ticks until end of life (None = immortal)
    pub lifespan: Option<u16>,
    pub end_of_life: EndOfLife,

    /// Travels up instead of down
    pub buoyant: bool,
    /// Chance per tick to expire early while resting against the grid edge
    pub boundary_decay: Option<f32>,
    /// Fluids only: levels out sideways whenever it stays in its row
    pub spreads: bool,
}

impl Default for MaterialDef {
    fn default() -> Self {
        Self {
            id: 0,
            name: "unknown".to_string(),
            material_type: MaterialType::Powder,
            density: 1.0,
            viscosity: 0.5,
            friction: 0.5,
            elasticity: 0.5,
            lifespan: None,
            end_of_life: EndOfLife::Vanish,
            buoyant: false,
            boundary_decay: None,
            spreads: true,
        }
    }
}

impl MaterialDef {
    pub fn is_fluid(&self) -> bool {
        self.material_type == MaterialType::Fluid
    }

    pub fn is_solid(&self) -> bool {
        self.material_type == MaterialType::Solid
    }

    /// Whether the spread pass moves this material
    pub fn levels_out(&self) -> bool {
        self.is_fluid() && self.spreads
    }

    /// Row offset of one step in the travel direction (+1 down, -1 up)
    pub fn travel_dir(&self) -> i32 {
        if self.buoyant { -1 } else { 1 }
    }

    /// Whether this material sinks past (or rises past) the given density
    pub fn moves_through(&self, density: f32) -> bool {
        if self.buoyant {
            self.density < density
        } else {
            self.density > density
        }
    }

    fn air() -> Self {
        Self {
            id: MaterialId::AIR,
            name: "air".to_string(),
            material_type: MaterialType::Empty,
            density: AIR_DENSITY,
            viscosity: 0.0,
            friction: 0.0,
            elasticity: 0.0,
            ..Default::default()
        }
    }
}

/// Registry of all materials and their reaction rules
pub struct Materials {
    materials: Vec<Option<MaterialDef>>,
    air: MaterialDef,
    reactions: ReactionRegistry,
}

impl Materials {
    pub fn new() -> Self {
        let mut materials = Self::empty();
        materials.register_defaults();
        materials.reactions = ReactionRegistry::new();
        materials
    }

    /// Registry holding only air and no reactions
    pub(crate) fn empty() -> Self {
        let mut materials = Self {
            materials: Vec::new(),
            air: MaterialDef::air(),
            reactions: ReactionRegistry::empty(),
        };
        materials.register(MaterialDef::air());
        materials
    }

    fn register_defaults(&mut self) {
        // Sand
        self.register(MaterialDef {
            id: MaterialId::SAND,
            name: "sand".to_string(),
            material_type: MaterialType::Powder,
            density: 1.5,
            friction: 0.7,
            elasticity: 0.3,
            ..Default::default()
        });

        // Water
        self.register(MaterialDef {
            id: MaterialId::WATER,
            name: "water".to_string(),
            material_type: MaterialType::Fluid,
            density: 1.0,
            viscosity: 0.3,
            ..Default::default()
        });

        // Steam - rises, condenses or dissipates after a second
        self.register(MaterialDef {
            id: MaterialId::STEAM,
            name: "steam".to_string(),
            material_type: MaterialType::Fluid,
            density: 0.05,
            viscosity: 0.1,
            lifespan: Some(60),
            end_of_life: EndOfLife::Chance {
                into: MaterialId::WATER,
                probability: 0.2,
            },
            buoyant: true,
            boundary_decay: Some(0.1),
            // Waits under a ceiling instead of drifting along it
            spreads: false,
            ..Default::default()
        });

        // Lava
        self.register(MaterialDef {
            id: MaterialId::LAVA,
            name: "lava".to_string(),
            material_type: MaterialType::Fluid,
            density: 2.5,
            viscosity: 0.5,
            ..Default::default()
        });

        // Stone - very dense powder
        self.register(MaterialDef {
            id: MaterialId::STONE,
            name: "stone".to_string(),
            material_type: MaterialType::Powder,
            density: 100.0,
            friction: 0.9,
            elasticity: 0.1,
            ..Default::default()
        });

        // Mud
        self.register(MaterialDef {
            id: MaterialId::MUD,
            name: "mud".to_string(),
            material_type: MaterialType::Fluid,
            density: 2.0,
            viscosity: 0.9,
            ..Default::default()
        });

        // Wall - immovable container material
        self.register(MaterialDef {
            id: MaterialId::WALL,
            name: "wall".to_string(),
            material_type: MaterialType::Solid,
            density: BOUNDARY_DENSITY,
            friction: 1.0,
            elasticity: 0.0,
            ..Default::default()
        });
    }

    /// Insert a definition without validation (callers validate first)
    pub(crate) fn register(&mut self, material: MaterialDef) {
        let id = material.id as usize;

        if self.materials.len() <= id {
            self.materials.resize(id + 1, None);
        }

        self.materials[id] = Some(material);
    }

    pub(crate) fn reactions_mut(&mut self) -> &mut ReactionRegistry {
        &mut self.reactions
    }

    /// Get material definition by ID
    ///
    /// Ids are validated when tables load and cells are painted, so an
    /// unregistered id only shows up through a bug; it reads as air.
    pub fn get(&self, id: u16) -> &MaterialDef {
        match self.materials.get(id as usize) {
            Some(Some(material)) => material,
            _ => &self.air,
        }
    }

    /// Get material definition by ID, reporting unregistered ids
    pub fn lookup(&self, id: u16) -> Result<&MaterialDef, ConfigError> {
        match self.materials.get(id as usize) {
            Some(Some(material)) => Ok(material),
            _ => Err(ConfigError::UnknownMaterial {
                id,
                context: "lookup".to_string(),
            }),
        }
    }

    pub fn contains(&self, id: u16) -> bool {
        matches!(self.materials.get(id as usize), Some(Some(_)))
    }

    /// Find a material by its (case-insensitive) name
    pub fn find_by_name(&self, name: &str) -> Result<&MaterialDef, ConfigError> {
        self.iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownMaterialName(name.to_string()))
    }

    /// Registered materials in id order
    pub fn iter(&self) -> impl Iterator<Item = &MaterialDef> {
        self.materials.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rule of `owner` when it meets `other`
    pub fn react(&self, owner: u16, other: u16) -> ReactionOutcome {
        self.reactions.react(owner, other)
    }

    pub fn reactions(&self) -> &ReactionRegistry {
        &self.reactions
    }
}

impl Default for Materials {
    fn default() -> Self {
        Self::new()
    }
}
