use std::collections::BTreeMap;
use std::ops::Deref;

use serde::Serialize;
use tracing::debug;

use super::avatar::AvatarTemplate;
use super::grid::AsciiMap;
use super::prefab::{Position, Prefab, PrefabLibrary};
use crate::error::ConfigurationError;

/// Template placed next to every object that can hold an item, and bound to every player.
pub const INVENTORY_PREFAB: &str = "inventory";
/// Template placed over every object that cooks.
pub const PROGRESS_PREFAB: &str = "loading_bar";

/// What a map character stands for: one prefab, or several stacked on the same cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CharPrefab {
    One(String),
    All(AllOf),
}

/// Serialized as `{"type": "all", "list": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "all")]
pub struct AllOf {
    pub list: Vec<String>,
}

impl CharPrefab {
    pub fn one(name: &str) -> Self {
        CharPrefab::One(name.to_string())
    }

    pub fn all(names: &[&str]) -> Self {
        CharPrefab::All(AllOf {
            list: names.iter().map(|n| n.to_string()).collect(),
        })
    }

    pub fn names(&self) -> &[String] {
        match self {
            CharPrefab::One(name) => std::slice::from_ref(name),
            CharPrefab::All(all) => &all.list,
        }
    }
}

pub type CharPrefabMap = BTreeMap<char, CharPrefab>;

/// A placed game object. Owns its own copy of the prefab it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Entity(Prefab);

impl Deref for Entity {
    type Target = Prefab;

    fn deref(&self) -> &Prefab {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    pub map: String,
    pub game_objects: Vec<Entity>,
    pub prefabs: PrefabLibrary,
    pub char_prefab_map: CharPrefabMap,
    /// Non-physical object holding level-wide logic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<Entity>,
}

/// Everything the engine needs to run a level.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescription {
    pub level_name: String,
    pub level_directory: String,
    pub num_players: usize,
    pub episode_length_frames: u32,
    pub sprite_size: u32,
    pub simulation: Simulation,
    #[serde(skip)]
    grid: (usize, usize),
}

impl SceneDescription {
    /// `(width, height)` of the map.
    pub fn grid(&self) -> (usize, usize) {
        self.grid
    }

    pub fn avatars(&self) -> impl Iterator<Item = &Entity> {
        self.simulation
            .game_objects
            .iter()
            .filter(|e| e.avatar().is_some())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Turns an ASCII map into the game objects of a level: item companions of
/// the map objects, then one avatar per player, each followed by its bound
/// inventory when the level has one.
pub struct SceneCompiler<'a> {
    pub level_name: &'a str,
    pub level_directory: &'a str,
    pub prefabs: &'a PrefabLibrary,
    pub char_prefab_map: &'a CharPrefabMap,
    pub avatar: &'a AvatarTemplate,
    /// Prefab cloned and bound to every player.
    pub player_inventory: Option<&'a str>,
    pub scene: Option<&'a Prefab>,
}

impl<'a> SceneCompiler<'a> {
    pub fn compile(
        &self,
        ascii_map: &str,
        player_count: usize,
        episode_length: u32,
        sprite_size: u32,
    ) -> Result<SceneDescription, ConfigurationError> {
        if player_count == 0 {
            return Err(ConfigurationError::InvalidPlayerCount {
                count: player_count,
                reason: "a level needs at least one player",
            });
        }
        let grid = AsciiMap::parse(ascii_map)?;
        for prefab in self.prefabs.values() {
            prefab.validate()?;
        }
        if let Some((row, column, character)) = grid
            .cells()
            .find(|(_, _, c)| !self.char_prefab_map.contains_key(c))
        {
            return Err(ConfigurationError::UnknownCharacter {
                character,
                row,
                column,
            });
        }

        // Map characters are placed by the engine from `map` and `charPrefabMap`.
        // Only their companions are emitted here.
        let mut game_objects = vec![];
        for (character, entry) in self.char_prefab_map {
            for name in entry.names() {
                let prefab = self.prefab(name)?;
                for (row, column) in grid.positions(*character) {
                    let position = Position {
                        x: column as i64,
                        y: row as i64,
                    };
                    if prefab.has_container() {
                        let inventory = self.prefab(INVENTORY_PREFAB)?;
                        game_objects.push(self.place(inventory, position, &grid)?);
                    }
                    if prefab.has_cooking_pot() {
                        let progress = self.prefab(PROGRESS_PREFAB)?;
                        game_objects.push(self.place(progress, position, &grid)?);
                    }
                }
            }
        }

        let inventory = self.player_inventory.map(|n| self.prefab(n)).transpose()?;
        for player in 1..=player_count {
            let avatar = self.avatar.instantiate(player);
            avatar.validate()?;
            game_objects.push(Entity(avatar));

            if let Some(inventory) = inventory {
                let mut bound = inventory.clone();
                bound
                    .inventory_mut()
                    .ok_or_else(|| ConfigurationError::MissingComponent {
                        prefab: inventory.name.clone(),
                        component: "Inventory",
                    })?
                    .player_index = player as i64;
                game_objects.push(Entity(bound));
            }
        }

        if let Some(scene) = self.scene {
            scene.validate()?;
        }

        debug!(
            level = self.level_name,
            width = grid.width(),
            height = grid.height(),
            players = player_count,
            objects = game_objects.len(),
            "compiled scene"
        );
        Ok(SceneDescription {
            level_name: self.level_name.to_string(),
            level_directory: self.level_directory.to_string(),
            num_players: player_count,
            episode_length_frames: episode_length,
            sprite_size,
            simulation: Simulation {
                map: grid.to_map_string(),
                game_objects,
                prefabs: self.prefabs.clone(),
                char_prefab_map: self.char_prefab_map.clone(),
                scene: self.scene.cloned().map(Entity),
            },
            grid: (grid.width(), grid.height()),
        })
    }

    fn prefab(&self, name: &str) -> Result<&'a Prefab, ConfigurationError> {
        self.prefabs
            .get(name)
            .ok_or_else(|| ConfigurationError::MissingPrefab(name.to_string()))
    }

    fn place(
        &self,
        prefab: &Prefab,
        position: Position,
        grid: &AsciiMap,
    ) -> Result<Entity, ConfigurationError> {
        if !grid.contains(position.x, position.y) {
            return Err(ConfigurationError::OutOfBounds {
                x: position.x,
                y: position.y,
                width: grid.width(),
                height: grid.height(),
            });
        }
        let mut entity = prefab.clone();
        entity
            .transform_mut()
            .ok_or_else(|| ConfigurationError::MissingComponent {
                prefab: prefab.name.clone(),
                component: "Transform",
            })?
            .position = position;
        Ok(Entity(entity))
    }
}
