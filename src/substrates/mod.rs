//! Registry of the substrates this crate can build.

pub mod clean_up;
pub mod collaborative_cooking;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{ConfigurationError, Result};
use crate::low_level::{Engine, MultiplayerWrapper, PlayerAction};
use crate::scene::{
    AvatarTemplate, CharPrefabMap, Prefab, PrefabLibrary, SceneCompiler, SceneDescription,
};

pub const SUBSTRATES: &[&str] = &[
    clean_up::NAME,
    "collaborative_cooking_impassable",
    "collaborative_cooking_passable",
];

/// Settings of a level that can be overridden at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LevelSettings {
    pub num_players: usize,
    pub episode_length_frames: u32,
    pub sprite_size: u32,
    pub map: String,
}

/// The fixed, data-only part of a substrate.
#[derive(Debug, Clone)]
pub struct Level {
    pub level_name: String,
    pub level_directory: String,
    pub prefabs: PrefabLibrary,
    pub char_prefab_map: CharPrefabMap,
    pub avatar: AvatarTemplate,
    /// Prefab bound to every player, if players carry items.
    pub player_inventory: Option<String>,
    pub scene: Option<Prefab>,
}

#[derive(Debug, Clone)]
pub struct SubstrateConfig {
    pub name: String,
    pub settings: LevelSettings,
    /// Discrete actions a policy can choose from, each a complete player action.
    pub action_set: Vec<PlayerAction>,
    pub individual_observation_names: Vec<String>,
    pub global_observation_names: Vec<String>,
    pub level: Level,
}

pub fn get_config(name: &str) -> Result<SubstrateConfig, ConfigurationError> {
    if name == clean_up::NAME {
        return clean_up::get_config();
    }
    match name.strip_prefix("collaborative_cooking_") {
        Some(map) if SUBSTRATES.contains(&name) => collaborative_cooking::get_config(map),
        _ => Err(ConfigurationError::UnknownSubstrate(name.to_string())),
    }
}

impl SubstrateConfig {
    /// Merges the keys of a JSON object into the level settings.
    ///
    /// Unknown keys and ill-typed values are rejected.
    pub fn with_overrides(mut self, overrides: &Value) -> Result<Self, ConfigurationError> {
        let overrides = overrides.as_object().ok_or_else(|| {
            <serde_json::Error as serde::de::Error>::custom("settings must be a JSON object")
        })?;
        let mut settings = serde_json::to_value(&self.settings)?;
        if let Value::Object(base) = &mut settings {
            for (key, value) in overrides {
                base.insert(key.clone(), value.clone());
            }
        }
        self.settings = serde_json::from_value(settings)?;
        Ok(self)
    }

    pub fn compile(&self) -> Result<SceneDescription, ConfigurationError> {
        SceneCompiler {
            level_name: &self.level.level_name,
            level_directory: &self.level.level_directory,
            prefabs: &self.level.prefabs,
            char_prefab_map: &self.level.char_prefab_map,
            avatar: &self.level.avatar,
            player_inventory: self.level.player_inventory.as_deref(),
            scene: self.level.scene.as_ref(),
        }
        .compile(
            &self.settings.map,
            self.settings.num_players,
            self.settings.episode_length_frames,
            self.settings.sprite_size,
        )
    }

    /// Compiles the level and starts an engine on it.
    pub fn build<E, F>(&self, builder: F) -> Result<MultiplayerWrapper<E>>
    where
        E: Engine,
        F: FnOnce(&SceneDescription) -> anyhow::Result<E>,
    {
        let scene = self.compile()?;
        info!(
            substrate = %self.name,
            players = scene.num_players,
            episode_length = scene.episode_length_frames,
            "building substrate"
        );
        let engine = builder(&scene)?;
        let individual: Vec<&str> = self
            .individual_observation_names
            .iter()
            .map(|s| s.as_str())
            .collect();
        let global: Vec<&str> = self
            .global_observation_names
            .iter()
            .map(|s| s.as_str())
            .collect();
        Ok(MultiplayerWrapper::new(engine, &individual, &global)?)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::low_level::{HeadlessEngine, Substrate};

    #[test]
    fn test_registered_substrates_build() {
        for name in SUBSTRATES {
            let config = get_config(name).unwrap();
            assert_eq!(config.name, *name);
            let env = config
                .build(|scene| Ok(HeadlessEngine::new(scene)?))
                .unwrap();
            assert_eq!(env.num_players(), config.settings.num_players);
        }
    }

    #[test]
    fn test_unknown_substrate() {
        assert!(matches!(
            get_config("collaborative_cooking_crowded"),
            Err(ConfigurationError::UnknownSubstrate(_))
        ));
        assert!(matches!(
            get_config("territory_open"),
            Err(ConfigurationError::UnknownSubstrate(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = get_config("collaborative_cooking_passable")
            .unwrap()
            .with_overrides(&json!({ "numPlayers": 2, "episodeLengthFrames": 50 }))
            .unwrap();
        assert_eq!(config.settings.num_players, 2);
        assert_eq!(config.settings.episode_length_frames, 50);
        assert_eq!(config.settings.sprite_size, 8);
        assert_eq!(config.compile().unwrap().avatars().count(), 2);
    }

    #[test]
    fn test_bad_overrides() {
        let config = || get_config("collaborative_cooking_passable").unwrap();
        for overrides in [
            json!({ "gravity": 1 }),
            json!({ "numPlayers": "four" }),
            json!([1, 2]),
        ] {
            assert!(matches!(
                config().with_overrides(&overrides),
                Err(ConfigurationError::InvalidSettings(_))
            ));
        }
    }
}
