use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::shapes::{Palette, Rgba, SpriteShape};
use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Orientation {
    #[default]
    N,
    E,
    S,
    W,
}

/// Grid coordinate. `x` is the column, `y` the row. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "(i64, i64)")]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl From<Position> for (i64, i64) {
    fn from(p: Position) -> Self {
        (p.x, p.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RenderMode {
    #[default]
    #[serde(rename = "ascii_shape")]
    AsciiShape,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateConfig {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl StateConfig {
    pub fn new(state: &str) -> Self {
        StateConfig {
            state: state.to_string(),
            ..Default::default()
        }
    }

    pub fn layer(mut self, layer: &str) -> Self {
        self.layer = Some(layer.to_string());
        self
    }

    pub fn sprite(mut self, sprite: &str) -> Self {
        self.sprite = Some(sprite.to_string());
        self
    }

    pub fn groups(mut self, groups: &[&str]) -> Self {
        self.groups = groups.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn contact(mut self, contact: &str) -> Self {
        self.contact = Some(contact.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateManager {
    pub initial_state: String,
    pub state_configs: Vec<StateConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub position: Position,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appearance {
    pub render_mode: RenderMode,
    pub sprite_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sprite_shapes: Vec<SpriteShape>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub palettes: Vec<Palette>,
    /// Either one flag for all sprites, or one per sprite.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub no_rotates: Vec<bool>,
    /// Flat colors, used instead of shapes and palettes.
    #[serde(rename = "spriteRGBColors", skip_serializing_if = "Vec::is_empty")]
    pub sprite_rgb_colors: Vec<Rgba>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalSprites {
    pub render_mode: RenderMode,
    pub custom_sprite_names: Vec<String>,
    pub custom_sprite_shapes: Vec<SpriteShape>,
    pub custom_palettes: Vec<Palette>,
    pub custom_no_rotates: Vec<bool>,
}

/// Inclusive range of one sub-action and its no-op value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRange {
    pub default: i64,
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub left: u32,
    pub right: u32,
    pub forward: u32,
    pub backward: u32,
    pub centered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    /// 1-based player slot.
    pub index: usize,
    pub spawn_group: String,
    pub alive_state: String,
    pub wait_state: String,
    pub speed: f64,
    pub action_order: Vec<String>,
    pub action_spec: BTreeMap<String, ActionRange>,
    pub view: View,
    /// Substitutes a player's own sprite with the canonical self sprite in its view.
    pub sprite_map: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    /// 1-based player slot, -1 while unbound.
    pub player_index: i64,
    pub empty_state: String,
    pub wait_state: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_item: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub infinite: bool,
    pub reward: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receiver {
    pub accepted_items: String,
    pub reward: f64,
    pub global_reward: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CookingPot {
    pub accepted_items: Vec<String>,
    pub cooking_time: u32,
    pub reward: f64,
    pub custom_state_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingBarVisualiser {
    pub total_time: u32,
    pub custom_state_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractBeam {
    pub cooldown_time: u32,
    pub shapes: Vec<SpriteShape>,
    pub palettes: Vec<Palette>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationObserver {
    pub object_is_avatar: bool,
    pub also_report_orientation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamBlocker {
    pub beam_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edible {
    pub live_state: String,
    pub wait_state: String,
    pub reward_for_eating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleGrow {
    pub max_apple_growth_rate: f64,
    pub threshold_depletion: f64,
    pub threshold_restoration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirtTracker {
    pub active_state: String,
    pub inactive_state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirtCleaning {}

/// Cycles through `states`, advancing every `game_frames_per_animation_frame` frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    pub states: Vec<String>,
    pub game_frames_per_animation_frame: u32,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub random_start_frame: bool,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Zapper {
    pub cooldown_time: u32,
    pub beam_length: u32,
    pub beam_radius: u32,
    pub frames_till_respawn: u32,
    pub penalty_for_being_zapped: f64,
    pub reward_for_zapping: f64,
    pub remove_hit_player: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cleaner {
    pub cooldown_time: u32,
    pub beam_length: u32,
    pub beam_radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Taste {
    pub role: String,
    pub reward_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiverMonitor {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirtSpawner {
    pub dirt_spawn_probability: f64,
    pub delay_start_of_dirt_spawning: u32,
}

/// A component with its constructor arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "component", content = "kwargs")]
pub enum Component {
    StateManager(StateManager),
    Transform(Transform),
    Appearance(Appearance),
    AdditionalSprites(AdditionalSprites),
    Avatar(Avatar),
    Inventory(Inventory),
    Container(Container),
    Receiver(Receiver),
    CookingPot(CookingPot),
    LoadingBarVisualiser(LoadingBarVisualiser),
    InteractBeam(InteractBeam),
    LocationObserver(LocationObserver),
    BeamBlocker(BeamBlocker),
    Edible(Edible),
    AppleGrow(AppleGrow),
    DirtTracker(DirtTracker),
    DirtCleaning(DirtCleaning),
    Animation(Animation),
    Zapper(Zapper),
    /// Adds a `READY_TO_SHOOT` observation to the avatar it is attached to.
    ReadyToShootObservation,
    Cleaner(Cleaner),
    Taste(Taste),
    RiverMonitor(RiverMonitor),
    DirtSpawner(DirtSpawner),
}

/// Named, immutable blueprint of a game object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prefab {
    pub name: String,
    pub components: Vec<Component>,
}

impl Prefab {
    pub fn new(name: &str, components: Vec<Component>) -> Self {
        Prefab {
            name: name.to_string(),
            components,
        }
    }

    pub fn state_manager(&self) -> Option<&StateManager> {
        self.components.iter().find_map(|c| match c {
            Component::StateManager(s) => Some(s),
            _ => None,
        })
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.components.iter().find_map(|c| match c {
            Component::Transform(t) => Some(t),
            _ => None,
        })
    }

    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.components.iter_mut().find_map(|c| match c {
            Component::Transform(t) => Some(t),
            _ => None,
        })
    }

    pub fn avatar(&self) -> Option<&Avatar> {
        self.components.iter().find_map(|c| match c {
            Component::Avatar(a) => Some(a),
            _ => None,
        })
    }

    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        self.components.iter_mut().find_map(|c| match c {
            Component::Inventory(i) => Some(i),
            _ => None,
        })
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        self.components.iter().find_map(|c| match c {
            Component::Inventory(i) => Some(i),
            _ => None,
        })
    }

    pub fn has_container(&self) -> bool {
        self.components
            .iter()
            .any(|c| matches!(c, Component::Container(_)))
    }

    pub fn has_cooking_pot(&self) -> bool {
        self.components
            .iter()
            .any(|c| matches!(c, Component::CookingPot(_)))
    }

    pub fn reports_ready_to_shoot(&self) -> bool {
        self.components
            .iter()
            .any(|c| matches!(c, Component::ReadyToShootObservation))
    }

    pub fn position(&self) -> Option<Position> {
        self.transform().map(|t| t.position)
    }

    /// Names of every state the object can be in.
    pub fn states(&self) -> Vec<&str> {
        self.state_manager()
            .map(|s| s.state_configs.iter().map(|c| c.state.as_str()).collect())
            .unwrap_or_default()
    }

    /// Sprites declared by `Appearance` and `AdditionalSprites`.
    pub fn declared_sprites(&self) -> BTreeSet<&str> {
        let mut sprites = BTreeSet::new();
        for component in &self.components {
            match component {
                Component::Appearance(a) => {
                    sprites.extend(a.sprite_names.iter().map(|s| s.as_str()))
                }
                Component::AdditionalSprites(a) => {
                    sprites.extend(a.custom_sprite_names.iter().map(|s| s.as_str()))
                }
                _ => {}
            }
        }
        sprites
    }

    /// Checks that the prefab is internally consistent.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let state_manager =
            self.state_manager()
                .ok_or_else(|| ConfigurationError::MissingComponent {
                    prefab: self.name.clone(),
                    component: "StateManager",
                })?;
        if self.transform().is_none() {
            return Err(ConfigurationError::MissingComponent {
                prefab: self.name.clone(),
                component: "Transform",
            });
        }
        if !self.states().contains(&state_manager.initial_state.as_str()) {
            return Err(ConfigurationError::UnknownInitialState {
                prefab: self.name.clone(),
                state: state_manager.initial_state.clone(),
            });
        }
        for component in &self.components {
            match component {
                Component::Appearance(a) if !a.sprite_rgb_colors.is_empty() => {
                    let (names, colors) = (a.sprite_names.len(), a.sprite_rgb_colors.len());
                    if names != colors || !a.sprite_shapes.is_empty() {
                        return Err(ConfigurationError::MalformedAppearance {
                            prefab: self.name.clone(),
                            reason: format!(
                                "{names} sprite names, {colors} colors and {} shapes",
                                a.sprite_shapes.len()
                            ),
                        });
                    }
                }
                Component::Appearance(a) => self.check_appearance(
                    a.sprite_names.len(),
                    a.sprite_shapes.len(),
                    a.palettes.len(),
                    a.no_rotates.len(),
                )?,
                Component::AdditionalSprites(a) => self.check_appearance(
                    a.custom_sprite_names.len(),
                    a.custom_sprite_shapes.len(),
                    a.custom_palettes.len(),
                    a.custom_no_rotates.len(),
                )?,
                _ => {}
            }
        }
        let declared = self.declared_sprites();
        let state_sprites = state_manager
            .state_configs
            .iter()
            .filter_map(|c| c.sprite.as_deref());
        let mapped_sprites = self
            .avatar()
            .into_iter()
            .flat_map(|a| a.sprite_map.values().map(|s| s.as_str()));
        for sprite in state_sprites.chain(mapped_sprites) {
            if !declared.contains(sprite) {
                return Err(ConfigurationError::MissingSprite {
                    prefab: self.name.clone(),
                    sprite: sprite.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_appearance(
        &self,
        names: usize,
        shapes: usize,
        palettes: usize,
        no_rotates: usize,
    ) -> Result<(), ConfigurationError> {
        let malformed = |reason: String| ConfigurationError::MalformedAppearance {
            prefab: self.name.clone(),
            reason,
        };
        if names != shapes || names != palettes {
            return Err(malformed(format!(
                "{names} sprite names, {shapes} shapes and {palettes} palettes"
            )));
        }
        if no_rotates > 1 && no_rotates != names {
            return Err(malformed(format!(
                "{no_rotates} no-rotate flags for {names} sprites"
            )));
        }
        Ok(())
    }
}

/// Prefabs of one substrate, keyed by name.
pub type PrefabLibrary = BTreeMap<String, Prefab>;
