use std::collections::BTreeMap;

use maplit::btreemap;

use super::prefab::{
    ActionRange, AdditionalSprites, Appearance, Avatar, Component, InteractBeam,
    LocationObserver, Prefab, StateConfig, StateManager, Transform, View,
};
use super::shapes::{get_palette, player_color, Palette, SpriteShape, ALPHA};

/// Sprite every player sees itself as.
#[derive(Debug, Clone)]
pub struct SelfSprite {
    pub name: String,
    pub shape: SpriteShape,
    pub palette: Palette,
    pub no_rotate: bool,
}

/// Short-range beam an avatar uses to interact with the object in front of it.
#[derive(Debug, Clone)]
pub struct BeamTemplate {
    pub shape: String,
    pub cooldown: u32,
}

/// Builds the avatar of each player slot.
#[derive(Debug, Clone)]
pub struct AvatarTemplate {
    pub shape: SpriteShape,
    pub self_sprite: SelfSprite,
    pub spawn_group: String,
    pub action_order: Vec<String>,
    pub action_spec: BTreeMap<String, ActionRange>,
    pub view: View,
    pub interact_beam: Option<BeamTemplate>,
    /// Substrate-specific components, placed before the location observer.
    pub components: Vec<Component>,
}

impl AvatarTemplate {
    pub fn sprite_name(player: usize) -> String {
        format!("Avatar{player}")
    }

    pub fn live_state(player: usize) -> String {
        format!("player{player}")
    }

    /// The avatar of the 1-based `player`, colored after player slot `player - 1`.
    pub fn instantiate(&self, player: usize) -> Prefab {
        let sprite = Self::sprite_name(player);
        let live_state = Self::live_state(player);
        let color = player_color(player - 1);
        let mut components = vec![
            Component::StateManager(StateManager {
                initial_state: live_state.clone(),
                state_configs: vec![
                    StateConfig::new(&live_state)
                        .layer("upperPhysical")
                        .sprite(&sprite)
                        .contact("avatar")
                        .groups(&["players"]),
                    StateConfig::new("playerWait").groups(&["playerWaits"]),
                ],
            }),
            Component::Transform(Transform::default()),
            Component::Appearance(Appearance {
                sprite_names: vec![sprite.clone()],
                sprite_shapes: vec![self.shape.clone()],
                palettes: vec![get_palette(color)],
                no_rotates: vec![true],
                ..Default::default()
            }),
            Component::AdditionalSprites(AdditionalSprites {
                custom_sprite_names: vec![self.self_sprite.name.clone()],
                custom_sprite_shapes: vec![self.self_sprite.shape.clone()],
                custom_palettes: vec![self.self_sprite.palette.clone()],
                custom_no_rotates: vec![self.self_sprite.no_rotate],
                ..Default::default()
            }),
            Component::Avatar(Avatar {
                index: player,
                spawn_group: self.spawn_group.clone(),
                alive_state: live_state,
                wait_state: "playerWait".to_string(),
                speed: 1.0,
                action_order: self.action_order.clone(),
                action_spec: self.action_spec.clone(),
                view: self.view,
                sprite_map: btreemap! { sprite => self.self_sprite.name.clone() },
            }),
        ];
        if let Some(beam) = &self.interact_beam {
            let beam_palette: Palette = btreemap! {
                'P' => [color[0], color[1], color[2], 255],
                '~' => ALPHA,
            };
            components.push(Component::InteractBeam(InteractBeam {
                cooldown_time: beam.cooldown,
                shapes: vec![SpriteShape::Static(beam.shape.clone())],
                palettes: vec![beam_palette],
            }));
        }
        components.extend(self.components.iter().cloned());
        components.push(Component::LocationObserver(LocationObserver {
            object_is_avatar: true,
            also_report_orientation: true,
        }));
        Prefab::new("avatar", components)
    }
}
