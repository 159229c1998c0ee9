//! Clean Up: a social dilemma where apples only grow while the river is kept
//! clean, so every player is tempted to eat instead of cleaning.

use maplit::btreemap;

use super::{Level, LevelSettings, SubstrateConfig};
use crate::error::ConfigurationError;
use crate::low_level::PlayerAction;
use crate::scene::shapes::{cute_avatar, get_palette, ShapeLibrary, ALPHA};
use crate::scene::{
    ActionRange, Animation, Appearance, AppleGrow, AvatarTemplate, BeamBlocker, CharPrefab,
    CharPrefabMap, Cleaner, Component, DirtCleaning, DirtSpawner, DirtTracker, Edible, Prefab,
    PrefabLibrary, RiverMonitor, SelfSprite, StateConfig, StateManager, Taste, Transform, View,
    Zapper,
};

pub const NAME: &str = "clean_up";
const WATER_STATES: [&str; 4] = ["water_1", "water_2", "water_3", "water_4"];

pub const ASCII_MAP: &str = "
WWWWWWWWWWWWWWWWWWWWWWWWWWWWWW
WHFFFHFFHFHFHFHFHFHFHHFHFFFHFW
WHFHFHFFHFHFHFHFHFHFHHFHFFFHFW
WHFFHFFHHFHFHFHFHFHFHHFHFFFHFW
WHFHFHFFHFHFHFHFHFHFHHFHFFFHFW
WHFFFFFFHFHFHFHFHFHFHHFHFFFHFW
W               HFHHHHHH     W
W   P    P          SSS      W
W     P     P   P   SS   P   W
W             P   PPSS       W
W   P    P          SS    P  W
W               P   SS P     W
W     P           P SS       W
W           P       SS  P    W
W  P             P PSS       W
W B B B B B B B B B SSB B B BW
WBBBBBBBBBBBBBBBBBBBBBBBBBBBBW
WBBBBBBBBBBBBBBBBBBBBBBBBBBBBW
WBBBBBBBBBBBBBBBBBBBBBBBBBBBBW
WBBBBBBBBBBBBBBBBBBBBBBBBBBBBW
WWWWWWWWWWWWWWWWWWWWWWWWWWWWWW
";

pub fn char_prefab_map() -> CharPrefabMap {
    btreemap! {
        'W' => CharPrefab::one("wall"),
        'P' => CharPrefab::one("spawn_point"),
        'B' => CharPrefab::one("potential_apple"),
        'S' => CharPrefab::one("river"),
        'H' => CharPrefab::all(&["river", "potential_dirt"]),
        'F' => CharPrefab::all(&["river", "actual_dirt"]),
    }
}

const WALL: &str = "
&&&&##&&&&&&&&&&
&@@@##@@@@@@@@@@
****##**********
****##**********
################
################
&&&@@@@@@@##@@&&
&&@@@@@@@@##@@@&
**********##****
**********##****
################
################
****##**********
****##**********
@@@@##@@@@@@@@@@
&&&&##@@@@@@@@@@
";

const APPLE: &str = "
xxxxxxxxxxxxxxxx
xxxxxxxxxxxxxxxx
xxxxxxxxxxxxxxxx
xxxxxxxxx##xxxxx
xxxxxxxx##xxxxxx
xxxxxx@##@xxxxxx
xxxxx@@@@@@xxxxx
xxx&&&&&&&&&&xxx
xxx&*&&&&&&&&xxx
xxx&***&&&&&&xxx
xxx**********xxx
xxxxx******xxxxx
xxxxxxx***xxxxxx
xxxxxxxxxxxxxxxx
xxxxxxxxxxxxxxxx
xxxxxxxxxxxxxxxx
";

const WATER_1: &str = "
**~~*ooo~~~oo~**
~~~o**~~~~~~~**o
ooo~***~~~~~***~
o~~~~**~~*****~~
~~~~*****@@**~~o
o~**********~oo~
o**~~~~~~***o~~~
*oo~~~~~~o**~~~~
~~~ooooooo~**~**
*~~~~oooo~~*@~**
**~~~~oo~~~~**~~
~**~~~~oo~~~**~~
~*@*~~~~oo~~**~~
~~*@**~~~~o**~~~
~~~~********~~~~
~~**~~~~ooo~***~
";

const WATER_2: &str = "
*~~*~oo~~~~oo~~*
~~oo*~~~~~~~~**~
oo~~~**~~~***~~o
~~~*********~~~~
~~~****@@**~~~oo
o~**********oo~~
~***~~~~~~***~~~
*~~oooo~ooo**~~~
~~~~~~oooo~~*@**
*~~~~~~~~oo~***~
~**~~~~~~~o~**~~
~~**~~~~~~o**~~~
~~*@**~~~~**~~~~
~~~~********~~~~
~~~**~~~~oo***~~
~***~~~oo~~~~**~
";

const WATER_3: &str = "
***oooo~~~oo**~*
oo~**~~~~~~~**oo
~~~***~~~~~***~~
o~~~~********ooo
~ooo~*@@*****~~~
~~o*****oo****~~
~~**~~oooo~***~~
~*~~~~~~~oo~**~~
*~~~~~~~~~oo*@**
*~~~~~~~~~~***~~
*~~~~~~~~~**o~~~
~**~~~~~~**~oo~~
~*@**~~~**~~~o~~
~~*@******~~o~~~
~~**~~~~~***~~~~
~**~~~~ooo~~***~
";

const WATER_4: &str = "
*~~*~oo~~ooo~~~*
~ooo*~~~~~~~***o
o~~~~**~~~**~~~~
~~~**@******~~~~
o~~***@@@**~~~oo
~o**********oo~~
~***~~~~~o***~~~
*~oooo~oooo**~~~
~~~~~oooo~~~*@**
*~~~~~~ooo~~***~
~**~~~~~~oo~**~~
~~**~~~~~~o***~~
~~**~~~~~~o**~~~
~~~*@@*~~~**o~~~
~~~~**@******~~~
~***~~~oo~~~~**~
";

/// Sprites and palettes of the river level.
pub fn shapes() -> ShapeLibrary {
    ShapeLibrary::new()
        .sprite("Wall", WALL)
        .sprite("Apple", APPLE)
        .sprite("water_1", WATER_1)
        .sprite("water_2", WATER_2)
        .sprite("water_3", WATER_3)
        .sprite("water_4", WATER_4)
        .palette(
            "Wall",
            btreemap! {
                '*' => [95, 95, 95, 255],
                '&' => [100, 100, 100, 255],
                '@' => [109, 109, 109, 255],
                '#' => [152, 152, 152, 255],
            },
        )
        .palette(
            "Apple",
            btreemap! {
                '*' => [102, 255, 0, 255],
                '@' => [230, 255, 0, 255],
                '&' => [117, 255, 26, 255],
                '#' => [255, 153, 0, 255],
                'x' => ALPHA,
            },
        )
        .palette(
            "water",
            btreemap! {
                '@' => [150, 190, 255, 255],
                '*' => [0, 100, 120, 255],
                'o' => [0, 70, 90, 255],
                '~' => [0, 55, 74, 255],
                'x' => ALPHA,
            },
        )
}

fn state_manager(initial: &str, state_configs: Vec<StateConfig>) -> Component {
    Component::StateManager(StateManager {
        initial_state: initial.to_string(),
        state_configs,
    })
}

fn transform() -> Component {
    Component::Transform(Transform::default())
}

fn wall(shapes: &ShapeLibrary) -> Result<Prefab, ConfigurationError> {
    Ok(Prefab::new(
        "wall",
        vec![
            state_manager(
                "wall",
                vec![StateConfig::new("wall").layer("upperPhysical").sprite("Wall")],
            ),
            Component::Appearance(Appearance {
                sprite_names: vec!["Wall".to_string()],
                sprite_shapes: vec![shapes.get_shape("Wall")?.clone()],
                palettes: vec![shapes.get_palette("Wall")?.clone()],
                no_rotates: vec![false],
                ..Default::default()
            }),
            transform(),
            Component::BeamBlocker(BeamBlocker {
                beam_type: "zapHit".to_string(),
            }),
            Component::BeamBlocker(BeamBlocker {
                beam_type: "cleanHit".to_string(),
            }),
        ],
    ))
}

fn potential_apple(shapes: &ShapeLibrary) -> Result<Prefab, ConfigurationError> {
    Ok(Prefab::new(
        "potentialApple",
        vec![
            state_manager(
                "appleWait",
                vec![
                    StateConfig::new("apple").sprite("Apple").layer("lowerPhysical"),
                    StateConfig::new("appleWait"),
                ],
            ),
            transform(),
            Component::Appearance(Appearance {
                sprite_names: vec!["Apple".to_string()],
                sprite_shapes: vec![shapes.get_shape("Apple")?.clone()],
                palettes: vec![shapes.get_palette("Apple")?.clone()],
                no_rotates: vec![false],
                ..Default::default()
            }),
            Component::Edible(Edible {
                live_state: "apple".to_string(),
                wait_state: "appleWait".to_string(),
                reward_for_eating: 1.0,
            }),
            Component::AppleGrow(AppleGrow {
                max_apple_growth_rate: 0.05,
                threshold_depletion: 0.4,
                threshold_restoration: 0.0,
            }),
        ],
    ))
}

/// Animated water drawn on the background layer.
fn river(shapes: &ShapeLibrary) -> Result<Prefab, ConfigurationError> {
    let states = WATER_STATES.map(|s| s.to_string()).to_vec();
    Ok(Prefab::new(
        "water_background",
        vec![
            state_manager(
                WATER_STATES[0],
                WATER_STATES
                    .iter()
                    .map(|s| {
                        StateConfig::new(s)
                            .layer("background")
                            .sprite(s)
                            .groups(&["water"])
                    })
                    .collect(),
            ),
            transform(),
            Component::Appearance(Appearance {
                sprite_names: states.clone(),
                sprite_shapes: WATER_STATES
                    .iter()
                    .map(|s| shapes.get_shape(s).cloned())
                    .collect::<Result<_, _>>()?,
                palettes: vec![shapes.get_palette("water")?.clone(); WATER_STATES.len()],
                ..Default::default()
            }),
            Component::Animation(Animation {
                states,
                game_frames_per_animation_frame: 2,
                looping: true,
                random_start_frame: true,
                group: "water".to_string(),
            }),
        ],
    ))
}

/// Pollution on a river cell, either present (`dirt`) or latent (`dirtWait`).
fn dirt(initial_state: &str) -> Prefab {
    Prefab::new(
        "DirtContainer",
        vec![
            state_manager(
                initial_state,
                vec![
                    StateConfig::new("dirtWait").layer("logic"),
                    StateConfig::new("dirt").layer("lowerPhysical").sprite("Dirt"),
                ],
            ),
            transform(),
            Component::Appearance(Appearance {
                sprite_names: vec!["Dirt".to_string()],
                sprite_rgb_colors: vec![[2, 230, 80, 50]],
                ..Default::default()
            }),
            Component::DirtTracker(DirtTracker {
                active_state: "dirt".to_string(),
                inactive_state: "dirtWait".to_string(),
            }),
            Component::DirtCleaning(DirtCleaning {}),
        ],
    )
}

/// Prefabs of the river level, keyed by the names the character map uses.
pub fn prefabs(shapes: &ShapeLibrary) -> Result<PrefabLibrary, ConfigurationError> {
    let spawn_point = Prefab::new(
        "spawnPoint",
        vec![
            state_manager(
                "spawnPoint",
                vec![StateConfig::new("spawnPoint")
                    .layer("logic")
                    .groups(&["spawnPoints"])],
            ),
            transform(),
        ],
    );
    Ok(btreemap! {
        "wall".to_string() => wall(shapes)?,
        "spawn_point".to_string() => spawn_point,
        "potential_apple".to_string() => potential_apple(shapes)?,
        "river".to_string() => river(shapes)?,
        "potential_dirt".to_string() => dirt("dirtWait"),
        "actual_dirt".to_string() => dirt("dirt"),
    })
}

/// Level-wide logic: watches the river and spawns new dirt on it.
pub fn scene() -> Prefab {
    Prefab::new(
        "scene",
        vec![
            state_manager("scene", vec![StateConfig::new("scene")]),
            transform(),
            Component::RiverMonitor(RiverMonitor {}),
            Component::DirtSpawner(DirtSpawner {
                dirt_spawn_probability: 0.5,
                delay_start_of_dirt_spawning: 50,
            }),
        ],
    )
}

pub fn avatar() -> AvatarTemplate {
    let range = |min, max| ActionRange {
        default: 0,
        min,
        max,
    };
    AvatarTemplate {
        shape: cute_avatar(),
        self_sprite: SelfSprite {
            name: "Self".to_string(),
            shape: cute_avatar(),
            palette: get_palette([50, 100, 200]),
            no_rotate: true,
        },
        spawn_group: "spawnPoints".to_string(),
        action_order: ["move", "turn", "fireZap", "fireClean"]
            .map(|a| a.to_string())
            .to_vec(),
        action_spec: btreemap! {
            "move".to_string() => range(0, 4),
            "turn".to_string() => range(-1, 1),
            "fireZap".to_string() => range(0, 1),
            "fireClean".to_string() => range(0, 1),
        },
        view: View {
            left: 5,
            right: 5,
            forward: 9,
            backward: 1,
            centered: false,
        },
        interact_beam: None,
        components: vec![
            Component::Zapper(Zapper {
                cooldown_time: 10,
                beam_length: 3,
                beam_radius: 1,
                frames_till_respawn: 50,
                penalty_for_being_zapped: 0.0,
                reward_for_zapping: 0.0,
                remove_hit_player: true,
            }),
            Component::ReadyToShootObservation,
            Component::Cleaner(Cleaner {
                cooldown_time: 2,
                beam_length: 3,
                beam_radius: 1,
            }),
            Component::Taste(Taste {
                role: "free".to_string(),
                reward_amount: 1.0,
            }),
        ],
    }
}

fn action(movement: i64, turn: i64, zap: i64, clean: i64) -> PlayerAction {
    btreemap! {
        "move".to_string() => movement,
        "turn".to_string() => turn,
        "fireZap".to_string() => zap,
        "fireClean".to_string() => clean,
    }
}

/// NOOP, FORWARD, BACKWARD, STEP_LEFT, STEP_RIGHT, TURN_LEFT, TURN_RIGHT, FIRE_ZAP, FIRE_CLEAN.
pub fn action_set() -> Vec<PlayerAction> {
    vec![
        action(0, 0, 0, 0),
        action(1, 0, 0, 0),
        action(3, 0, 0, 0),
        action(4, 0, 0, 0),
        action(2, 0, 0, 0),
        action(0, -1, 0, 0),
        action(0, 1, 0, 0),
        action(0, 0, 1, 0),
        action(0, 0, 0, 1),
    ]
}

pub fn get_config() -> Result<SubstrateConfig, ConfigurationError> {
    let shapes = shapes();
    Ok(SubstrateConfig {
        name: NAME.to_string(),
        settings: LevelSettings {
            num_players: 7,
            episode_length_frames: 1000,
            sprite_size: 8,
            map: ASCII_MAP.to_string(),
        },
        action_set: action_set(),
        individual_observation_names: ["RGB", "READY_TO_SHOOT", "POSITION", "ORIENTATION"]
            .map(|n| n.to_string())
            .to_vec(),
        global_observation_names: vec!["WORLD.RGB".to_string()],
        level: Level {
            level_name: NAME.to_string(),
            level_directory: "meltingpot/lua/levels".to_string(),
            prefabs: prefabs(&shapes)?,
            char_prefab_map: char_prefab_map(),
            avatar: avatar(),
            player_inventory: None,
            scene: Some(scene()),
        },
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::low_level::{Engine, HeadlessEngine, Substrate};

    fn in_map(c: char) -> usize {
        ASCII_MAP.chars().filter(|m| *m == c).count()
    }

    #[test]
    fn test_prefabs_are_valid() {
        let library = prefabs(&shapes()).unwrap();
        for prefab in library.values() {
            prefab.validate().unwrap();
        }
        for name in char_prefab_map().values().flat_map(|c| c.names()) {
            assert!(library.contains_key(name), "{name} missing");
        }
        scene().validate().unwrap();
        assert_eq!(
            library["actual_dirt"].state_manager().unwrap().initial_state,
            "dirt"
        );
        assert_eq!(
            library["potential_dirt"].state_manager().unwrap().initial_state,
            "dirtWait"
        );
    }

    #[test]
    fn test_compiles_avatars_only() {
        let scene = get_config().unwrap().compile().unwrap();
        assert_eq!(scene.grid(), (30, 21));
        assert_eq!(scene.num_players, 7);
        // Nothing in the river level holds items, so only avatars are emitted.
        assert_eq!(scene.simulation.game_objects.len(), 7);
        assert_eq!(scene.avatars().count(), 7);
        assert!(in_map('H') > 0 && in_map('F') > 0);
        for avatar in scene.avatars() {
            assert!(avatar.reports_ready_to_shoot());
            assert!(!avatar
                .components
                .iter()
                .any(|c| matches!(c, Component::InteractBeam(_))));
        }

        let value = serde_json::to_value(&scene).unwrap();
        let simulation = &value["simulation"];
        assert_eq!(simulation["charPrefabMap"]["S"], "river");
        assert_eq!(simulation["charPrefabMap"]["F"]["type"], "all");
        assert_eq!(
            simulation["charPrefabMap"]["H"]["list"],
            serde_json::json!(["river", "potential_dirt"])
        );
        let components = &simulation["scene"]["components"];
        assert_eq!(components[2]["component"], "RiverMonitor");
        assert_eq!(components[3]["kwargs"]["delayStartOfDirtSpawning"], 50);
        let avatar = &simulation["gameObjects"][0]["components"];
        assert_eq!(avatar[5]["component"], "Zapper");
        assert_eq!(avatar[6], serde_json::json!({ "component": "ReadyToShootObservation" }));
    }

    #[test]
    fn test_headless_specs() {
        let config = get_config().unwrap();
        let engine = HeadlessEngine::new(&config.compile().unwrap()).unwrap();
        let observations = engine.observation_spec();
        assert_eq!(observations["7.RGB"].shape(), Some(&[88, 88, 3][..]));
        assert_eq!(observations["3.READY_TO_SHOOT"].shape(), Some(&[][..]));
        assert_eq!(engine.action_spec()["1.fireClean"].int_range(), Some((0, 1)));
        assert_eq!(engine.action_spec().len(), 28);

        let env = config
            .build(|scene| Ok(HeadlessEngine::new(scene)?))
            .unwrap();
        assert_eq!(env.num_players(), 7);
    }

    #[test]
    fn test_action_set_matches_spec() {
        let avatar = avatar();
        for action in action_set() {
            assert_eq!(action.len(), avatar.action_order.len());
            for (name, value) in action {
                let range = avatar.action_spec[&name];
                assert!((range.min..=range.max).contains(&value), "{name}");
            }
        }
    }
}
