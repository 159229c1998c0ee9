//! Collaborative Cooking: a pure common-interest game where players carry
//! tomatoes to cooking pots and deliver the soup together.

use maplit::btreemap;

use super::{Level, LevelSettings, SubstrateConfig};
use crate::error::ConfigurationError;
use crate::low_level::PlayerAction;
use crate::scene::shapes::{cute_avatar, get_palette, shift_down, Palette, Rgba, ShapeLibrary};
use crate::scene::{
    ActionRange, Appearance, AvatarTemplate, BeamTemplate, CharPrefab, CharPrefabMap, Component,
    Container, CookingPot, Inventory, MultiSlotContainer, Prefab, PrefabLibrary, ProgressBar,
    Receiver, SelfSprite, StateConfig, StateManager, Transform, View, INVENTORY_PREFAB,
    PROGRESS_PREFAB,
};

pub const COOKING_TIME: u32 = 20;
pub const ITEMS: [&str; 4] = ["empty", "tomato", "dish", "soup"];
const OFFSET_ROWS: usize = 3;

pub const IMPASSABLE: &str = "
##T######
## ###D##
#P      #
#    P  C
#       #
#########
#       #
C P   P #
#       #
##O###O##
";

pub const PASSABLE: &str = "
###D###O#O###
#    #     ##
#    #   P ##
C P  #     ##
#    #      T
C   P#     ##
#    #  P  ##
#          ##
#############
";

pub fn ascii_map(name: &str) -> Option<&'static str> {
    match name {
        "impassable" => Some(IMPASSABLE),
        "passable" => Some(PASSABLE),
        _ => None,
    }
}

pub fn char_prefab_map() -> CharPrefabMap {
    btreemap! {
        'P' => CharPrefab::one("spawn_point"),
        '#' => CharPrefab::one("counter"),
        'O' => CharPrefab::one("tomato_dispenser"),
        'D' => CharPrefab::one("dish_dispenser"),
        'T' => CharPrefab::one("delivery_location"),
        'C' => CharPrefab::one("cooking_pot"),
    }
}

const BACKGROUND_LIGHT: Rgba = [255, 255, 255, 255];
const BACKGROUND_DARK: Rgba = [82, 82, 82, 255];
const OUTLINE: Rgba = [85, 58, 23, 255];
const OUTLINE_DARK: Rgba = [49, 49, 49, 255];
const INVISIBLE: Rgba = [0, 0, 0, 0];
const COUNTER: Rgba = [115, 81, 39, 255];

const INTERACT: &str = "
PPPPPPPPPPPPPPPP
PPPPPPPPPPPPPPPP
PP~~~~~~~~~~~~PP
PP~~~~~~~~~~~~PP
PP~~~~~~~~~~~~PP
PP~~~~~~~~~~~~PP
PP~~~~~~~~~~~~PP
PP~~~~~~~~~~~~PP
PP~~~~~~~~~~~~PP
PP~~~~~~~~~~~~PP
PP~~~~~~~~~~~~PP
PP~~~~~~~~~~~~PP
PP~~~~~~~~~~~~PP
PP~~~~~~~~~~~~PP
PPPPPPPPPPPPPPPP
PPPPPPPPPPPPPPPP
";

const EMPTY: &str = "
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
";

const COUNTER_SHAPE: &str = "
&&&&&&&&&&&&&&&&
&**************&
&**************&
&**************&
&**************&
&**************&
&**************&
&**************&
&**************&
&**************&
&**************&
&**************&
&**************&
&**************&
&**************&
&&&&&&&&&&&&&&&&
";

const DISH: &str = "
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~++++~~~~~~
~~~~~+^^^^+~~~~~
~~~~~+^^^^+~~~~~
~~~~~+^^^^+~~~~~
~~~~~&++++&~~~~~
~~~~~~&&&&~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
";

const DISH_DISPENSER: &str = "
&&&&&&&&&&&&&&&&
&~~~~~~~~~~~~~~&
&~~~~~~~~~~~~~~&
&~~~~~~~~~~~~~~&
&~~~~~~~~~~~~~~&
&~~~~~++++~~~~~&
&~~~~+^^^^+~~~~&
&~~~~+^^^^+~~~~&
&~~~~+^^^^+~~~~&
&~~~~X++++X~~~~&
&~~~~~XXXX~~~~~&
&~~~~~~~~~~~~~~&
&~~~~~~~~~~~~~~&
&~~~~~~~~~~~~~~&
&~~~~~~~~~~~~~~&
&&&&&&&&&&&&&&&&
";

const TOMATO: &str = "
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~++^+~~~~~~
~~~~~&O^---~~~~~
~~~~~O-----~~~~~
~~~~~O&-@--~~~~~
~~~~~~OO&&~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
";

const TOMATO_DISPENSER: &str = "
&&&&&&&&&&&&&&&&
&,,,,,,,,,,,,,,&
&,,,,,,,,,,,,,,&
&,,,,,,,,,,,,,,&
&,,,,,,,,,,,,,,&
&,,,,,,,,,,,,,,&
&,,,,,++^+,,,,,&
&,,,,XO^---,,,,&
&,,,,O-----,,,,&
&,,,,O&-@--,,,,&
&,,,,,OOXX,,,,,&
&,,,,,,,,,,,,,,&
&,,,,,,,,,,,,,,&
&,,,,,,,,,,,,,,&
&,,,,,,,,,,,,,,&
&&&&&&&&&&&&&&&&
";

const COOKING_POT_EMPTY: &str = "
&&&&&&&&&&&&&&&&
&~~~++++++++~~~&
&~~+^^^^^^^XO~~&
&~~+^^^^^^XXO~~&
&^^+^^^^^XXXO--&
&^~+^^^^XXXXO~-&
&^~+@@@@AAAAO~-&
&^^+@@@@AAAAO--&
&~~+@@@@AAAAO~~&
&~~@OOOOOOOO-~~&
&~~@MMMMMMMM-~~&
&~~@MMMMMMMM-~~&
&~~@MMMMMMMM-~~&
&~~@MMMMMMMM-~~&
&~~~MMMMMMMM~~~&
&&&&&&&&&&&&&&&&
";

const COOKING_POT_1: &str = "
&&&&&&&&&&&&&&&&
&~~~++++++++~~~&
&~~+^^^^^^^XO~~&
&~~+^^^^^^XXO~~&
&^^+^^^^^XXXO--&
&^~+KKKKLLLLO~-&
&^~+KKKKLLLLO~-&
&^^+KKKKLLLLO--&
&~~+KKKKLLLLO~~&
&~~@OOOOOOOO-~~&
&~~@MMMMMMMM-~~&
&~~@MMMMMMMM-~~&
&~~@MMMMMMMM-~~&
&~~@MMMMMMMM-~~&
&~~~MMMMMMMM~~~&
&&&&&&&&&&&&&&&&
";

const COOKING_POT_2: &str = "
&&&&&&&&&&&&&&&&
&~~~++++++++~~~&
&~~+^^^^^^^XO~~&
&~~+^^^^^^XXO~~&
&^^+KKKKKKLLO--&
&^~+KKKKLKLLO~-&
&^~+KLKKKKLLO~-&
&^^+KKKKKKLLO--&
&~~+KKKKKKLLO~~&
&~~@OOOOOOOO-~~&
&~~@MMMMMMMM-~~&
&~~@MMMMMMMM-~~&
&~~@MMMMMMMM-~~&
&~~@MMMMMMMM-~~&
&~~~MMMMMMMM~~~&
&&&&&&&&&&&&&&&&
";

const COOKING_POT_3: &str = "
&&&&&&&&&&&&&&&&
&~~~++++++++~~~&
&~~+KKKKKKKKO~~&
&~~+KNKKKKKKO~~&
&^^+KKKKKKKKO--&
&^~+KKKKKKKKO~-&
&^~+KKKKKKKKO~-&
&^^+KKNKKKNKO--&
&~~+KKKKKKKKO~~&
&~~@OOOOOOOO-~~&
&~~@MMMMMMMM-~~&
&~~@MMMMMMMM-~~&
&~~@MMMMMMMM-~~&
&~~@MMMMMMMM-~~&
&~~~MMMMMMMM~~~&
&&&&&&&&&&&&&&&&
";

const LOADING_BAR: &str = "
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
~~~abcdefghij~~~
~~~abcdefghij~~~
~~~~~~~~~~~~~~~~
~~~~~~~~~~~~~~~~
";

/// Sprites and palettes of the cooking level.
pub fn shapes() -> ShapeLibrary {
    let dish_palette = |filling: Rgba| -> Palette {
        btreemap! {
            '~' => INVISIBLE,
            '+' => [255, 255, 255, 255],
            '^' => filling,
            '&' => [221, 222, 238, 255],
        }
    };
    let tomato_colors = btreemap! {
        '~' => INVISIBLE,
        '+' => [239, 81, 90, 255],
        '^' => [29, 139, 43, 255],
        'O' => [151, 47, 52, 255],
        '-' => [236, 58, 74, 255],
        '@' => [240, 57, 75, 255],
    };
    let mut tomato = tomato_colors.clone();
    tomato.insert('&', [190, 53, 62, 255]);
    let mut tomato_dispenser = tomato_colors;
    tomato_dispenser.insert(',', BACKGROUND_DARK);
    tomato_dispenser.insert('&', OUTLINE_DARK);
    tomato_dispenser.insert('X', [190, 53, 62, 255]);

    let mut library = ShapeLibrary::new()
        .sprite("interact", INTERACT)
        .sprite("empty", EMPTY)
        .sprite("counter", COUNTER_SHAPE)
        .sprite("delivery_location", COUNTER_SHAPE)
        .sprite("dish", DISH)
        .sprite("soup", DISH)
        .sprite("dish_dispenser", DISH_DISPENSER)
        .sprite("tomato", TOMATO)
        .sprite("tomato_dispenser", TOMATO_DISPENSER)
        .sprite("cooking_pot_empty", COOKING_POT_EMPTY)
        .sprite("cooking_pot_1", COOKING_POT_1)
        .sprite("cooking_pot_2", COOKING_POT_2)
        .sprite("cooking_pot_3", COOKING_POT_3)
        .sprite("loading_bar", LOADING_BAR)
        .palette("empty", btreemap! { '~' => INVISIBLE, '@' => BACKGROUND_LIGHT })
        .palette("counter", btreemap! { '*' => COUNTER, '&' => OUTLINE })
        .palette(
            "delivery_location",
            btreemap! { '*' => BACKGROUND_DARK, '&' => OUTLINE_DARK },
        )
        .palette("dish", dish_palette([233, 239, 248, 255]))
        .palette("soup", dish_palette([236, 58, 74, 255]))
        .palette(
            "dish_dispenser",
            btreemap! {
                '&' => OUTLINE_DARK,
                '~' => BACKGROUND_DARK,
                '+' => [255, 255, 255, 255],
                '^' => [233, 239, 248, 255],
                'X' => [221, 222, 238, 255],
            },
        )
        .palette("tomato", tomato)
        .palette("tomato_dispenser", tomato_dispenser)
        .palette(
            "cooking_pot",
            btreemap! {
                '&' => OUTLINE,
                '~' => COUNTER,
                '+' => [224, 231, 240, 255],
                '^' => [140, 155, 181, 255],
                'X' => [98, 95, 128, 255],
                'O' => [238, 241, 241, 255],
                '-' => [194, 206, 222, 255],
                '@' => [92, 106, 135, 255],
                'A' => [65, 66, 97, 255],
                'M' => [139, 155, 181, 255],
                'K' => [236, 58, 74, 255],
                'L' => [161, 43, 43, 255],
                'N' => [242, 226, 187, 255],
            },
        );
    for (item, shape) in [("empty", EMPTY), ("tomato", TOMATO), ("dish", DISH), ("soup", DISH)] {
        library = library.sprite(
            &format!("{item}_offset"),
            &shift_down(shape, OFFSET_ROWS, '~'),
        );
    }
    library
}

fn placeholder() -> Component {
    Component::Transform(Transform::default())
}

fn static_object(
    shapes: &ShapeLibrary,
    name: &str,
    extra: Component,
) -> Result<Prefab, ConfigurationError> {
    Ok(Prefab::new(
        name,
        vec![
            Component::StateManager(StateManager {
                initial_state: name.to_string(),
                state_configs: vec![StateConfig::new(name).layer("upperPhysical").sprite(name)],
            }),
            placeholder(),
            Component::Appearance(Appearance {
                sprite_names: vec![name.to_string()],
                sprite_shapes: vec![shapes.get_shape(name)?.clone()],
                palettes: vec![shapes.get_palette(name)?.clone()],
                no_rotates: vec![true],
                ..Default::default()
            }),
            extra,
        ],
    ))
}

fn dispenser(shapes: &ShapeLibrary, name: &str, item: &str) -> Result<Prefab, ConfigurationError> {
    static_object(
        shapes,
        name,
        Component::Container(Container {
            starting_item: Some(item.to_string()),
            infinite: true,
            reward: 0.0,
        }),
    )
}

fn inventory(shapes: &ShapeLibrary) -> Result<Prefab, ConfigurationError> {
    let offsets: Vec<String> = ITEMS.iter().map(|i| format!("{i}_offset")).collect();
    let sprite_names: Vec<String> = ITEMS
        .iter()
        .map(|i| i.to_string())
        .chain(offsets.iter().cloned())
        .collect();
    let mut state_configs = vec![StateConfig::new("wait")];
    state_configs.extend(
        sprite_names
            .iter()
            .map(|s| StateConfig::new(s).sprite(s).layer("overlay")),
    );
    let sprite_shapes = sprite_names
        .iter()
        .map(|s| shapes.get_shape(s).cloned())
        .collect::<Result<_, _>>()?;
    let palettes = ITEMS
        .iter()
        .chain(ITEMS.iter())
        .map(|i| shapes.get_palette(i).cloned())
        .collect::<Result<_, _>>()?;
    Ok(Prefab::new(
        INVENTORY_PREFAB,
        vec![
            Component::StateManager(StateManager {
                initial_state: "wait".to_string(),
                state_configs,
            }),
            placeholder(),
            Component::Appearance(Appearance {
                sprite_names,
                sprite_shapes,
                palettes,
                no_rotates: vec![false],
                ..Default::default()
            }),
            Component::Inventory(Inventory {
                player_index: -1,
                empty_state: "empty".to_string(),
                wait_state: "wait".to_string(),
            }),
        ],
    ))
}

fn cooking_pot(shapes: &ShapeLibrary, reward: f64) -> Result<Prefab, ConfigurationError> {
    let pot = MultiSlotContainer {
        name: "cooking_pot",
        sprite_base: "CookingPot",
        slots: 3,
        options: &["empty", "tomato"],
    };
    let fill_shapes = [
        shapes.get_shape("cooking_pot_empty")?,
        shapes.get_shape("cooking_pot_1")?,
        shapes.get_shape("cooking_pot_2")?,
        shapes.get_shape("cooking_pot_3")?,
    ];
    let palette = shapes.get_palette("cooking_pot")?;
    let states = pot.states();
    Ok(Prefab::new(
        "cooking_pot",
        vec![
            Component::StateManager(StateManager {
                initial_state: pot.initial_state(),
                state_configs: states
                    .iter()
                    .map(|s| {
                        StateConfig::new(&s.state)
                            .layer("upperPhysical")
                            .sprite(&s.sprite)
                            .groups(&["cooking_pot"])
                    })
                    .collect(),
            }),
            placeholder(),
            Component::Appearance(Appearance {
                sprite_names: states.iter().map(|s| s.sprite.clone()).collect(),
                sprite_shapes: states.iter().map(|s| fill_shapes[s.fill].clone()).collect(),
                palettes: vec![palette.clone(); states.len()],
                no_rotates: vec![true; states.len()],
                ..Default::default()
            }),
            Component::CookingPot(CookingPot {
                accepted_items: vec!["tomato".to_string()],
                cooking_time: COOKING_TIME,
                reward,
                custom_state_names: states.into_iter().map(|s| s.state).collect(),
            }),
        ],
    ))
}

/// Prefabs of the cooking level, keyed by the names the character map uses.
pub fn prefabs(shapes: &ShapeLibrary) -> Result<PrefabLibrary, ConfigurationError> {
    let spawn_point = Prefab::new(
        "spawnPoint",
        vec![
            Component::StateManager(StateManager {
                initial_state: "spawnPoint".to_string(),
                state_configs: vec![StateConfig::new("spawnPoint")
                    .layer("logic")
                    .groups(&["spawnPoints"])],
            }),
            placeholder(),
        ],
    );
    let bar_shape = shapes.get_shape("loading_bar")?.text();
    let loading_bar = ProgressBar {
        name: PROGRESS_PREFAB,
        steps: 10,
        total_time: COOKING_TIME,
        shape: &bar_shape,
        filling: [201, 178, 50, 255],
        finished: [15, 188, 15, 255],
    }
    .prefab();
    let counter = static_object(
        shapes,
        "counter",
        Component::Container(Container {
            reward: 0.0,
            ..Default::default()
        }),
    )?;
    let delivery_location = static_object(
        shapes,
        "delivery_location",
        Component::Receiver(Receiver {
            accepted_items: "soup".to_string(),
            reward: 20.0,
            global_reward: true,
        }),
    )?;
    Ok(btreemap! {
        "spawn_point".to_string() => spawn_point,
        INVENTORY_PREFAB.to_string() => inventory(shapes)?,
        PROGRESS_PREFAB.to_string() => loading_bar,
        "counter".to_string() => counter,
        "dish_dispenser".to_string() => dispenser(shapes, "dish_dispenser", "dish")?,
        "tomato_dispenser".to_string() => dispenser(shapes, "tomato_dispenser", "tomato")?,
        "delivery_location".to_string() => delivery_location,
        "cooking_pot".to_string() => cooking_pot(shapes, 0.0)?,
    })
}

pub fn avatar(shapes: &ShapeLibrary) -> Result<AvatarTemplate, ConfigurationError> {
    let range = |min, max| ActionRange {
        default: 0,
        min,
        max,
    };
    Ok(AvatarTemplate {
        shape: cute_avatar(),
        self_sprite: SelfSprite {
            name: "Self".to_string(),
            shape: cute_avatar(),
            palette: get_palette([50, 100, 200]),
            no_rotate: true,
        },
        spawn_group: "spawnPoints".to_string(),
        action_order: vec!["move".to_string(), "turn".to_string(), "interact".to_string()],
        action_spec: btreemap! {
            "move".to_string() => range(0, 4),
            "turn".to_string() => range(-1, 1),
            "interact".to_string() => range(0, 1),
        },
        view: View {
            left: 2,
            right: 2,
            forward: 3,
            backward: 1,
            centered: false,
        },
        interact_beam: Some(BeamTemplate {
            shape: shapes.get_shape("interact")?.text(),
            cooldown: 1,
        }),
        components: vec![],
    })
}

fn action(movement: i64, turn: i64, interact: i64) -> PlayerAction {
    btreemap! {
        "move".to_string() => movement,
        "turn".to_string() => turn,
        "interact".to_string() => interact,
    }
}

/// NOOP, FORWARD, BACKWARD, STEP_LEFT, STEP_RIGHT, TURN_LEFT, TURN_RIGHT, INTERACT.
pub fn action_set() -> Vec<PlayerAction> {
    vec![
        action(0, 0, 0),
        action(1, 0, 0),
        action(3, 0, 0),
        action(4, 0, 0),
        action(2, 0, 0),
        action(0, -1, 0),
        action(0, 1, 0),
        action(0, 0, 1),
    ]
}

/// Configuration of the cooking level laid out on the named map.
pub fn get_config(map: &str) -> Result<SubstrateConfig, ConfigurationError> {
    let ascii_map = ascii_map(map)
        .ok_or_else(|| ConfigurationError::UnknownSubstrate(format!("collaborative_cooking_{map}")))?;
    let shapes = shapes();
    Ok(SubstrateConfig {
        name: format!("collaborative_cooking_{map}"),
        settings: LevelSettings {
            num_players: 4,
            episode_length_frames: 1000,
            sprite_size: 8,
            map: ascii_map.to_string(),
        },
        action_set: action_set(),
        individual_observation_names: vec![
            "RGB".to_string(),
            "POSITION".to_string(),
            "ORIENTATION".to_string(),
        ],
        global_observation_names: vec!["WORLD.RGB".to_string()],
        level: Level {
            level_name: "collaborative_cooking".to_string(),
            level_directory: "meltingpot/lua/levels".to_string(),
            prefabs: prefabs(&shapes)?,
            char_prefab_map: char_prefab_map(),
            avatar: avatar(&shapes)?,
            player_inventory: Some(INVENTORY_PREFAB.to_string()),
            scene: None,
        },
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prefabs_are_valid() {
        let library = prefabs(&shapes()).unwrap();
        for prefab in library.values() {
            prefab.validate().unwrap();
        }
        for name in char_prefab_map().values().flat_map(|c| c.names()) {
            assert!(library.contains_key(name), "{name} missing");
        }
    }

    #[test]
    fn test_cooking_pot_states() {
        let library = prefabs(&shapes()).unwrap();
        let pot = &library["cooking_pot"];
        assert_eq!(pot.states().len(), 9);
        assert_eq!(
            pot.state_manager().unwrap().initial_state,
            "cooking_pot_empty_empty_empty"
        );
        assert!(pot.states().contains(&"cooking_pot_cooked"));
        match &pot.components[2] {
            Component::Appearance(a) => {
                assert_eq!(a.sprite_shapes[0], *shapes().get_shape("cooking_pot_empty").unwrap());
                assert_eq!(a.sprite_shapes[8], *shapes().get_shape("cooking_pot_3").unwrap());
            }
            other => panic!("expected an appearance, got {other:?}"),
        }
    }

    #[test]
    fn test_inventory_states() {
        let library = prefabs(&shapes()).unwrap();
        let states = library[INVENTORY_PREFAB].states();
        assert_eq!(states.len(), 1 + 2 * ITEMS.len());
        assert_eq!(states[0], "wait");
        assert!(states.contains(&"soup_offset"));
    }

    #[test]
    fn test_offset_sprites_keep_height() {
        let shapes = shapes();
        let offset = shapes.get_shape("tomato_offset").unwrap().rows();
        let original = shapes.get_shape("tomato").unwrap().rows();
        assert_eq!(offset.len(), original.len());
        assert_eq!(offset[3], original[0]);
        assert!(offset[0].chars().all(|c| c == '~'));
    }

    #[test]
    fn test_action_set() {
        let actions = action_set();
        assert_eq!(actions.len(), 8);
        assert_eq!(actions[0].values().sum::<i64>(), 0);
        assert_eq!(actions[3]["move"], 4);
        assert_eq!(actions[5]["turn"], -1);
        assert_eq!(actions[7]["interact"], 1);
    }

    #[test]
    fn test_maps_compile() {
        for map in ["impassable", "passable"] {
            let config = get_config(map).unwrap();
            let scene = config.compile().unwrap();
            assert_eq!(scene.avatars().count(), 4);
            assert_eq!(scene.level_name, "collaborative_cooking");
        }
        assert!(get_config("crowded").is_err());
    }

    #[test]
    fn test_impassable_layout() {
        let scene = get_config("impassable").unwrap().compile().unwrap();
        let count = |name: &str| {
            scene
                .simulation
                .game_objects
                .iter()
                .filter(|e| e.name == name)
                .count()
        };
        let in_map = |c: char| IMPASSABLE.chars().filter(|m| *m == c).count();
        assert_eq!(scene.grid(), (9, 10));
        assert_eq!(count(PROGRESS_PREFAB), in_map('C'));
        let placed_by_engine = [
            "cooking_pot",
            "spawnPoint",
            "counter",
            "tomato_dispenser",
            "delivery_location",
        ];
        for name in placed_by_engine {
            assert_eq!(count(name), 0, "{name}");
        }
        let containers = in_map('#') + in_map('O') + in_map('D');
        assert_eq!(count(INVENTORY_PREFAB), containers + 4);
        assert_eq!(count("avatar"), 4);
        assert_eq!(
            scene.simulation.game_objects.len(),
            containers + in_map('C') + 4 + 4
        );
    }
}
