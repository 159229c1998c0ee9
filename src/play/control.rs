use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::input::{ActionMap, InputDevice, PressedKeys};
use super::render::Renderer;
use crate::agent::{noop_value, Agent, AnyAgent};
use crate::error::Result;
use crate::low_level::{player_key, rewards, split_key, Engine, FlatAction, Spec, TimeStep};
use crate::scene::SceneDescription;
use crate::substrates::SubstrateConfig;

/// Called after every step with the timestep and a 0-based player index.
pub type VerboseFn = Box<dyn FnMut(&TimeStep, usize)>;
/// Produces the overlay text shown on top of the rendered frame.
pub type TextDisplayFn = Box<dyn Fn(&TimeStep, usize) -> String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Background agents, indexed by 0-based player. `None` plays the no-op action.
#[derive(Default)]
pub struct Players(pub Vec<Option<AnyAgent>>);

impl Players {
    pub fn none(num_players: usize) -> Players {
        Players((0..num_players).map(|_| None).collect())
    }

    pub fn get_mut(&mut self, player: usize) -> Option<&mut AnyAgent> {
        self.0.get_mut(player).and_then(|agent| agent.as_mut())
    }

    fn game_over(&mut self) {
        for agent in self.0.iter_mut().flatten() {
            agent.game_over();
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayOptions {
    /// Observation rendered each tick. Looked up as is, then as `"<p>.<name>"`.
    pub render_observation: String,
    /// Ticks per second. 0 runs as fast as the engine steps.
    pub fps: u32,
    pub print_events: bool,
    /// Logs every player's reward after each step.
    pub verbose: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        PlayOptions {
            render_observation: "RGB".to_string(),
            fps: 8,
            print_events: false,
            verbose: false,
        }
    }
}

/// Builds the flat joint action of one tick.
pub struct ActionReader {
    /// Sub-action names and bounds of each player, 0-based.
    sub_actions: Vec<Vec<(String, RangeInclusive<i64>)>>,
}

impl ActionReader {
    pub fn new(action_spec: &BTreeMap<String, Spec>, num_players: usize) -> Self {
        let mut sub_actions = vec![vec![]; num_players];
        for (key, spec) in action_spec {
            match split_key(key) {
                Some((player, name)) if (1..=num_players).contains(&player) => {
                    let (min, max) = spec.int_range().unwrap_or((0, 0));
                    sub_actions[player - 1].push((name.to_string(), min..=max));
                }
                _ => warn!(key = %key, "ignoring action without a player prefix"),
            }
        }
        ActionReader { sub_actions }
    }

    pub fn num_players(&self) -> usize {
        self.sub_actions.len()
    }

    /// Every key defaults to 0. The controlled player reads `action_map`, the others ask their agent.
    pub fn step(
        &self,
        controlled: usize,
        pressed: &PressedKeys,
        action_map: &ActionMap,
        players: &mut Players,
    ) -> FlatAction {
        let mut action = FlatAction::new();
        for (player, sub_actions) in self.sub_actions.iter().enumerate() {
            for (name, range) in sub_actions {
                let value = if player == controlled {
                    action_map.get(name).map_or(0, |read| read(pressed))
                } else {
                    match players.get_mut(player) {
                        Some(agent) => agent.act_dyn(name, range.clone()),
                        None => noop_value(range),
                    }
                };
                action.insert(player_key(player + 1, name), value);
            }
        }
        action
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport {
    pub scores: Vec<f64>,
    pub steps: u64,
}

/// One episode of interactive play over a raw engine.
pub struct ControlLoop<E, I, R> {
    env: E,
    input: I,
    renderer: R,
    action_map: ActionMap,
    players: Players,
    reader: ActionReader,
    options: PlayOptions,
    verbose_fn: Option<VerboseFn>,
    text_display_fn: Option<TextDisplayFn>,
    ticker: Option<Receiver<Instant>>,
    player_index: usize,
    scores: Vec<f64>,
    steps: u64,
    state: LoopState,
}

impl<E: Engine, I: InputDevice, R: Renderer> ControlLoop<E, I, R> {
    pub fn new(
        env: E,
        num_players: usize,
        input: I,
        renderer: R,
        action_map: ActionMap,
        options: PlayOptions,
    ) -> Self {
        let reader = ActionReader::new(&env.action_spec(), num_players);
        let ticker = match options.fps {
            0 => None,
            fps => Some(crossbeam_channel::tick(Duration::from_secs(1) / fps)),
        };
        ControlLoop {
            env,
            input,
            renderer,
            action_map,
            players: Players::none(num_players),
            reader,
            options,
            verbose_fn: None,
            text_display_fn: None,
            ticker,
            player_index: 0,
            scores: vec![0.0; num_players],
            steps: 0,
            state: LoopState::Running,
        }
    }

    pub fn with_players(mut self, players: Players) -> Self {
        self.players = players;
        self
    }

    pub fn with_verbose(mut self, verbose_fn: impl FnMut(&TimeStep, usize) + 'static) -> Self {
        self.verbose_fn = Some(Box::new(verbose_fn));
        self
    }

    pub fn with_text_display(
        mut self,
        text_display_fn: impl Fn(&TimeStep, usize) -> String + 'static,
    ) -> Self {
        self.text_display_fn = Some(Box::new(text_display_fn));
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// 0-based index of the player driven by the input device.
    pub fn player_index(&self) -> usize {
        self.player_index
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    fn num_players(&self) -> usize {
        self.scores.len()
    }

    pub fn start(&mut self) -> Result<()> {
        let timestep = self.env.reset()?;
        self.render(&timestep)
    }

    pub fn tick(&mut self) -> Result<LoopState> {
        if self.state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }
        let frame = self.input.poll();
        if frame.quit {
            info!(steps = self.steps, "quit requested");
            self.state = LoopState::Stopped;
            return Ok(self.state);
        }
        if frame.switch_player && self.num_players() > 0 {
            self.player_index = (self.player_index + 1) % self.num_players();
            info!(player = self.player_index + 1, "switched controlled player");
        }

        let action = self.reader.step(
            self.player_index,
            &frame.pressed,
            &self.action_map,
            &mut self.players,
        );
        let timestep = self.env.step(&action)?;
        self.steps += 1;

        let step_rewards = rewards(&timestep.observation, self.num_players());
        if self.options.verbose {
            info!(step = self.steps, rewards = ?step_rewards, "step");
        }
        for (player, reward) in step_rewards.into_iter().enumerate() {
            self.scores[player] += reward;
            if player == self.player_index && reward != 0.0 {
                info!(player = player + 1, score = self.scores[player], "score changed");
            }
            if let Some(verbose_fn) = &mut self.verbose_fn {
                verbose_fn(&timestep, player);
            }
        }

        let events = self.env.events();
        if self.options.print_events && !events.is_empty() {
            let events = serde_json::to_string(&events).unwrap_or_default();
            info!(step = self.steps, %events, "events");
        }

        self.render(&timestep)?;
        if let Some(ticker) = &self.ticker {
            let _ = ticker.recv();
        }

        if timestep.last() {
            debug!(steps = self.steps, "episode ended");
            self.state = LoopState::Stopped;
        }
        Ok(self.state)
    }

    fn render(&mut self, timestep: &TimeStep) -> Result<()> {
        let name = &self.options.render_observation;
        let frame = timestep
            .observation
            .get(name)
            .or_else(|| timestep.observation.get(&player_key(self.player_index + 1, name)));
        let Some(frame) = frame else {
            debug!(observation = %name, "nothing to render");
            return Ok(());
        };
        let display_player = if self.num_players() == 1 {
            0
        } else {
            self.player_index
        };
        let overlay = self
            .text_display_fn
            .as_ref()
            .map(|text| text(timestep, display_player))
            .unwrap_or_default();
        self.renderer.render(frame, &overlay)?;
        Ok(())
    }

    /// Resets the engine and ticks until the loop stops.
    pub fn run(mut self) -> Result<EpisodeReport> {
        self.start()?;
        while self.tick()? == LoopState::Running {}
        self.players.game_over();
        self.env.close();
        Ok(EpisodeReport {
            scores: self.scores,
            steps: self.steps,
        })
    }
}

/// Plays one episode of `config` with `overrides` applied to its settings.
#[allow(clippy::too_many_arguments)]
pub fn run_episode<E, F, I, R>(
    config: SubstrateConfig,
    overrides: &Value,
    builder: F,
    input: I,
    renderer: R,
    action_map: ActionMap,
    players: Players,
    options: PlayOptions,
) -> Result<EpisodeReport>
where
    E: Engine,
    F: FnOnce(&SceneDescription) -> anyhow::Result<E>,
    I: InputDevice,
    R: Renderer,
{
    let config = config.with_overrides(overrides)?;
    let scene = config.compile()?;
    let env = builder(&scene)?;
    info!(
        substrate = %config.name,
        players = scene.num_players,
        "running an episode with {} players",
        scene.num_players
    );
    let report = ControlLoop::new(env, scene.num_players, input, renderer, action_map, options)
        .with_players(players)
        .run()?;
    for (player, score) in report.scores.iter().enumerate() {
        info!("player {}: score is {}", player + 1, score);
    }
    Ok(report)
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use maplit::btreemap;
    use ndarray::{arr0, ArrayD, IxDyn};
    use serde_json::json;

    use super::*;
    use crate::low_level::{FlatObservation, HeadlessEngine, StepType};
    use crate::play::input::{action_map_for, default_action_map, InputFrame, Key};
    use crate::play::render::{LogRenderer, NullRenderer};
    use crate::substrates::get_config;

    /// Pays `reward` to player 1 on every step, ends after `length` steps.
    struct Paying {
        reward: f64,
        length: u64,
        steps: u64,
        seen: Rc<RefCell<Vec<FlatAction>>>,
    }

    impl Paying {
        fn new(reward: f64, length: u64) -> Self {
            Paying {
                reward,
                length,
                steps: 0,
                seen: Rc::default(),
            }
        }

        fn observation(&self, reward: f64) -> FlatObservation {
            btreemap! {
                "1.REWARD".to_string() => arr0(reward).into_dyn(),
                "2.REWARD".to_string() => arr0(0.0).into_dyn(),
                "1.RGB".to_string() => ArrayD::zeros(IxDyn(&[2, 2, 3])),
                "2.RGB".to_string() => ArrayD::zeros(IxDyn(&[2, 2, 3])),
            }
        }
    }

    impl Engine for Paying {
        fn observation_spec(&self) -> BTreeMap<String, Spec> {
            BTreeMap::new()
        }

        fn action_spec(&self) -> BTreeMap<String, Spec> {
            btreemap! {
                "1.move".to_string() => Spec::bounded_int("move", 0, 4),
                "1.turn".to_string() => Spec::bounded_int("turn", -1, 1),
                "2.move".to_string() => Spec::bounded_int("move", 0, 4),
                "2.turn".to_string() => Spec::bounded_int("turn", -1, 1),
            }
        }

        fn reset(&mut self) -> anyhow::Result<TimeStep> {
            self.steps = 0;
            Ok(TimeStep {
                step_type: StepType::First,
                observation: self.observation(0.0),
            })
        }

        fn step(&mut self, action: &FlatAction) -> anyhow::Result<TimeStep> {
            self.steps += 1;
            self.seen.borrow_mut().push(action.clone());
            let step_type = if self.steps >= self.length {
                StepType::Last
            } else {
                StepType::Mid
            };
            Ok(TimeStep {
                step_type,
                observation: self.observation(self.reward),
            })
        }
    }

    fn scripted_input(frames: Vec<InputFrame>) -> impl FnMut() -> InputFrame {
        let mut frames = VecDeque::from(frames);
        move || frames.pop_front().unwrap_or_default()
    }

    fn control_loop(
        env: Paying,
        frames: Vec<InputFrame>,
    ) -> ControlLoop<Paying, impl FnMut() -> InputFrame, NullRenderer> {
        let options = PlayOptions {
            fps: 0,
            ..Default::default()
        };
        ControlLoop::new(
            env,
            2,
            scripted_input(frames),
            NullRenderer,
            default_action_map(),
            options,
        )
    }

    #[test]
    fn test_reward_to_first_agent() {
        let report = control_loop(Paying::new(1.5, 4), vec![]).run().unwrap();
        assert_eq!(report.scores, vec![6.0, 0.0]);
        assert_eq!(report.steps, 4);
    }

    #[test]
    fn test_stops_on_terminal_tick() {
        let frames = vec![InputFrame::keys([Key::W]); 10];
        let env = Paying::new(1.0, 2);
        let seen = env.seen.clone();
        let mut game = control_loop(env, frames);
        game.start().unwrap();
        assert_eq!(game.tick().unwrap(), LoopState::Running);
        assert_eq!(game.tick().unwrap(), LoopState::Stopped);
        assert_eq!(game.scores(), &[2.0, 0.0]);
        assert_eq!(game.tick().unwrap(), LoopState::Stopped);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_quit_stops_before_stepping() {
        let env = Paying::new(1.0, 5);
        let seen = env.seen.clone();
        let report = control_loop(env, vec![InputFrame::keys([Key::Escape])])
            .run()
            .unwrap();
        assert_eq!(report.steps, 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_switch_player() {
        let frames = vec![
            InputFrame::keys([Key::Tab, Key::W]),
            InputFrame::keys([Key::Q]),
            InputFrame::keys([Key::Tab, Key::D]),
        ];
        let env = Paying::new(0.0, 10);
        let seen = env.seen.clone();
        let mut game = control_loop(env, frames);
        game.start().unwrap();
        game.tick().unwrap();
        assert_eq!(game.player_index(), 1);
        game.tick().unwrap();
        game.tick().unwrap();
        assert_eq!(game.player_index(), 0);

        let seen = seen.borrow();
        assert_eq!(seen[0]["1.move"], 0);
        assert_eq!(seen[0]["2.move"], 1);
        assert_eq!(seen[1]["2.turn"], -1);
        assert_eq!(seen[2]["1.move"], 2);
        assert_eq!(seen[2]["2.move"], 0);
    }

    #[test]
    fn test_action_reader() {
        let env = Paying::new(0.0, 1);
        let reader = ActionReader::new(&env.action_spec(), 2);
        assert_eq!(reader.num_players(), 2);

        let mut players = Players(vec![None, Some(AnyAgent::scripted(1, |_, _| 9))]);
        let pressed = [Key::S, Key::E].into_iter().collect();
        let action = reader.step(0, &pressed, &default_action_map(), &mut players);
        assert_eq!(
            action,
            btreemap! {
                "1.move".to_string() => 3,
                "1.turn".to_string() => 1,
                "2.move".to_string() => 4,
                "2.turn".to_string() => 1,
            }
        );

        let action = reader.step(1, &pressed, &ActionMap::new(), &mut Players::none(2));
        assert!(action.values().all(|v| *v == 0));
    }

    #[test]
    fn test_verbose_and_text_display() {
        let calls = Rc::new(RefCell::new(0));
        let counted = calls.clone();
        let report = control_loop(Paying::new(1.0, 3), vec![])
            .with_verbose(move |_, _| *counted.borrow_mut() += 1)
            .with_text_display(|_, player| format!("player {player}"))
            .run()
            .unwrap();
        assert_eq!(report.steps, 3);
        assert_eq!(*calls.borrow(), 6);
    }

    #[test]
    fn test_run_episode_on_headless_engine() {
        let config = get_config("collaborative_cooking_passable").unwrap();
        let options = PlayOptions {
            fps: 0,
            ..Default::default()
        };
        let report = run_episode(
            config,
            &json!({ "numPlayers": 2, "episodeLengthFrames": 5 }),
            |scene| Ok(HeadlessEngine::new(scene)?),
            scripted_input(vec![InputFrame::keys([Key::W, Key::Space])]),
            LogRenderer::default(),
            default_action_map(),
            Players(vec![None, Some(AnyAgent::random_seeded(3))]),
            options,
        )
        .unwrap();
        assert_eq!(report.steps, 5);
        assert_eq!(report.scores, vec![0.0, 0.0]);
    }

    #[test]
    fn test_run_episode_on_clean_up() {
        let config = get_config("clean_up").unwrap();
        let engine = HeadlessEngine::new(&config.compile().unwrap()).unwrap();
        let reader = ActionReader::new(&engine.action_spec(), 7);
        let keys = InputFrame::keys([Key::W, Key::Space, Key::X]).pressed;
        let action = reader.step(0, &keys, &action_map_for("clean_up"), &mut Players::none(7));
        assert_eq!(action["1.move"], 1);
        assert_eq!(action["1.fireZap"], 1);
        assert_eq!(action["1.fireClean"], 1);
        assert_eq!(action["2.fireClean"], 0);
        assert!(!action.contains_key("1.interact"));

        let report = run_episode(
            config,
            &json!({ "episodeLengthFrames": 4 }),
            |scene| Ok(HeadlessEngine::new(scene)?),
            scripted_input(vec![InputFrame::keys([Key::X]), InputFrame::keys([Key::Space])]),
            NullRenderer,
            action_map_for("clean_up"),
            Players(vec![None, Some(AnyAgent::random_seeded(5))]),
            PlayOptions {
                fps: 0,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(report.steps, 4);
        assert_eq!(report.scores, vec![0.0; 7]);
    }
}
