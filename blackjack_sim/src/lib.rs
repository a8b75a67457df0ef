pub mod game;
pub mod write;

use blackjack_lib::Shoe;
pub use game::prelude::*;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;
use std::iter::FromIterator;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use thiserror::Error;

pub mod prelude {
    pub use super::{
        BlackjackSimulator, BlackjackSimulatorConfig, BlackjackSimulatorConfigBuilder,
        MulStrategyBlackjackSimulator, MulStrategyBlackjackSimulatorBuilder, OutputFormat,
        SimulationError, SimulationSummary,
    };
}

/// Simple struct for recording all of the interesting data points accumulated during a simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub label: String,
    pub simulations: u32,
    pub rounds_played: u32,
    pub wins: i32,
    pub pushes: i32,
    pub losses: i32,
    pub player_blackjacks: i32,
    pub early_endings: i32,
    pub winnings: f64,
}

impl SimulationSummary {
    pub fn new<S: Into<String>>(label: S) -> SimulationSummary {
        SimulationSummary {
            label: label.into(),
            ..SimulationSummary::default()
        }
    }

    /// Folds the results of one finished game into the summary.
    pub fn record<D: blackjack_lib::Deck>(&mut self, game: &BlackjackGameSim<D>) {
        self.simulations += 1;
        self.rounds_played += game.rounds_played;
        self.wins += game.totals.wins;
        self.pushes += game.totals.pushes;
        self.losses += game.totals.losses;
        self.player_blackjacks += game.totals.player_blackjacks;
        self.winnings += game.totals.winnings;
        if game.ended_early {
            self.early_endings += 1;
        }
    }

    pub fn merge(&mut self, other: &SimulationSummary) {
        self.simulations += other.simulations;
        self.rounds_played += other.rounds_played;
        self.wins += other.wins;
        self.pushes += other.pushes;
        self.losses += other.losses;
        self.player_blackjacks += other.player_blackjacks;
        self.early_endings += other.early_endings;
        self.winnings += other.winnings;
    }

    pub fn total_hands(&self) -> i32 {
        self.wins + self.pushes + self.losses
    }
}

impl Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of player blackjacks".len() + 20;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        let total_hands = self.total_hands();
        // An empty summary reports zero rates instead of NaN.
        let rate = |n: f64| {
            if total_hands == 0 {
                0.0
            } else {
                n / (total_hands as f64)
            }
        };
        let body = format!(
            "{}{}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n",
            "strategy: ",
            self.label,
            "simulations",
            self.simulations,
            "hands won",
            self.wins,
            "hands pushed",
            self.pushes,
            "hands lost",
            self.losses,
            "winnings",
            self.winnings,
            "number of player blackjacks",
            self.player_blackjacks,
            "number of early endings",
            self.early_endings,
            "total hands played",
            total_hands,
            "win percentage",
            rate(self.wins as f64),
            "push percentage",
            rate(self.pushes as f64),
            "loss percentage",
            rate(self.losses as f64),
            "average winnings per hand",
            rate(self.winnings)
        );
        write!(f, "{}", body)
    }
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("game error: {0}")]
    Game(#[from] BlackjackGameError),
    #[error("failed to send summary: {0}")]
    Sending(String),
    #[error("failed to write summaries: {0}")]
    Write(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("simulation #{0} panicked")]
    ThreadPanicked(usize),
}

/// How the summaries of a `MulStrategyBlackjackSimulator` run are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Struct for running a number of simulations for one configuration.
/// Every simulation starts from a fresh balances map and a freshly shuffled shoe, then the results
/// are accumulated in a `SimulationSummary`.
pub struct BlackjackSimulator {
    config: BlackjackSimulatorConfig,
    summary: SimulationSummary,
}

impl BlackjackSimulator {
    pub fn new(config: BlackjackSimulatorConfig) -> BlackjackSimulator {
        BlackjackSimulator {
            config,
            summary: SimulationSummary::new(config.ladder.label()),
        }
    }

    pub fn config(&self) -> &BlackjackSimulatorConfig {
        &self.config
    }

    pub fn player_ids(&self) -> Vec<String> {
        (1..=self.config.num_players)
            .map(|n| format!("player-{}", n))
            .collect()
    }

    /// Builds a game with every player seated at full balance.
    fn new_game(&self) -> BlackjackGameSim<Shoe> {
        let ids = self.player_ids();
        let balances = ids
            .iter()
            .map(|id| (id.clone(), self.config.starting_balance))
            .collect::<Balances>()
            .shared();

        // Each simulation gets its own shoe, seeded from its index when a seed is configured.
        let seed = self
            .config
            .seed
            .map(|seed| seed.wrapping_add(self.summary.simulations as u64));
        let shoe = Shoe::new(self.config.num_decks, seed);

        let mut dealer = Dealer::new(shoe, balances, self.config.rules);
        for id in ids {
            dealer.add_player(PlayerSim::new(id, self.config.ladder));
        }
        BlackjackGameSim::new(dealer, self.config.rounds_per_simulation)
    }

    /// Runs every configured simulation, returning the accumulated summary.
    pub fn run(&mut self) -> Result<&SimulationSummary, SimulationError> {
        info!(
            "running {} simulations for {}",
            self.config.num_simulations, self.summary.label
        );
        for _ in 0..self.config.num_simulations {
            self.run_single_simulation()?;
        }
        info!("finished simulations for {}", self.summary.label);
        Ok(&self.summary)
    }

    /// Runs one simulation, records it and returns its own summary.
    pub fn run_single_simulation(&mut self) -> Result<SimulationSummary, SimulationError> {
        let mut game = self.new_game();
        game.run()?;

        if !self.config.silent {
            println!("simulation #{}", self.summary.simulations + 1);
            game.display_stats(io::stdout())?;
        }

        let mut single = SimulationSummary::new(self.summary.label.clone());
        single.record(&game);
        self.summary.merge(&single);
        Ok(single)
    }

    pub fn summary(&self) -> &SimulationSummary {
        &self.summary
    }

    /// Clears the accumulated results so the simulator can be run again.
    pub fn reset(&mut self) {
        self.summary = SimulationSummary::new(self.summary.label.clone());
    }
}

/// This struct is for comparing several bid ladders under the same table configuration. Each
/// ladder is simulated on its own thread.
pub struct MulStrategyBlackjackSimulator {
    simulations: Vec<BlackjackSimulator>,
    pub config: BlackjackSimulatorConfig,
}

impl MulStrategyBlackjackSimulator {
    /// Method that returns a new `MulStrategyBlackjackSimulatorBuilder` object.
    pub fn new(config: BlackjackSimulatorConfig) -> MulStrategyBlackjackSimulatorBuilder {
        MulStrategyBlackjackSimulatorBuilder {
            simulations: vec![],
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.simulations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simulations.is_empty()
    }

    /// Runs every simulation on its own thread. Each thread owns its dealer, balances and shoe, and
    /// sends a summary per finished simulation to the writer thread, which writes them to `file_out`.
    pub fn run(
        &mut self,
        file_out: Box<dyn io::Write + Send + 'static>,
        format: OutputFormat,
    ) -> Result<(), SimulationError> {
        let (write_sender, write_receiver) = mpsc::channel::<(Option<SimulationSummary>, usize)>();

        // Unique ids let the writing thread know when every simulation is done
        let ids = HashSet::from_iter(1..=self.simulations.len());
        let write_handle =
            thread::spawn(move || write::write_summaries(write_receiver, ids, file_out, format));

        let mut handles = vec![];
        for (i, mut simulation) in self.simulations.drain(..).enumerate() {
            let id = i + 1;
            let write_sender_clone = write_sender.clone();
            let num_simulations = simulation.config().num_simulations;

            let handle = thread::spawn(move || -> Result<(), SimulationError> {
                for _ in 0..num_simulations {
                    let summary = simulation.run_single_simulation()?;
                    write_sender_clone
                        .send((Some(summary), id))
                        .map_err(|e| SimulationError::Sending(e.to_string()))?;
                }
                // Tell the writing thread we are finished with this simulation
                write_sender_clone
                    .send((None, id))
                    .map_err(|e| SimulationError::Sending(e.to_string()))?;
                Ok(())
            });
            handles.push((id, handle));
        }
        drop(write_sender);

        let mut result = Ok(());
        for (id, handle) in handles {
            let outcome = handle
                .join()
                .map_err(|_| SimulationError::ThreadPanicked(id))
                .and_then(|r| r);
            if let Err(e) = outcome {
                log::error!("error occured for simulation #{}: {}", id, e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }

        // Make sure the writer has finished as well
        write_handle
            .join()
            .map_err(|_| SimulationError::ThreadPanicked(0))??;

        result
    }
}

/// Struct for building a `MulStrategyBlackjackSimulator` object
pub struct MulStrategyBlackjackSimulatorBuilder {
    simulations: Vec<BlackjackSimulator>,
    config: BlackjackSimulatorConfig,
}

impl MulStrategyBlackjackSimulatorBuilder {
    /// Adds a simulation that plays `ladder`, everything else is taken from the preset
    /// `BlackjackSimulatorConfig` passed on creation.
    pub fn simulation(&mut self, ladder: BidLadder) -> &mut Self {
        let config = BlackjackSimulatorConfig {
            ladder,
            ..self.config
        };
        self.simulations.push(BlackjackSimulator::new(config));
        self
    }

    /// Method that builds a `MulStrategyBlackjackSimulator` object
    pub fn build(&mut self) -> MulStrategyBlackjackSimulator {
        MulStrategyBlackjackSimulator {
            simulations: std::mem::take(&mut self.simulations),
            config: self.config,
        }
    }
}

/// Struct for configuring a single `BlackjackSimulator` object. Every field has a default, so a
/// JSON file only needs the fields it changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackjackSimulatorConfig {
    pub num_players: usize,
    pub starting_balance: f64,
    pub num_decks: usize,
    pub rules: TableRules,
    pub ladder: BidLadder,
    pub rounds_per_simulation: u32,
    pub num_simulations: u32,
    pub seed: Option<u64>,
    pub silent: bool,
}

impl BlackjackSimulatorConfig {
    /// Associated method for returning a new `BlackjackSimulatorConfigBuilder` object. Allows
    /// choosing the parameters of the simulation such as the players starting balance, the number
    /// of simulations run, the table rules and how many decks are used.
    pub fn new() -> BlackjackSimulatorConfigBuilder {
        BlackjackSimulatorConfigBuilder::default()
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SimulationError> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(io::BufReader::new(file))?;
        Ok(config)
    }
}

impl Default for BlackjackSimulatorConfig {
    /// Returns the standard configurations for the simulation.
    fn default() -> Self {
        BlackjackSimulatorConfig::new().build()
    }
}

/// Struct to implement builder pattern for `BlackjackSimulatorConfig`
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackjackSimulatorConfigBuilder {
    num_players: Option<usize>,
    starting_balance: Option<f64>,
    num_decks: Option<usize>,
    rules: Option<TableRules>,
    ladder: Option<BidLadder>,
    rounds_per_simulation: Option<u32>,
    num_simulations: Option<u32>,
    seed: Option<u64>,
    silent: Option<bool>,
}

impl BlackjackSimulatorConfigBuilder {
    /// Starts from an existing configuration instead of the defaults.
    pub fn from_config(config: BlackjackSimulatorConfig) -> Self {
        BlackjackSimulatorConfigBuilder {
            num_players: Some(config.num_players),
            starting_balance: Some(config.starting_balance),
            num_decks: Some(config.num_decks),
            rules: Some(config.rules),
            ladder: Some(config.ladder),
            rounds_per_simulation: Some(config.rounds_per_simulation),
            num_simulations: Some(config.num_simulations),
            seed: config.seed,
            silent: Some(config.silent),
        }
    }

    /// Method for changing the number of players seated at the table.
    pub fn num_players(&mut self, players: usize) -> &mut Self {
        self.num_players = Some(players);
        self
    }

    /// Method for changing the starting balance of every player.
    pub fn starting_balance(&mut self, balance: f64) -> &mut Self {
        self.starting_balance = Some(balance);
        self
    }

    /// Method for choosing the number of decks used in the game
    pub fn num_decks(&mut self, decks: usize) -> &mut Self {
        self.num_decks = Some(decks);
        self
    }

    pub fn rules(&mut self, rules: TableRules) -> &mut Self {
        self.rules = Some(rules);
        self
    }

    pub fn ladder(&mut self, ladder: BidLadder) -> &mut Self {
        self.ladder = Some(ladder);
        self
    }

    /// Method for setting the maximum number of rounds that will be played for each simulation
    pub fn rounds_per_simulation(&mut self, rounds: u32) -> &mut Self {
        self.rounds_per_simulation = Some(rounds);
        self
    }

    /// Method for setting the number of simulations run.
    pub fn num_simulations(&mut self, n: u32) -> &mut Self {
        self.num_simulations = Some(n);
        self
    }

    /// Seeds the shoe so runs can be reproduced.
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// Method for setting a boolean flag, if set to false the `BlackjackSimulator` configured with
    /// these configurations displays the stats of each simulation it runs.
    pub fn silent(&mut self, silent: bool) -> &mut Self {
        self.silent = Some(silent);
        self
    }

    /// Method for building a `BlackjackSimulatorConfig` object from the given builder.
    pub fn build(&mut self) -> BlackjackSimulatorConfig {
        BlackjackSimulatorConfig {
            num_players: self.num_players.unwrap_or(1),
            starting_balance: self.starting_balance.unwrap_or(500.0),
            num_decks: self.num_decks.unwrap_or(6),
            rules: self.rules.unwrap_or_default(),
            ladder: self.ladder.unwrap_or_default(),
            rounds_per_simulation: self.rounds_per_simulation.unwrap_or(50),
            num_simulations: self.num_simulations.unwrap_or(100),
            seed: self.seed,
            silent: self.silent.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> BlackjackSimulatorConfig {
        BlackjackSimulatorConfig::new()
            .num_players(3)
            .starting_balance(200.0)
            .num_simulations(5)
            .rounds_per_simulation(100)
            .seed(11)
            .build()
    }

    #[test]
    fn simple_simulation_test() {
        let mut simulator = BlackjackSimulator::new(small_config());

        let summary = match simulator.run() {
            Ok(summary) => summary.clone(),
            Err(e) => panic!("error: {}", e),
        };

        assert_eq!(summary.simulations, 5);
        assert!(summary.rounds_played <= 500);
        assert!(summary.total_hands() > 0);
        assert_eq!(summary.label, BidLadder::default().label());
    }

    #[test]
    fn default_table_finishes_every_seed() {
        let config = BlackjackSimulatorConfig::new()
            .seed(0)
            .num_simulations(40)
            .rounds_per_simulation(1000)
            .build();
        let mut simulator = BlackjackSimulator::new(config);
        let summary = simulator.run().unwrap_or_else(|e| panic!("error: {}", e));
        assert_eq!(summary.simulations, 40);
    }

    #[test]
    fn seeded_simulations_are_reproducible() {
        let mut first = BlackjackSimulator::new(small_config());
        let mut second = BlackjackSimulator::new(small_config());
        first.run().unwrap();
        second.run().unwrap();
        assert_eq!(first.summary(), second.summary());

        first.reset();
        assert_eq!(first.summary().simulations, 0);
    }

    #[test]
    fn config_defaults_and_json() {
        let config = BlackjackSimulatorConfig::default();
        assert_eq!(config.num_players, 1);
        assert_eq!(config.rules, TableRules::default());
        assert_eq!(config.ladder.limit(), 32.0);

        let parsed: BlackjackSimulatorConfig = serde_json::from_str(
            r#"{ "num_players": 4, "rules": { "double_policy": "any-two-cards" }, "ladder": { "bid_pow_limit": 3 } }"#,
        )
        .unwrap();
        assert_eq!(parsed.num_players, 4);
        assert_eq!(parsed.rules.double_policy, DoublePolicy::AnyTwoCards);
        assert_eq!(parsed.rules.max_bet, 100.0);
        assert_eq!(parsed.ladder.limit(), 8.0);
        assert_eq!(parsed.num_simulations, config.num_simulations);

        let rebuilt = BlackjackSimulatorConfigBuilder::from_config(parsed).build();
        assert_eq!(rebuilt, parsed);
    }

    #[test]
    fn summary_display() {
        let empty = SimulationSummary::new("ladder");
        let text = empty.to_string();
        assert!(text.contains("strategy: ladder"));
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn run_multiple_simulations() {
        let config = BlackjackSimulatorConfig::new()
            .num_simulations(3)
            .rounds_per_simulation(50)
            .seed(5)
            .build();
        let mut simulator = MulStrategyBlackjackSimulator::new(config)
            .simulation(BidLadder::new(1.0, 2.0, 5))
            .simulation(BidLadder::new(1.0, 3.0, 3))
            .build();
        assert_eq!(simulator.len(), 2);

        if let Err(e) = simulator.run(Box::new(io::sink()), OutputFormat::Text) {
            panic!("{}", e);
        }
        assert!(simulator.is_empty());
    }
}
