use blackjack_sim::strategy::validate_tables;
use blackjack_sim::{
    BidLadder, BlackjackSimulatorConfig, BlackjackSimulatorConfigBuilder, DoublePolicy,
    MulStrategyBlackjackSimulator, OutputFormat, SimulationError, TableRules,
};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "blackjack_sim",
    about = "Simulate blackjack tables of basic-strategy players betting on a bid ladder"
)]
struct Args {
    /// JSON configuration file, the flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of players seated at the table
    #[arg(long)]
    players: Option<usize>,

    /// Starting balance of every player
    #[arg(long)]
    balance: Option<f64>,

    /// Number of decks in the shoe
    #[arg(long)]
    decks: Option<usize>,

    /// Reshuffle once fewer than this percentage of the shoe remains
    #[arg(long)]
    shuffle_perc: Option<f64>,

    #[arg(long)]
    min_bet: Option<f64>,

    #[arg(long)]
    max_bet: Option<f64>,

    /// Maximum number of rounds per simulation
    #[arg(long)]
    rounds: Option<u32>,

    /// Number of simulations per ladder
    #[arg(long)]
    simulations: Option<u32>,

    /// Seed for the shoe, runs with the same seed are reproducible
    #[arg(long)]
    seed: Option<u64>,

    /// Which two-card hands may be doubled
    #[arg(long, value_enum)]
    double_policy: Option<DoublePolicy>,

    /// First bid of the ladder
    #[arg(long)]
    original_bid: Option<f64>,

    /// Highest power of the multiplier the ladder may reach
    #[arg(long)]
    pow_limit: Option<i32>,

    /// Ladder multipliers to compare, one simulation each (e.g. "2,3")
    #[arg(long, value_delimiter = ',')]
    multipliers: Vec<f64>,

    /// Print the stats of every single simulation
    #[arg(long, default_value_t = false)]
    verbose: bool,

    /// Write the summaries as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Args {
    fn into_config(self) -> Result<(BlackjackSimulatorConfig, Vec<f64>), SimulationError> {
        let base = match &self.config {
            Some(path) => BlackjackSimulatorConfig::from_json_file(path)?,
            None => BlackjackSimulatorConfig::default(),
        };

        let rules = TableRules {
            min_bet: self.min_bet.unwrap_or(base.rules.min_bet),
            max_bet: self.max_bet.unwrap_or(base.rules.max_bet),
            shuffle_perc: self.shuffle_perc.unwrap_or(base.rules.shuffle_perc),
            double_policy: self.double_policy.unwrap_or(base.rules.double_policy),
        };
        let ladder = BidLadder {
            original_bid: self.original_bid.unwrap_or(base.ladder.original_bid),
            bid_pow_limit: self.pow_limit.unwrap_or(base.ladder.bid_pow_limit),
            ..base.ladder
        };

        let mut builder = BlackjackSimulatorConfigBuilder::from_config(base);
        builder.rules(rules).ladder(ladder).silent(!self.verbose);
        if let Some(players) = self.players {
            builder.num_players(players);
        }
        if let Some(balance) = self.balance {
            builder.starting_balance(balance);
        }
        if let Some(decks) = self.decks {
            builder.num_decks(decks);
        }
        if let Some(rounds) = self.rounds {
            builder.rounds_per_simulation(rounds);
        }
        if let Some(simulations) = self.simulations {
            builder.num_simulations(simulations);
        }
        if let Some(seed) = self.seed {
            builder.seed(seed);
        }

        let multipliers = if self.multipliers.is_empty() {
            vec![ladder.bid_multiplier]
        } else {
            self.multipliers
        };
        Ok((builder.build(), multipliers))
    }
}

fn run(args: Args) -> Result<(), SimulationError> {
    validate_tables()?;

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let (config, multipliers) = args.into_config()?;

    let mut builder = MulStrategyBlackjackSimulator::new(config);
    for multiplier in multipliers {
        builder.simulation(BidLadder {
            bid_multiplier: multiplier,
            ..config.ladder
        });
    }
    let mut simulator = builder.build();
    log::info!(
        "running {} ladders with {} players for {} simulations",
        simulator.len(),
        config.num_players,
        config.num_simulations
    );
    simulator.run(Box::new(std::io::stdout()), format)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
