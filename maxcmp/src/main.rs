//! Command-line front-end for the two-party maximum comparison.
//!
//! Alice garbles and connects; bob evaluates and listens. Exit codes:
//! 0 success, 2 input error, 3 protocol abort, 4 transport error.

mod input;

use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::time::Duration;

use circuit::comparator;
use crypto_core::{ChannelConfig, NetChannel};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use structopt::StructOpt;
use twopc::{clear_verdict, run_as_evaluator, run_as_garbler, SessionParams, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Party {
    Alice,
    Bob,
}

impl Party {
    fn name(&self) -> &'static str {
        match self {
            Party::Alice => "alice",
            Party::Bob => "bob",
        }
    }

    fn default_input_file(&self) -> &'static str {
        match self {
            Party::Alice => "input_alice.txt",
            Party::Bob => "input_bob.txt",
        }
    }

    fn other_input_file(&self) -> &'static str {
        match self {
            Party::Alice => "input_bob.txt",
            Party::Bob => "input_alice.txt",
        }
    }
}

impl FromStr for Party {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alice" => Ok(Party::Alice),
            "bob" => Ok(Party::Bob),
            other => Err(format!("unknown party '{other}'")),
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "maxcmp", about = "Compare two private set maxima without revealing them.")]
struct Opt {
    /// The party to run: alice garbles, bob evaluates.
    #[structopt(possible_values = &["alice", "bob"])]
    party: Party,

    /// Peer address: bob listens on it, alice connects to it.
    #[structopt(long, default_value = "127.0.0.1:12345")]
    addr: String,

    /// Input file (default input_alice.txt / input_bob.txt by party).
    #[structopt(long, parse(from_os_str))]
    input: Option<PathBuf>,

    /// Circuit width in bits.
    #[structopt(long, default_value = "32")]
    bits: usize,

    /// Fixed-point scale applied to every input.
    #[structopt(long, default_value = "10")]
    scale: u32,

    /// Per-message timeout in seconds (0 disables it).
    #[structopt(long, default_value = "30")]
    timeout: u64,

    /// Whole-session deadline in seconds (0 means unbounded).
    #[structopt(long, default_value = "0")]
    deadline: u64,

    /// Log verbosity.
    #[structopt(
        short = "l",
        long,
        default_value = "warning",
        possible_values = &["debug", "info", "warning", "error"]
    )]
    loglevel: String,

    /// Additionally recompute the verdict in the clear from both input
    /// files. Test aid only: it reads the other party's file locally.
    #[structopt(short, long)]
    verify: bool,
}

fn main() {
    process::exit(run(Opt::from_args()));
}

fn run(opt: Opt) -> i32 {
    let filter = match opt.loglevel.as_str() {
        "warning" => "warn",
        other => other,
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if !(2..=64).contains(&opt.bits) {
        eprintln!("input error: circuit width {} not in 2..=64", opt.bits);
        return 2;
    }
    if opt.scale == 0 {
        eprintln!("input error: scale must be positive");
        return 2;
    }

    let input_path = opt
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(opt.party.default_input_file()));
    let inputs = match input::load_inputs(&input_path, opt.scale) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("input error: {e:#}");
            return 2;
        }
    };
    log::info!(
        "{}: loaded {} inputs from {}",
        opt.party.name(),
        inputs.len(),
        input_path.display()
    );

    let params = SessionParams {
        n_bits: opt.bits,
        scale: opt.scale,
    };
    let circ = comparator(opt.bits);
    let config = ChannelConfig {
        message_timeout: (opt.timeout > 0).then(|| Duration::from_secs(opt.timeout)),
        session_deadline: (opt.deadline > 0).then(|| Duration::from_secs(opt.deadline)),
    };
    let mut rng = ChaCha20Rng::from_entropy();

    let result = match opt.party {
        Party::Alice => match NetChannel::connect(&opt.addr, config) {
            Ok(mut channel) => run_as_garbler(&mut channel, &mut rng, &circ, &inputs, params),
            Err(e) => {
                eprintln!("transport failure: {e}");
                return 4;
            }
        },
        Party::Bob => match NetChannel::accept(&opt.addr, config) {
            Ok(mut channel) => run_as_evaluator(&mut channel, &mut rng, &circ, &inputs, params),
            Err(e) => {
                eprintln!("transport failure: {e}");
                return 4;
            }
        },
    };

    let verdict = match result {
        Ok(verdict) => verdict,
        Err(e) => {
            eprintln!("{e}");
            return e.exit_code();
        }
    };

    println!("verdict {verdict} ({})", describe(verdict));
    let won = matches!(
        (opt.party, verdict),
        (Party::Alice, Verdict::Alice) | (Party::Bob, Verdict::Bob)
    );
    if won {
        let max = inputs.iter().max().copied().unwrap_or(0);
        log::info!(
            "{}: the global maximum is my {}",
            opt.party.name(),
            format_fixed(max, opt.scale)
        );
    }

    if opt.verify {
        match verify(&opt, &inputs, verdict) {
            Ok(true) => log::info!("verification successful"),
            Ok(false) => {
                eprintln!("verification failed: clear-text verdict disagrees");
                return 3;
            }
            Err(e) => {
                eprintln!("input error: {e:#}");
                return 2;
            }
        }
    }
    0
}

fn describe(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Equal => "both parties hold the same maximum",
        Verdict::Alice => "alice holds the global maximum",
        Verdict::Bob => "bob holds the global maximum",
    }
}

fn format_fixed(scaled: i64, scale: u32) -> String {
    if scale == 1 {
        scaled.to_string()
    } else {
        format!("{}", scaled as f64 / scale as f64)
    }
}

/// Recompute the verdict in the clear from both parties' input files.
fn verify(opt: &Opt, mine: &[i64], protocol_verdict: Verdict) -> anyhow::Result<bool> {
    let theirs = input::load_inputs(&PathBuf::from(opt.party.other_input_file()), opt.scale)?;
    let my_max = mine.iter().max().copied().expect("inputs are non-empty");
    let their_max = theirs
        .iter()
        .max()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("other party's input file is empty"))?;

    let (alice_max, bob_max) = match opt.party {
        Party::Alice => (my_max, their_max),
        Party::Bob => (their_max, my_max),
    };
    let expected = clear_verdict(alice_max, bob_max);
    log::info!("clear-text verdict {expected} ({})", describe(expected));
    Ok(expected == protocol_verdict)
}
