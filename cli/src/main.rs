//! culpa CLI - command-line harness around the fixture trees
//!
//! Renders a fixture, computes worst-case and guaranteed likelihoods plus the
//! dominance relations of every information set, and runs the trust-based
//! reduction.

use std::error::Error;
use std::process::ExitCode;

use culpa_engine::dominance::{is_strictly_dominated, is_weakly_dominated, shortfall, trust_based_reduced_tree};
use culpa_engine::test_tree::{self, FIXTURES};
use culpa_engine::{EngineConfig, Group, Resolve, Tree};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const USAGE: &str = "\
Usage:
  culpa list
  culpa show <fixture>
  culpa analyze <fixture>
  culpa reduce <fixture> <information-set>

Options:
  -d          raise log verbosity (repeatable, overridden by CULPA_LOG)
  --no-memo   evaluate without the per-tree caches";

struct Options {
    verbosity: u8,
    memoize: bool,
    positional: Vec<String>,
}

fn parse_args(args: impl Iterator<Item = String>) -> Options {
    let mut options = Options {
        verbosity: 0,
        memoize: true,
        positional: Vec::new(),
    };
    for arg in args {
        match arg.as_str() {
            "--no-memo" => options.memoize = false,
            flag if flag.starts_with("-d") && flag[1..].chars().all(|c| c == 'd') => {
                options.verbosity = options.verbosity.saturating_add((flag.len() - 1) as u8);
            }
            _ => options.positional.push(arg),
        }
    }
    options
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::try_from_env("CULPA_LOG").unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
    tracing_subscriber::registry().with(fmt_layer.with_filter(filter)).init();
    debug!(verbosity, "logging initialised");
}

fn load(name: &str, memoize: bool) -> Result<Tree, Box<dyn Error>> {
    let tree = test_tree::by_name(name)
        .ok_or_else(|| format!("unknown fixture '{name}', expected one of: {}", FIXTURES.join(", ")))??;
    Ok(tree.with_config(EngineConfig::default().with_memoize(memoize)))
}

fn show(tree: &Tree) {
    println!("{tree}");
    println!("Information sets:");
    let branch = tree.root_branch();
    for ins in branch.information_sets() {
        if let Ok(set) = tree.arena().infoset(ins) {
            println!("  {set}");
        }
    }
}

fn analyze(tree: &Tree) -> Result<(), Box<dyn Error>> {
    let branch = tree.root_branch();
    let root = tree.root();
    println!("Tree '{}'", tree.name());
    println!("  worst-case likelihood: {}", branch.get_likelihood(root, None, None, Resolve::Max)?);
    println!("  best-case likelihood:  {}", branch.get_likelihood(root, None, None, Resolve::Min)?);

    for player in branch.players() {
        let group = Group::singleton(&player);
        println!("Player {player}");
        println!("  guaranteed likelihood: {}", branch.get_guaranteed_likelihood(root, &group)?);
        for ins in branch.information_sets_of(&group) {
            let set = tree.arena().infoset(ins)?;
            println!("  {}", set.name());
            for action in set.actions() {
                let verdict = if is_strictly_dominated(tree, action, ins)? {
                    "strictly dominated"
                } else if is_weakly_dominated(tree, action, ins)? {
                    "weakly dominated"
                } else {
                    "undominated"
                };
                println!("    {action}: {verdict}, shortfall {}", shortfall(tree, action, ins)?);
            }
        }
    }
    let all = branch.all_players();
    println!("Group {all}");
    println!("  guaranteed likelihood: {}", branch.get_guaranteed_likelihood(root, &all)?);
    Ok(())
}

fn reduce(tree: &Tree, infoset: &str) -> Result<(), Box<dyn Error>> {
    let ins = tree
        .root_branch()
        .information_set_by_name(infoset)
        .ok_or_else(|| format!("no information set '{infoset}' in '{}'", tree.name()))?;
    let (reduced, subs) = trust_based_reduced_tree(tree, ins)?;
    info!(tree = reduced.name(), kept = subs.len(), "reduced");
    show(&reduced);
    Ok(())
}

fn run(options: &Options) -> Result<(), Box<dyn Error>> {
    let args: Vec<&str> = options.positional.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["list"] => {
            for name in FIXTURES {
                println!("{name}");
            }
        }
        ["show", fixture] => show(&load(fixture, options.memoize)?),
        ["analyze", fixture] => analyze(&load(fixture, options.memoize)?)?,
        ["reduce", fixture, infoset] => reduce(&load(fixture, options.memoize)?, infoset)?,
        _ => {
            println!("culpa v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("{USAGE}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let options = parse_args(std::env::args().skip(1));
    setup_logging(options.verbosity);
    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Options {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_flags_are_separated_from_positionals() {
        let options = args(&["-d", "analyze", "--no-memo", "-dd", "forward_trust"]);
        assert_eq!(options.verbosity, 3);
        assert!(!options.memoize);
        assert_eq!(options.positional, vec!["analyze", "forward_trust"]);
    }

    #[test]
    fn test_commands_run_on_fixtures() {
        let tree = load("forward_trust", false).unwrap();
        analyze(&tree).unwrap();
        reduce(&tree, "ins_v1").unwrap();
        assert!(reduce(&tree, "missing").is_err());
        assert!(load("missing", true).is_err());
    }
}
