use anyhow::{Context, Result, bail};
use env_logger::Env;
use log::debug;
use sched_sim::sim::BernoulliWorkload;
use sched_sim::{PolicyKind, Process, RequeueOrder, SimConfig};
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const USAGE: &str = "\
usage: sched-sim [options]

With no input option the process list and policy are read interactively.

options:
  --scenario <file>   read processes and policy from a JSON scenario
  --random <count>    generate <count> processes
  --seed <n>          seed for --random (default 0)
  --policy <name>     fcfs | sjf | srtf | rr
  --quantum <n>       round-robin time quantum
  --requeue <order>   arrivals_first | preempted_first
  --json              print the report as JSON
  -h, --help          show this message";

#[derive(Debug, Default)]
struct Args {
    scenario: Option<PathBuf>,
    random: Option<usize>,
    seed: u64,
    policy: Option<PolicyKind>,
    quantum: Option<i64>,
    requeue: Option<RequeueOrder>,
    json: bool,
}

impl Args {
    fn parse(mut argv: impl Iterator<Item = String>) -> Result<Option<Self>> {
        let mut args = Args::default();

        while let Some(flag) = argv.next() {
            let mut value = || {
                argv.next()
                    .with_context(|| format!("{flag} expects a value"))
            };
            match flag.as_str() {
                "--scenario" => args.scenario = Some(PathBuf::from(value()?)),
                "--random" => args.random = Some(value()?.parse().context("--random count")?),
                "--seed" => args.seed = value()?.parse().context("--seed")?,
                "--policy" => args.policy = Some(value()?.parse()?),
                "--quantum" => args.quantum = Some(value()?.parse().context("--quantum")?),
                "--requeue" => args.requeue = Some(value()?.parse()?),
                "--json" => args.json = true,
                "-h" | "--help" => return Ok(None),
                other => bail!("unknown argument '{other}'\n\n{USAGE}"),
            }
        }

        if args.scenario.is_some() && args.random.is_some() {
            bail!("--scenario and --random are mutually exclusive");
        }
        Ok(Some(args))
    }
}

#[derive(Debug, Deserialize)]
struct Scenario {
    processes: Vec<(u64, u64, u64)>,
    #[serde(default)]
    policy: Option<PolicyKind>,
    #[serde(default)]
    quantum: Option<i64>,
    #[serde(default)]
    requeue: Option<RequeueOrder>,
}

/// Whitespace-separated integer reader for the interactive prompts.
struct Prompter<R, W> {
    input: R,
    output: W,
    pending: Vec<String>,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            pending: Vec::new(),
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<i64> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        while self.pending.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                bail!("unexpected end of input");
            }
            self.pending = line.split_whitespace().rev().map(str::to_owned).collect();
        }

        let token = self.pending.pop().unwrap_or_default();
        token
            .parse()
            .with_context(|| format!("expected an integer, got '{token}'"))
    }

    fn ask_ticks(&mut self, prompt: &str) -> Result<u64> {
        let value = self.ask(prompt)?;
        u64::try_from(value).with_context(|| format!("value must not be negative, got {value}"))
    }

    fn read_processes(&mut self) -> Result<Vec<Process>> {
        let count = self.ask("Enter number of processes: ")?;
        let count = usize::try_from(count).context("process count must not be negative")?;

        let mut specs = Vec::with_capacity(count);
        for pid in 1..=count {
            write!(self.output, "\nProcess {pid} Details:")?;
            let arrival = self.ask_ticks("\n  Arrival time: ")?;
            let burst = self.ask_ticks("  Burst time: ")?;
            let memory = self.ask_ticks("  Memory req: ")?;
            specs.push((arrival, burst, memory));
        }
        Ok(Process::batch(specs))
    }

    fn read_policy(&mut self) -> Result<PolicyKind> {
        write!(self.output, "\nSelect scheduling algorithm:")?;
        for (n, policy) in PolicyKind::ALL.iter().enumerate() {
            write!(self.output, "\n  {}. {}", n + 1, policy.menu_label())?;
        }
        let choice = self.ask("\nChoice: ")?;
        Ok(PolicyKind::from_menu_choice(choice)?)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let Some(args) = Args::parse(std::env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    let mut policy = args.policy;
    let mut quantum = args.quantum;
    let mut requeue = args.requeue;

    let processes = if let Some(path) = &args.scenario {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&text)
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        policy = policy.or(scenario.policy);
        quantum = quantum.or(scenario.quantum);
        requeue = requeue.or(scenario.requeue);
        Process::batch(scenario.processes)
    } else if let Some(count) = args.random {
        BernoulliWorkload::default().generate(count, args.seed)
    } else {
        prompter.read_processes()?
    };
    debug!("Loaded {} processes", processes.len());

    let policy = match policy {
        Some(policy) => policy,
        None if args.scenario.is_none() && args.random.is_none() => prompter.read_policy()?,
        None => bail!("no policy selected; pass --policy"),
    };
    if policy.needs_quantum() && quantum.is_none() {
        quantum = Some(prompter.ask("Enter time quantum: ")?);
    }

    let config = SimConfig::new(policy, quantum)?.with_requeue(requeue.unwrap_or_default());
    let report = sched_sim::simulate(&processes, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("\n{report}");
    }
    Ok(())
}
