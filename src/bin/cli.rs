//! quantsim CLI - run betting, calibration, value-of-information and sampling experiments

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use quantsim::config::{CalibrationConfig, KellyConfig, SimConfig, StatsConfig, VoiConfig};
use quantsim::core::voi::{evaluate_voi, VoiReport};
use quantsim::simulation::{
    run_stats, CalibrationExperiment, CalibrationResult, KellyExperiment, KellyResult, StatsReport,
};
use quantsim::Termination;

const DEFAULT_STATS_FILE: &str = "stats.json";

/// Width of the text bar charts
const BAR_WIDTH: usize = 40;

#[derive(Parser)]
#[command(name = "quantsim")]
#[command(author, version, about = "Seedable probability simulations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// JSON file with experiment parameters (flags override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare betting policies on one simulated outcome stream
    Kelly {
        /// Number of bets
        #[arg(short, long)]
        n: Option<usize>,

        /// True win probability
        #[arg(long)]
        p_true: Option<f64>,

        /// Believed win probability used for Kelly sizing
        #[arg(long)]
        p_hat: Option<f64>,

        /// Fraction staked by the fixed policy
        #[arg(long)]
        fixed: Option<f64>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Score forecast models across a regime switch
    Calibration {
        /// Length of the binary stream
        #[arg(short, long)]
        n: Option<usize>,

        /// Probability before the switch point
        #[arg(long)]
        p1: Option<f64>,

        /// Probability after the switch point
        #[arg(long)]
        p2: Option<f64>,

        /// Switch point (1 to n-1), also the train/test split
        #[arg(short, long)]
        switch_point: Option<usize>,

        /// Number of calibration bins
        #[arg(long)]
        bins: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Value of a noisy signal before choosing between actions A and B
    Voi {
        /// Prior probability of the good state (0-1, exclusive)
        #[arg(short, long)]
        prior: Option<f64>,

        /// Signal accuracy (0-1, exclusive)
        #[arg(short, long)]
        q: Option<f64>,
    },

    /// Sample normal data, print statistics and write them to a JSON file
    Stats {
        #[arg(short, long)]
        n: Option<usize>,

        #[arg(long)]
        mean: Option<f64>,

        #[arg(long)]
        std_dev: Option<f64>,

        /// Number of histogram bins
        #[arg(long)]
        bins: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Output statistics file
        #[arg(short, long, default_value = DEFAULT_STATS_FILE)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => SimConfig::default(),
    };
    debug!(?config, "Loaded configuration");

    if !cli.json {
        println!("{}", "quantsim".cyan().bold());
        println!();
    }

    if cli.interactive {
        return run_interactive(config);
    }

    match cli.command {
        Some(Commands::Kelly {
            n,
            p_true,
            p_hat,
            fixed,
            seed,
        }) => {
            let kelly = &mut config.kelly;
            override_with(&mut kelly.n, n);
            override_with(&mut kelly.p_true, p_true);
            override_with(&mut kelly.p_hat, p_hat);
            override_with(&mut kelly.fixed_fraction, fixed);
            override_with(&mut kelly.seed, seed);
            run_kelly(&config.kelly, cli.json)
        }
        Some(Commands::Calibration {
            n,
            p1,
            p2,
            switch_point,
            bins,
            seed,
        }) => {
            let cal = &mut config.calibration;
            override_with(&mut cal.n, n);
            override_with(&mut cal.p1, p1);
            override_with(&mut cal.p2, p2);
            override_with(&mut cal.switch_point, switch_point);
            override_with(&mut cal.bins, bins);
            override_with(&mut cal.seed, seed);
            run_calibration(&config.calibration, cli.json)
        }
        Some(Commands::Voi { prior, q }) => {
            override_with(&mut config.voi.p_prior, prior);
            override_with(&mut config.voi.q, q);
            run_voi(&config.voi, cli.json)
        }
        Some(Commands::Stats {
            n,
            mean,
            std_dev,
            bins,
            seed,
            output,
        }) => {
            let stats = &mut config.stats;
            override_with(&mut stats.n, n);
            override_with(&mut stats.mean, mean);
            override_with(&mut stats.std_dev, std_dev);
            override_with(&mut stats.bins, bins);
            if seed.is_some() {
                stats.seed = seed;
            }
            run_sampling(&config.stats, &output, cli.json)
        }
        None => {
            println!("No command given. Use --help or --interactive.");
            Ok(())
        }
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize result")?
    );
    Ok(())
}

fn run_kelly(config: &KellyConfig, json: bool) -> Result<()> {
    config.validate().context("Invalid Kelly parameters")?;

    let result = KellyExperiment::new(config.clone())
        .run()
        .context("Kelly experiment failed")?;

    if json {
        return print_json(&result);
    }

    println!("{}", "Running Kelly betting simulation...".green());
    println!("Bets: {}", config.n);
    println!("True win probability: {:.2}", config.p_true);
    println!("Believed win probability: {:.2}", config.p_hat);
    println!("Seed: {}", config.seed);
    println!(
        "Realized win rate: {:.1}%",
        result.outcomes.frequency() * 100.0
    );
    println!();

    print_kelly_summary(&result);
    print_wealth_checkpoints(&result, 10);

    Ok(())
}

fn print_kelly_summary(result: &KellyResult) {
    println!("{}", "Wealth by Policy:".yellow().bold());
    println!(
        "{:<14} {:>9} {:>12} {:>10} {:>10} {:>12}  {}",
        "Policy", "Fraction", "Final", "Peak", "Max DD", "Growth/bet", "Status"
    );
    println!("{}", "-".repeat(86));

    for p in &result.policies {
        let growth = p
            .summary
            .log_growth_rate
            .map(|g| format!("{:.5}", g))
            .unwrap_or_else(|| "-".to_string());
        let status = match p.trajectory.termination {
            Termination::Horizon => "completed".normal(),
            Termination::Ruin { round } => format!("ruined at bet {}", round).red(),
        };
        let final_wealth = format!("{:.4}", p.summary.final_wealth);
        let final_wealth = if p.summary.final_wealth >= 1.0 {
            final_wealth.green()
        } else {
            final_wealth.red()
        };

        println!(
            "{:<14} {:>9.3} {:>12} {:>10.4} {:>9.1}% {:>12}  {}",
            p.name,
            p.fraction,
            final_wealth,
            p.summary.peak_wealth,
            p.summary.max_drawdown * 100.0,
            growth,
            status
        );
    }
    println!();
}

/// Wealth of every policy at evenly spaced bets
fn print_wealth_checkpoints(result: &KellyResult, steps: usize) {
    let n = result.outcomes.len();
    if n == 0 || steps == 0 {
        return;
    }

    println!("{}", "Wealth Evolution:".yellow().bold());
    print!("{:>6}", "Bet");
    for p in &result.policies {
        print!(" {:>12}", p.name);
    }
    println!();
    println!("{}", "-".repeat(6 + 13 * result.policies.len()));

    let stride = (n / steps).max(1);
    let mut checkpoints: Vec<usize> = (0..=n).step_by(stride).collect();
    if checkpoints.last() != Some(&n) {
        checkpoints.push(n);
    }

    for bet in checkpoints {
        print!("{:>6}", bet);
        for p in &result.policies {
            match p.trajectory.path.get(bet) {
                Some(w) => print!(" {:>12.4}", w.max(0.0)),
                None => print!(" {:>12}", "ruined"),
            }
        }
        println!();
    }
    println!();
}

fn run_calibration(config: &CalibrationConfig, json: bool) -> Result<()> {
    config.validate().context("Invalid calibration parameters")?;

    let result = CalibrationExperiment::new(config.clone())
        .run()
        .context("Calibration experiment failed")?;

    if json {
        return print_json(&result);
    }

    println!("{}", "Running calibration study...".green());
    println!("Stream length: {}", config.n);
    println!(
        "Regimes: p = {:.2} before bet {}, p = {:.2} after",
        config.p1, config.switch_point, config.p2
    );
    println!(
        "Train: {} outcomes ({:.1}% ones), Test: {} outcomes ({:.1}% ones)",
        result.train_len,
        result.train_frequency * 100.0,
        result.test_len,
        result.test_frequency * 100.0
    );
    println!();

    print_calibration_summary(&result);

    Ok(())
}

fn print_calibration_summary(result: &CalibrationResult) {
    println!("{}", "MODEL PERFORMANCE (TEST SET)".yellow().bold());
    println!(
        "{:<16} {:>10} {:>12} {:>12} {:>10}",
        "Model", "Forecast", "Brier Score", "Log Loss", "ECE"
    );
    println!("{}", "-".repeat(64));
    for m in &result.models {
        println!(
            "{:<16} {:>10.4} {:>12.4} {:>12.4} {:>10.4}",
            m.name, m.forecaster.probability, m.record.brier, m.record.log_loss, m.record.ece
        );
    }

    println!("\n{}", "Reliability Diagram:".yellow().bold());
    println!(
        "{:<16} {:>12} {:>12} {:>10}",
        "Model", "Predicted", "Observed", "Gap"
    );
    println!("{}", "-".repeat(53));
    for m in &result.models {
        for (predicted, observed) in m.record.calibration.points() {
            let gap = format!("{:+.4}", predicted - observed);
            let gap = if (predicted - observed).abs() > 0.1 {
                gap.red()
            } else {
                gap.normal()
            };
            println!(
                "{:<16} {:>12.4} {:>12.4} {:>10}",
                m.name, predicted, observed, gap
            );
        }
    }
    println!();
}

fn run_voi(config: &VoiConfig, json: bool) -> Result<()> {
    config.validate().context("Invalid decision parameters")?;

    let report = evaluate_voi(config.p_prior, config.q).context("Value of information failed")?;

    if json {
        return print_json(&report);
    }

    print_voi_report(&report);
    Ok(())
}

fn print_voi_report(report: &VoiReport) {
    println!("{}", "RESULT".yellow().bold());
    println!("Prior probability: {}", report.p_prior);
    println!("Effective signal accuracy: {:.3}", report.q);
    if report.flipped {
        println!(
            "{}",
            "Note: signal was anti-informative and has been inverted".yellow()
        );
    }
    println!(
        "Best action without signal: {} (EV {:.4})",
        report.base_action, report.base_ev
    );
    println!(
        "Action A is chosen from a prior of {:.4} upward",
        report.indifference_prior
    );
    println!("Expected value with signal: {:.4}", report.ev_with_signal);
    println!(
        "Value of information: {}",
        format!("{:.4}", report.value).green().bold()
    );
}

fn run_sampling(config: &StatsConfig, output: &Path, json: bool) -> Result<()> {
    config.validate().context("Invalid sampling parameters")?;

    let report = run_stats(config).context("Sampling failed")?;
    report
        .write_json(output)
        .with_context(|| format!("Failed to write {:?}", output))?;

    if json {
        return print_json(&report);
    }

    print_stats_report(&report);
    println!("Simulation complete. File generated: {}", output.display());
    Ok(())
}

fn print_stats_report(report: &StatsReport) {
    let s = &report.stats;
    println!("{}", "Sample Statistics:".yellow().bold());
    println!("{:<10} {:>12}", "Count", s.count);
    println!("{:<10} {:>12.4}", "Mean", s.mean);
    println!("{:<10} {:>12.4}", "Median", s.median);
    println!("{:<10} {:>12.4}", "Variance", s.variance);
    println!("{:<10} {:>12.4}", "Std Dev", s.std_dev);
    println!("{:<10} {:>12.4}", "Min", s.min);
    println!("{:<10} {:>12.4}", "Max", s.max);

    println!("\n{}", "Histogram:".yellow().bold());
    let peak = report.histogram.counts.iter().copied().max().unwrap_or(0);
    for (i, &count) in report.histogram.counts.iter().enumerate() {
        let len = if peak > 0 { count * BAR_WIDTH / peak } else { 0 };
        println!(
            "{:>9.2} {:>6} {}",
            report.histogram.edges[i],
            count,
            "#".repeat(len).blue()
        );
    }
    println!();
}

fn run_interactive(mut config: SimConfig) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!();

    let theme = ColorfulTheme::default();

    loop {
        let options = vec![
            "Kelly betting simulation",
            "Probability calibration",
            "Value of information",
            "Sample statistics",
            "Quit",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        let outcome = match selection {
            0 => {
                config.kelly.n = Input::with_theme(&theme)
                    .with_prompt("Number of bets")
                    .default(config.kelly.n)
                    .interact_text()?;
                config.kelly.p_hat = Input::with_theme(&theme)
                    .with_prompt("Believed win probability")
                    .default(config.kelly.p_hat)
                    .interact_text()?;
                println!();
                run_kelly(&config.kelly, false)
            }
            1 => {
                config.calibration.n = Input::with_theme(&theme)
                    .with_prompt("Length of the binary stream")
                    .default(config.calibration.n)
                    .interact_text()?;
                let max_switch = config.calibration.n.saturating_sub(1);
                config.calibration.switch_point = Input::with_theme(&theme)
                    .with_prompt(format!("Switch point (1 to {})", max_switch))
                    .default(config.calibration.switch_point.min(max_switch).max(1))
                    .interact_text()?;
                println!();
                run_calibration(&config.calibration, false)
            }
            2 => {
                config.voi.p_prior = Input::with_theme(&theme)
                    .with_prompt("Prior probability of good state (0-1)")
                    .default(config.voi.p_prior)
                    .interact_text()?;
                config.voi.q = Input::with_theme(&theme)
                    .with_prompt("Signal accuracy q (0-1)")
                    .default(config.voi.q)
                    .interact_text()?;
                println!();
                run_voi(&config.voi, false)
            }
            3 => {
                let output: String = Input::with_theme(&theme)
                    .with_prompt("Output file")
                    .default(DEFAULT_STATS_FILE.to_string())
                    .interact_text()?;
                println!();
                run_sampling(&config.stats, Path::new(&output), false)
            }
            4 => {
                println!("Goodbye!");
                break;
            }
            _ => Ok(()),
        };

        // Bad input in one experiment should not end the session
        if let Err(e) = outcome {
            println!("{} {:#}", "Error:".red().bold(), e);
        }
        println!();
    }

    Ok(())
}
