mod cli;
mod config;
mod datasources;
mod error;
mod export;
mod logic;
mod models;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::{Config, WeatherSource};
use logic::{Simulation, SimulationRun};
use models::{EnvironmentSeries, ProductTable};
use tracing_subscriber::EnvFilter;

fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Run {
        output: None,
        summary: None,
    });

    if let Commands::Init = command {
        Config::setup_interactive(cli.config).context("interactive setup failed")?;
        return Ok(());
    }

    let mut config = Config::load(cli.config).context(
        "configuration error (copy config/config.yaml.example to config/config.yaml or run `vineguard init`)",
    )?;
    if let Some(path) = cli.weather {
        config.inputs.weather = WeatherSource::Csv { path };
    }
    if let Some(path) = cli.products {
        config.inputs.products.path = path;
    }

    match command {
        Commands::Run { output, summary } => {
            let (env, products) = load_inputs(&config)?;
            let run = Simulation::new(&config)
                .run(&env, &products)
                .context("season simulation failed")?;

            print_run(&run);

            if let Some(path) = output {
                export::write_schedule(&path, &run.rows)
                    .with_context(|| format!("failed to write schedule to {}", path.display()))?;
                println!("Schedule written to {}", path.display());
            }
            if let Some(path) = summary {
                export::write_summary(&path, &run.summary)
                    .with_context(|| format!("failed to write summary to {}", path.display()))?;
                println!("Summary written to {}", path.display());
            }
        }
        Commands::Check => {
            println!("Config: OK");
            let (env, products) = load_inputs(&config)?;
            println!("Weather: {} days", env.len());
            println!(
                "Products: {} (max PHI {} days)",
                products.len(),
                products.max_pre_harvest_interval()
            );
            println!(
                "Season: {} days from {}, harvest on day {} ({})",
                config.season.days,
                config.season.start_date,
                config.season.harvest_day,
                config.season.date_of(config.season.harvest_day)
            );
        }
        Commands::Products => {
            let products = datasources::load_products(&config.inputs.products)
                .context("failed to load product table")?;
            print_products(&products, config.scheduler.min_efficacy);
        }
        Commands::Init => {}
    }

    Ok(())
}

fn load_inputs(config: &Config) -> Result<(EnvironmentSeries, ProductTable)> {
    let env = datasources::load_weather(&config.inputs.weather, config.season.days)
        .context("failed to load weather")?;
    let products = datasources::load_products(&config.inputs.products)
        .context("failed to load product table")?;
    Ok((env, products))
}

fn print_run(run: &SimulationRun) {
    let s = &run.summary;
    let o = &s.outcome;
    println!("Season: {} days, harvest on day {}", s.days, s.harvest_day);
    if let (Some(peak), Some(last)) = (
        run.population
            .iter()
            .max_by(|a, b| a.immature_count.total_cmp(&b.immature_count)),
        run.population.last(),
    ) {
        println!(
            "Population: peak {:.0} immature on day {}, {:.0} mature on day {}",
            peak.immature_count, peak.day, last.mature_count, last.day
        );
    }
    println!(
        "Schedule: {} application(s) through day {} ({})",
        s.applications, s.actionable_end, s.strategy
    );
    if s.dropped_applications > 0 {
        println!(
            "  {} later application(s) dropped inside the pre-harvest window",
            s.dropped_applications
        );
    }
    for row in run.rows.iter().filter(|r| r.product_id.is_some()) {
        println!(
            "  day {:>3} {}  {:<32} {:>5}  dose {:.3}",
            row.day,
            row.date,
            row.product_id.as_deref().unwrap_or_default(),
            row.product_class.as_deref().unwrap_or("-"),
            row.dose_rate
        );
    }
    println!(
        "Yield: {:.3} (mold {:.3}, late penalty {:.3})",
        o.effective_yield, o.mold_impact, o.harvest_penalty
    );
    println!(
        "Revenue: {:.2}  Pesticide cost: {:.2}  Profit: {:.2}",
        o.revenue, o.pesticide_cost, o.profit
    );
}

fn print_products(products: &ProductTable, min_efficacy: f64) {
    let gate = |efficacy: f64| if efficacy >= min_efficacy { "ok" } else { "--" };
    println!(
        "{:<32} {:>5} {:>4} {:>4} {:>8} {:>5}  {:>8} {:>6}",
        "Product", "Class", "PHI", "REI", "Max vol", "Apps", "Immature", "Mature"
    );
    for p in products.iter() {
        println!(
            "{:<32} {:>5} {:>4} {:>4} {:>8.2} {:>5}  {:>4} {:>2} {:>4} {:>2}",
            p.id,
            p.class,
            p.pre_harvest_interval,
            p.re_entry_interval,
            p.seasonal_max_volume,
            p.max_applications_per_season,
            p.efficacy_on_immature,
            gate(p.efficacy_on_immature),
            p.efficacy_on_mature,
            gate(p.efficacy_on_mature),
        );
    }
}
