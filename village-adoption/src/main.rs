use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use village_adoption::render::{render_png, write_period_graphs};
use village_adoption::schedule::{generate_panel_csv, load_schedule, PANEL_FILE_NAME};
use village_adoption::village::{adjacency_file_name, generate_village_csv};
use village_adoption::{SimulationConfig, ThresholdMode, VillageNetwork, VillageSession};

/// Visualize simulated microfinance take-up across a village network.
#[derive(Parser, Debug)]
#[command(name = "village-adoption")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write random village adjacency matrices and a matching panel file
    Generate {
        /// Households per village
        #[arg(long, default_value = "140")]
        households: usize,

        /// Random relationships drawn per village
        #[arg(long, default_value = "500")]
        links: usize,

        /// Number of villages, numbered from 1
        #[arg(long, default_value = "3")]
        villages: u32,

        /// Periods per village in the panel
        #[arg(long, default_value = "6")]
        periods: usize,

        /// Output data directory
        #[arg(long, default_value = "data")]
        out: PathBuf,
    },
    /// Simulate every period of one village and write one graph per period
    Simulate {
        /// Directory holding the adjacency matrices
        #[arg(long, default_value = "data")]
        data: PathBuf,

        /// Village number
        #[arg(long, default_value = "1")]
        village: u32,

        /// Panel CSV; defaults to panel.csv inside the data directory
        #[arg(long)]
        panel: Option<PathBuf>,

        /// Select exactly floor(n * target) households instead of one extra
        #[arg(long)]
        exclusive: bool,

        /// Simulate periods one after another on the current thread
        #[arg(long)]
        sequential: bool,

        /// Also render PNGs with Graphviz `dot`
        #[arg(long)]
        png: bool,

        /// Output directory for the period graphs
        #[arg(long, default_value = "graphs")]
        out: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,village_adoption=info")),
        )
        .init();

    match Args::parse().command {
        Commands::Generate {
            households,
            links,
            villages,
            periods,
            out,
        } => {
            std::fs::create_dir_all(&out)?;
            for village in 1..=villages {
                generate_village_csv(households, links, out.join(adjacency_file_name(village)))?;
            }
            generate_panel_csv(villages, periods, out.join(PANEL_FILE_NAME))?;
            info!(villages, households, periods, out = %out.display(), "Generated village data");
        }
        Commands::Simulate {
            data,
            village,
            panel,
            exclusive,
            sequential,
            png,
            out,
        } => {
            let network = VillageNetwork::from_csv(data.join(adjacency_file_name(village)))?;
            let panel = panel.unwrap_or_else(|| data.join(PANEL_FILE_NAME));
            let schedule = load_schedule(&panel, village)?;

            let config = SimulationConfig {
                threshold_mode: if exclusive {
                    ThresholdMode::Exclusive
                } else {
                    ThresholdMode::Inclusive
                },
                parallel: !sequential,
                ..SimulationConfig::default()
            };
            let session = VillageSession::new(network, schedule, config);
            let snapshots = session.snapshots()?;

            let written = write_period_graphs(session.network(), &snapshots, &out)?;
            if png {
                for dot_file in &written {
                    render_png(dot_file, dot_file.with_extension("png"))?;
                }
            }

            println!(
                "Village {} ({} households, {} periods):",
                village,
                session.network().household_count(),
                snapshots.len()
            );
            for snapshot in &snapshots {
                println!(
                    "{}: target {:.3}, {} adopters",
                    snapshot.title(),
                    snapshot.target_fraction,
                    snapshot.flags.adopter_count()
                );
            }
        }
    }

    Ok(())
}
