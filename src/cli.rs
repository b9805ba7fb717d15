use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::experiment;
use crate::narrative::StepEvent;
use crate::presentation::Presentation;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Experiment {
    /// Laser, mirrors, and a particle beam
    Simple,
    /// Optical lattice with trapped atoms
    Lattice,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an experiment's narrative headlessly, printing what each step reveals
    Walk {
        #[arg(long, value_enum, default_value_t = Experiment::Simple)]
        experiment: Experiment,

        /// Number of advance events to replay (defaults to the script length)
        #[arg(long)]
        steps: Option<u32>,

        /// Frame ticks simulated per narrative step
        #[arg(long, default_value_t = 3)]
        ticks: u32,

        /// Seconds per simulated tick
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,

        /// Beam particle count for the simple experiment
        #[arg(long, default_value_t = 10_000)]
        particles: usize,

        /// Particle sampling seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Walk {
            experiment,
            steps,
            ticks,
            dt,
            particles,
            seed,
        } => walk(experiment, steps, ticks, dt, particles, seed),
    }
}

fn walk(
    which: Experiment,
    steps: Option<u32>,
    ticks: u32,
    dt: f32,
    particles: usize,
    seed: u64,
) -> Result<()> {
    let mut presentation = match which {
        Experiment::Simple => experiment::simple_bench(particles, seed)?,
        Experiment::Lattice => experiment::lattice_bench()?,
    };

    let last = presentation.script.last_step().unwrap_or(0).max(0) as u32;
    let steps = steps.unwrap_or(last);

    for step in 0..=steps {
        if step > 0 {
            presentation.step(StepEvent::Advance);
        }
        for _ in 0..ticks.max(1) {
            presentation.tick(dt)?;
        }

        describe(step, &presentation);
    }

    Ok(())
}

fn describe(step: u32, presentation: &Presentation) {
    let visible = presentation.scene.visible_names();
    println!("step {step}: {} visible: {}", visible.len(), visible.join(", "));

    if let Some(bp) = &presentation.beam_particles {
        if presentation.state.step > bp.gate_step {
            let records = bp.field.records();
            let mean: f32 =
                records.iter().map(|r| r.color[3]).sum::<f32>() / records.len() as f32;
            let standing = presentation.scene.is_visible(&bp.mirrors.0).unwrap_or(false)
                && presentation.scene.is_visible(&bp.mirrors.1).unwrap_or(false);
            let drawn = presentation.scene.is_visible(&bp.entity).unwrap_or(false);
            println!(
                "        beam: {} particles, mean intensity {mean:.3}{}{}",
                records.len(),
                if standing { ", standing wave" } else { "" },
                if drawn { "" } else { " (cloud hidden)" },
            );
        }
    }
}
