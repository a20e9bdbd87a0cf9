use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;
use vspace::{HitAndRun, LinearVersionSpace};

mod data;
mod provenance;

#[derive(Parser)]
#[command(name = "vspace-cli")]
#[command(about = "Sample linear classifiers consistent with labelled data")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Sample the version space of a labelled CSV/Parquet table
    Sample(SampleArgs),
    /// Print a small provenance JSON block
    Report,
}

#[derive(Args, Clone, Debug, Serialize)]
struct SampleArgs {
    /// Labelled points; every column except the label is a feature
    #[arg(long)]
    input: PathBuf,
    /// Output table (`.parquet` or CSV), one sampled classifier per row
    #[arg(long)]
    out: PathBuf,
    /// Column holding labels in {1, -1} or {1, 0}
    #[arg(long, default_value = "label")]
    label_column: String,
    #[arg(long, default_value_t = 64)]
    chain_length: usize,
    #[arg(long, default_value_t = 100)]
    sample_size: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Sample(args) => sample(&args).map(|_| ()),
        Action::Report => report(),
    }
}

/// Returns the provenance sidecar path.
fn sample(args: &SampleArgs) -> Result<PathBuf> {
    tracing::info!(
        input = %args.input.display(),
        out = %args.out.display(),
        chain_length = args.chain_length,
        sample_size = args.sample_size,
        seed = args.seed,
        "sample"
    );
    let frame = data::read_frame(&args.input)?;
    let labelled = data::labelled_points(&frame, &args.label_column)?;
    tracing::info!(
        rows = frame.height(),
        features = labelled.features.len(),
        "input table"
    );

    let sampler = HitAndRun::new(args.chain_length, args.sample_size)?;
    let mut space = LinearVersionSpace::new(labelled.features.len(), sampler)?;
    for (point, label) in labelled.points.iter().zip(&labelled.labels) {
        space.add_constraint(point, *label)?;
    }
    let mut rng = StdRng::seed_from_u64(args.seed);
    let samples = space.sample(&mut rng)?;

    let mut out = data::samples_frame(&samples)?;
    data::write_frame(&mut out, &args.out)?;
    tracing::info!(rows = out.height(), cols = out.width(), "samples written");

    let params = serde_json::json!({
        "args": args,
        "features": labelled.features,
        "constraints": space.num_constraints(),
    });
    provenance::write_sidecar(&args.out, provenance::Payload::new(params))
}

fn report() -> Result<()> {
    let obj = serde_json::json!({
        "code_rev": provenance::current_git_rev(),
        "vspace_version": vspace::VERSION,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
