//! Command line front end for clip graphs
//!
//! Reads a project file (selected clips plus edges), reports whether the clips form a
//! playable sequence, rearranges them, or writes the render plan for the renderer.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use cim_domain_clip_graph::infrastructure::{InMemoryClipSource, JsonFileUploader};
use cim_domain_clip_graph::{
    format_duration, to_timeline, total_duration, ClipRecord, EditingSession, GraphCommand,
    NodeId, Orientation, SequenceStatus, SessionConfig,
};

#[derive(Parser, Debug)]
#[command(name = "clip-sequencer", version)]
struct Cli {
    /// Session configuration JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report the sequence status and timeline of a project.
    Check(CheckArgs),
    /// Rebuild the edges of a project and write the result.
    Arrange(ArrangeArgs),
    /// Write the render plan of a linear project.
    Submit(SubmitArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ArrangeArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output project JSON.
    #[arg(long)]
    out: PathBuf,

    /// How to rebuild the edges.
    #[arg(long, value_enum, default_value_t = ArrangeMode::Canonical)]
    mode: ArrangeMode,

    /// Layout direction. Falls back to the configured orientation.
    #[arg(long, value_enum)]
    orientation: Option<OrientationChoice>,

    /// Seed for the shuffle mode.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct SubmitArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving the render plan.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ArrangeMode {
    /// Chain the clips in their current order.
    Chain,
    /// Keep the longest existing path first, then chain the rest.
    Canonical,
    /// Chain the clips in random order.
    Shuffle,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrientationChoice {
    Horizontal,
    Vertical,
}

impl From<OrientationChoice> for Orientation {
    fn from(choice: OrientationChoice) -> Self {
        match choice {
            OrientationChoice::Horizontal => Orientation::Horizontal,
            OrientationChoice::Vertical => Orientation::Vertical,
        }
    }
}

/// On-disk project: selected clips and the edges between them
#[derive(Debug, Default, Serialize, Deserialize)]
struct Project {
    clips: Vec<ClipRecord>,
    #[serde(default)]
    edges: Vec<(NodeId, NodeId)>,
}

#[derive(Debug, Serialize)]
struct TimelineRow {
    id: String,
    title: String,
    start: String,
    duration: f64,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    status: SequenceStatus,
    total_duration: String,
    timeline: Vec<TimelineRow>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("load configuration '{}'", path.display()))?,
        None => SessionConfig::default(),
    };

    match cli.cmd {
        Command::Check(args) => cmd_check(config, args),
        Command::Arrange(args) => cmd_arrange(config, args),
        Command::Submit(args) => cmd_submit(config, args).await,
    }
}

fn read_project(path: &Path) -> anyhow::Result<Project> {
    let f = File::open(path).with_context(|| format!("open project '{}'", path.display()))?;
    let r = BufReader::new(f);
    let project: Project = serde_json::from_reader(r).with_context(|| "parse project JSON")?;
    Ok(project)
}

fn open_session(config: SessionConfig, project: Project, out_dir: &Path) -> anyhow::Result<EditingSession> {
    let mut session = EditingSession::new(
        config,
        Arc::new(InMemoryClipSource::default()),
        Arc::new(JsonFileUploader::new(out_dir)),
    )?;

    session.sync_selection(&project.clips);
    for (source_id, target_id) in project.edges {
        session
            .connect(source_id.clone(), target_id.clone())
            .with_context(|| format!("connect '{source_id}' -> '{target_id}'"))?;
    }
    Ok(session)
}

fn cmd_check(config: SessionConfig, args: CheckArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let session = open_session(config, project, Path::new("."))?;

    let status = session.status().clone();
    let clips = status
        .order()
        .map(|order| session.snapshot().clips_for(order))
        .unwrap_or_default();
    let report = CheckReport {
        status,
        total_duration: format_duration(total_duration(&clips)),
        timeline: to_timeline(&clips)
            .into_iter()
            .map(|entry| TimelineRow {
                id: entry.clip.id().to_string(),
                title: entry.clip.title().to_string(),
                start: format_duration(entry.start),
                duration: entry.duration,
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_arrange(config: SessionConfig, args: ArrangeArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let mut session = open_session(config, project, Path::new("."))?;
    if let Some(seed) = args.seed {
        session = session.with_seed(seed);
    }

    let orientation = args
        .orientation
        .map(Orientation::from)
        .unwrap_or_else(|| session.default_orientation());
    let command = match args.mode {
        ArrangeMode::Chain => GraphCommand::AutoConnect { orientation },
        ArrangeMode::Canonical => GraphCommand::ConnectCanonical { orientation },
        ArrangeMode::Shuffle => GraphCommand::Shuffle { orientation },
    };
    session.handle(command)?;

    let snapshot = session.snapshot();
    let arranged = Project {
        clips: snapshot.nodes.iter().map(|node| node.data.clone()).collect(),
        edges: snapshot
            .edges
            .iter()
            .map(|edge| (edge.source.clone(), edge.target.clone()))
            .collect(),
    };
    let json = serde_json::to_string_pretty(&arranged)?;
    std::fs::write(&args.out, json).with_context(|| format!("write project '{}'", args.out.display()))?;

    println!("Arranged {} clips into {}", arranged.clips.len(), args.out.display());
    Ok(())
}

async fn cmd_submit(config: SessionConfig, args: SubmitArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let session = open_session(config, project, &args.out_dir)?;

    let pending = session.prepare_submit()?;
    let frames = pending.plan().total_frames;
    let receipt = pending.send().await?;

    println!(
        "Submitted {} as {} ({} frames)",
        args.in_path.display(),
        receipt.job_id,
        frames
    );
    Ok(())
}
