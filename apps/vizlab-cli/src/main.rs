use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vizlab_common::Color;
use vizlab_demos::{DemoOptions, demo_names, launch};
use vizlab_render::{DebugTextRenderer, RenderView, Renderer, SceneInspector};
use vizlab_textviz::{Marker, MarkerPlacer, TermConfig, WordVizConfig, locate, tokenize};

#[derive(Parser)]
#[command(name = "vizlab-cli", about = "CLI tool for vizlab scenes and word visualizations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the default word-viz configuration
    Info,
    /// List the registered demos
    Demos,
    /// Print the tokens of a text, one per line
    Tokenize {
        text: String,
    },
    /// Print every occurrence of a term with its placement height
    Locate {
        #[arg(long)]
        text: String,
        #[arg(long)]
        term: String,
        /// Height factor
        #[arg(short, long, default_value = "0.2")]
        k: f32,
    },
    /// Generate markers and print them as JSON
    Place {
        /// Word-viz YAML file; every term in it is placed
        #[arg(short, long, conflicts_with_all = ["text", "term"])]
        config: Option<PathBuf>,
        #[arg(long, requires = "term")]
        text: Option<String>,
        #[arg(long, requires = "text")]
        term: Option<String>,
        /// Markers per occurrence when placing a single term
        #[arg(long, default_value = "100")]
        count: usize,
        /// Overrides the seed from the config
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Build a demo, drive its panel, and print the resulting scene
    Render {
        #[arg(short, long, default_value = "assignment2")]
        demo: String,
        /// Seconds since start passed to the final update
        #[arg(short, long, default_value = "0")]
        time: f32,
        /// Set a panel control, `key=value`; repeatable
        #[arg(long = "set", value_name = "KEY=VALUE")]
        sets: Vec<String>,
        /// Press a panel button; repeatable, applied in order
        #[arg(long = "press", value_name = "KEY")]
        presses: Vec<String>,
        /// Word-viz YAML file for the word-occurrence demo
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        /// Print counts only
        #[arg(long)]
        summary: bool,
    },
}

#[derive(Serialize)]
struct PlacedTerm<'a> {
    term: &'a str,
    markers: Vec<Marker>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("vizlab-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("demos: {}", demo_names().len());
            print!("{}", WordVizConfig::default().to_yaml()?);
        }
        Commands::Demos => {
            for name in demo_names() {
                let (demo, _) = launch(name, &DemoOptions::default())?;
                println!("{name:<12} {}", demo.title());
            }
        }
        Commands::Tokenize { text } => {
            for token in tokenize(&text) {
                println!("{token}");
            }
        }
        Commands::Locate { text, term, k } => {
            let tokens = tokenize(&text);
            let found = locate(&tokens, &term, k);
            println!("{} tokens, {} occurrences of {term:?}", tokens.len(), found.len());
            for occurrence in found {
                println!("  index={} height={:.3}", occurrence.index, occurrence.height);
            }
        }
        Commands::Place {
            config,
            text,
            term,
            count,
            seed,
        } => {
            let mut viz = match config {
                Some(path) => WordVizConfig::load(&path).with_context(|| format!("loading {}", path.display()))?,
                None => WordVizConfig {
                    source_text: text.unwrap_or_default(),
                    terms: vec![TermConfig {
                        count,
                        ..TermConfig::new(term.unwrap_or_default(), Color::WHITE)
                    }],
                    ..WordVizConfig::default()
                },
            };
            if let Some(seed) = seed {
                viz.seed = seed;
            }
            viz.validate()?;

            let tokens = tokenize(&viz.source_text);
            tracing::debug!(tokens = tokens.len(), terms = viz.terms.len(), seed = viz.seed, "placing markers");
            let mut placer = MarkerPlacer::new(viz.seed, viz.height_factor, viz.y_offset);
            let placed: Vec<PlacedTerm> = viz
                .terms
                .iter()
                .map(|term| PlacedTerm {
                    term: &term.term,
                    markers: placer.place(&tokens, term),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&placed)?);
        }
        Commands::Render {
            demo,
            time,
            sets,
            presses,
            config,
            seed,
            summary,
        } => {
            let word_viz = config
                .map(|path| WordVizConfig::load(&path).with_context(|| format!("loading {}", path.display())))
                .transpose()?;
            let (mut demo, mut scene) = launch(&demo, &DemoOptions { seed, word_viz })?;

            for set in &sets {
                let (key, value) = set
                    .split_once('=')
                    .with_context(|| format!("expected KEY=VALUE, got {set:?}"))?;
                demo.panel_mut().apply_str(key, value)?;
            }
            demo.update(&mut scene, 0.0);
            for key in &presses {
                if !demo.panel_mut().press(key) {
                    anyhow::bail!("no button {key:?} in {}", demo.name());
                }
                demo.update(&mut scene, 0.0);
            }
            demo.update(&mut scene, time);
            tracing::info!(
                demo = demo.name(),
                sets = sets.len(),
                presses = presses.len(),
                nodes = scene.node_count(),
                "rendered demo scene"
            );

            if summary {
                println!("{}", SceneInspector::summary(&scene));
            } else {
                print!("{}", DebugTextRenderer::new().render(&scene, &RenderView::default()));
            }
        }
    }

    Ok(())
}
