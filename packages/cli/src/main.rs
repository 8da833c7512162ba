#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line driver for the story scenes.
//!
//! ```text
//! av_story scenes
//! av_story render "?scene=collisions-by-type&location=SAN%20FRANCISCO"
//! av_story interact "?scene=scene1" '{"kind":"selectPoint","location":"PHOENIX"}'
//! ```
//!
//! Every command renders into an in-memory surface and prints the resulting
//! drawing as JSON, together with the navigation query that restores it.
//! Data is read from `AV_STORY_DATA` (a directory or an `http(s)://` base
//! URL) unless `--data` overrides it.

use std::sync::Arc;

use av_story_dataset::{DatasetCache, DatasetConfig};
use av_story_scene::{
    Dispatcher, MemorySurface, NavigationContext, SceneError, SceneId, SceneRegistry,
    ShowOutcome,
};
use av_story_scene_models::Interaction;
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Parser)]
#[command(name = "av_story", about = "Render the autonomous-vehicle crash story scenes")]
struct Cli {
    /// Data directory or base URL (overrides `AV_STORY_DATA`)
    #[arg(long, global = true)]
    data: Option<String>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered scenes
    Scenes,
    /// Render the scene a navigation query points at
    Render {
        /// Navigation query, e.g. `?scene=scene2&location=SITE_A`
        #[arg(default_value = "")]
        query: String,
    },
    /// Render a query, then apply interactions in order
    Interact {
        /// Navigation query to start from
        query: String,
        /// Interactions as JSON, e.g. `{"kind":"selectPoint","location":"SITE_A"}`
        #[arg(required = true)]
        interactions: Vec<String>,
    },
}

fn outcome_label(outcome: Option<&ShowOutcome>) -> serde_json::Value {
    match outcome {
        Some(ShowOutcome::Drawn(id)) => json!({ "status": "drawn", "scene": id }),
        Some(ShowOutcome::Stale(id)) => json!({ "status": "stale", "scene": id }),
        Some(ShowOutcome::UnknownScene(name)) => {
            json!({ "status": "unknownScene", "scene": name })
        }
        None => json!({ "status": "ignored" }),
    }
}

fn list_scenes(registry: &SceneRegistry) {
    println!("{:<22} {:<8} TITLE", "SCENE", "ALIAS");
    println!("{}", "-".repeat(60));
    for id in registry.ids() {
        println!("{:<22} {:<8} {}", id.to_string(), id.alias(), id.title());
    }
}

/// Restores `nav`, then applies `interactions` in order. Stops early if the
/// query names an unknown scene.
async fn replay(
    dispatcher: &Dispatcher,
    nav: &mut NavigationContext,
    surface: &MemorySurface,
    interactions: &[Interaction],
) -> Result<Option<ShowOutcome>, SceneError> {
    let mut outcome = Some(dispatcher.restore(nav, surface).await?);
    for interaction in interactions {
        if matches!(outcome, Some(ShowOutcome::UnknownScene(_))) {
            break;
        }
        outcome = dispatcher.interact(interaction, nav, surface).await?;
    }
    Ok(outcome)
}

fn print(
    value: &serde_json::Value,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = DatasetConfig::from_env();
    if let Some(data) = cli.data {
        config = config.with_location(data);
    }

    let registry = SceneRegistry::with_default_scenes();

    let (query, raw_interactions) = match cli.command {
        Commands::Scenes => {
            list_scenes(&registry);
            return Ok(());
        }
        Commands::Render { query } => (query, Vec::new()),
        Commands::Interact {
            query,
            interactions,
        } => (query, interactions),
    };
    let interactions = raw_interactions
        .iter()
        .map(|raw| serde_json::from_str::<Interaction>(raw))
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("Using datasets from {}", config.location);
    let dispatcher = Dispatcher::new(registry, Arc::new(DatasetCache::new(config.source())));
    let surface = MemorySurface::new();
    let mut nav = NavigationContext::from_query(&query);

    let outcome = match replay(&dispatcher, &mut nav, &surface, &interactions).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("Failed to render '{query}': {e}");
            return Err(e.into());
        }
    };

    if let Some(ShowOutcome::UnknownScene(name)) = &outcome {
        eprintln!(
            "Unknown scene: {name} (known: {})",
            SceneId::all()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let result = json!({
        "outcome": outcome_label(outcome.as_ref()),
        "query": nav.query(),
        "drawing": surface.current(),
    });
    print(&result, cli.compact)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use av_story_dataset::{DatasetTable, StaticSource};

    use super::*;

    const MILEAGE: &str = "location,miles_millions\nSITE_A,10\n";
    const CRASHES: &str = "location,year_month,crash_type,any_injury,airbag_deployment,suspected_serious_injury\n\
                           SITE_A,202301,side,False,False,False\n";

    fn dispatcher(source: StaticSource) -> Dispatcher {
        Dispatcher::new(
            SceneRegistry::with_default_scenes(),
            Arc::new(DatasetCache::new(Arc::new(source))),
        )
    }

    #[tokio::test]
    async fn replay_applies_interactions_in_order() {
        let dispatcher = dispatcher(
            StaticSource::new()
                .with_table(DatasetTable::Mileage, MILEAGE)
                .with_table(DatasetTable::Crashes, CRASHES),
        );
        let surface = MemorySurface::new();
        let mut nav = NavigationContext::from_query("?scene=scene1");
        let interactions = [Interaction::SelectPoint {
            location: "SITE_A".to_owned(),
        }];

        let outcome = replay(&dispatcher, &mut nav, &surface, &interactions)
            .await
            .unwrap();

        assert_eq!(outcome, Some(ShowOutcome::Drawn(SceneId::CollisionsByType)));
        assert_eq!(nav.len(), 2);
    }

    #[tokio::test]
    async fn replay_surfaces_unavailable_data() {
        let dispatcher = dispatcher(StaticSource::new());
        let surface = MemorySurface::new();
        let mut nav = NavigationContext::from_query("");

        let err = replay(&dispatcher, &mut nav, &surface, &[]).await.unwrap_err();

        assert!(matches!(err, SceneError::Dataset(_)));
        assert!(surface.current().is_none());
    }
}
