//! bunkmate - run the roommate matching engine against a fixture file.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use bunkmate_cluster::Clusterer;
use bunkmate_pairing::{
    MatchRecord, MatchStore, Matchmaker, MemoryMatchStore, RoundOutcome,
};
use bunkmate_survey::{MemoryResponseStore, QUESTION_COUNT, RawResponse};

/// Roommate matching engine driver.
///
/// Loads questionnaire responses (and optionally pre-existing matches)
/// from a YAML or JSON fixture file, then answers match queries, runs the
/// multi-round pairing loop, or clusters users into preference groups.
#[derive(Parser)]
#[command(name = "bunkmate")]
#[command(about = "Roommate matching engine CLI")]
#[command(version)]
struct Cli {
    /// Fixture file with responses and matches (YAML or JSON)
    #[arg(short = 'f', long = "file", global = true, default_value = "fixture.yaml")]
    file: String,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Best reciprocal matches for one user
    Matches {
        /// User to query
        #[arg(short, long)]
        user: i64,

        /// Result size and reciprocity window
        #[arg(short, long, default_value_t = 5)]
        top: usize,
    },
    /// Run the multi-round pairing loop
    Rounds,
    /// Cluster users and print per-cluster preference lists
    Clusters {
        /// Number of clusters
        #[arg(short, long, default_value_t = 3)]
        k: usize,
    },
}

#[derive(Deserialize)]
struct Fixture {
    #[serde(default)]
    responses: Vec<FixtureResponse>,
    #[serde(default)]
    matches: Vec<FixtureMatch>,
}

#[derive(Deserialize)]
struct FixtureResponse {
    user_id: i64,
    /// Exactly 25 entries; null marks a skipped question.
    answers: Vec<Option<u8>>,
    #[serde(default)]
    ts: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct FixtureMatch {
    user_id: i64,
    peer_id: i64,
    #[serde(default)]
    score: f32,
}

fn load_fixture(path: &str) -> anyhow::Result<Fixture> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading fixture {path}"))?;
    let fixture = match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&raw).context("parsing JSON fixture")?,
        _ => serde_yaml::from_str(&raw).context("parsing YAML fixture")?,
    };
    Ok(fixture)
}

async fn build_stores(
    fixture: Fixture,
) -> anyhow::Result<(Arc<MemoryResponseStore>, Arc<MemoryMatchStore>)> {
    let responses = Arc::new(MemoryResponseStore::new());
    for r in fixture.responses {
        if r.answers.len() != QUESTION_COUNT {
            bail!(
                "user {}: expected {QUESTION_COUNT} answers, got {}",
                r.user_id,
                r.answers.len()
            );
        }
        let mut answers = [None; QUESTION_COUNT];
        answers.copy_from_slice(&r.answers);
        let mut response = RawResponse::new(r.user_id, answers);
        if let Some(ts) = r.ts {
            response.submitted_at = ts;
        }
        responses.add(response);
    }

    let matches = Arc::new(MemoryMatchStore::new());
    let records: Vec<MatchRecord> = fixture
        .matches
        .iter()
        .map(|m| MatchRecord {
            user_id: m.user_id,
            peer_id: m.peer_id,
            score: m.score,
            created_at: Utc::now(),
        })
        .collect();
    if !records.is_empty() {
        matches.commit(&records).await?;
    }

    Ok((responses, matches))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    }

    let fixture = load_fixture(&cli.file)?;
    let (responses, matches) = build_stores(fixture).await?;

    match cli.command {
        Commands::Matches { user, top } => {
            let engine = Matchmaker::new(responses, matches as Arc<dyn MatchStore>);
            match engine.best_matches(user, top).await? {
                None => println!("no response data for user {user}"),
                Some(best) if cli.json => {
                    println!("{}", serde_json::to_string_pretty(&best)?);
                }
                Some(best) if best.is_empty() => {
                    println!("no reciprocal match for user {user}");
                }
                Some(best) => {
                    for m in best {
                        println!("peer {:>6}  score {:.4}", m.peer_id, m.score);
                    }
                }
            }
        }
        Commands::Rounds => {
            let engine = Matchmaker::new(responses, matches as Arc<dyn MatchStore>);
            match engine.run_rounds().await? {
                RoundOutcome::Insufficient { available } => {
                    println!("insufficient users: {available} eligible, need 2");
                }
                RoundOutcome::Completed { pairs, rounds, capped } => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&pairs)?);
                    } else {
                        for p in &pairs {
                            println!(
                                "{:>6} <-> {:<6} score {:.4}",
                                p.user_id, p.peer_id, p.score
                            );
                        }
                        println!("{} pairs in {rounds} rounds", pairs.len());
                        if capped {
                            println!("round cap reached before convergence");
                        }
                    }
                }
            }
        }
        Commands::Clusters { k } => {
            let clusterer = Clusterer::new(responses);
            match clusterer.cluster_preferences(k).await? {
                None => println!("no response data"),
                Some(outcome) => {
                    let mut labels: Vec<usize> =
                        outcome.preferences.keys().copied().collect();
                    labels.sort_unstable();

                    let mut assigned: Vec<(i64, usize)> =
                        outcome.assignments.iter().map(|(u, l)| (*u, *l)).collect();
                    assigned.sort_unstable();

                    if cli.json {
                        let assignments: std::collections::BTreeMap<String, usize> = assigned
                            .iter()
                            .map(|(u, l)| (u.to_string(), *l))
                            .collect();
                        let preferences: std::collections::BTreeMap<
                            String,
                            std::collections::BTreeMap<String, Vec<i64>>,
                        > = outcome
                            .preferences
                            .iter()
                            .map(|(label, lists)| {
                                (
                                    label.to_string(),
                                    lists
                                        .iter()
                                        .map(|(u, peers)| (u.to_string(), peers.clone()))
                                        .collect(),
                                )
                            })
                            .collect();
                        let value = serde_json::json!({
                            "assignments": assignments,
                            "preferences": preferences,
                        });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    } else {
                        for (user, label) in &assigned {
                            println!("user {user:>6}  cluster {label}");
                        }
                        for label in labels {
                            println!("cluster {label} preferences:");
                            let lists = &outcome.preferences[&label];
                            let mut users: Vec<i64> = lists.keys().copied().collect();
                            users.sort_unstable();
                            for user in users {
                                let peers: Vec<String> = lists[&user]
                                    .iter()
                                    .map(|p| p.to_string())
                                    .collect();
                                println!("  {user}: {}", peers.join(" > "));
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
