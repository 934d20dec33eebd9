// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GeoFirestore demo
//!
//! Seeds a few landmarks with a write batch, then records concurrent
//! check-ins through transactions and reports how each one ended.

use anyhow::Context;
use futures_util::{stream, StreamExt};
use geofirestore::{
    config::Config, DbError, Firestore, GeoFirestore, GeoPoint, GeoTransaction, TransactionError,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LANDMARKS: &str = "landmarks";
const CHECK_INS: usize = 16;

/// Landmark document stored in the demo collection.
#[derive(Debug, Clone, Serialize)]
struct Landmark {
    name: String,
    coordinates: GeoPoint,
    check_ins: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    let options = config
        .transaction_options()
        .context("Invalid transaction options")?;
    tracing::info!(
        project = %config.project_id,
        max_attempts = options.max_attempts(),
        "Starting GeoFirestore demo"
    );

    let firestore = Firestore::new(&config.project_id).context("Failed to open database")?;
    let geo = GeoFirestore::with_location_field(firestore, &config.location_field)
        .context("Invalid location field")?;

    // Seed landmarks atomically
    let landmarks = geo.collection(LANDMARKS)?;
    let seeds = [
        ("ferry-building", "Ferry Building", 37.7955, -122.3937),
        ("coit-tower", "Coit Tower", 37.8024, -122.4058),
        ("twin-peaks", "Twin Peaks", 37.7544, -122.4477),
    ];
    let mut batch = geo.batch();
    for (id, name, latitude, longitude) in seeds {
        let landmark = Landmark {
            name: name.to_string(),
            coordinates: GeoPoint::new(latitude, longitude)?,
            check_ins: 0,
        };
        batch.set(&landmarks.doc(id)?, &location_doc(&config, &landmark)?)?;
    }
    let commit = batch.commit().await?;
    tracing::info!(writes = commit.write_count, "Seeded landmarks");

    // Concurrent check-ins against one hot document
    let target = landmarks.doc("coit-tower")?;
    let results = stream::iter(0..CHECK_INS)
        .map(|visitor| {
            let geo = geo.clone();
            let target = target.clone();
            async move {
                geo.run_transaction_with_options(options, |tx: GeoTransaction| {
                    let target = target.clone();
                    async move {
                        let snapshot = tx.get(&target).await?;
                        let check_ins = snapshot
                            .native()
                            .get("check_ins")
                            .and_then(|v| v.as_u64())
                            .ok_or_else(|| DbError::NotFound(target.path()))?;
                        // Give other check-ins a chance to interleave.
                        tokio::task::yield_now().await;
                        tx.update(&target, &serde_json::json!({ "check_ins": check_ins + 1 }))?;
                        Ok::<_, DbError>(tx.attempt())
                    }
                })
                .await
                .map(|attempts| (visitor, attempts))
            }
        })
        .buffer_unordered(CHECK_INS)
        .collect::<Vec<_>>()
        .await;

    let mut committed = 0;
    for result in results {
        match result {
            Ok((visitor, attempts)) => {
                committed += 1;
                tracing::info!(visitor, attempts, "Check-in committed");
            }
            Err(TransactionError::Aborted(err)) => {
                tracing::error!(error = %err, "Check-in aborted");
            }
            Err(TransactionError::Failed { attempts }) => {
                tracing::warn!(attempts, "Check-in gave up after repeated conflicts");
            }
            Err(TransactionError::Commit(err)) => {
                tracing::error!(error = %err, "Check-in commit rejected");
            }
        }
    }

    let snapshot = target.get().await?;
    let check_ins = snapshot
        .native()
        .get("check_ins")
        .and_then(|v| v.as_u64())
        .context("Landmark lost its check-in counter")?;
    tracing::info!(
        landmark = %target.path(),
        check_ins,
        committed,
        location = ?snapshot.point()?,
        "Demo complete"
    );

    Ok(())
}

/// Serialize a landmark, moving its location to the configured field.
fn location_doc(config: &Config, landmark: &Landmark) -> anyhow::Result<serde_json::Value> {
    let mut value = serde_json::to_value(landmark)?;
    if let Some(fields) = value.as_object_mut() {
        if let Some(location) = fields.remove("coordinates") {
            fields.insert(config.location_field.clone(), location);
        }
    }
    Ok(value)
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("geofirestore=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
