// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Client commands that talk to a running daemon over the status API.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::Value;

fn base_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}")
}

async fn get_json(url: &str) -> Result<Value> {
    let response = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to reach daemon at {url} (is `caroline serve` running?)"))?;

    if !response.status().is_success() {
        bail!("Daemon returned {} for {url}", response.status());
    }
    response.json().await.context("Failed to parse daemon response")
}

pub async fn status(host: &str, port: u16) -> Result<()> {
    let json = get_json(&format!("{}/os_status", base_url(host, port))).await?;

    let system = json["system_status"].as_str().unwrap_or("unknown");
    let system = match system {
        "operational" => system.green(),
        "stopped" => system.red(),
        _ => system.yellow(),
    };
    println!("System: {system}");

    let engine = &json["decision_engine"];
    println!(
        "Decisions: {} made, {} pending, {} rule misses",
        engine["decisions_made"], engine["pending_decisions"], engine["rule_misses"]
    );

    println!("Services:");
    if let Some(services) = json["background_services"].as_object() {
        for (name, service) in services {
            let state = service["status"].as_str().unwrap_or("unknown");
            let state = match state {
                "running" => state.green(),
                "error" => state.red(),
                _ => state.yellow(),
            };
            println!(
                "  {name:<20} {state}  last activity {}",
                service["last_activity"].as_str().unwrap_or("-")
            );
        }
    }
    Ok(())
}

pub async fn decisions(host: &str, port: u16, limit: usize) -> Result<()> {
    let url = format!("{}/recent_decisions?limit={limit}", base_url(host, port));
    let json = get_json(&url).await?;

    let total = &json["total_decisions"];
    let decisions = json["recent_decisions"].as_array().cloned().unwrap_or_default();
    println!("{} total, showing {}", total, decisions.len());

    for d in decisions {
        let status = d["status"].as_str().unwrap_or("unknown");
        let status = match status {
            "executed" => status.green(),
            "pending_approval" => status.yellow(),
            _ => status.normal(),
        };
        println!(
            "  {}  {:<22} {:<18} urgency={} [{status}]",
            d["executed_at"].as_str().unwrap_or("-"),
            d["type"].as_str().unwrap_or("?"),
            d["trigger"].as_str().unwrap_or("?"),
            d["urgency"].as_str().unwrap_or("?"),
        );
    }
    Ok(())
}

pub async fn queues(host: &str, port: u16) -> Result<()> {
    let json = get_json(&format!("{}/queue_status", base_url(host, port))).await?;

    if let Some(queues) = json["queues"].as_object() {
        for (name, queue) in queues {
            let state = queue["status"].as_str().unwrap_or("unknown");
            let state = if state == "active" {
                state.green()
            } else {
                state.dimmed()
            };
            println!("  {name:<18} {:>5} events  [{state}]", queue["size"]);
        }
    }
    Ok(())
}

pub async fn force(host: &str, port: u16, decision_type: &str, data: &str) -> Result<()> {
    let payload: Value = serde_json::from_str(data).context("--data must be valid JSON")?;

    let response = reqwest::Client::new()
        .post(format!("{}/force_decision", base_url(host, port)))
        .json(&serde_json::json!({ "type": decision_type, "data": payload }))
        .send()
        .await
        .context("Failed to reach daemon")?;

    let status = response.status();
    let body: Value = response.json().await.context("Failed to parse daemon response")?;
    if !status.is_success() {
        bail!("Daemon rejected decision: {}", body["error"]);
    }

    println!(
        "{} decision {} queued as {}",
        "OK".green(),
        decision_type.bold(),
        body["decision_id"]
    );
    Ok(())
}
