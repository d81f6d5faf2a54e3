// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end runs of `kernel::run` against a mock gateway connection,
//! exercising the real websocket transport rather than just the dispatcher.

use std::time::Duration;

use clap::Parser as ClapParser;
use gatebot::config::Config;
use gatebot::kernel::{self, RoutineSchedule};
use gatebot::registry::CommandRegistry;
use gatebot_scenarios::MockGateway;

fn config(port: u16) -> Config {
    Config::parse_from([
        "gatebot",
        "--connect-host",
        "127.0.0.1",
        "--connect-port",
        &port.to_string(),
        "--working-time-secs",
        "5",
        "--cooldown-time-secs",
        "0",
    ])
}

#[tokio::test]
async fn echo_command_round_trips_through_the_real_transport() -> anyhow::Result<()> {
    let gateway = MockGateway::start().await?;
    let mut gateway = gateway;
    let config = config(gateway.port);

    let run = tokio::spawn(kernel::run(config, CommandRegistry::new(), RoutineSchedule::default()));

    // The kernel fetches bot identity on startup; answer it so it doesn't
    // stall waiting for a response that will never come.
    let login_request = tokio::time::timeout(Duration::from_secs(2), gateway.outbound.recv())
        .await?
        .expect("kernel sent a get_login_info request on startup");
    let echo = login_request["echo"].as_str().map(str::to_owned);
    gateway
        .inbound
        .send(serde_json::json!({
            "retcode": 0,
            "status": "ok",
            "echo": echo,
            "data": { "user_id": 1, "nickname": "gatebot" },
        }))
        .await?;

    gateway.inbound.send(MockGateway::private_message("42", "~echo#hi there")).await?;

    let reply = tokio::time::timeout(Duration::from_secs(2), gateway.outbound.recv())
        .await?
        .expect("echo command replied over the transport");
    assert_eq!(reply["action"], "send_msg");
    assert_eq!(reply["params"]["user_id"], "42");
    assert_eq!(reply["params"]["message"], "hi there");

    run.await??;
    Ok(())
}

#[tokio::test]
async fn lifecycle_pause_suppresses_non_exempt_commands() -> anyhow::Result<()> {
    let mut gateway = MockGateway::start().await?;
    let config = config(gateway.port);

    let run = tokio::spawn(kernel::run(config, CommandRegistry::new(), RoutineSchedule::default()));

    let login_request = tokio::time::timeout(Duration::from_secs(2), gateway.outbound.recv())
        .await?
        .expect("kernel sent a get_login_info request on startup");
    let echo = login_request["echo"].as_str().map(str::to_owned);
    gateway
        .inbound
        .send(serde_json::json!({
            "retcode": 0,
            "status": "ok",
            "echo": echo,
            "data": { "user_id": 1, "nickname": "gatebot" },
        }))
        .await?;

    gateway.inbound.send(MockGateway::private_message("42", "~lifecycle#off")).await?;
    let paused_reply = tokio::time::timeout(Duration::from_secs(2), gateway.outbound.recv())
        .await?
        .expect("lifecycle replied");
    assert!(paused_reply["params"]["message"].as_str().unwrap_or_default().contains("paused"));

    gateway.inbound.send(MockGateway::private_message("42", "~echo#should not run")).await?;
    let next = tokio::time::timeout(Duration::from_millis(300), gateway.outbound.recv()).await;
    assert!(next.is_err(), "echo must not reply while paused");

    run.await??;
    Ok(())
}
