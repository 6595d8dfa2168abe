/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hexameter::prelude::*;
use hexameter_test::prelude::*;
use serde_json::json;
use tracing::info;

use crate::setup::{initialize_tracing, local_context, params, spawn_responder};
mod setup;

/// A message addressed to the context itself never touches the network.
#[hexameter_test]
async fn test_tell_to_self_is_loopback() -> anyhow::Result<()> {
    initialize_tracing();
    let mut context = local_context().await?;
    let me = context.me().clone();

    let answer = context
        .tell(MessageType::Qry, &me, "test", Parameter::new())
        .await?
        .expect("trivial space always answers");
    assert_eq!(
        answer[0]["description"],
        format!("answer to message qry@test from {me}")
    );
    assert_eq!(context.stats().messages_sent(), 0);
    assert_eq!(context.stats().connections_accepted(), 0);
    context.term().await;
    Ok(())
}

/// `ask` returns exactly what a remote responder acknowledged.
///
/// **Scenario:**
/// 1. A responder context with a `TrivialSpace` handles messages in a background task.
/// 2. A requester asks it `qry` on `test` with `[{"skills": 1337}]`.
///
/// **Verification:**
/// - The answer is the single description the trivial space produced for the requester.
#[hexameter_test]
async fn test_ask_returns_the_responders_payload() -> anyhow::Result<()> {
    initialize_tracing();
    let (responder, task) = spawn_responder(&TrivialSpace, &default_spheres()).await?;
    let mut requester = local_context().await?;

    let answer = tokio::time::timeout(
        Duration::from_secs(10),
        requester.ask(MessageType::Qry, &responder, "test", params(json!([{"skills": 1337}]))),
    )
    .await??;
    info!(?answer, "ask completed");

    let expected = params(json!([{
        "description": format!("answer to message qry@test from {}", requester.me())
    }]));
    assert_eq!(answer, expected);

    task.abort();
    requester.term().await;
    Ok(())
}

/// The liveness space echoes whatever it is asked.
#[hexameter_test]
async fn test_ask_life_echoes() -> anyhow::Result<()> {
    initialize_tracing();
    let (responder, task) = spawn_responder(&TrivialSpace, &default_spheres()).await?;
    let mut requester = local_context().await?;

    let payload = params(json!([{"ping": 1}]));
    let answer = tokio::time::timeout(
        Duration::from_secs(10),
        requester.ask(MessageType::Get, &responder, LIFE_SPACE, payload.clone()),
    )
    .await??;
    assert_eq!(answer, payload);

    task.abort();
    requester.term().await;
    Ok(())
}

/// Asking the context itself completes from the local answer.
#[hexameter_test]
async fn test_ask_self() -> anyhow::Result<()> {
    initialize_tracing();
    let mut context = local_context().await?;
    let me = context.me().clone();

    let answer = tokio::time::timeout(
        Duration::from_secs(5),
        context.ask(MessageType::Get, &me, "test", Parameter::new()),
    )
    .await??;
    assert_eq!(answer.len(), 1);
    assert_eq!(
        answer[0]["description"],
        format!("answer to message get@test from {me}")
    );
    context.term().await;
    Ok(())
}

/// Under the consume policy every `ask` sees only its own answer.
#[hexameter_test]
async fn test_consume_policy_separates_answers() -> anyhow::Result<()> {
    initialize_tracing();
    let (responder, task) = spawn_responder(&TrivialSpace, &default_spheres()).await?;
    let mut config = HexameterConfig::default();
    config.correlation.policy = CorrelationPolicy::Consume;
    let mut requester = HexameterContext::init_with(
        "127.0.0.1:0",
        &TrivialSpace,
        &default_spheres_with(config.correlation.policy),
        config,
    )
    .await?;

    for n in 0..3 {
        let payload = params(json!([{"n": n}]));
        let answer = tokio::time::timeout(
            Duration::from_secs(10),
            requester.ask(MessageType::Qry, &responder, LIFE_SPACE, payload.clone()),
        )
        .await??;
        assert_eq!(answer, payload);
    }

    task.abort();
    requester.term().await;
    Ok(())
}

/// Under the default retain policy repeated asks of one pair still get their own answers.
///
/// **Scenario:**
/// 1. A responder context handles messages in a background task.
/// 2. A requester with the default spheres asks it three times on `net.life`, each
///    time with a different payload.
///
/// **Verification:**
/// - Every ask returns exactly the payload it sent.
#[hexameter_test]
async fn test_retain_policy_repeated_asks() -> anyhow::Result<()> {
    initialize_tracing();
    let (responder, task) = spawn_responder(&TrivialSpace, &default_spheres()).await?;
    let mut requester = local_context().await?;
    assert_eq!(requester.config().correlation.policy, CorrelationPolicy::Retain);

    for n in 0..3 {
        let payload = params(json!([{"n": n}]));
        let answer = tokio::time::timeout(
            Duration::from_secs(10),
            requester.ask(MessageType::Qry, &responder, LIFE_SPACE, payload.clone()),
        )
        .await??;
        info!(n, ?answer, "ask completed");
        assert_eq!(answer, payload);
    }

    task.abort();
    requester.term().await;
    Ok(())
}

/// Repeated asks of the context itself return one answer each, under both policies.
#[hexameter_test]
async fn test_repeated_ask_self() -> anyhow::Result<()> {
    initialize_tracing();
    for policy in [CorrelationPolicy::Retain, CorrelationPolicy::Consume] {
        let mut config = HexameterConfig::default();
        config.correlation.policy = policy;
        let mut context = HexameterContext::init_with(
            "127.0.0.1:0",
            &TrivialSpace,
            &default_spheres_with(policy),
            config,
        )
        .await?;
        let me = context.me().clone();

        for kind in [MessageType::Get, MessageType::Qry, MessageType::Put] {
            let answer = tokio::time::timeout(
                Duration::from_secs(5),
                context.ask(kind, &me, "test", Parameter::new()),
            )
            .await??;
            assert_eq!(answer.len(), 1, "{policy:?}");
            assert_eq!(
                answer[0]["description"],
                format!("answer to message {kind}@test from {me}")
            );
        }
        context.term().await;
    }
    Ok(())
}

/// Telling an unreachable peer loses the message without an error.
#[hexameter_test]
async fn test_tell_to_unreachable_peer_is_lost() -> anyhow::Result<()> {
    initialize_tracing();
    let mut context = local_context().await?;
    let nobody = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        Address::new("127.0.0.1", listener.local_addr()?.port())
    };

    let result = context
        .tell(MessageType::Put, &nobody, "test", Parameter::new())
        .await?;
    assert_eq!(result, None);
    assert_eq!(context.stats().send_failures(), 1);
    assert_eq!(context.stats().messages_sent(), 0);
    context.term().await;
    Ok(())
}

struct Failing;

#[async_trait]
impl Processor for Failing {
    async fn process(&self, envelope: Envelope) -> anyhow::Result<Option<Parameter>> {
        anyhow::bail!("cannot handle {}@{}", envelope.kind, envelope.space)
    }
}

/// Errors raised by the space reach the caller unchanged.
#[hexameter_test]
async fn test_handler_errors_propagate() -> anyhow::Result<()> {
    initialize_tracing();
    let failing = || -> ProcessorRef { Arc::new(Failing) };
    let mut broken = HexameterContext::init_with(
        "127.0.0.1:0",
        &failing,
        &default_spheres(),
        HexameterConfig::default(),
    )
    .await?;
    let mut sender = local_context().await?;
    let outsider = Address::new("127.0.0.1", 9);

    let error = broken
        .process(MessageType::Put, &outsider, "test", Parameter::new())
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "cannot handle put@test");

    sender
        .tell(MessageType::Get, broken.me(), "test", Parameter::new())
        .await?;
    assert!(broken.respond(0).await.is_err());

    // the correlator still answers while the space fails
    let echo = broken
        .process(MessageType::Get, &outsider, LIFE_SPACE, params(json!([{"ok": true}])))
        .await?;
    assert_eq!(echo, Some(params(json!([{"ok": true}]))));

    broken.term().await;
    sender.term().await;
    Ok(())
}

/// The verbose preset logs without changing results in either direction.
#[hexameter_test]
async fn test_verbose_spheres_are_transparent() -> anyhow::Result<()> {
    initialize_tracing();
    let (responder, task) = spawn_responder(&TrivialSpace, &verbose_spheres()).await?;
    let mut requester = HexameterContext::init_with(
        "127.0.0.1:0",
        &TrivialSpace,
        &verbose_spheres(),
        HexameterConfig::default(),
    )
    .await?;

    let answer = tokio::time::timeout(
        Duration::from_secs(10),
        requester.ask(MessageType::Put, &responder, "test", Parameter::new()),
    )
    .await??;
    assert_eq!(
        answer[0]["description"],
        format!("answer to message put@test from {}", requester.me())
    );

    task.abort();
    requester.term().await;
    Ok(())
}

/// A bare host gets the default port, and a malformed address is refused.
#[hexameter_test]
async fn test_address_parsing_on_init() -> anyhow::Result<()> {
    initialize_tracing();
    let refused = HexameterContext::init("localhost:notaport", &TrivialSpace).await;
    assert!(matches!(refused, Err(HexameterError::InvalidAddress(_))));

    let mut config = HexameterConfig::default();
    config.transport.default_port = 0;
    let mut context =
        HexameterContext::init_with("127.0.0.1", &TrivialSpace, &default_spheres(), config).await?;
    assert_ne!(context.me().port(), 0);
    assert_eq!(context.me().host(), "127.0.0.1");
    context.term().await;
    Ok(())
}
