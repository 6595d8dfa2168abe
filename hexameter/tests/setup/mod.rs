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
#![allow(dead_code)]

use std::sync::Once;

use hexameter::prelude::*;
use tokio::task::JoinHandle;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Ensures tracing initialization happens only once across all tests.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber for tests, writing to `logs/context_tests.txt`.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        std::fs::create_dir_all("logs").expect("could not create logs dir");

        let file_appender = RollingFileAppender::new(Rotation::NEVER, "logs", "context_tests.txt");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Leak the guard so the non-blocking writer is not dropped before process exit
        Box::leak(Box::new(guard));

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("trace")
                .add_directive("hexameter=trace".parse().unwrap())
                .add_directive("hexameter_core=trace".parse().unwrap())
                .add_directive("tokio=info".parse().unwrap())
        });

        let subscriber = FmtSubscriber::builder()
            .with_span_events(FmtSpan::NONE)
            .with_max_level(Level::TRACE)
            .compact()
            .with_line_number(true)
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

/// A context with a trivial space on a free local port.
pub async fn local_context() -> anyhow::Result<HexameterContext> {
    Ok(HexameterContext::init("127.0.0.1:0", &TrivialSpace).await?)
}

/// Starts a context that answers every message it receives until the task is aborted.
pub async fn spawn_responder(
    space: &dyn Space,
    spheres: &[SphereRef],
) -> anyhow::Result<(Address, JoinHandle<anyhow::Result<()>>)> {
    let mut responder =
        HexameterContext::init_with("127.0.0.1:0", space, spheres, HexameterConfig::default())
            .await?;
    let address = responder.me().clone();
    let task = tokio::spawn(async move {
        while responder.respond(0).await? {}
        Ok(())
    });
    Ok((address, task))
}

pub fn params(value: serde_json::Value) -> Parameter {
    parameter_from_json(value).expect("parameter must be an array of objects")
}
