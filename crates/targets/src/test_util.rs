//! Fixtures shared by the check and scheduler tests.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use clap::Parser;
use config::Opts;
use influx::{FieldValue, MetricsSink, Point};
use mockito::ServerGuard;
use network::{DEFAULT_PROBE_TIMEOUT, HttpProbe};
use notify::{Notifier, TelegramChannel};

use crate::{
    checks::{CheckState, execute},
    context::CheckContext,
    target::{CheckKind, Target},
};

pub(crate) const VALOPER: &str = "cosmosvaloper1test";
pub(crate) const ACCOUNT: &str = "cosmos1test";
pub(crate) const HEX: &str = "AB12";
pub(crate) const CHAT_PATH: &str = "/botT/sendMessage";

pub(crate) fn opts(rpc: &str, lcd: &str) -> Opts {
    Opts::try_parse_from([
        "mission-control",
        "--rpc-endpoint",
        rpc,
        "--lcd-endpoint",
        lcd,
        "--external-rpc",
        &format!("{}/external", rpc.trim_end_matches('/')),
        "--val-operator-addr",
        VALOPER,
        "--acc-address",
        ACCOUNT,
        "--validator-hex-addr",
        HEX,
    ])
    .unwrap()
}

/// Base URL of a server that accepts connections and never answers.
pub(crate) async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    url
}

/// 2024-03-01 at the given UTC time.
pub(crate) fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
}

pub(crate) fn int(p: &Point, key: &str) -> i64 {
    match p.fields.get(key) {
        Some(FieldValue::Int(v)) => *v,
        other => panic!("{key} is not an int: {other:?}"),
    }
}

pub(crate) fn float(p: &Point, key: &str) -> f64 {
    match p.fields.get(key) {
        Some(FieldValue::Float(v)) => *v,
        other => panic!("{key} is not a float: {other:?}"),
    }
}

pub(crate) fn boolean(p: &Point, key: &str) -> bool {
    match p.fields.get(key) {
        Some(FieldValue::Bool(v)) => *v,
        other => panic!("{key} is not a bool: {other:?}"),
    }
}

pub(crate) fn string(p: &Point, key: &str) -> String {
    match p.fields.get(key) {
        Some(FieldValue::Str(v)) => v.clone(),
        other => panic!("{key} is not a string: {other:?}"),
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    points: Mutex<Vec<Point>>,
}

impl RecordingSink {
    pub(crate) fn points(&self) -> Vec<Point> {
        self.points.lock().unwrap().clone()
    }

    pub(crate) fn find(&self, measurement: &str) -> Option<Point> {
        self.points().into_iter().find(|p| p.measurement == measurement)
    }
}

#[async_trait]
impl MetricsSink for RecordingSink {
    async fn write(&self, points: Vec<Point>) -> eyre::Result<()> {
        self.points.lock().unwrap().extend(points);
        Ok(())
    }
}

/// A mock node serving RPC, LCD, the reference RPC and the chat API.
pub(crate) struct Harness {
    pub(crate) server: ServerGuard,
    pub(crate) ctx: CheckContext,
    pub(crate) sink: Arc<RecordingSink>,
    pub(crate) state: CheckState,
}

impl Harness {
    pub(crate) async fn new() -> Self {
        Self::with_opts(|_| {}).await
    }

    pub(crate) async fn with_opts(configure: impl FnOnce(&mut Opts)) -> Self {
        let server = mockito::Server::new_async().await;
        let mut o = opts(&server.url(), &server.url());
        configure(&mut o);

        let sink = Arc::new(RecordingSink::default());
        let chat = TelegramChannel::with_base_url("T".into(), "1".into(), server.url()).with_max_retries(0);
        let ctx = CheckContext::new(
            Arc::new(o),
            HttpProbe::new(DEFAULT_PROBE_TIMEOUT).unwrap(),
            Arc::clone(&sink) as Arc<dyn MetricsSink>,
            Arc::new(Notifier::new(vec![Arc::new(chat)])),
        )
        .unwrap();
        let state = CheckState::for_context(&ctx);
        Self { server, ctx, sink, state }
    }

    pub(crate) fn target(&self, check: CheckKind) -> Target {
        let cadence = check.default_cadence().parse().unwrap();
        Target::new(check, &self.ctx.opts, cadence)
    }

    pub(crate) async fn run(&mut self, check: CheckKind, now: DateTime<Utc>) -> eyre::Result<()> {
        let target = self.target(check);
        execute(&target, &self.ctx, &mut self.state, now).await
    }
}
