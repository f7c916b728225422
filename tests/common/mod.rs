//! In-process FalkorDB stand-in speaking RESP, for integration tests.
//!
//! Answers `PING` and `GRAPH.RO_QUERY <graph> <query> --compact` with canned
//! compact replies. Queries with no canned reply get an empty result set,
//! which is what a graph that does not exist looks like to the exporter.

#![allow(dead_code)]

use bytes::BytesMut;
use falkor_export::RespValue;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Canned server behaviour
#[derive(Clone, Default)]
pub struct Fixture {
    replies: HashMap<(String, String), RespValue>,
    ping_reply: Option<RespValue>,
    chunk_size: Option<usize>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply for `query` against `graph`
    pub fn reply(mut self, graph: &str, query: &str, value: RespValue) -> Self {
        self.replies.insert((graph.to_string(), query.to_string()), value);
        self
    }

    /// Override the PONG handshake reply
    pub fn ping_reply(mut self, value: RespValue) -> Self {
        self.ping_reply = Some(value);
        self
    }

    /// Write replies in pieces of `size` bytes
    pub fn chunked(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }
}

/// Start the mock server on an ephemeral port
pub async fn spawn(fixture: Fixture) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let fixture = Arc::new(fixture);

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            let fixture = Arc::clone(&fixture);
            tokio::spawn(async move {
                let _ = handle_connection(socket, fixture).await;
            });
        }
    });

    addr
}

/// A port nothing listens on
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn handle_connection(mut socket: TcpStream, fixture: Arc<Fixture>) -> std::io::Result<()> {
    let mut buffer = BytesMut::with_capacity(4096);

    loop {
        while let Some(command) = RespValue::decode(&mut buffer).expect("client sent malformed RESP") {
            let response = respond(&command, &fixture);
            let mut out = Vec::new();
            response.encode(&mut out)?;

            match fixture.chunk_size {
                Some(size) => {
                    for piece in out.chunks(size) {
                        socket.write_all(piece).await?;
                        socket.flush().await?;
                        tokio::task::yield_now().await;
                    }
                }
                None => socket.write_all(&out).await?,
            }
        }

        if socket.read_buf(&mut buffer).await? == 0 {
            return Ok(());
        }
    }
}

fn respond(command: &RespValue, fixture: &Fixture) -> RespValue {
    let args: Vec<String> = command
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a.as_string().unwrap().unwrap_or_default())
        .collect();

    match args[0].to_uppercase().as_str() {
        "PING" => fixture
            .ping_reply
            .clone()
            .unwrap_or_else(|| RespValue::SimpleString("PONG".to_string())),
        "GRAPH.RO_QUERY" => {
            assert_eq!(args.get(3).map(String::as_str), Some("--compact"));
            fixture
                .replies
                .get(&(args[1].clone(), args[2].clone()))
                .cloned()
                .unwrap_or_else(|| compact_result(&["column"], vec![]))
        }
        other => RespValue::Error(format!("ERR unknown command '{}'", other)),
    }
}

// ---- compact reply builders ----

pub fn bulk(s: &str) -> RespValue {
    RespValue::BulkString(Some(s.as_bytes().to_vec()))
}

fn typed(code: i64, value: RespValue) -> RespValue {
    RespValue::Array(vec![RespValue::Integer(code), value])
}

pub fn null() -> RespValue {
    typed(1, RespValue::BulkString(None))
}

pub fn string(s: &str) -> RespValue {
    typed(2, bulk(s))
}

pub fn int(i: i64) -> RespValue {
    typed(3, RespValue::Integer(i))
}

pub fn boolean(b: bool) -> RespValue {
    typed(4, bulk(if b { "true" } else { "false" }))
}

pub fn double(f: f64) -> RespValue {
    typed(5, bulk(&f.to_string()))
}

pub fn array(items: Vec<RespValue>) -> RespValue {
    typed(6, RespValue::Array(items))
}

pub fn vector(values: &[f64]) -> RespValue {
    typed(12, RespValue::Array(values.iter().map(|v| bulk(&v.to_string())).collect()))
}

pub fn datetime(secs: i64) -> RespValue {
    typed(13, RespValue::Integer(secs))
}

pub fn date(secs: i64) -> RespValue {
    typed(14, RespValue::Integer(secs))
}

pub fn labels(names: &[&str]) -> RespValue {
    array(names.iter().map(|n| string(n)).collect())
}

pub fn map(pairs: Vec<(&str, RespValue)>) -> RespValue {
    let flat = pairs
        .into_iter()
        .flat_map(|(k, v)| [bulk(k), v])
        .collect();
    typed(10, RespValue::Array(flat))
}

/// `[header, rows, stats]`
pub fn compact_result(columns: &[&str], rows: Vec<Vec<RespValue>>) -> RespValue {
    RespValue::Array(vec![
        RespValue::Array(
            columns
                .iter()
                .map(|c| RespValue::Array(vec![RespValue::Integer(1), bulk(c)]))
                .collect(),
        ),
        RespValue::Array(rows.into_iter().map(RespValue::Array).collect()),
        RespValue::Array(vec![
            bulk("Cached execution: 0"),
            bulk("Query internal execution time: 0.2 milliseconds"),
        ]),
    ])
}
