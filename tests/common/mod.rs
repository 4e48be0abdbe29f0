#![allow(dead_code)]

use async_trait::async_trait;
use cardcost::domain::cost::{Cost, CostRecord};
use cardcost::domain::country::{CountryCode, CountryLookupResult};
use cardcost::domain::ports::{CostStore, CountryLookup};
use cardcost::error::LookupError;
use cardcost::infrastructure::in_memory::InMemoryCostStore;
use rust_decimal::Decimal;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::NamedTempFile;

/// Lookup double returning a fixed answer and counting calls.
pub struct StubLookup {
    answer: Result<&'static str, LookupError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubLookup {
    pub fn country(alpha2: &'static str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(alpha2),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: LookupError) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(alpha2: &'static str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(alpha2),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CountryLookup for StubLookup {
    async fn lookup(&self, _pan: &str) -> Result<CountryLookupResult, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.answer {
            Ok(alpha2) => Ok(CountryLookupResult::new(CountryCode::parse(alpha2).unwrap())),
            Err(e) => Err(e.clone()),
        }
    }
}

pub async fn store_with(costs: &[(&str, Decimal)]) -> Arc<InMemoryCostStore> {
    let store = Arc::new(InMemoryCostStore::new());
    for (code, cost) in costs {
        store
            .save(CostRecord::new(
                CountryCode::parse(code).unwrap(),
                Cost::new(*cost).unwrap(),
            ))
            .await
            .unwrap();
    }
    store
}

pub fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

/// A local address nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Answers every request on a local port with the given issuing country.
///
/// The listener thread lives for the rest of the test binary.
pub fn serve_binlist(alpha2: &'static str) -> String {
    use std::io::{BufRead, BufReader};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).is_ok_and(|n| n > 0) {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let body = format!(r#"{{"scheme":"visa","country":{{"alpha2":"{}"}}}}"#, alpha2);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{}", addr)
}
