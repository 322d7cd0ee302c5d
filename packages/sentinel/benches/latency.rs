//! Latency benchmarks for the transaction-check path
//!
//! Classification runs inline on every mempool check, so these track the cost
//! of decode + dispatch + classify and of encoding the published frame.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use mempool_sentinel::classify::Outcome;
use mempool_sentinel::message::{JsonTxDecoder, TxDecoder};
use mempool_sentinel::publisher::{EventSink, RedisPublisher};
use mempool_sentinel::query::{QueryError, StateQuerier};
use mempool_sentinel::registry::AddressRegistry;
use mempool_sentinel::Classifier;

/// Chain where every account is rich and every query answers instantly
struct RichChain;

impl StateQuerier for RichChain {
    fn bank_balance(&self, _address: &str, _denom: &str) -> Result<u128, QueryError> {
        Ok(u128::MAX)
    }

    fn account_sequence(&self, _address: &str) -> Result<u64, QueryError> {
        Ok(0)
    }

    fn encoded_account(&self, _address: &str) -> Result<Vec<u8>, QueryError> {
        Ok(Vec::new())
    }

    fn smart_query(&self, _contract: &str, _query: &[u8]) -> Result<Vec<u8>, QueryError> {
        Ok(br#"{"balance":"1000000000000","rate":"10.0","exchange_rate":"1.1"}"#.to_vec())
    }
}

fn registry() -> AddressRegistry {
    let mut registry = AddressRegistry::default();
    for i in 0..200 {
        registry.mirror_pairs.insert(format!("m{}-UST", i), format!("terra1pair{}", i));
        registry.mirror_tokens.insert(format!("m{}", i), format!("terra1token{}", i));
    }
    registry.terra_tokens.insert("AUST", "terra1aust");
    registry.wallets.insert("mintContract", "terra1mint");
    registry.wallets.insert("mirrorOracle", "terra1oracle");
    registry.wallets.insert("ancContract", "terra1market");
    registry
}

fn swap_tx() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "body": { "messages": [{
            "@type": "/terra.wasm.v1beta1.MsgExecuteContract",
            "sender": "terra1trader",
            "contract": "terra1pair150",
            "execute_msg": { "swap": { "belief_price": "3.1", "max_spread": "0.01" } },
            "coins": [{ "denom": "uusd", "amount": "1000000" }],
        }]}
    }))
    .unwrap()
}

fn mint_tx() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "body": { "messages": [{
            "@type": "/terra.wasm.v1beta1.MsgExecuteContract",
            "sender": "terra1trader",
            "contract": "terra1mint",
            "execute_msg": { "open_position": {
                "collateral": { "info": { "token": { "contract_addr": "terra1aust" } }, "amount": "100000000" },
                "asset_info": { "token": { "contract_addr": "terra1token7" } },
                "collateral_ratio": "2.0",
            }},
            "coins": [],
        }]}
    }))
    .unwrap()
}

fn classifier() -> Classifier {
    Classifier::new(Arc::new(registry()), Arc::new(JsonTxDecoder), Arc::new(RichChain))
}

/// Benchmark transaction decoding
fn bench_decode_transaction(c: &mut Criterion) {
    let raw = swap_tx();
    c.bench_function("decode_transaction", |b| {
        b.iter(|| black_box(JsonTxDecoder.decode(black_box(&raw))))
    });
}

/// Benchmark classification of a gated swap
fn bench_classify_swap(c: &mut Criterion) {
    let classifier = classifier();
    let raw = swap_tx();
    c.bench_function("classify_swap", |b| {
        b.iter(|| black_box(classifier.classify(black_box(&raw))))
    });
}

/// Benchmark mint reconstruction with two oracle lookups
fn bench_classify_mint(c: &mut Criterion) {
    let classifier = classifier();
    let raw = mint_tx();
    c.bench_function("classify_mint", |b| {
        b.iter(|| black_box(classifier.classify(black_box(&raw))))
    });
}

/// Benchmark classification of an untracked call
fn bench_classify_unrouted(c: &mut Criterion) {
    let classifier = classifier();
    let raw = String::from_utf8(swap_tx())
        .unwrap()
        .replace("terra1pair150", "terra1unknown")
        .into_bytes();
    c.bench_function("classify_unrouted", |b| {
        b.iter(|| black_box(classifier.classify(black_box(&raw))))
    });
}

/// Benchmark MessagePack encoding plus enqueue
fn bench_publish_frame(c: &mut Criterion) {
    let event = classifier()
        .classify_outcomes(&swap_tx())
        .into_iter()
        .find_map(Outcome::into_event)
        .unwrap();
    let (publisher, mut frames) = RedisPublisher::channel(1);

    c.bench_function("publish_frame", |b| {
        b.iter(|| {
            publisher.publish(black_box(&event));
            black_box(frames.try_recv().ok())
        })
    });
}

criterion_group!(
    benches,
    bench_decode_transaction,
    bench_classify_swap,
    bench_classify_mint,
    bench_classify_unrouted,
    bench_publish_frame
);

criterion_main!(benches);
