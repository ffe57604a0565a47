//! Benchmarks for the tunnel cipher.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

use kcptun_server::cipher::{CipherKey, CipherRole, SecureStream};
use kcptun_server::handshake::Iv;

const IV: [u8; 32] = *b"0123456789abcdef0123456789abcdef";

/// Push `data` from a client-role stream to a server-role stream.
async fn transfer(data: &[u8], chunk: usize) -> Vec<u8> {
    let key = CipherKey::derive("it's a secrect");
    let iv = Iv::from_bytes(IV);
    let (a, b) = duplex(data.len() + 1024);
    let mut client = SecureStream::new(a, &key, &iv, CipherRole::Client).unwrap();
    let mut server = SecureStream::new(b, &key, &iv, CipherRole::Server).unwrap();

    for part in data.chunks(chunk) {
        client.write_all(part).await.unwrap();
    }
    client.flush().await.unwrap();

    let mut buf = vec![0u8; data.len()];
    server.read_exact(&mut buf).await.unwrap();
    buf
}

fn bench_cipher_throughput(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("cipher_throughput");

    for data_size in [1024, 16384, 262144] {
        group.throughput(Throughput::Bytes(data_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(data_size),
            &data_size,
            |b, &size| {
                let data = vec![0x5au8; size];
                b.iter(|| rt.block_on(async { black_box(transfer(&data, 4096).await) }))
            },
        );
    }

    group.finish();
}

fn bench_cipher_write_size(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let data = vec![0x5au8; 65536];

    let mut group = c.benchmark_group("cipher_write_size");
    group.throughput(Throughput::Bytes(data.len() as u64));

    // Odd sizes exercise partial cipher blocks.
    for chunk in [1, 15, 512, 8192] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, &chunk| {
            b.iter(|| rt.block_on(async { black_box(transfer(&data, chunk).await) }))
        });
    }

    group.finish();
}

fn bench_key_derivation(c: &mut Criterion) {
    c.bench_function("key_derivation", |b| {
        b.iter(|| black_box(CipherKey::derive(black_box("it's a secrect"))))
    });
}

criterion_group!(
    benches,
    bench_cipher_throughput,
    bench_cipher_write_size,
    bench_key_derivation
);
criterion_main!(benches);
