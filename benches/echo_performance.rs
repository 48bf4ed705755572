use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use echoload::client::{LoadConfig, LoadGenerator, MemorySink};
use echoload::common::spawn_test_server;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;

fn bench_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(spawn_test_server(1024)).unwrap();
    let mut stream = rt.block_on(TcpStream::connect(server.addr)).unwrap();
    stream.set_nodelay(true).unwrap();

    let mut group = c.benchmark_group("round_trip");

    // Payloads above the server buffer size take several reads to mirror
    for size in [64usize, 256, 1024, 4096] {
        let data = vec![b'x'; size];
        let mut response = vec![0u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("tcp_echo", size), &size, |b, _| {
            b.iter(|| {
                rt.block_on(async {
                    stream.write_all(black_box(&data)).await.unwrap();
                    stream.read_exact(&mut response).await.unwrap();
                })
            });
        });
    }

    group.finish();
    drop(stream);
    rt.block_on(server.shutdown()).unwrap();
}

fn bench_load_run(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(spawn_test_server(1024)).unwrap();

    let mut group = c.benchmark_group("load_run");
    group.sample_size(20);

    for tasks in [1usize, 10, 50] {
        let config = LoadConfig {
            server_host: server.addr.ip().to_string(),
            server_port: server.addr.port(),
            concurrent_tasks: tasks,
            messages_per_task: 10,
            ..Default::default()
        };

        group.throughput(Throughput::Elements((tasks * 10) as u64));
        group.bench_with_input(BenchmarkId::new("tasks", tasks), &config, |b, config| {
            b.iter(|| {
                let generator = LoadGenerator::new(config.clone(), Arc::new(MemorySink::new()));
                let summary = rt.block_on(generator.run());
                assert_eq!(summary.messages_received, (tasks * 10) as u64);
            });
        });
    }

    group.finish();
    rt.block_on(server.shutdown()).unwrap();
}

criterion_group!(benches, bench_round_trip, bench_load_run);
criterion_main!(benches);
