//! 短码生成性能基准测试

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use linktally::services::generate_code;
use linktally::services::code_generator::generate_code_with;
use std::hint::black_box;

/// 不同长度下的生成耗时
fn bench_generate_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("code_generator/generate_code");

    for length in [4usize, 6, 8, 16, 64] {
        group.throughput(Throughput::Elements(length as u64));
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, &length| {
            b.iter(|| generate_code(black_box(length)));
        });
    }

    group.finish();
}

/// 拒绝采样本身的开销：固定字节源，排除 RNG
fn bench_rejection_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("code_generator/rejection");

    // 全部可接受
    group.bench_function("no_rejects", |b| {
        b.iter(|| {
            generate_code_with(black_box(6), |buf| {
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = (i % 248) as u8;
                }
            })
        });
    });

    // 约一半字节被丢弃
    group.bench_function("half_rejected", |b| {
        b.iter(|| {
            let mut n: u32 = 0;
            generate_code_with(black_box(6), |buf| {
                for byte in buf.iter_mut() {
                    *byte = if n % 2 == 0 { 255 } else { (n % 248) as u8 };
                    n += 1;
                }
            })
        });
    });

    group.finish();
}

criterion_group!(benches, bench_generate_code, bench_rejection_sampling);
criterion_main!(benches);
