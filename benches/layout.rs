use asmflow::{Arch, Config, Instruction, build_view};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn insn(address: u64, opcode: &str, operands: String) -> Instruction {
    Instruction {
        address: format!("{:#x}", address),
        bytes: String::new(),
        opcode: opcode.to_string(),
        operands,
    }
}

/// Straight-line function of `count` instructions ending in a return.
fn linear_function(count: usize) -> Vec<Instruction> {
    let mut out = Vec::new();
    let mut addr = 0x1000u64;
    for _ in 0..count.saturating_sub(1) {
        out.push(insn(addr, "add", "x0, x0, #1".to_string()));
        addr += 4;
    }
    out.push(insn(addr, "ret", String::new()));
    out
}

/// Chain of if/else diamonds with a loop back to the entry every 8 diamonds,
/// approximating real branchy code.
fn branchy_function(diamonds: usize) -> Vec<Instruction> {
    let mut out = Vec::new();
    let mut addr = 0x1000u64;
    for i in 0..diamonds {
        let join = addr + 16;
        out.push(insn(addr, "cmp", "x0, #0".to_string()));
        out.push(insn(addr + 4, "b.eq", format!("{:#x}", join)));
        out.push(insn(addr + 8, "add", "x0, x0, #1".to_string()));
        out.push(insn(addr + 12, "b", format!("{:#x}", join)));
        if i % 8 == 7 {
            out.push(insn(addr + 16, "b.ne", "0x1000".to_string()));
        } else {
            out.push(insn(addr + 16, "nop", String::new()));
        }
        addr += 20;
    }
    out.push(insn(addr, "ret", String::new()));
    out
}

fn bench_build_view(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("build_view");
    for size in [100usize, 1000, 4000] {
        let linear = linear_function(size);
        group.bench_with_input(BenchmarkId::new("linear", size), &linear, |b, input| {
            b.iter(|| build_view(black_box(input), &Arch::Arm64, &config).unwrap());
        });
    }
    for diamonds in [20usize, 200, 800] {
        let branchy = branchy_function(diamonds);
        group.bench_with_input(
            BenchmarkId::new("branchy", diamonds),
            &branchy,
            |b, input| {
                b.iter(|| build_view(black_box(input), &Arch::Arm64, &config).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_build_view);
criterion_main!(benches);
