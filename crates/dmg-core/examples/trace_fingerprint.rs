//! Deterministic trace fingerprint used for cross-host comparison.

use dmg_core::{Bus, CoreConfig, Cpu, RomDevice, RunBoundary, TraceEvent};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

const PROGRAM: &[u8] = &[
    0x31, 0xFE, 0xDF, // ld sp,0xDFFE
    0x3E, 0x2A, // ld a,0x2A
    0x06, 0x05, // ld b,5
    0x80, // loop: add a,b
    0xCB, 0x37, // swap a
    0xC5, // push bc
    0xD1, // pop de
    0x05, // dec b
    0x20, 0xF8, // jr nz,loop
    0x27, // daa
    0x76, // halt
];

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> String {
    let mut rom = vec![0x00; 0x8000];
    rom[0x0100..0x0100 + PROGRAM.len()].copy_from_slice(PROGRAM);
    let mut cpu = Cpu::new(
        Bus::with_rom_device(RomDevice::from_bytes(rom)),
        CoreConfig::default(),
    );

    let mut events: Vec<TraceEvent> = Vec::new();
    let outcome = cpu
        .begin_execution(&mut events)
        .expect("fingerprint program should halt");
    assert_eq!(
        outcome.boundary,
        RunBoundary::ModeChanged(dmg_core::CpuMode::Halted)
    );

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for event in &events {
        hash_bytes(&mut hash, event.to_string().as_bytes());
    }
    hash_bytes(&mut hash, &outcome.steps.to_le_bytes());
    hash_bytes(&mut hash, &outcome.cycles.to_le_bytes());

    let regs = cpu.registers();
    for pair in [regs.af(), regs.bc(), regs.de(), regs.hl(), regs.sp(), regs.pc()] {
        hash_bytes(&mut hash, &pair.to_le_bytes());
    }

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
