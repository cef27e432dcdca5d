#![no_main]

use dmg_core::{
    decode_memory_region, disassemble_range, Bus, CoreConfig, Cpu, RomDevice, RomImage,
};
use libfuzzer_sys::fuzz_target;

const MAX_STEPS: u64 = 256;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let _ = RomImage::from_bytes(data.to_vec());
    let _ = decode_memory_region(u16::from_le_bytes([data[0], data[1]]));

    let mut rom = vec![0x00; 0x8000];
    let len = data.len().min(rom.len() - 0x0100);
    rom[0x0100..0x0100 + len].copy_from_slice(&data[..len]);

    let config = CoreConfig {
        tracing_enabled: true,
        step_limit: Some(MAX_STEPS),
    };
    let mut cpu = Cpu::new(Bus::with_rom_device(RomDevice::from_bytes(rom)), config);
    let mut events = Vec::new();
    let result = cpu.begin_execution(&mut events);

    assert!(cpu.retired() <= MAX_STEPS);
    if let Err(report) = result {
        assert_eq!(report.retired, cpu.retired());
        let _ = report.to_string();
    }
    for event in &events {
        let _ = event.to_string();
    }
    let _ = disassemble_range(cpu.bus(), 0x0100, 16);
});
