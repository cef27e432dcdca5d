//! Bus routing and cartridge header coverage.

use dmg_core::rom::{
    HEADER_CHECKSUM_OFFSET, LOGO_OFFSET, NINTENDO_LOGO, ROM_SIZE_OFFSET, TITLE_OFFSET,
};
use dmg_core::{
    decode_memory_region, header_checksum, Bus, BusError, CoreConfig, Cpu, MemoryRegion,
    RamDevice, RomError, RomImage, FIXED_MEMORY_REGIONS, OPEN_BUS,
};
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

/// First byte after the cartridge header.
const PROGRAM_START: usize = 0x0150;

/// Builds a 32 KiB image whose entry point (`nop; jp 0x0150`) jumps over the
/// header to `program`.
fn cartridge(title: &[u8], program: &[u8]) -> Vec<u8> {
    let mut data = vec![0x00; 0x8000];
    data[0x0100..0x0104].copy_from_slice(&[0x00, 0xC3, 0x50, 0x01]);
    data[LOGO_OFFSET..LOGO_OFFSET + NINTENDO_LOGO.len()].copy_from_slice(&NINTENDO_LOGO);
    data[TITLE_OFFSET..TITLE_OFFSET + title.len()].copy_from_slice(title);
    data[PROGRAM_START..PROGRAM_START + program.len()].copy_from_slice(program);
    data[HEADER_CHECKSUM_OFFSET] = header_checksum(&data).expect("header present");
    data
}

#[test]
fn valid_cartridge_loads_and_boots() {
    // ld a,0x42; ld (0xC000),a; halt
    let rom = RomImage::from_bytes(cartridge(b"TETRIS", &[0x3E, 0x42, 0xEA, 0x00, 0xC0, 0x76]))
        .expect("valid header");
    assert_eq!(rom.title(), "TETRIS");
    assert_eq!(rom.declared_size(), Some(0x8000));

    let mut cpu = Cpu::new(Bus::with_dmg_layout(rom), CoreConfig::default());
    let outcome = cpu.begin_execution(&mut Vec::new()).expect("halts");
    assert_eq!(outcome.steps, 5);
    assert_eq!(cpu.registers().pc(), 0x0156);
    assert_eq!(cpu.bus().read_byte(0xC000), Ok(0x42));
}

#[test]
fn program_bytes_leave_the_header_intact() {
    let data = cartridge(b"GAME", &[0xFF; 0x20]);
    assert_eq!(&data[LOGO_OFFSET..LOGO_OFFSET + NINTENDO_LOGO.len()], &NINTENDO_LOGO);
    assert_eq!(&data[PROGRAM_START..PROGRAM_START + 0x20], &[0xFF; 0x20]);
    assert!(RomImage::from_bytes(data).is_ok());
}

#[test]
fn corrupted_logo_is_rejected() {
    let mut data = cartridge(b"GAME", &[]);
    data[LOGO_OFFSET] ^= 0xFF;
    assert!(matches!(RomImage::from_bytes(data), Err(RomError::InvalidLogo)));
}

#[test]
fn checksum_mismatch_reports_both_values() {
    let mut data = cartridge(b"GAME", &[]);
    let expected = data[HEADER_CHECKSUM_OFFSET].wrapping_add(1);
    data[HEADER_CHECKSUM_OFFSET] = expected;

    match RomImage::from_bytes(data) {
        Err(RomError::ChecksumMismatch {
            expected: header,
            computed,
        }) => {
            assert_eq!(header, expected);
            assert_eq!(computed, expected.wrapping_sub(1));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn truncated_image_is_rejected() {
    assert!(matches!(
        RomImage::from_bytes(vec![0; 0x14F]),
        Err(RomError::TooShort { len: 0x14F })
    ));
}

#[test]
fn missing_file_surfaces_io_error() {
    let err = RomImage::from_file("/nonexistent/dmg-core/rom.gb").expect_err("missing");
    assert!(matches!(err, RomError::Io { .. }));
    assert!(err.to_string().contains("rom.gb"));
}

#[test]
fn title_stops_at_nul_and_masks_non_printable() {
    let rom = RomImage::from_bytes(cartridge(b"AB\x01CD\0XYZ", &[])).expect("valid header");
    assert_eq!(rom.title(), "AB?CD");
}

#[test]
fn declared_size_follows_header_code() {
    let mut data = cartridge(b"BIG", &[]);
    data[ROM_SIZE_OFFSET] = 0x05;
    data[HEADER_CHECKSUM_OFFSET] = header_checksum(&data).expect("header present");
    let rom = RomImage::from_bytes(data).expect("valid header");
    assert_eq!(rom.declared_size(), Some(0x8000 << 5));
}

#[rstest]
#[case(0x0000, MemoryRegion::Rom)]
#[case(0x7FFF, MemoryRegion::Rom)]
#[case(0x8000, MemoryRegion::VideoRam)]
#[case(0xA000, MemoryRegion::ExternalRam)]
#[case(0xC000, MemoryRegion::WorkRam)]
#[case(0xE000, MemoryRegion::EchoRam)]
#[case(0xFE00, MemoryRegion::Oam)]
#[case(0xFEA0, MemoryRegion::Unusable)]
#[case(0xFF00, MemoryRegion::Io)]
#[case(0xFF80, MemoryRegion::HighRam)]
#[case(0xFFFF, MemoryRegion::InterruptEnable)]
fn every_address_decodes_to_one_region(#[case] addr: u16, #[case] region: MemoryRegion) {
    assert_eq!(decode_memory_region(addr), region);
    assert!(region.contains(addr));
    assert_eq!(
        FIXED_MEMORY_REGIONS
            .iter()
            .filter(|descriptor| descriptor.region.contains(addr))
            .count(),
        1
    );
}

#[rstest]
#[case::vram(0x8000, MemoryRegion::VideoRam)]
#[case::echo(0xE123, MemoryRegion::EchoRam)]
#[case::io(0xFF44, MemoryRegion::Io)]
fn canonical_layout_leaves_hardware_windows_unmapped(
    #[case] addr: u16,
    #[case] region: MemoryRegion,
) {
    let rom = RomImage::from_bytes(cartridge(b"", &[])).expect("valid header");
    let mut bus = Bus::with_dmg_layout(rom);
    let unmapped = BusError::UnmappedAddress { addr, region };

    assert_eq!(bus.read_byte(addr), Err(unmapped));
    assert_eq!(bus.write_byte(addr, 0x12), Err(unmapped));
}

#[test]
fn canonical_layout_routes_ram_unusable_and_ie() {
    let rom = RomImage::from_bytes(cartridge(b"", &[])).expect("valid header");
    let mut bus = Bus::with_dmg_layout(rom);

    for addr in [0xA000, 0xDFFF, 0xFE9F, 0xFFFE, 0xFFFF] {
        bus.write_byte(addr, 0x5A).expect("writable");
        assert_eq!(bus.read_byte(addr), Ok(0x5A), "address {addr:#06X}");
    }

    bus.write_byte(0xFEA0, 0x77).expect("unusable window accepts writes");
    assert_eq!(bus.read_byte(0xFEA0), Ok(0x00));

    assert_eq!(
        bus.write_byte(0x0200, 0x00),
        Err(BusError::ReadOnlyViolation { addr: 0x0200 })
    );
}

#[test]
fn short_rom_reads_past_image_as_open_bus() {
    let mut data = cartridge(b"", &[]);
    data.truncate(0x4000);
    let rom = RomImage::from_bytes(data).expect("header intact");
    let bus = Bus::with_dmg_layout(rom);
    assert_eq!(bus.read_byte(0x4000), Ok(OPEN_BUS));
}

#[test]
fn first_mapped_device_wins_on_overlap() {
    let mut bus = Bus::new();
    bus.map(RamDevice::new(0xC000, 0xC0FF));
    bus.map(RamDevice::work_ram());
    bus.write_byte(0xC010, 0x11).expect("mapped");

    assert_eq!(bus.device_count(), 2);
    assert_eq!(bus.read_byte(0xC010), Ok(0x11));
    assert_eq!(bus.read_byte(0xC110), Ok(0x00));
}
