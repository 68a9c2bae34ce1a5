use proptest::prelude::*;

use trackerkit_communication::{BackendFactory, BridgeBackend, SimulatedBridge, SimulatedFactory};
use trackerkit_core::{MemoryWidth, Watch, MAX_ADDRESS};

fn width() -> impl Strategy<Value = MemoryWidth> {
    prop_oneof![
        Just(MemoryWidth::U8),
        Just(MemoryWidth::U16),
        Just(MemoryWidth::U24),
        Just(MemoryWidth::U32),
    ]
}

proptest! {
    #[test]
    fn test_read_int_matches_poked_bytes(
        addr in 0u32..(MAX_ADDRESS - 4),
        bytes in prop::array::uniform4(any::<u8>()),
        width in width(),
    ) {
        let bridge = SimulatedBridge::new();
        bridge.poke(addr, &bytes);

        let n = width.bytes() as usize;
        let mut expected = [0u8; 4];
        expected[..n].copy_from_slice(&bytes[..n]);
        prop_assert_eq!(bridge.read_int(addr, width), u32::from_le_bytes(expected));
    }

    #[test]
    fn test_watch_covers_its_range(addr in 0u32..0xFF_0000, len in 1u32..0x100) {
        let watch = Watch::new(addr, len).unwrap();
        let mut bridge = SimulatedBridge::new();
        bridge.add_watch(watch);

        prop_assert!(bridge.is_watched(addr));
        prop_assert!(bridge.is_watched(addr + len - 1));
        prop_assert!(!bridge.is_watched(addr + len));
    }
}

#[test]
fn test_factory_backends_share_memory() {
    let factory = SimulatedFactory::new();
    let bridge = factory.create_bridge("PopTracker").unwrap();
    factory.bridge().unwrap().poke(0x7e0000, &[0x34, 0x12]);

    assert_eq!(bridge.read_int(0x7e0000, MemoryWidth::U16), 0x1234);
}

#[test]
fn test_read_fills_unfetched_bytes_with_zero() {
    let bridge = SimulatedBridge::new();
    bridge.poke(0x10, &[0xff]);

    let mut buf = [0xaa; 3];
    bridge.read(0x0f, &mut buf);
    assert_eq!(buf, [0x00, 0xff, 0x00]);
}
