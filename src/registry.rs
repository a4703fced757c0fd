//! The device-type registry (C7): a static map from the 16-bit type code
//! reported by discovery/auth to a behaviour profile plus display strings.
//!
//! Read-only after initialisation — the whole table is `const`, so it can
//! be shared across threads with no synchronisation at all.

/// Which inner-codec family and command set a device speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// SP1: fire-and-forget switch, no status read, outer command `0x66`.
    Sp1,
    /// SP2 and OEM-rebadged compatibles: power + nightlight + energy.
    Sp2,
    /// SP2S: same command set as SP2, different firmware generation.
    Sp2S,
    Sp3,
    Sp3S,
    Sp4,
    Sp4B,
    /// Classic IR/RF blaster, raw inner codec.
    RmMini,
    RmPro,
    RmMiniB,
    /// RM4 family, length-prefixed inner codec.
    Rm4Mini,
    Rm4Pro,
    /// A1 environmental sensor.
    A1,
    /// S1C security alarm kit.
    S1C,
    /// Dooya curtain motor.
    Dooya,
    /// Hysen-branded thermostat, CRC-framed inner codec.
    Hysen,
    /// MP1 power strip.
    Mp1,
    /// BG Electrical smart outlet, JSON-framed inner codec.
    Bg1,
    Lb1,
    Lb27,
    /// S3 hub. Not present in the retrieved device-type table (its code
    /// varies by OEM batch); construct handles for it directly with
    /// [`crate::session::DeviceHandle::with_profile`] rather than through
    /// discovery's registry lookup.
    S3,
}

/// One row of the registry: behaviour profile plus the strings a caller
/// would show a human, plus the device-id byte pair this profile writes at
/// outer-frame offset 0x24–0x25 (see the open question in `DESIGN.md`).
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    pub profile: Profile,
    pub model: &'static str,
    pub manufacturer: &'static str,
    pub device_id_bytes: [u8; 2],
}

const STANDARD_ID_BYTES: [u8; 2] = crate::frame::DEFAULT_DEVICE_ID_BYTES;
/// The `sp2mini2` quirk (§9 open question): this profile writes `0x28 0x27`
/// instead of the standard `0x2A 0x27` at 0x24–0x25.
const SP2MINI2_ID_BYTES: [u8; 2] = [0x28, 0x27];

macro_rules! entry {
    ($profile:expr, $model:expr, $manufacturer:expr) => {
        RegistryEntry {
            profile: $profile,
            model: $model,
            manufacturer: $manufacturer,
            device_id_bytes: STANDARD_ID_BYTES,
        }
    };
    ($profile:expr, $model:expr, $manufacturer:expr, quirk) => {
        RegistryEntry {
            profile: $profile,
            model: $model,
            manufacturer: $manufacturer,
            device_id_bytes: SP2MINI2_ID_BYTES,
        }
    };
}

/// `(type_code, entry)` pairs. Sourced from the device-type table shipped
/// with the reference implementation this crate's protocol is modelled on.
pub const SUPPORTED_TYPES: &[(u16, RegistryEntry)] = &[
    (0x0000, entry!(Profile::Sp1, "SP1", "Broadlink")),
    (0x2717, entry!(Profile::Sp2, "NEO", "Ankuoo")),
    (0x2719, entry!(Profile::Sp2, "SP2-compatible", "Honeywell")),
    (0x271A, entry!(Profile::Sp2, "SP2-compatible", "Honeywell")),
    (0x2720, entry!(Profile::Sp2, "SP mini", "Broadlink")),
    (0x2728, entry!(Profile::Sp2, "SP2-compatible", "URANT", quirk)),
    (0x273E, entry!(Profile::Sp2, "SP mini", "Broadlink")),
    (0x7530, entry!(Profile::Sp2, "SP2", "Broadlink (OEM)")),
    (0x7539, entry!(Profile::Sp2, "SP2-IL", "Broadlink (OEM)")),
    (0x753E, entry!(Profile::Sp2, "SP mini 3", "Broadlink")),
    (0x7540, entry!(Profile::Sp2, "MP2", "Broadlink")),
    (0x7544, entry!(Profile::Sp2, "SP2-CL", "Broadlink")),
    (0x7546, entry!(Profile::Sp2, "SP2-UK/BR/IN", "Broadlink (OEM)")),
    (0x7547, entry!(Profile::Sp2, "SC1", "Broadlink")),
    (0x7918, entry!(Profile::Sp2, "SP2", "Broadlink (OEM)")),
    (0x7919, entry!(Profile::Sp2, "SP2-compatible", "Honeywell")),
    (0x791A, entry!(Profile::Sp2, "SP2-compatible", "Honeywell")),
    (0x7D0D, entry!(Profile::Sp2, "SP mini 3", "Broadlink (OEM)")),
    (0x2711, entry!(Profile::Sp2S, "SP2", "Broadlink")),
    (0x2716, entry!(Profile::Sp2S, "NEO PRO", "Ankuoo")),
    (0x271D, entry!(Profile::Sp2S, "Ego", "Efergy")),
    (0x2736, entry!(Profile::Sp2S, "SP mini+", "Broadlink")),
    (0x2733, entry!(Profile::Sp3, "SP3", "Broadlink")),
    (0x7D00, entry!(Profile::Sp3, "SP3-EU", "Broadlink (OEM)")),
    (0x9479, entry!(Profile::Sp3S, "SP3S-US", "Broadlink")),
    (0x947A, entry!(Profile::Sp3S, "SP3S-EU", "Broadlink")),
    (0x756C, entry!(Profile::Sp4, "SP4M", "Broadlink")),
    (0x756F, entry!(Profile::Sp4, "MCB1", "Broadlink")),
    (0x7579, entry!(Profile::Sp4, "SP4L-EU", "Broadlink")),
    (0x7583, entry!(Profile::Sp4, "SP mini 3", "Broadlink")),
    (0x7D11, entry!(Profile::Sp4, "SP mini 3", "Broadlink")),
    (0xA56A, entry!(Profile::Sp4, "MCB1", "Broadlink")),
    (0xA589, entry!(Profile::Sp4, "SP4L-UK", "Broadlink")),
    (0x5115, entry!(Profile::Sp4B, "SCB1E", "Broadlink")),
    (0x51E2, entry!(Profile::Sp4B, "AHC/U-01", "BG Electrical")),
    (0x6111, entry!(Profile::Sp4B, "MCB1", "Broadlink")),
    (0x6113, entry!(Profile::Sp4B, "SCB1E", "Broadlink")),
    (0x618B, entry!(Profile::Sp4B, "SP4L-EU", "Broadlink")),
    (0x6489, entry!(Profile::Sp4B, "SP4L-AU", "Broadlink")),
    (0x648B, entry!(Profile::Sp4B, "SP4M-US", "Broadlink")),
    (0x2737, entry!(Profile::RmMini, "RM mini 3", "Broadlink")),
    (0x278F, entry!(Profile::RmMini, "RM mini", "Broadlink")),
    (0x27C2, entry!(Profile::RmMini, "RM mini 3", "Broadlink")),
    (0x27C7, entry!(Profile::RmMini, "RM mini 3", "Broadlink")),
    (0x27CC, entry!(Profile::RmMini, "RM mini 3", "Broadlink")),
    (0x27CD, entry!(Profile::RmMini, "RM mini 3", "Broadlink")),
    (0x27D0, entry!(Profile::RmMini, "RM mini 3", "Broadlink")),
    (0x27D1, entry!(Profile::RmMini, "RM mini 3", "Broadlink")),
    (0x27D3, entry!(Profile::RmMini, "RM mini 3", "Broadlink")),
    (0x27DE, entry!(Profile::RmMini, "RM mini 3", "Broadlink")),
    (0x2712, entry!(Profile::RmPro, "RM pro/pro+", "Broadlink")),
    (0x272A, entry!(Profile::RmPro, "RM pro", "Broadlink")),
    (0x273D, entry!(Profile::RmPro, "RM pro", "Broadlink")),
    (0x277C, entry!(Profile::RmPro, "RM home", "Broadlink")),
    (0x2783, entry!(Profile::RmPro, "RM home", "Broadlink")),
    (0x2787, entry!(Profile::RmPro, "RM pro", "Broadlink")),
    (0x278B, entry!(Profile::RmPro, "RM plus", "Broadlink")),
    (0x2797, entry!(Profile::RmPro, "RM pro+", "Broadlink")),
    (0x279D, entry!(Profile::RmPro, "RM pro+", "Broadlink")),
    (0x27A1, entry!(Profile::RmPro, "RM plus", "Broadlink")),
    (0x27A6, entry!(Profile::RmPro, "RM plus", "Broadlink")),
    (0x27A9, entry!(Profile::RmPro, "RM pro+", "Broadlink")),
    (0x27C3, entry!(Profile::RmPro, "RM pro+", "Broadlink")),
    (0x5F36, entry!(Profile::RmMiniB, "RM mini 3", "Broadlink")),
    (0x6508, entry!(Profile::RmMiniB, "RM mini 3", "Broadlink")),
    (0x51DA, entry!(Profile::Rm4Mini, "RM4 mini", "Broadlink")),
    (0x6070, entry!(Profile::Rm4Mini, "RM4C mini", "Broadlink")),
    (0x610E, entry!(Profile::Rm4Mini, "RM4 mini", "Broadlink")),
    (0x610F, entry!(Profile::Rm4Mini, "RM4C mini", "Broadlink")),
    (0x62BC, entry!(Profile::Rm4Mini, "RM4 mini", "Broadlink")),
    (0x62BE, entry!(Profile::Rm4Mini, "RM4C mini", "Broadlink")),
    (0x6364, entry!(Profile::Rm4Mini, "RM4S", "Broadlink")),
    (0x648D, entry!(Profile::Rm4Mini, "RM4 mini", "Broadlink")),
    (0x6539, entry!(Profile::Rm4Mini, "RM4C mini", "Broadlink")),
    (0x653A, entry!(Profile::Rm4Mini, "RM4 mini", "Broadlink")),
    (0x6026, entry!(Profile::Rm4Pro, "RM4 pro", "Broadlink")),
    (0x61A2, entry!(Profile::Rm4Pro, "RM4 pro", "Broadlink")),
    (0x649B, entry!(Profile::Rm4Pro, "RM4 pro", "Broadlink")),
    (0x653C, entry!(Profile::Rm4Pro, "RM4 pro", "Broadlink")),
    (0x2714, entry!(Profile::A1, "e-Sensor", "Broadlink")),
    (0x2722, entry!(Profile::S1C, "S2KIT", "Broadlink")),
    (0x4E4D, entry!(Profile::Dooya, "DT360E-45/20", "Dooya")),
    (0x4EAD, entry!(Profile::Hysen, "HY02B05H", "Hysen")),
    (0x4EB5, entry!(Profile::Mp1, "MP1-1K4S", "Broadlink")),
    (0x4EF7, entry!(Profile::Mp1, "MP1-1K4S", "Broadlink (OEM)")),
    (0x4F1B, entry!(Profile::Mp1, "MP1-1K3S2U", "Broadlink (OEM)")),
    (0x4F65, entry!(Profile::Mp1, "MP1-1K3S2U", "Broadlink")),
    (0x51E3, entry!(Profile::Bg1, "BG800/BG900", "BG Electrical")),
    (0x5043, entry!(Profile::Lb1, "SB800TD", "Broadlink (OEM)")),
    (0x504E, entry!(Profile::Lb1, "LB1", "Broadlink")),
    (0x60C7, entry!(Profile::Lb1, "LB1", "Broadlink")),
    (0x60C8, entry!(Profile::Lb1, "LB1", "Broadlink")),
    (0x6112, entry!(Profile::Lb1, "LB1", "Broadlink")),
    (0xA4F4, entry!(Profile::Lb27, "LB27 R1", "Broadlink")),
];

/// Look up a 16-bit device-type code. Unknown codes return `None`; callers
/// should fall back to a generic handle that supports only discovery/auth.
pub fn lookup(devtype: u16) -> Option<RegistryEntry> {
    SUPPORTED_TYPES
        .iter()
        .find(|(code, _)| *code == devtype)
        .map(|(_, entry)| *entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_a_known_thermostat() {
        let entry = lookup(0x4EAD).unwrap();
        assert_eq!(entry.profile, Profile::Hysen);
        assert_eq!(entry.model, "HY02B05H");
    }

    #[test]
    fn sp2mini2_quirk_profile_overrides_device_id_bytes() {
        let entry = lookup(0x2728).unwrap();
        assert_eq!(entry.device_id_bytes, SP2MINI2_ID_BYTES);

        let standard = lookup(0x2720).unwrap();
        assert_eq!(standard.device_id_bytes, STANDARD_ID_BYTES);
    }

    #[test]
    fn unknown_code_yields_none() {
        assert!(lookup(0xFFFF).is_none());
    }

    #[test]
    fn table_has_no_duplicate_codes() {
        let mut seen = std::collections::HashSet::new();
        for (code, _) in SUPPORTED_TYPES {
            assert!(seen.insert(*code), "duplicate code 0x{code:04x}");
        }
    }
}
