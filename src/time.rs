//! Datetime and source-address packing used by the discovery probe and by
//! the authentication handshake's session tag.
//!
//! The wire layout is a 12-byte local-time block (matching the source's
//! `Datetime` helper) followed, inside the discovery probe, by a 6-byte
//! source-endpoint block.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};
use std::net::Ipv4Addr;

/// Pack a local datetime into the 12-byte block the device expects:
/// UTC offset in hours (i32 LE, signed), year (u16 LE), minute, hour,
/// last two digits of the year, ISO weekday (1 = Monday), day, month.
pub fn pack_datetime(dt: DateTime<Local>) -> [u8; 12] {
    let mut out = [0u8; 12];
    let utc_offset_hours = dt.offset().local_minus_utc() / 3600;
    out[0x00..0x04].copy_from_slice(&utc_offset_hours.to_le_bytes());
    out[0x04..0x06].copy_from_slice(&(dt.year() as u16).to_le_bytes());
    out[0x06] = dt.minute() as u8;
    out[0x07] = dt.hour() as u8;
    out[0x08] = (dt.year() % 100) as u8;
    out[0x09] = dt.weekday().number_from_monday() as u8;
    out[0x0A] = dt.day() as u8;
    out[0x0B] = dt.month() as u8;
    out
}

/// Inverse of [`pack_datetime`]. Used by tests to check the packer is
/// self-consistent; the device never sends this block back.
pub fn unpack_datetime(data: &[u8; 12]) -> DateTime<Local> {
    let utc_offset_hours = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let year = i32::from(u16::from_le_bytes([data[0x04], data[0x05]]));
    let minute = data[0x06] as u32;
    let hour = data[0x07] as u32;
    let day = data[0x0A] as u32;
    let month = data[0x0B] as u32;

    let naive = chrono::NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time");
    let offset = chrono::FixedOffset::east_opt(utc_offset_hours * 3600).expect("valid offset");
    offset
        .from_local_datetime(&naive)
        .single()
        .expect("unambiguous local time")
        .with_timezone(&Local)
}

/// Pack a source endpoint into the 6-byte block: IPv4 octets, then port
/// little-endian.
pub fn pack_address(ip: Ipv4Addr, port: u16) -> [u8; 6] {
    let mut out = [0u8; 6];
    out[0..4].copy_from_slice(&ip.octets());
    out[4..6].copy_from_slice(&port.to_le_bytes());
    out
}
