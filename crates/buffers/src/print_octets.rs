//! Hex rendering of payload prefixes for diagnostics.

use std::fmt::Write;

/// Renders at most `max` leading bytes as space-separated hex, followed by
/// a count of the bytes left out.
///
/// ```
/// use lstasko_buffers::print_octets;
///
/// assert_eq!(print_octets(&[0xac, 0xed, 0x00, 0x05], 16), "ac ed 00 05");
/// assert_eq!(print_octets(&[0xac, 0xed, 0x00, 0x05, 0x73], 2), "ac ed (+3 bytes)");
/// ```
pub fn print_octets(octets: &[u8], max: usize) -> String {
    let shown = &octets[..octets.len().min(max)];
    let mut out = String::with_capacity(shown.len() * 3 + 12);
    for byte in shown {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    let hidden = octets.len() - shown.len();
    if hidden > 0 {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "(+{hidden} bytes)");
    }
    out
}
