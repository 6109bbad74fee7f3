//! Small shared helpers

use std::fmt::Write;

/// Format bytes as offset / hex / ASCII dump lines for byte tracing.
///
/// ```text
/// 0000: 02 0A 01 50 69 6E 67 20 44 61 74 61 00 33 03     ...Ping Data.3.
/// ```
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (line, chunk) in bytes.chunks(16).enumerate() {
        let mut hex = String::with_capacity(48);
        let mut ascii = String::with_capacity(16);
        for &byte in chunk {
            let _ = write!(hex, "{:02X} ", byte);
            ascii.push(if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '.'
            });
        }
        if line > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:04X}: {:<48} {}", line * 16, hex, ascii);
    }
    out
}
