//! Minimal bodies that pass (or deliberately fail) the signature checks.

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n";
const PNG_TRAILER: &[u8] = b"IEND\xaeB`\x82";

/// `head`, zero padding, `tail`, `len` bytes in total.
fn padded(head: &[u8], tail: &[u8], len: usize) -> Vec<u8> {
    let mut body = head.to_vec();
    body.resize(len - tail.len(), 0);
    body.extend_from_slice(tail);
    body
}

pub fn png(len: usize) -> Vec<u8> {
    padded(PNG_HEADER, PNG_TRAILER, len)
}

pub fn jpeg(len: usize) -> Vec<u8> {
    padded(b"\xff\xd8\xff\xe0\x00\x10JFIF\x00", b"", len)
}

pub fn gif(len: usize) -> Vec<u8> {
    padded(b"GIF89a", b"\x00\x3b", len)
}

/// Text pretending to be anything.
pub fn html(len: usize) -> Vec<u8> {
    padded(b"<html><script>alert(1)</script>", b"</html>", len)
}
