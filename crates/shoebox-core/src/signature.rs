//! File signature registry
//!
//! Maps an accepted MIME type to the extension used for stored files and to a
//! byte-pattern predicate that confirms the body really is of that type. The
//! registry is an allow-list: a content type without a rule is never accepted,
//! whatever the body looks like.
//!
//! Rules are registered before the server starts serving and the registry is
//! shared read-only afterwards (`Arc<SignatureRegistry>`).

use thiserror::Error;

/// Byte-pattern test over the complete upload body. Must not mutate or panic
/// on short input.
pub type SignaturePredicate = fn(&[u8]) -> bool;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("MIME type already registered: {0}")]
    DuplicateMimeType(String),

    #[error("Extension already registered: {0}")]
    DuplicateExtension(String),

    #[error("Invalid extension: {0}")]
    InvalidExtension(String),
}

/// One accepted file type.
#[derive(Clone)]
pub struct SignatureRule {
    mime_type: String,
    extension: String,
    predicate: SignaturePredicate,
}

impl SignatureRule {
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Run the predicate against `body`.
    pub fn matches(&self, body: &[u8]) -> bool {
        (self.predicate)(body)
    }
}

impl std::fmt::Debug for SignatureRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureRule")
            .field("mime_type", &self.mime_type)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

/// Registry of accepted file types, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SignatureRegistry {
    rules: Vec<SignatureRule>,
}

impl SignatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every supported image and video type.
    pub fn standard() -> Self {
        // The table below has unique MIME types and extensions, so these cannot fail.
        let mut registry = Self::new();
        for (mime_type, extension, predicate) in STANDARD_RULES {
            registry.rules.push(SignatureRule {
                mime_type: (*mime_type).to_string(),
                extension: (*extension).to_string(),
                predicate: *predicate,
            });
        }
        registry
    }

    /// Add a rule. Each MIME type and each extension may be registered once.
    pub fn register(
        &mut self,
        mime_type: &str,
        extension: &str,
        predicate: SignaturePredicate,
    ) -> Result<&mut Self, RegistryError> {
        let mime_type = normalize_mime(mime_type);
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();

        if extension.is_empty()
            || !extension.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(RegistryError::InvalidExtension(extension));
        }
        if self.rules.iter().any(|r| r.mime_type == mime_type) {
            return Err(RegistryError::DuplicateMimeType(mime_type));
        }
        // The reverse lookup used by retrieval has to stay unambiguous.
        if self.rules.iter().any(|r| r.extension == extension) {
            return Err(RegistryError::DuplicateExtension(extension));
        }

        self.rules.push(SignatureRule {
            mime_type,
            extension,
            predicate,
        });
        Ok(self)
    }

    /// Find the rule for a declared content type. MIME parameters and case are ignored.
    pub fn lookup(&self, mime_type: &str) -> Option<&SignatureRule> {
        let mime_type = normalize_mime(mime_type);
        self.rules.iter().find(|r| r.mime_type == mime_type)
    }

    /// Reverse lookup used by retrieval: resolves a stored file's extension
    /// (`png` or `.png`) to the content type it was accepted as.
    pub fn extension_for(&self, path_suffix: &str) -> Option<&str> {
        let suffix = path_suffix.trim_start_matches('.');
        self.rules
            .iter()
            .find(|r| r.extension.eq_ignore_ascii_case(suffix))
            .map(|r| r.mime_type.as_str())
    }

    pub fn mime_types(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.mime_type.as_str())
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.extension.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Lowercase the type and drop any parameters (`image/png; q=1` -> `image/png`).
pub fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

const STANDARD_RULES: &[(&str, &str, SignaturePredicate)] = &[
    ("image/png", "png", is_png),
    ("image/jpeg", "jpeg", is_jpeg),
    ("image/gif", "gif", is_gif),
    ("image/bmp", "bmp", is_bmp),
    ("video/mp4", "mp4", is_mp4),
    ("video/webm", "webm", is_webm),
    ("image/vnd.adobe.photoshop", "psd", is_psd),
    ("image/vnd.radiance", "hdr", is_hdr),
];

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n";
const PNG_TRAILER: &[u8] = b"IEND\xae\x42\x60\x82";

/// ISO base media brands accepted after the `ftyp` box tag.
const MP4_BRANDS: [&[u8; 4]; 19] = [
    b"avc1", b"iso2", b"isom", b"mmp4", b"mp41", b"mp42", b"mp71", b"msnv", b"ndas", b"ndsc",
    b"ndsh", b"ndsm", b"ndsp", b"ndss", b"ndxc", b"ndxh", b"ndxm", b"ndxp", b"ndxs",
];

/// `body[offset..offset + pattern.len()] == pattern`, false when the body is too short.
fn bytes_at(body: &[u8], offset: usize, pattern: &[u8]) -> bool {
    body.get(offset..offset + pattern.len()) == Some(pattern)
}

pub fn is_png(body: &[u8]) -> bool {
    bytes_at(body, 0, PNG_HEADER) && body.ends_with(PNG_TRAILER)
}

pub fn is_jpeg(body: &[u8]) -> bool {
    // JFIF
    (bytes_at(body, 0, b"\xff\xd8\xff\xe0") && bytes_at(body, 6, b"JFIF\0"))
        // Exif
        || (bytes_at(body, 0, b"\xff\xd8\xff\xe1") && bytes_at(body, 6, b"Exif\0"))
        // SPIFF
        || (bytes_at(body, 0, b"\xff\xd8\xff\xe8") && bytes_at(body, 6, b"SPIFF\0"))
}

pub fn is_gif(body: &[u8]) -> bool {
    (bytes_at(body, 0, b"GIF87a") || bytes_at(body, 0, b"GIF89a")) && body.ends_with(b"\x00\x3b")
}

pub fn is_bmp(body: &[u8]) -> bool {
    bytes_at(body, 0, b"BM")
}

pub fn is_mp4(body: &[u8]) -> bool {
    bytes_at(body, 4, b"ftyp")
        && body
            .get(8..12)
            .is_some_and(|brand| MP4_BRANDS.iter().any(|b| b.as_slice() == brand))
}

pub fn is_webm(body: &[u8]) -> bool {
    bytes_at(body, 0, b"\x1a\x45\xdf\xa3")
}

pub fn is_psd(body: &[u8]) -> bool {
    bytes_at(body, 0, b"8BPS")
}

pub fn is_hdr(body: &[u8]) -> bool {
    bytes_at(body, 0, b"#?RADIANCE\n")
}
