//! Multipart/form-data encoder for service uploads.
//!
//! Pure function of its inputs: scalar fields plus one binary attachment are
//! serialized into a single body with a freshly generated boundary token.
//! Nothing here inspects image content or validates field values.

use uuid::Uuid;

/// An encoded multipart body together with its boundary token.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    /// Boundary token, without the leading `--` delimiter dashes.
    pub boundary: String,
    /// The full body bytes, including the closing delimiter.
    pub bytes: Vec<u8>,
}

impl MultipartBody {
    /// The `Content-Type` header value for this body.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

/// Generate a boundary token from a random source.
///
/// Randomness keeps the delimiter from colliding with attachment content.
fn fresh_boundary() -> String {
    format!("----trazar-{}", Uuid::new_v4().simple())
}

/// Encode scalar fields and one binary attachment into a multipart body.
///
/// Field order follows the caller's order, so identical inputs produce
/// byte-identical parts (only the boundary differs between calls). The
/// attachment part carries the original file name and an `image/png` content
/// type, followed by exactly its raw bytes.
pub fn encode(
    fields: &[(String, String)],
    file_field: &str,
    file_name: &str,
    file_bytes: &[u8],
) -> MultipartBody {
    let boundary = fresh_boundary();
    let mut bytes = Vec::with_capacity(file_bytes.len() + 512);

    for (name, value) in fields {
        bytes.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        bytes.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        bytes.extend_from_slice(value.as_bytes());
        bytes.extend_from_slice(b"\r\n");
    }

    bytes.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    bytes.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{file_field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    bytes.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    bytes.extend_from_slice(file_bytes);
    bytes.extend_from_slice(b"\r\n");

    bytes.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    MultipartBody { boundary, bytes }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_boundary_is_unpredictable() {
        let a = encode(&[], "image", "a.png", b"x");
        let b = encode(&[], "image", "a.png", b"x");
        assert_ne!(a.boundary, b.boundary);
    }

    #[test]
    fn test_content_type_carries_boundary() {
        let body = encode(&[], "image", "a.png", b"x");
        assert_eq!(
            body.content_type(),
            format!("multipart/form-data; boundary={}", body.boundary)
        );
    }

    #[test]
    fn test_scalar_fields_encoded_in_order() {
        let body = encode(
            &fields(&[("method", "ai"), ("optimize", "true")]),
            "image",
            "logo.png",
            b"PNG",
        );
        let text = String::from_utf8(body.bytes).unwrap();
        let method_at = text
            .find("Content-Disposition: form-data; name=\"method\"\r\n\r\nai\r\n")
            .unwrap();
        let optimize_at = text
            .find("Content-Disposition: form-data; name=\"optimize\"\r\n\r\ntrue\r\n")
            .unwrap();
        assert!(method_at < optimize_at);
    }

    #[test]
    fn test_attachment_part_has_filename_and_content_type() {
        let body = encode(&[], "image", "logo.png", b"PNG");
        let text = String::from_utf8(body.bytes).unwrap();
        assert!(text
            .contains("Content-Disposition: form-data; name=\"image\"; filename=\"logo.png\""));
        assert!(text.contains("Content-Type: image/png\r\n\r\nPNG\r\n"));
    }

    #[test]
    fn test_body_terminated_by_closing_delimiter() {
        let body = encode(&fields(&[("quality", "high")]), "image", "a.png", b"x");
        let closing = format!("--{}--\r\n", body.boundary);
        assert!(body.bytes.ends_with(closing.as_bytes()));
    }

    #[test]
    fn test_raw_attachment_bytes_unaltered() {
        // Binary content with embedded CRLFs and NULs must survive verbatim.
        let payload = b"\x89PNG\r\n\x1a\n\x00\x00binary\r\npayload";
        let body = encode(&[], "image", "bin.png", payload);
        let needle: Vec<u8> = [b"\r\n\r\n" as &[u8], payload, b"\r\n"].concat();
        let found = body
            .bytes
            .windows(needle.len())
            .any(|window| window == needle.as_slice());
        assert!(found, "attachment bytes were altered");
    }

    #[test]
    fn test_identical_inputs_identical_parts_modulo_boundary() {
        let a = encode(&fields(&[("method", "ai")]), "image", "a.png", b"data");
        let b = encode(&fields(&[("method", "ai")]), "image", "a.png", b"data");
        let normalize = |body: &MultipartBody| {
            String::from_utf8(body.bytes.clone())
                .unwrap()
                .replace(&body.boundary, "BOUNDARY")
        };
        assert_eq!(normalize(&a), normalize(&b));
    }

    #[test]
    fn test_no_scalar_fields() {
        let body = encode(&[], "image", "only.png", b"bytes");
        let text = String::from_utf8(body.bytes).unwrap();
        // Exactly one opening delimiter (attachment) plus the closing one.
        assert_eq!(text.matches(&format!("--{}\r\n", body.boundary)).count(), 1);
        assert_eq!(text.matches(&format!("--{}--", body.boundary)).count(), 1);
    }
}
