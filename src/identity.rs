use actix_web::http::header::HeaderMap;
use sha2::{Digest, Sha256};

/// Per-visitor identity derived from request metadata. Votes and comments
/// are deduplicated against both fields independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub ip_address: String,
    pub device_fingerprint: String,
}

impl Identity {
    /// Resolves the caller's identity from the request headers and the
    /// optional client-supplied fingerprint / device id. Pure function of
    /// its inputs: the same browser on the same network always maps to the
    /// same fingerprint.
    pub fn resolve(headers: &HeaderMap, fingerprint: Option<&str>, device_id: Option<&str>) -> Identity {
        let ip_address = client_ip(headers);
        let device_fingerprint = derive_fingerprint(
            &ip_address,
            header_str(headers, "user-agent"),
            header_str(headers, "accept"),
            header_str(headers, "accept-language"),
            fingerprint.unwrap_or(""),
            device_id.unwrap_or(""),
        );
        Identity {
            ip_address,
            device_fingerprint,
        }
    }
}

/// First entry of the forwarded-for chain, falling back to `X-Real-IP`
/// and finally loopback for local development.
pub fn client_ip(headers: &HeaderMap) -> String {
    let raw = match headers.get("x-forwarded-for") {
        Some(v) => v.to_str().unwrap_or(""),
        None => header_str(headers, "x-real-ip"),
    };
    let first = raw.split(',').next().unwrap_or("").trim();
    if first.is_empty() {
        "127.0.0.1".to_string()
    } else {
        first.to_string()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
}

fn derive_fingerprint(
    ip: &str,
    user_agent: &str,
    accept: &str,
    accept_language: &str,
    fingerprint: &str,
    device_id: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{}:{}:{}:{}:{}:{}",
        ip, user_agent, accept, accept_language, fingerprint, device_id
    ));
    hex::encode(hasher.finalize())
}
