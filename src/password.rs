use hex::ToHex;
use rand::Rng;
use sha2::{Digest, Sha256};

const SALT_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password);
    hasher.update(salt);
    hasher.finalize().encode_hex()
}

pub fn random_salt() -> String {
    let mut rng = rand::thread_rng();
    (0..32)
        .map(|_| SALT_CHARS[rng.gen_range(0..SALT_CHARS.len())] as char)
        .collect()
}

pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    hash_password(password, salt) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_correct_password() {
        let salt = random_salt();
        let hash = hash_password("admin123", &salt);
        assert!(verify_password("admin123", &salt, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let salt = random_salt();
        let hash = hash_password("admin123", &salt);
        assert!(!verify_password("admin124", &salt, &hash));
    }

    #[test]
    fn same_password_different_salt_different_hash() {
        let a = hash_password("admin123", &random_salt());
        let b = hash_password("admin123", &random_salt());
        assert_ne!(a, b);
    }

    #[test]
    fn salt_is_32_alphanumeric_chars() {
        let salt = random_salt();
        assert_eq!(salt.len(), 32);
        assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
