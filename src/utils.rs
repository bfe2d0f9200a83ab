//! Identifier helpers for storage sessions

use bech32::Bech32m;
use uuid7::uuid7;

pub const SESSION_HRP: &str = "session_";

// construct a unique session id then encode using bech32
pub fn new_session_id() -> anyhow::Result<String> {
    new_uuid_to_bech32(SESSION_HRP)
}

pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_carry_prefix() {
        let id = new_session_id().unwrap();
        assert!(id.starts_with("session_1"));
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(new_session_id().unwrap(), new_session_id().unwrap());
    }

    #[test]
    fn empty_hrp_fails() {
        assert!(new_uuid_to_bech32("").is_err());
    }
}
