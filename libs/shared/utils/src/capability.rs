//! Per-order capability tokens for the public virtual-inspection endpoints.
//!
//! A token is `{order_id}.{sig}` where `sig` is the base64url-encoded
//! HMAC-SHA256 of the order id under the service secret. Clients receive the
//! token out of band (notification link) and present it in the URL path; no
//! session is involved.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use shared_models::auth::OrderAccess;

type HmacSha256 = Hmac<Sha256>;

pub fn mint_order_token(order_id: Uuid, secret: &str) -> Result<String, String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(order_id.to_string().as_bytes());

    let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{}.{}", order_id, sig))
}

pub fn verify_order_token(token: &str, secret: &str) -> Result<OrderAccess, String> {
    if secret.is_empty() {
        return Err("Order token secret is not set".to_string());
    }

    let (order_part, sig_part) = token
        .split_once('.')
        .ok_or_else(|| "Invalid token format".to_string())?;

    let order_id =
        Uuid::parse_str(order_part).map_err(|_| "Invalid order id in token".to_string())?;

    let signature = URL_SAFE_NO_PAD
        .decode(sig_part)
        .map_err(|_| "Invalid signature encoding".to_string())?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(order_id.to_string().as_bytes());

    mac.verify_slice(&signature)
        .map_err(|_| "Invalid token signature".to_string())?;

    Ok(OrderAccess { order_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_token_verifies() {
        let order_id = Uuid::new_v4();
        let token = mint_order_token(order_id, "secret").unwrap();
        let access = verify_order_token(&token, "secret").unwrap();
        assert_eq!(access.order_id, order_id);
    }

    #[test]
    fn tampered_order_id_is_rejected() {
        let token = mint_order_token(Uuid::new_v4(), "secret").unwrap();
        let other = Uuid::new_v4();
        let sig = token.split_once('.').unwrap().1;
        let forged = format!("{}.{}", other, sig);
        assert!(verify_order_token(&forged, "secret").is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint_order_token(Uuid::new_v4(), "secret").unwrap();
        assert!(verify_order_token(&token, "other-secret").is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(verify_order_token("not-a-token", "secret").is_err());
        assert!(verify_order_token("also.not.a.token", "secret").is_err());
    }
}
