use crate::database::StaffRole;
use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: StaffRole,
    pub user_id: Uuid,
    pub name: String,
}

pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_seconds: u64,
}

impl JwtManager {
    pub fn new(secret: &str, expiration_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_seconds,
        }
    }

    pub fn generate_token(&self, user_id: Uuid, name: &str, role: StaffRole) -> Result<String> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;
        let expiration = now + self.expiration_seconds as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration,
            role,
            user_id,
            name: name.to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_identity_and_role() {
        let manager = JwtManager::new("test-secret", 3600);
        let id = Uuid::new_v4();
        let token = manager
            .generate_token(id, "Asha Rao", StaffRole::Salesperson)
            .unwrap();
        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.user_id, id);
        assert_eq!(claims.name, "Asha Rao");
        assert_eq!(claims.role, StaffRole::Salesperson);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let manager = JwtManager::new("secret-a", 3600);
        let other = JwtManager::new("secret-b", 3600);
        let token = manager
            .generate_token(Uuid::new_v4(), "x", StaffRole::Admin)
            .unwrap();
        assert!(other.validate_token(&token).is_err());
    }
}
