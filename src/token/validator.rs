use anyhow::{anyhow, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::Value;
use tracing::debug;

use crate::helpers::time::{is_in_future, now_i64};

const PADDING_INDIFFERENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// JWTs use the URL-safe alphabet, some issuers still emit the standard one.
const URL_SAFE_ANY_PAD: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, PADDING_INDIFFERENT);
const STANDARD_ANY_PAD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PADDING_INDIFFERENT);

/// Claims carried by the access token. Only `exp` is required.
///
/// Other claims are read best effort: `null` or an unexpected type reads as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtPayload {
    pub sub: Option<String>,
    pub exp: i64,
    pub iat: Option<i64>,
    pub jti: Option<String>,
    pub roles: Vec<String>,
    pub token_version: Option<i64>,
}

impl JwtPayload {
    fn from_claims(claims: &Value) -> Result<Self> {
        let exp = claims
            .get("exp")
            .and_then(numeric_date)
            .ok_or_else(|| anyhow!("invalid JWT payload: numeric exp is missing"))?;

        Ok(Self {
            sub: string_claim(claims, "sub"),
            exp,
            iat: claims.get("iat").and_then(numeric_date),
            jti: string_claim(claims, "jti"),
            roles: claims
                .get("roles")
                .and_then(Value::as_array)
                .map(|roles| roles.iter().filter_map(Value::as_str).map(str::to_owned).collect())
                .unwrap_or_default(),
            token_version: claims.get("token_version").and_then(Value::as_i64),
        })
    }
}

/// Integer seconds, fractional seconds are truncated.
fn numeric_date(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|secs| secs as i64))
}

fn string_claim(claims: &Value, name: &str) -> Option<String> {
    claims.get(name).and_then(Value::as_str).map(str::to_owned)
}

/// Decode the middle segment of a dot separated token.
pub fn decode_jwt(token: &str) -> Result<JwtPayload> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(anyhow!("invalid JWT format"));
    }

    let payload = parts[1];
    let decoded = URL_SAFE_ANY_PAD
        .decode(payload)
        .or_else(|_| STANDARD_ANY_PAD.decode(payload))
        .map_err(|e| anyhow!("base64 decode error: {}", e))?;

    let claims: Value = serde_json::from_slice(&decoded)
        .map_err(|e| anyhow!("invalid JWT payload: {}", e))?;
    JwtPayload::from_claims(&claims)
}

/// True when the token decodes and its `exp` is strictly after now.
pub fn is_token_valid(token: &str) -> bool {
    is_token_valid_at(token, now_i64())
}

pub fn is_token_valid_at(token: &str, now_unix_ts: i64) -> bool {
    match decode_jwt(token) {
        Ok(claims) => is_in_future(claims.exp, now_unix_ts),
        Err(e) => {
            debug!(error = %e, "failed to decode token");
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
    use serde_json::json;

    /// minimal unsigned JWT for tests
    pub(crate) fn sample_jwt(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            json!({
                "sub": "user-1",
                "exp": exp,
                "iat": exp - 900,
                "jti": "f0e1",
                "roles": ["USER"],
                "token_version": 1
            })
            .to_string(),
        );
        format!("{}.{}.sig", header, payload)
    }

    #[test]
    fn future_exp_is_valid() {
        let now = now_i64();
        for delta in [1, 60, 3600, 86_400 * 365] {
            assert!(is_token_valid_at(&sample_jwt(now + delta), now), "delta {delta}");
        }
        assert!(is_token_valid(&sample_jwt(now + 600)));
    }

    #[test]
    fn past_or_current_exp_is_invalid() {
        let now = now_i64();
        for delta in [0, 1, 60, 86_400] {
            assert!(!is_token_valid_at(&sample_jwt(now - delta), now), "delta {delta}");
        }
    }

    #[test]
    fn decodes_all_claims() {
        let claims = decode_jwt(&sample_jwt(2_000_000_000)).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
        assert_eq!(claims.exp, 2_000_000_000);
        assert_eq!(claims.roles, vec!["USER".to_owned()]);
        assert_eq!(claims.token_version, Some(1));
    }

    #[test]
    fn accepts_padded_standard_alphabet() {
        let payload = STANDARD.encode(r#"{"exp":4102444800,"sub":"a?b>"}"#);
        let token = format!("h.{}.s", payload);
        assert!(is_token_valid_at(&token, 1_700_000_000));
    }

    #[test]
    fn loosely_typed_claims_do_not_invalidate() {
        let now = 1_700_000_000;
        let cases = [
            json!({"sub": "u", "exp": 4102444800i64, "iat": 1700000000, "roles": null}),
            json!({"sub": 42, "exp": 4102444800i64}),
            json!({"exp": 4102444800i64, "roles": ["USER", 7], "jti": {"k": 1}, "token_version": "v1"}),
        ];
        for claims in cases {
            let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode(claims.to_string()));
            assert!(is_token_valid_at(&token, now), "claims {claims}");
        }

        let claims = decode_jwt(&format!(
            "h.{}.s",
            URL_SAFE_NO_PAD.encode(r#"{"sub":42,"exp":4102444800,"roles":null}"#)
        ))
        .unwrap();
        assert_eq!(claims.sub, None);
        assert!(claims.roles.is_empty());
    }

    #[test]
    fn fractional_exp_is_numeric() {
        let future = URL_SAFE_NO_PAD.encode(r#"{"exp":4.1e9}"#);
        let past = URL_SAFE_NO_PAD.encode(r#"{"exp":1699999999.5}"#);

        assert!(is_token_valid_at(&format!("h.{}.s", future), 1_700_000_000));
        assert!(!is_token_valid_at(&format!("h.{}.s", past), 1_700_000_000));
        assert_eq!(decode_jwt(&format!("h.{}.s", future)).unwrap().exp, 4_100_000_000);
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        let no_exp = URL_SAFE_NO_PAD.encode(r#"{"sub":"x"}"#);
        let text_exp = URL_SAFE_NO_PAD.encode(r#"{"exp":"tomorrow"}"#);
        let not_json = URL_SAFE_NO_PAD.encode("definitely not json");

        let cases = [
            String::new(),
            "abc".to_owned(),
            "abc.def".to_owned(),
            "a.b.c.d".to_owned(),
            "h.!!!not-base64!!!.s".to_owned(),
            format!("h.{}.s", not_json),
            format!("h.{}.s", no_exp),
            format!("h.{}.s", text_exp),
            "abc.def.ghi".to_owned(),
        ];

        for token in cases {
            assert!(!is_token_valid_at(&token, 0), "token {token:?}");
        }
    }
}
