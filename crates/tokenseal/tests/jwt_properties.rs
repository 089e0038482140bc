//! Property tests: any claim set survives sign-then-verify unchanged.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use tokenseal::jwt::{
    generate_ecdsa, Algorithm, ClaimValue, FixedClock, JwtHmac, JwtValidator, RawJwt,
};

const NOW: i64 = 1_500_000_000;

#[derive(Debug, Clone)]
struct Claims {
    issuer: Option<String>,
    subject: Option<String>,
    jwt_id: Option<String>,
    audiences: Vec<String>,
    expiration: Option<i64>,
    not_before: Option<i64>,
    issued_at: Option<i64>,
    custom: Vec<(String, ClaimValue)>,
}

impl Claims {
    fn build(&self) -> RawJwt {
        let mut b = RawJwt::builder();
        if let Some(v) = &self.issuer {
            b = b.issuer(v.clone());
        }
        if let Some(v) = &self.subject {
            b = b.subject(v.clone());
        }
        if let Some(v) = &self.jwt_id {
            b = b.jwt_id(v.clone());
        }
        for aud in &self.audiences {
            b = b.add_audience(aud.clone());
        }
        if let Some(t) = self.expiration {
            b = b.expiration(Utc.timestamp_opt(t, 0).unwrap());
        }
        if let Some(t) = self.not_before {
            b = b.not_before(Utc.timestamp_opt(t, 0).unwrap());
        }
        if let Some(t) = self.issued_at {
            b = b.issued_at(Utc.timestamp_opt(t, 0).unwrap());
        }
        for (name, value) in &self.custom {
            b = b.add_claim(name.clone(), value.clone());
        }
        b.build().expect("valid claims")
    }

    fn validator(&self) -> JwtValidator {
        let now = Utc.timestamp_opt(NOW, 0).unwrap();
        let mut b = JwtValidator::builder().clock(FixedClock::new(now));
        if let Some(aud) = self.audiences.first() {
            b = b.expected_audience(aud.clone());
        }
        b.build().expect("valid validator")
    }
}

fn claim_value() -> impl Strategy<Value = ClaimValue> {
    prop_oneof![
        Just(ClaimValue::Null),
        any::<bool>().prop_map(ClaimValue::Bool),
        any::<i64>().prop_map(ClaimValue::Integer),
        (-1e15f64..1e15).prop_map(ClaimValue::Double),
        "\\PC{0,24}".prop_map(ClaimValue::String),
        prop::collection::vec("[a-z]{0,8}", 0..4).prop_map(ClaimValue::StringArray),
    ]
}

fn claims() -> impl Strategy<Value = Claims> {
    (
        proptest::option::of("\\PC{0,24}"),
        proptest::option::of("\\PC{0,24}"),
        proptest::option::of("[a-zA-Z0-9-]{1,36}"),
        prop::collection::vec("[a-z.:/]{1,16}", 0..3),
        proptest::option::of(NOW + 1..NOW + 1_000_000),
        proptest::option::of(NOW - 1_000_000..=NOW),
        proptest::option::of(0i64..NOW),
        prop::collection::vec(("x_[a-z]{1,10}", claim_value()), 0..5),
    )
        .prop_map(
            |(issuer, subject, jwt_id, audiences, expiration, not_before, issued_at, custom)| {
                Claims {
                    issuer,
                    subject,
                    jwt_id,
                    audiences,
                    expiration,
                    not_before,
                    issued_at,
                    custom,
                }
            },
        )
}

proptest! {
    #[test]
    fn hmac_sign_then_verify_is_identity(claims in claims(), alg_idx in 0usize..3) {
        let alg = [Algorithm::Hs256, Algorithm::Hs384, Algorithm::Hs512][alg_idx];
        let jwt = JwtHmac::new(alg, &[0x5a; 64]).unwrap();
        let raw = claims.build();
        let compact = jwt.create_compact(&raw).unwrap();
        let verified = jwt.verify_compact(&compact, &claims.validator()).unwrap();
        prop_assert_eq!(verified.as_raw(), &raw);
    }

    #[test]
    fn custom_claims_read_back(claims in claims()) {
        let raw = claims.build();
        for (name, _) in &claims.custom {
            // Later duplicates overwrite earlier ones.
            let last = claims.custom.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v);
            let got = raw.claim(name);
            prop_assert_eq!(got.as_ref(), last);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn ecdsa_sign_then_verify_is_identity(claims in claims()) {
        let signer = generate_ecdsa(Algorithm::Es256).unwrap();
        let raw = claims.build();
        let compact = signer.create_compact(&raw).unwrap();
        let verified = signer
            .public_key_verify()
            .unwrap()
            .verify_compact(&compact, &claims.validator())
            .unwrap();
        prop_assert_eq!(verified.as_raw(), &raw);
    }
}
