//! Published vectors and tamper sweeps for the MAC and AEAD layers.

use proptest::prelude::*;
use tokenseal::crypto::{Aead, EncryptThenAuthenticate, HashType, HmacEngine, MacEngine};
use tokenseal::SealError;

fn unhex(s: &str) -> Vec<u8> {
    hex::decode(s).expect("valid hex")
}

// ---------------------------------------------------------------------------
// HMAC (NIST CAVP HMACVS)
// ---------------------------------------------------------------------------

const NIST_SHA256_KEY: &str =
    "6f35628d65813435534b5d67fbdb54cb33403d04e843103e6399f806cb5df95febbdd61236f33245";
const NIST_SHA256_MSG: &str = "752cff52e4b90768558e5369e75d97c69643509a5e5904e0a386cbe4d0970ef7\
                               3f918f675945a9aefe26daea27587e8dc909dd56fd0468805f834039b345f855\
                               cfe19c44b55af241fff3ffcd8045cd5c288e6c4e284c3720570b58e4d47b8fee\
                               edc52fd1401f698a209fccfa3b4c0d9a797b046a2759f82a54c41ccd7b5f592b";
const NIST_SHA256_TAG: &str = "05d1243e6465ed9620c9aec1c351a186";

const NIST_SHA512_KEY: &str = "726374c4b8df517510db9159b730f93431e0cd468d4f3821eab0edb93abd0fba\
                               46ab4f1ef35d54fec3d85fa89ef72ff3d35f22cf5ab69e205c10afcdf4aaf113\
                               38dbb12073474fddb556e60b8ee52f91163ba314303ee0c910e64e87fbf30221\
                               4edbe3f2";
const NIST_SHA512_MSG: &str = "ac939659dc5f668c9969c0530422e3417a462c8b665e8db25a883a625f7aa59b\
                               89c5ad0ece5712ca17442d1798c6dea25d82c5db260cb59c75ae650be56569c1\
                               bd2d612cc57e71315917f116bbfa65a0aeb8af7840ee83d3e7101c52cf652d27\
                               73531b7a6bdd690b846a741816c860819270522a5b0cdfa1d736c501c583d916";
const NIST_SHA512_TAG: &str = "bd3d2df6f9d284b421a43e5f9cb94bc4ff88a88243f1f0133bad0fb1791f6569";

#[test]
fn nist_hmac_sha256_truncated_tag() {
    let mac = HmacEngine::new(HashType::Sha256, &unhex(NIST_SHA256_KEY), 16).unwrap();
    let msg = unhex(NIST_SHA256_MSG);
    let tag = mac.compute_mac(&msg).unwrap();
    assert_eq!(hex::encode(&tag), NIST_SHA256_TAG);
    assert!(mac.verify_mac(&tag, &msg).is_ok());
}

#[test]
fn nist_hmac_sha512_truncated_tag() {
    let mac = HmacEngine::new(HashType::Sha512, &unhex(NIST_SHA512_KEY), 32).unwrap();
    let msg = unhex(NIST_SHA512_MSG);
    let tag = mac.compute_mac(&msg).unwrap();
    assert_eq!(hex::encode(&tag), NIST_SHA512_TAG);
    assert!(mac.verify_mac(&tag, &msg).is_ok());
}

#[test]
fn nist_tag_bit_flips_rejected() {
    let mac = HmacEngine::new(HashType::Sha256, &unhex(NIST_SHA256_KEY), 16).unwrap();
    let msg = unhex(NIST_SHA256_MSG);
    let tag = unhex(NIST_SHA256_TAG);
    for bit in 0..tag.len() * 8 {
        let mut bad = tag.clone();
        bad[bit / 8] ^= 1 << (bit % 8);
        assert!(
            matches!(mac.verify_mac(&bad, &msg), Err(SealError::VerificationFailure)),
            "bit {bit}"
        );
    }
}

#[test]
fn nist_tag_truncations_rejected() {
    let mac = HmacEngine::new(HashType::Sha256, &unhex(NIST_SHA256_KEY), 16).unwrap();
    let msg = unhex(NIST_SHA256_MSG);
    let tag = unhex(NIST_SHA256_TAG);
    for len in 0..tag.len() {
        assert!(mac.verify_mac(&tag[..len], &msg).is_err(), "length {len}");
    }
}

// ---------------------------------------------------------------------------
// AES-CTR-HMAC reference ciphertexts
// ---------------------------------------------------------------------------

const ETA_AAD: &str = "546865207365636f6e64207072696e6369706c65206f662041756775737465204b6572636b686f666673";

struct EtaVector {
    mac_key: &'static str,
    enc_key: &'static str,
    hash: HashType,
    tag_len: usize,
    ciphertext: &'static str,
}

const ETA_VECTORS: [EtaVector; 2] = [
    EtaVector {
        mac_key: "000102030405060708090a0b0c0d0e0f",
        enc_key: "101112131415161718191a1b1c1d1e1f",
        hash: HashType::Sha256,
        tag_len: 16,
        ciphertext: "1af38c2dc2b96ffdd86694092341bc04c80edfa32ddf39d5ef00c0b468834279\
                     a2e46a1b8049f792f76bfe54b903a9c9a94ac9b47ad2655c5f10f9aef71427e2\
                     fc6f9b3f399a221489f16362c703233609d45ac69864e3321cf82935ac4096c8\
                     6e133314c54019e8ca7980dfa4b9cf1b384c486f3a54c51078158ee5d79de59f\
                     bd34d848b3d69550a67646344427ade54b8851ffb598f7f80074b9473c82e2db\
                     652c3fa36b0a7c5b3219fab3a30bc1c4",
    },
    EtaVector {
        mac_key: "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
        enc_key: "202122232425262728292a2b2c2d2e2f303132333435363738393a3b3c3d3e3f",
        hash: HashType::Sha512,
        tag_len: 32,
        ciphertext: "1af38c2dc2b96ffdd86694092341bc044affaaadb78c31c5da4b1b590d10ffbd\
                     3dd8d5d302423526912da037ecbcc7bd822c301dd67c373bccb584ad3e9279c2\
                     e6d12a1374b77f077553df829410446b36ebd97066296ae6427ea75c2e0846a1\
                     1a09ccf5370dc80bfecbad28c73f09b3a3b75e662a2594410ae496b2e2e6609e\
                     31e6e02cc837f053d21f37ff4f51950bbe2638d09dd7a4930930806d0703b1f6\
                     4dd3b4c088a7f45c216839645b2012bf2e6269a8c56a816dbc1b267761955bc5",
    },
];

fn eta(v: &EtaVector) -> EncryptThenAuthenticate {
    EncryptThenAuthenticate::aes_ctr_hmac(
        &unhex(v.enc_key),
        16,
        &unhex(v.mac_key),
        v.hash,
        v.tag_len,
    )
    .unwrap()
}

#[test]
fn reference_ciphertexts_authenticate() {
    let aad = unhex(ETA_AAD);
    for v in &ETA_VECTORS {
        let ct = unhex(v.ciphertext);
        let pt = eta(v).decrypt(&ct, &aad).unwrap();
        assert_eq!(pt.len(), ct.len() - 16 - v.tag_len);
    }
}

#[test]
fn reference_ciphertext_bit_flips_rejected() {
    let aad = unhex(ETA_AAD);
    for v in &ETA_VECTORS {
        let aead = eta(v);
        let ct = unhex(v.ciphertext);
        for bit in 0..ct.len() * 8 {
            let mut bad = ct.clone();
            bad[bit / 8] ^= 1 << (bit % 8);
            assert!(
                matches!(aead.decrypt(&bad, &aad), Err(SealError::VerificationFailure)),
                "ciphertext bit {bit}"
            );
        }
        for bit in 0..aad.len() * 8 {
            let mut bad = aad.clone();
            bad[bit / 8] ^= 1 << (bit % 8);
            assert!(aead.decrypt(&ct, &bad).is_err(), "aad bit {bit}");
        }
    }
}

#[test]
fn reference_ciphertext_truncations_rejected() {
    let aad = unhex(ETA_AAD);
    for v in &ETA_VECTORS {
        let aead = eta(v);
        let ct = unhex(v.ciphertext);
        for len in 0..ct.len() {
            assert!(
                matches!(aead.decrypt(&ct[..len], &aad), Err(SealError::VerificationFailure)),
                "length {len}"
            );
        }
    }
}

#[test]
fn wrong_mac_key_rejected() {
    let aad = unhex(ETA_AAD);
    let v = &ETA_VECTORS[0];
    let aead = EncryptThenAuthenticate::aes_ctr_hmac(
        &unhex(v.enc_key),
        16,
        &[0u8; 16],
        v.hash,
        v.tag_len,
    )
    .unwrap();
    assert!(aead.decrypt(&unhex(v.ciphertext), &aad).is_err());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn any_aead() -> impl Strategy<Value = EncryptThenAuthenticate> {
    (
        prop_oneof![Just(16usize), Just(32usize)],
        12usize..=16,
        prop_oneof![
            Just((HashType::Sha256, 16usize)),
            Just((HashType::Sha256, 32usize)),
            Just((HashType::Sha384, 24usize)),
            Just((HashType::Sha512, 32usize)),
        ],
    )
        .prop_map(|(key_len, iv_len, (hash, tag_len))| {
            EncryptThenAuthenticate::aes_ctr_hmac(
                &vec![0x42; key_len],
                iv_len,
                &[0x24; 32],
                hash,
                tag_len,
            )
            .unwrap()
        })
}

proptest! {
    #[test]
    fn roundtrip(
        aead in any_aead(),
        pt in prop::collection::vec(any::<u8>(), 0..256),
        aad in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let ct = aead.encrypt(&pt, &aad).unwrap();
        prop_assert_eq!(aead.decrypt(&ct, &aad).unwrap(), pt);
    }

    #[test]
    fn any_single_bit_flip_rejected(
        aead in any_aead(),
        pt in prop::collection::vec(any::<u8>(), 0..64),
        aad in prop::collection::vec(any::<u8>(), 1..32),
        pick in any::<prop::sample::Index>(),
        flip_aad in any::<bool>(),
    ) {
        let ct = aead.encrypt(&pt, &aad).unwrap();
        if flip_aad {
            let mut bad = aad.clone();
            let bit = pick.index(bad.len() * 8);
            bad[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(aead.decrypt(&ct, &bad).is_err());
        } else {
            let mut bad = ct.clone();
            let bit = pick.index(bad.len() * 8);
            bad[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(aead.decrypt(&bad, &aad).is_err());
        }
    }

    #[test]
    fn any_truncation_rejected(
        aead in any_aead(),
        pt in prop::collection::vec(any::<u8>(), 0..64),
        cut in 1usize..128,
    ) {
        let ct = aead.encrypt(&pt, b"aad").unwrap();
        let keep = ct.len().saturating_sub(cut);
        prop_assert!(aead.decrypt(&ct[..keep], b"aad").is_err());
    }
}
