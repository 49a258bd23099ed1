#![no_main]
use libfuzzer_sys::fuzz_target;

use hashrand_crypto::drbg::{HashDrbg, HashDrbgType};

fuzz_target!(|data: &[u8]| {
    if data.len() < 49 {
        return;
    }
    let out_len = usize::from(data[0]);
    let (entropy, rest) = data[1..].split_at(32);
    let (nonce, adin) = rest.split_at(16);

    let mut drbg = match HashDrbg::new(HashDrbgType::Sha256, entropy, nonce, Some(adin)) {
        Ok(drbg) => drbg,
        Err(_) => return,
    };

    let mut out = vec![0u8; out_len];
    let _ = drbg.generate(&mut out, Some(adin));
    let _ = drbg.reseed(entropy, Some(adin));
    let _ = drbg.generate(&mut out, None);

    drbg.uninstantiate();
    assert!(drbg.verify_zeroization());
});
