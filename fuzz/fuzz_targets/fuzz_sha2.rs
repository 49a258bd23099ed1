#![no_main]
use libfuzzer_sys::fuzz_target;

use hashrand_crypto::sha2::{Sha256, Sha512};

// One-shot and arbitrarily chunked updates must agree.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let chunk = usize::from(data[0]).max(1);
    let msg = &data[1..];

    let one_shot = Sha256::digest(msg).unwrap();
    let mut ctx = Sha256::new();
    for piece in msg.chunks(chunk) {
        ctx.update(piece).unwrap();
    }
    assert_eq!(ctx.finish().unwrap(), one_shot);

    let one_shot = Sha512::digest(msg).unwrap();
    let mut ctx = Sha512::new();
    for piece in msg.chunks(chunk) {
        ctx.update(piece).unwrap();
    }
    assert_eq!(ctx.finish().unwrap(), one_shot);
});
