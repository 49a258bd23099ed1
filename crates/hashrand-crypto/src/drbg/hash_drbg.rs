//! Hash-DRBG (Hash-based Deterministic Random Bit Generator).
//!
//! Implements NIST SP 800-90A Section 10.1.1 over any digest injected
//! through the [`Digest`] trait. [`HashDrbgState`] is the bare mechanism
//! (instantiate / reseed / generate / uninstantiate over the V and C state
//! integers, with the reseed counter passed in by the owner);
//! [`HashDrbg`] wraps it with the counter, the operational limits, and a
//! lifecycle state machine.

use crate::drbg::params::{seedlen_for_blocklen, DrbgParams, MAX_BLOCKLEN, MAX_SEEDLEN};
use crate::provider::{Digest, HashAlgorithm};
use crate::sha2::{Sha256, Sha384, Sha512};
use hashrand_types::CryptoError;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Hash algorithm selection for Hash-DRBG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashDrbgType {
    /// SHA-256 (output 32, seedlen 55).
    Sha256,
    /// SHA-384 (output 48, seedlen 111).
    Sha384,
    /// SHA-512 (output 64, seedlen 111).
    Sha512,
}

impl HashDrbgType {
    /// Digest output size in bytes.
    pub fn output_size(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

impl HashAlgorithm for HashDrbgType {
    fn new_digest(&self) -> Box<dyn Digest> {
        match self {
            Self::Sha256 => Box::new(Sha256::new()),
            Self::Sha384 => Box::new(Sha384::new()),
            Self::Sha512 => Box::new(Sha512::new()),
        }
    }
}

/// dst = (dst + add) mod 2^(8 * dst.len()).
///
/// Both buffers are big-endian integers; `add` is aligned against the
/// low-order (rightmost) end of `dst`. The carry out of the most
/// significant byte is discarded.
fn add_bytes(dst: &mut [u8], add: &[u8]) {
    debug_assert!(!add.is_empty() && add.len() <= dst.len());

    let offset = dst.len() - add.len();
    let mut carry = 0u16;
    for i in (0..add.len()).rev() {
        let sum = u16::from(dst[offset + i]) + u16::from(add[i]) + carry;
        dst[offset + i] = sum as u8;
        carry = sum >> 8;
    }

    if carry != 0 {
        // Propagate through the high-order bytes, stopping at the first
        // byte that does not itself overflow.
        for i in (0..offset).rev() {
            let (byte, overflow) = dst[i].overflowing_add(1);
            dst[i] = byte;
            if !overflow {
                break;
            }
        }
    }
}

/// Hash_df derivation function (SP 800-90A 10.3.1).
///
/// Fills `out` with `Hash(counter || bitlen || [inbyte] || in1 || [in2] ||
/// [in3])` blocks, truncating only the final block. The inputs are fed to
/// the digest as separate updates and never concatenated in memory.
fn hash_df(
    md: &mut dyn Digest,
    out: &mut [u8],
    inbyte: Option<u8>,
    in1: &[u8],
    in2: Option<&[u8]>,
    in3: Option<&[u8]>,
) -> Result<(), CryptoError> {
    let blocklen = md.output_size();
    debug_assert!(blocklen > 0 && blocklen <= MAX_BLOCKLEN);

    // The block counter is a single byte. Standard seedlen/blocklen pairs
    // need at most a handful of blocks, so a request that would wrap the
    // counter is a contract violation, not a case to wrap through.
    if out.len().div_ceil(blocklen) > usize::from(u8::MAX) {
        return Err(CryptoError::InvalidArg);
    }

    // header = counter || number_of_bits_to_return || [inbyte]
    let bits = (out.len() as u32) * 8;
    let mut header = [0u8; 6];
    header[0] = 1;
    header[1..5].copy_from_slice(&bits.to_be_bytes());
    let header_len = if let Some(b) = inbyte {
        header[5] = b;
        6
    } else {
        5
    };

    for chunk in out.chunks_mut(blocklen) {
        md.reset();
        md.update(&header[..header_len])?;
        md.update(in1)?;
        if let Some(in2) = in2 {
            md.update(in2)?;
        }
        if let Some(in3) = in3 {
            md.update(in3)?;
        }

        if chunk.len() == blocklen {
            md.finish(chunk)?;
        } else {
            // Final short block: keep the leftmost bytes of the digest.
            let mut block = [0u8; MAX_BLOCKLEN];
            md.finish(&mut block[..blocklen])?;
            chunk.copy_from_slice(&block[..chunk.len()]);
            block.zeroize();
        }

        header[0] = header[0].wrapping_add(1);
    }
    Ok(())
}

/// Hash-DRBG mechanism state (SP 800-90A 10.1.1).
///
/// Holds the working value V, the constant C, and a scratch buffer, each
/// a `seedlen`-byte big-endian integer stored in a fixed-capacity array.
/// The reseed counter belongs to the owning layer and is passed into
/// [`generate`](Self::generate).
pub struct HashDrbgState {
    digest: Box<dyn Digest>,
    blocklen: usize,
    seedlen: usize,
    v: [u8; MAX_SEEDLEN],
    c: [u8; MAX_SEEDLEN],
    vtmp: [u8; MAX_SEEDLEN],
}

impl Drop for HashDrbgState {
    fn drop(&mut self) {
        self.v.zeroize();
        self.c.zeroize();
        self.vtmp.zeroize();
    }
}

impl HashDrbgState {
    /// Create an uninstantiated state around `digest`.
    ///
    /// The seed length is fixed here from the digest output size
    /// (SP 800-90A 10.1 Table 2): 440 bits for outputs up to 256 bits,
    /// 888 bits otherwise.
    pub fn new(digest: Box<dyn Digest>) -> Result<Self, CryptoError> {
        let blocklen = digest.output_size();
        if blocklen == 0 || blocklen > MAX_BLOCKLEN {
            return Err(CryptoError::DigestBadOutputLength { len: blocklen });
        }
        Ok(HashDrbgState {
            digest,
            blocklen,
            seedlen: seedlen_for_blocklen(blocklen),
            v: [0u8; MAX_SEEDLEN],
            c: [0u8; MAX_SEEDLEN],
            vtmp: [0u8; MAX_SEEDLEN],
        })
    }

    /// Digest output size in bytes.
    pub fn blocklen(&self) -> usize {
        self.blocklen
    }

    /// Internal seed length in bytes.
    pub fn seedlen(&self) -> usize {
        self.seedlen
    }

    /// V = (V + Hash(inbyte || V || [adin])) mod 2^(8 * seedlen).
    fn add_hash_to_v(&mut self, inbyte: u8, adin: Option<&[u8]>) -> Result<(), CryptoError> {
        let seedlen = self.seedlen;
        self.digest.reset();
        self.digest.update(&[inbyte])?;
        self.digest.update(&self.v[..seedlen])?;
        if let Some(adin) = adin {
            self.digest.update(adin)?;
        }
        self.digest.finish(&mut self.vtmp[..self.blocklen])?;
        add_bytes(&mut self.v[..seedlen], &self.vtmp[..self.blocklen]);
        Ok(())
    }

    /// Hashgen (SP 800-90A 10.1.1.4): expand V into `out.len()` bytes.
    ///
    /// A zero-length request is an observable no-op: no digest calls, no
    /// state change. V itself is never modified here; the iterated value
    /// lives in the scratch buffer.
    fn hash_gen(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        if out.is_empty() {
            return Ok(());
        }

        let (seedlen, blocklen) = (self.seedlen, self.blocklen);
        // data = V
        self.vtmp.copy_from_slice(&self.v);
        let mut chunks = out.chunks_mut(blocklen).peekable();
        while let Some(chunk) = chunks.next() {
            self.digest.reset();
            self.digest.update(&self.vtmp[..seedlen])?;
            if chunk.len() == blocklen {
                self.digest.finish(chunk)?;
            } else {
                let mut block = [0u8; MAX_BLOCKLEN];
                self.digest.finish(&mut block[..blocklen])?;
                chunk.copy_from_slice(&block[..chunk.len()]);
                block.zeroize();
            }
            if chunks.peek().is_some() {
                // data = (data + 1) mod 2^(8 * seedlen)
                add_bytes(&mut self.vtmp[..seedlen], &[1]);
            }
        }
        Ok(())
    }

    /// Hash_DRBG_Instantiate_Process (SP 800-90A 10.1.1.2).
    ///
    /// Either both V and C are derived and the state is usable, or an
    /// error is returned and the state must not be treated as instantiated.
    pub fn instantiate(
        &mut self,
        entropy: &[u8],
        nonce: &[u8],
        pstr: Option<&[u8]>,
    ) -> Result<(), CryptoError> {
        let seedlen = self.seedlen;
        // (Step 1-3) V = Hash_df(entropy || nonce || personalization, seedlen)
        hash_df(
            self.digest.as_mut(),
            &mut self.v[..seedlen],
            None,
            entropy,
            Some(nonce),
            pstr,
        )?;
        // (Step 4) C = Hash_df(0x00 || V, seedlen)
        hash_df(
            self.digest.as_mut(),
            &mut self.c[..seedlen],
            Some(0x00),
            &self.v[..seedlen],
            None,
            None,
        )
    }

    /// Hash_DRBG_Reseed_Process (SP 800-90A 10.1.1.3).
    ///
    /// The new seed is derived into an explicit temporary so the old V is
    /// read in full before the new one is written. A failure part-way
    /// through can leave V and C inconsistent with each other; the caller
    /// must then uninstantiate and instantiate from scratch rather than
    /// retry.
    pub fn reseed(&mut self, entropy: &[u8], adin: Option<&[u8]>) -> Result<(), CryptoError> {
        let seedlen = self.seedlen;

        // (Step 1-2) V = Hash_df(0x01 || V || entropy || additional_input)
        let mut seed = [0u8; MAX_SEEDLEN];
        let derived = hash_df(
            self.digest.as_mut(),
            &mut seed[..seedlen],
            Some(0x01),
            &self.v[..seedlen],
            Some(entropy),
            adin,
        );
        if derived.is_ok() {
            self.v[..seedlen].copy_from_slice(&seed[..seedlen]);
        }
        seed.zeroize();
        derived?;

        // (Step 4) C = Hash_df(0x00 || V, seedlen)
        hash_df(
            self.digest.as_mut(),
            &mut self.c[..seedlen],
            Some(0x00),
            &self.v[..seedlen],
            None,
            None,
        )
    }

    /// Hash_DRBG_Generate_Process (SP 800-90A 10.1.1.4).
    ///
    /// `reseed_counter` is the owner's count of generate calls since the
    /// last (re)seed, mixed into V as four big-endian bytes. A zero-length
    /// request returns immediately without touching the state. On error
    /// `out` is cleared so no partial output reaches the caller.
    pub fn generate(
        &mut self,
        out: &mut [u8],
        adin: Option<&[u8]>,
        reseed_counter: u32,
    ) -> Result<(), CryptoError> {
        if out.is_empty() {
            return Ok(());
        }
        let result = self.generate_inner(out, adin, reseed_counter);
        if result.is_err() {
            out.zeroize();
        }
        result
    }

    fn generate_inner(
        &mut self,
        out: &mut [u8],
        adin: Option<&[u8]>,
        reseed_counter: u32,
    ) -> Result<(), CryptoError> {
        let seedlen = self.seedlen;

        // (Step 2) if adin is present: V = (V + Hash(0x02 || V || adin))
        if let Some(adin) = adin {
            if !adin.is_empty() {
                self.add_hash_to_v(0x02, Some(adin))?;
            }
        }
        // (Step 3) out = Hashgen(outlen, V)
        self.hash_gen(out)?;
        // (Step 4) V = (V + Hash(0x03 || V)) mod 2^(8 * seedlen)
        self.add_hash_to_v(0x03, None)?;
        // (Step 5) V = (V + C + reseed_counter) mod 2^(8 * seedlen)
        add_bytes(&mut self.v[..seedlen], &self.c[..seedlen]);
        add_bytes(&mut self.v[..seedlen], &reseed_counter.to_be_bytes());
        Ok(())
    }

    /// Hash_DRBG_Uninstantiate: overwrite V, C, and scratch with zeros.
    pub fn uninstantiate(&mut self) {
        self.v.zeroize();
        self.c.zeroize();
        self.vtmp.zeroize();
    }

    /// Diagnostic check that V, C, and scratch are all-zero.
    pub fn verify_zeroization(&self) -> bool {
        let mut acc = 0u8;
        for byte in self.v.iter().chain(self.c.iter()).chain(self.vtmp.iter()) {
            acc |= byte;
        }
        acc.ct_eq(&0).into()
    }
}

/// Lifecycle status of a DRBG instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrbgStatus {
    Uninstantiated,
    Instantiated,
    /// A reseed or generate failed mid-update; V/C may be inconsistent and
    /// the instance must be uninstantiated before reuse.
    Error,
}

/// An instantiated Hash-DRBG with its reseed counter and operational limits.
pub struct HashDrbg {
    core: HashDrbgState,
    params: DrbgParams,
    status: DrbgStatus,
    /// Number of generate requests since last (re)seed.
    reseed_counter: u32,
}

impl HashDrbg {
    /// Instantiate a new Hash-DRBG over one of the SHA-2 digests.
    pub fn new(
        hash_type: HashDrbgType,
        entropy: &[u8],
        nonce: &[u8],
        pstr: Option<&[u8]>,
    ) -> Result<Self, CryptoError> {
        Self::with_digest(hash_type.new_digest(), entropy, nonce, pstr)
    }

    /// Instantiate over an arbitrary injected digest engine.
    pub fn with_digest(
        digest: Box<dyn Digest>,
        entropy: &[u8],
        nonce: &[u8],
        pstr: Option<&[u8]>,
    ) -> Result<Self, CryptoError> {
        let core = HashDrbgState::new(digest)?;
        let params = DrbgParams::for_blocklen(core.blocklen());
        let mut drbg = HashDrbg {
            core,
            params,
            status: DrbgStatus::Uninstantiated,
            reseed_counter: 0,
        };
        drbg.instantiate(entropy, nonce, pstr)?;
        Ok(drbg)
    }

    /// Instantiate from the system entropy source (getrandom).
    pub fn from_system_entropy(hash_type: HashDrbgType) -> Result<Self, CryptoError> {
        let params = DrbgParams::for_blocklen(hash_type.output_size());
        let mut seed = vec![0u8; params.seedlen + params.min_noncelen];
        getrandom::getrandom(&mut seed).map_err(|_| CryptoError::DrbgEntropyFail)?;
        let result = {
            let (entropy, nonce) = seed.split_at(params.seedlen);
            Self::new(hash_type, entropy, nonce, None)
        };
        seed.zeroize();
        result
    }

    /// The limits this instance enforces.
    pub fn params(&self) -> &DrbgParams {
        &self.params
    }

    /// Instantiate with fresh seed material (SP 800-90A 9.1).
    ///
    /// Constructors return an already-instantiated instance, so this is
    /// only valid after [`uninstantiate`](Self::uninstantiate).
    pub fn instantiate(
        &mut self,
        entropy: &[u8],
        nonce: &[u8],
        pstr: Option<&[u8]>,
    ) -> Result<(), CryptoError> {
        if self.status != DrbgStatus::Uninstantiated {
            return Err(CryptoError::DrbgInvalidState);
        }
        self.check_seed_material(entropy, nonce, pstr)?;
        if let Err(e) = self.core.instantiate(entropy, nonce, pstr) {
            // Scrub anything half-written; the instance stays uninstantiated.
            self.core.uninstantiate();
            return Err(e);
        }
        self.status = DrbgStatus::Instantiated;
        self.reseed_counter = 1;
        Ok(())
    }

    /// Reseed with fresh entropy (SP 800-90A 9.2).
    pub fn reseed(
        &mut self,
        entropy: &[u8],
        additional_input: Option<&[u8]>,
    ) -> Result<(), CryptoError> {
        if self.status != DrbgStatus::Instantiated {
            return Err(CryptoError::DrbgInvalidState);
        }
        if entropy.len() < self.params.min_entropylen {
            return Err(CryptoError::DrbgInsufficientEntropy {
                min: self.params.min_entropylen,
                got: entropy.len(),
            });
        }
        if entropy.len() > self.params.max_entropylen
            || additional_input.map_or(0, |d| d.len()) > self.params.max_adinlen
        {
            return Err(CryptoError::DrbgInvalidInputLength);
        }
        match self.core.reseed(entropy, additional_input) {
            Ok(()) => {
                self.reseed_counter = 1;
                Ok(())
            }
            Err(e) => {
                self.status = DrbgStatus::Error;
                Err(e)
            }
        }
    }

    /// Generate pseudorandom bytes (SP 800-90A 9.3).
    ///
    /// A zero-length request succeeds without touching any state. Requests
    /// are limited to `max_request` bytes, and the instance refuses to
    /// generate once the reseed interval is exhausted.
    pub fn generate(
        &mut self,
        output: &mut [u8],
        additional_input: Option<&[u8]>,
    ) -> Result<(), CryptoError> {
        if self.status != DrbgStatus::Instantiated {
            return Err(CryptoError::DrbgInvalidState);
        }
        if output.is_empty() {
            return Ok(());
        }
        if output.len() > self.params.max_request {
            return Err(CryptoError::DrbgRequestTooLarge {
                max: self.params.max_request,
                got: output.len(),
            });
        }
        if additional_input.map_or(0, |d| d.len()) > self.params.max_adinlen {
            return Err(CryptoError::DrbgInvalidInputLength);
        }
        if self.reseed_counter > self.params.reseed_interval {
            return Err(CryptoError::DrbgReseedRequired);
        }
        match self.core.generate(output, additional_input, self.reseed_counter) {
            Ok(()) => {
                self.reseed_counter += 1;
                Ok(())
            }
            Err(e) => {
                self.status = DrbgStatus::Error;
                Err(e)
            }
        }
    }

    /// Generate `len` pseudorandom bytes (convenience method).
    pub fn generate_bytes(&mut self, len: usize) -> Result<Vec<u8>, CryptoError> {
        let mut output = vec![0u8; len];
        self.generate(&mut output, None)?;
        Ok(output)
    }

    /// Zeroize V, C, and scratch and return to the uninstantiated state.
    pub fn uninstantiate(&mut self) {
        self.core.uninstantiate();
        self.status = DrbgStatus::Uninstantiated;
        self.reseed_counter = 0;
    }

    /// Diagnostic check that the internal state is all-zero.
    pub fn verify_zeroization(&self) -> bool {
        self.core.verify_zeroization()
    }

    fn check_seed_material(
        &self,
        entropy: &[u8],
        nonce: &[u8],
        pstr: Option<&[u8]>,
    ) -> Result<(), CryptoError> {
        if entropy.len() < self.params.min_entropylen {
            return Err(CryptoError::DrbgInsufficientEntropy {
                min: self.params.min_entropylen,
                got: entropy.len(),
            });
        }
        if entropy.len() > self.params.max_entropylen
            || nonce.len() < self.params.min_noncelen
            || nonce.len() > self.params.max_noncelen
            || pstr.map_or(0, |p| p.len()) > self.params.max_perslen
        {
            return Err(CryptoError::DrbgInvalidInputLength);
        }
        Ok(())
    }
}
