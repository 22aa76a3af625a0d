//! eap_aka - EAP-AKA' key hierarchy (RFC5448 3.3) as profiled for 5G by TS33.501 6.1.3.1

use crate::keygen::{HomeVector, derive_kseaf, kdf};
use hmac::{Hmac, Mac};
use rand_core::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// K_encr, K_aut, K_re, MSK, EMSK.
const MK_LEN: usize = 16 + 32 + 32 + 64 + 64;

/// CK' || IK' = KDF(CK || IK, 0x20, serving network name, SQN xor AK) (TS33.501, Annex A.3).
pub fn derive_ck_ik_prime(
    ck: &[u8; 16],
    ik: &[u8; 16],
    serving_network_name: &[u8],
    sqn_xor_ak: &[u8],
) -> ([u8; 16], [u8; 16]) {
    let out = kdf(
        &[*ck, *ik].concat(),
        0x20,
        &[serving_network_name, sqn_xor_ak],
    );
    let mut ck_prime = [0u8; 16];
    let mut ik_prime = [0u8; 16];
    ck_prime.copy_from_slice(&out[0..16]);
    ik_prime.copy_from_slice(&out[16..32]);
    (ck_prime, ik_prime)
}

// RFC5448, 3.4.  T1 = HMAC(K, S | 0x01), Tn = HMAC(K, Tn-1 | S | n).
fn prf_prime(key: &[u8], s: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + 32);
    let mut t: Vec<u8> = vec![];
    let mut n = 1u8;
    while out.len() < len {
        let mut mac = HmacSha256::new_from_slice(key).expect("Can't fail");
        mac.update(&t);
        mac.update(s);
        mac.update(&[n]);
        t = mac.finalize().into_bytes().to_vec();
        out.extend_from_slice(&t);
        n += 1;
    }
    out.truncate(len);
    out
}

/// The keys derived from MK = PRF'(IK' | CK', "EAP-AKA'" | Identity).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EapAkaPrimeKeys {
    pub k_encr: [u8; 16],
    pub k_aut: [u8; 32],
    pub k_re: [u8; 32],
    pub msk: [u8; 64],
    pub emsk: [u8; 64],
}

impl EapAkaPrimeKeys {
    pub fn derive(ck_prime: &[u8; 16], ik_prime: &[u8; 16], identity: &[u8]) -> Self {
        let mk = prf_prime(
            &[*ik_prime, *ck_prime].concat(),
            &[b"EAP-AKA'".as_slice(), identity].concat(),
            MK_LEN,
        );
        let mut keys = EapAkaPrimeKeys {
            k_encr: [0; 16],
            k_aut: [0; 32],
            k_re: [0; 32],
            msk: [0; 64],
            emsk: [0; 64],
        };
        let (k_encr, rest) = mk.split_at(16);
        let (k_aut, rest) = rest.split_at(32);
        let (k_re, rest) = rest.split_at(32);
        let (msk, emsk) = rest.split_at(64);
        keys.k_encr.copy_from_slice(k_encr);
        keys.k_aut.copy_from_slice(k_aut);
        keys.k_re.copy_from_slice(k_re);
        keys.msk.copy_from_slice(msk);
        keys.emsk.copy_from_slice(emsk);
        keys
    }

    /// TS33.501, 6.1.3.1: KAUSF is the most significant 256 bits of EMSK.
    pub fn kausf(&self) -> [u8; 32] {
        let mut kausf = [0u8; 32];
        kausf.copy_from_slice(&self.emsk[0..32]);
        kausf
    }

    /// AT_MAC, HMAC-SHA-256-128 over the whole EAP packet with the AT_MAC value zeroed.
    pub fn mac(&self, packet: &[u8]) -> [u8; 16] {
        let mut mac = HmacSha256::new_from_slice(&self.k_aut).expect("Can't fail");
        mac.update(packet);
        let mut out = [0u8; 16];
        out.copy_from_slice(&mac.finalize().into_bytes()[0..16]);
        out
    }
}

/// What the home network holds for one EAP-AKA' challenge.
pub struct EapAkaPrimeChallenge {
    pub rand: [u8; 16],
    pub autn: [u8; 16],
    pub xres: [u8; 8],
    pub keys: EapAkaPrimeKeys,
    pub kseaf: [u8; 32],
}

/// Network side of TS33.501 6.1.3.1.  As with 5G-AKA the caller owns SQN.
pub fn generate_eap_aka_prime_challenge(
    k: &[u8; 16],
    opc: &[u8; 16],
    serving_network_name: &[u8],
    identity: &[u8],
    sqn: &[u8; 6],
    rng: &mut impl RngCore,
) -> EapAkaPrimeChallenge {
    let v = HomeVector::generate(k, opc, sqn, rng);
    let (ck_prime, ik_prime) =
        derive_ck_ik_prime(&v.ck, &v.ik, serving_network_name, &v.autn[0..6]);
    let keys = EapAkaPrimeKeys::derive(&ck_prime, &ik_prime, identity);
    EapAkaPrimeChallenge {
        rand: v.rand,
        autn: v.autn,
        xres: v.xres,
        kseaf: derive_kseaf(&keys.kausf(), serving_network_name),
        keys,
    }
}
