use hmac::{Hmac, Mac};
use milenage::Milenage;
use rand_core::RngCore;
use sha2::Sha256;

use crate::{CipheringAlgorithm, IntegrityAlgorithm};

type HmacSha256 = Hmac<Sha256>;

// AMF (authentication and key management field) with the separation bit set.
const AMF: [u8; 2] = [0x80, 0x00];

/// A 5G home environment authentication vector as handed to the SEAF.
pub struct Challenge {
    pub rand: [u8; 16],
    pub autn: [u8; 16],
    pub xres_star: [u8; 16],
    pub kausf: [u8; 32],
    pub kseaf: [u8; 32],
}

// Key derivation function from TS33.220, B.2.0.  Each parameter Pi is followed by its two
// byte length Li.
pub(crate) fn kdf(key: &[u8], fc: u8, parameters: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("Can't fail");
    mac.update(&[fc]);
    for p in parameters {
        mac.update(p);
        mac.update(&(p.len() as u16).to_be_bytes());
    }
    mac.finalize().into_bytes().into()
}

// "For an algorithm key of length n bits, where n is less or equal to 256, the n least
// significant bits of the 256 bits of the KDF output shall be used as the algorithm key."
fn least_significant_128(output: [u8; 32]) -> [u8; 16] {
    let mut k = [0u8; 16];
    k.copy_from_slice(&output[16..32]);
    k
}

/// Network side of TS33.501 6.1.3.2.0.  The caller owns SQN and is responsible for advancing it
/// between challenges.
pub fn generate_challenge(
    k: &[u8; 16],
    opc: &[u8; 16],
    serving_network_name: &[u8],
    sqn: &[u8; 6],
    rng: &mut impl RngCore,
) -> Challenge {
    let v = HomeVector::generate(k, opc, sqn, rng);
    let kausf = derive_kausf(&v.ck, &v.ik, serving_network_name, &v.autn[0..6]);
    Challenge {
        rand: v.rand,
        autn: v.autn,
        xres_star: derive_res_star(&v.ck, &v.ik, serving_network_name, &v.rand, &v.xres),
        kseaf: derive_kseaf(&kausf, serving_network_name),
        kausf,
    }
}

/// A fresh RAND with the Milenage outputs the home network keeps for it.
pub(crate) struct HomeVector {
    pub rand: [u8; 16],
    pub autn: [u8; 16],
    pub xres: [u8; 8],
    pub ck: [u8; 16],
    pub ik: [u8; 16],
}

impl HomeVector {
    pub fn generate(
        k: &[u8; 16],
        opc: &[u8; 16],
        sqn: &[u8; 6],
        rng: &mut impl RngCore,
    ) -> Self {
        let mut rand = [0u8; 16];
        rng.fill_bytes(&mut rand);

        // MAC, XRES, CK, IK, AK
        let mut m = Milenage::new_with_opc(*k, *opc);
        let mac = m.f1(&rand, sqn, &AMF);
        let (xres, ck, ik, ak) = m.f2345(&rand);

        // AUTN = SQN ^ AK || AMF || MAC
        let mut autn = [0u8; 16];
        for i in 0..6 {
            autn[i] = sqn[i] ^ ak[i];
        }
        autn[6..8].copy_from_slice(&AMF);
        autn[8..16].copy_from_slice(&mac);

        HomeVector {
            rand,
            autn,
            xres,
            ck,
            ik,
        }
    }
}

// TS33.501, Annex A.2
pub fn derive_kausf(
    ck: &[u8; 16],
    ik: &[u8; 16],
    serving_network_name: &[u8],
    sqn_xor_ak: &[u8],
) -> [u8; 32] {
    kdf(&[*ck, *ik].concat(), 0x6A, &[serving_network_name, sqn_xor_ak])
}

// TS33.501, Annex A.4.  The same function yields RES* on the UE and XRES* in the home network.
pub fn derive_res_star(
    ck: &[u8; 16],
    ik: &[u8; 16],
    serving_network_name: &[u8],
    rand: &[u8; 16],
    res: &[u8],
) -> [u8; 16] {
    least_significant_128(kdf(
        &[*ck, *ik].concat(),
        0x6B,
        &[serving_network_name, rand, res],
    ))
}

// TS33.501, Annex A.6
pub fn derive_kseaf(kausf: &[u8; 32], serving_network_name: &[u8]) -> [u8; 32] {
    kdf(kausf, 0x6C, &[serving_network_name])
}

// TS33.501, Annex A.7.0.  P0 is the SUPI (IMSI digits), P1 is the ABBA.
pub fn derive_kamf(kseaf: &[u8; 32], supi: &[u8], abba: &[u8]) -> [u8; 32] {
    kdf(kseaf, 0x6D, &[supi, abba])
}

// TS33.501, A.9.  Access type distinguisher 3GPP = 0x01 (table A.9-1).
pub fn derive_kgnb(kamf: &[u8; 32], uplink_nas_count: u32) -> [u8; 32] {
    kdf(kamf, 0x6E, &[&uplink_nas_count.to_be_bytes(), &[0x01]])
}

// TS33.501, A.8 algorithm type distinguishers.
const N_NAS_ENC_ALG: u8 = 0x01;
const N_NAS_INT_ALG: u8 = 0x02;

pub fn derive_knas_enc(kamf: &[u8; 32], algorithm: CipheringAlgorithm) -> [u8; 16] {
    derive_algorithm_key(kamf, N_NAS_ENC_ALG, algorithm.into())
}

pub fn derive_knas_int(kamf: &[u8; 32], algorithm: IntegrityAlgorithm) -> [u8; 16] {
    derive_algorithm_key(kamf, N_NAS_INT_ALG, algorithm.into())
}

fn derive_algorithm_key(
    input_key: &[u8; 32],
    algorithm_type_distinguisher: u8,
    algorithm_identity: u8,
) -> [u8; 16] {
    least_significant_128(kdf(
        input_key,
        0x69,
        &[&[algorithm_type_distinguisher], &[algorithm_identity]],
    ))
}
