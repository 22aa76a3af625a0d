//! aka - UE side of 5G-AKA (TS33.102 6.3, TS33.501 6.1.3.2) using Milenage

use crate::AkaError;
use aes::Aes128;
use aes::cipher::{BlockEncrypt, KeyInit};
use milenage::Milenage;

/// The operator variant algorithm configuration field, either as provisioned OP or as the
/// derived OPc.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorKey {
    Op([u8; 16]),
    Opc([u8; 16]),
}

impl OperatorKey {
    pub fn opc(&self, k: &[u8; 16]) -> [u8; 16] {
        match self {
            OperatorKey::Op(op) => compute_opc(k, op),
            OperatorKey::Opc(opc) => *opc,
        }
    }

    fn milenage(&self, k: &[u8; 16]) -> Milenage {
        Milenage::new_with_opc(*k, self.opc(k))
    }
}

/// OPc = OP xor E[OP]K (TS35.206, 4.1).
pub fn compute_opc(k: &[u8; 16], op: &[u8; 16]) -> [u8; 16] {
    let mut block = aes::Block::from(*op);
    Aes128::new(k.into()).encrypt_block(&mut block);
    let mut opc = [0u8; 16];
    for (o, (e, p)) in opc.iter_mut().zip(block.iter().zip(op)) {
        *o = e ^ p;
    }
    opc
}

/// All Milenage outputs for one RAND.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthVector {
    pub mac_a: [u8; 8],
    pub mac_s: [u8; 8],
    pub res: [u8; 8],
    pub ck: [u8; 16],
    pub ik: [u8; 16],
    pub ak: [u8; 6],
    pub ak_star: [u8; 6],
}

impl AuthVector {
    pub fn compute(
        k: &[u8; 16],
        op: &OperatorKey,
        rand: &[u8; 16],
        sqn: &[u8; 6],
        amf: &[u8; 2],
    ) -> Self {
        let mut m = op.milenage(k);
        let mac_a = m.f1(rand, sqn, amf);
        let mac_s = m.f1star(rand, sqn, amf);
        let (res, ck, ik, ak) = m.f2345(rand);
        let ak_star = m.f5star(rand);
        AuthVector {
            mac_a,
            mac_s,
            res,
            ck,
            ik,
            ak,
            ak_star,
        }
    }
}

/// What the USIM learns from a successfully verified AUTN.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AkaResult {
    pub res: [u8; 8],
    pub ck: [u8; 16],
    pub ik: [u8; 16],
    pub sqn: [u8; 6],
    pub sqn_xor_ak: [u8; 6],
    pub amf: [u8; 2],
}

impl AkaResult {
    pub fn sqn_value(&self) -> u64 {
        sqn_to_u64(&self.sqn)
    }
}

/// Checks AUTN = (SQN xor AK) || AMF || MAC-A against RAND.  SQN freshness is left to the
/// caller, which knows the highest SQN accepted so far.
pub fn verify_autn(
    k: &[u8; 16],
    op: &OperatorKey,
    rand: &[u8; 16],
    autn: &[u8; 16],
) -> Result<AkaResult, AkaError> {
    let mut m = op.milenage(k);
    let (res, ck, ik, ak) = m.f2345(rand);

    let mut sqn_xor_ak = [0u8; 6];
    sqn_xor_ak.copy_from_slice(&autn[0..6]);
    let mut sqn = sqn_xor_ak;
    for (s, a) in sqn.iter_mut().zip(ak) {
        *s ^= a;
    }
    let amf = [autn[6], autn[7]];

    if m.f1(rand, &sqn, &amf)[..] != autn[8..16] {
        return Err(AkaError::MacFailure);
    }

    // TS33.501, Annex A: bit 0 of the AMF field is the separation bit.
    if amf[0] & 0x80 == 0 {
        return Err(AkaError::SeparationBit);
    }

    Ok(AkaResult {
        res,
        ck,
        ik,
        sqn,
        sqn_xor_ak,
        amf,
    })
}

/// Resynchronisation token AUTS = (SQNms xor AK*) || MAC-S, where MAC-S is computed with the
/// dummy AMF of all zeros (TS33.102, 6.3.3).
pub fn build_auts(k: &[u8; 16], op: &OperatorKey, rand: &[u8; 16], sqn_ms: &[u8; 6]) -> [u8; 14] {
    let mut m = op.milenage(k);
    let ak_star = m.f5star(rand);
    let mac_s = m.f1star(rand, sqn_ms, &[0, 0]);
    let mut auts = [0u8; 14];
    for i in 0..6 {
        auts[i] = sqn_ms[i] ^ ak_star[i];
    }
    auts[6..].copy_from_slice(&mac_s);
    auts
}

pub fn sqn_to_u64(sqn: &[u8; 6]) -> u64 {
    sqn.iter().fold(0, |acc, b| (acc << 8) | *b as u64)
}

pub fn sqn_from_u64(value: u64) -> [u8; 6] {
    let mut sqn = [0u8; 6];
    sqn.copy_from_slice(&value.to_be_bytes()[2..]);
    sqn
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // TS35.208, 4.3 test set 1
    const K: [u8; 16] = hex!("465b5ce8b199b49faa5f0a2ee238a6bc");
    const RAND: [u8; 16] = hex!("23553cbe9637a89d218ae64dae47bf35");
    const SQN: [u8; 6] = hex!("ff9bb4d0b607");
    const AMF: [u8; 2] = hex!("b9b9");
    const OP: [u8; 16] = hex!("cdc202d5123e20f62b6d676ac72cb318");

    #[test]
    fn test_opc_derivation() {
        assert_eq!(
            compute_opc(&K, &OP),
            hex!("cd63cb71954a9f4e48a5994e37a02baf")
        );
    }

    #[test]
    fn test_milenage_conformance_set_1() {
        let av = AuthVector::compute(&K, &OperatorKey::Op(OP), &RAND, &SQN, &AMF);
        assert_eq!(av.mac_a, hex!("4a9ffac354dfafb3"));
        assert_eq!(av.mac_s, hex!("01cfaf9ec4e871e9"));
        assert_eq!(av.res, hex!("a54211d5e3ba50bf"));
        assert_eq!(av.ck, hex!("b40ba9a3c58b2a05bbf0d987b21bf8cb"));
        assert_eq!(av.ik, hex!("f769bcd751044604127672711c6d3441"));
        assert_eq!(av.ak, hex!("aa689c648370"));
        assert_eq!(av.ak_star, hex!("451e8beca43b"));

        let with_opc = AuthVector::compute(
            &K,
            &OperatorKey::Opc(hex!("cd63cb71954a9f4e48a5994e37a02baf")),
            &RAND,
            &SQN,
            &AMF,
        );
        assert_eq!(with_opc, av);
    }

    fn autn(amf: [u8; 2]) -> [u8; 16] {
        let av = AuthVector::compute(&K, &OperatorKey::Op(OP), &RAND, &SQN, &amf);
        let mut autn = [0u8; 16];
        for i in 0..6 {
            autn[i] = SQN[i] ^ av.ak[i];
        }
        autn[6..8].copy_from_slice(&amf);
        autn[8..].copy_from_slice(&av.mac_a);
        autn
    }

    #[test]
    fn test_verify_autn_recovers_sqn() {
        let result = verify_autn(&K, &OperatorKey::Op(OP), &RAND, &autn([0x80, 0x00])).unwrap();
        assert_eq!(result.sqn, SQN);
        assert_eq!(result.res, hex!("a54211d5e3ba50bf"));
        assert_eq!(result.sqn_value(), 0xff9bb4d0b607);
    }

    #[test]
    fn test_verify_autn_failures() {
        let mut bad_mac = autn([0x80, 0x00]);
        bad_mac[15] ^= 1;
        assert_eq!(
            verify_autn(&K, &OperatorKey::Op(OP), &RAND, &bad_mac),
            Err(AkaError::MacFailure)
        );
        assert_eq!(
            verify_autn(&K, &OperatorKey::Op(OP), &RAND, &autn([0x00, 0x00])),
            Err(AkaError::SeparationBit)
        );
    }

    #[test]
    fn test_auts_conceals_sqn() {
        let sqn_ms = sqn_from_u64(0x20);
        let auts = build_auts(&K, &OperatorKey::Op(OP), &RAND, &sqn_ms);
        let av = AuthVector::compute(&K, &OperatorKey::Op(OP), &RAND, &sqn_ms, &[0, 0]);
        for i in 0..6 {
            assert_eq!(auts[i] ^ av.ak_star[i], sqn_ms[i]);
        }
        assert_eq!(auts[6..], av.mac_s);
    }
}
