//! snow3g - SNOW 3G stream cipher and the f8 / f9 functions used by 128-NEA1 and 128-NIA1

use bitvec::prelude::*;

const SR: [u8; 256] = [
    0x63, 0x7C, 0x77, 0x7B, 0xF2, 0x6B, 0x6F, 0xC5, 0x30, 0x01, 0x67, 0x2B, 0xFE, 0xD7, 0xAB, 0x76,
    0xCA, 0x82, 0xC9, 0x7D, 0xFA, 0x59, 0x47, 0xF0, 0xAD, 0xD4, 0xA2, 0xAF, 0x9C, 0xA4, 0x72, 0xC0,
    0xB7, 0xFD, 0x93, 0x26, 0x36, 0x3F, 0xF7, 0xCC, 0x34, 0xA5, 0xE5, 0xF1, 0x71, 0xD8, 0x31, 0x15,
    0x04, 0xC7, 0x23, 0xC3, 0x18, 0x96, 0x05, 0x9A, 0x07, 0x12, 0x80, 0xE2, 0xEB, 0x27, 0xB2, 0x75,
    0x09, 0x83, 0x2C, 0x1A, 0x1B, 0x6E, 0x5A, 0xA0, 0x52, 0x3B, 0xD6, 0xB3, 0x29, 0xE3, 0x2F, 0x84,
    0x53, 0xD1, 0x00, 0xED, 0x20, 0xFC, 0xB1, 0x5B, 0x6A, 0xCB, 0xBE, 0x39, 0x4A, 0x4C, 0x58, 0xCF,
    0xD0, 0xEF, 0xAA, 0xFB, 0x43, 0x4D, 0x33, 0x85, 0x45, 0xF9, 0x02, 0x7F, 0x50, 0x3C, 0x9F, 0xA8,
    0x51, 0xA3, 0x40, 0x8F, 0x92, 0x9D, 0x38, 0xF5, 0xBC, 0xB6, 0xDA, 0x21, 0x10, 0xFF, 0xF3, 0xD2,
    0xCD, 0x0C, 0x13, 0xEC, 0x5F, 0x97, 0x44, 0x17, 0xC4, 0xA7, 0x7E, 0x3D, 0x64, 0x5D, 0x19, 0x73,
    0x60, 0x81, 0x4F, 0xDC, 0x22, 0x2A, 0x90, 0x88, 0x46, 0xEE, 0xB8, 0x14, 0xDE, 0x5E, 0x0B, 0xDB,
    0xE0, 0x32, 0x3A, 0x0A, 0x49, 0x06, 0x24, 0x5C, 0xC2, 0xD3, 0xAC, 0x62, 0x91, 0x95, 0xE4, 0x79,
    0xE7, 0xC8, 0x37, 0x6D, 0x8D, 0xD5, 0x4E, 0xA9, 0x6C, 0x56, 0xF4, 0xEA, 0x65, 0x7A, 0xAE, 0x08,
    0xBA, 0x78, 0x25, 0x2E, 0x1C, 0xA6, 0xB4, 0xC6, 0xE8, 0xDD, 0x74, 0x1F, 0x4B, 0xBD, 0x8B, 0x8A,
    0x70, 0x3E, 0xB5, 0x66, 0x48, 0x03, 0xF6, 0x0E, 0x61, 0x35, 0x57, 0xB9, 0x86, 0xC1, 0x1D, 0x9E,
    0xE1, 0xF8, 0x98, 0x11, 0x69, 0xD9, 0x8E, 0x94, 0x9B, 0x1E, 0x87, 0xE9, 0xCE, 0x55, 0x28, 0xDF,
    0x8C, 0xA1, 0x89, 0x0D, 0xBF, 0xE6, 0x42, 0x68, 0x41, 0x99, 0x2D, 0x0F, 0xB0, 0x54, 0xBB, 0x16,
];

const SQ: [u8; 256] = [
    0x25, 0x24, 0x73, 0x67, 0xD7, 0xAE, 0x5C, 0x30, 0xA4, 0xEE, 0x6E, 0xCB, 0x7D, 0xB5, 0x82, 0xDB,
    0xE4, 0x8E, 0x48, 0x49, 0x4F, 0x5D, 0x6A, 0x78, 0x70, 0x88, 0xE8, 0x5F, 0x5E, 0x84, 0x65, 0xE2,
    0xD8, 0xE9, 0xCC, 0xED, 0x40, 0x2F, 0x11, 0x28, 0x57, 0xD2, 0xAC, 0xE3, 0x4A, 0x15, 0x1B, 0xB9,
    0xB2, 0x80, 0x85, 0xA6, 0x2E, 0x02, 0x47, 0x29, 0x07, 0x4B, 0x0E, 0xC1, 0x51, 0xAA, 0x89, 0xD4,
    0xCA, 0x01, 0x46, 0xB3, 0xEF, 0xDD, 0x44, 0x7B, 0xC2, 0x7F, 0xBE, 0xC3, 0x9F, 0x20, 0x4C, 0x64,
    0x83, 0xA2, 0x68, 0x42, 0x13, 0xB4, 0x41, 0xCD, 0xBA, 0xC6, 0xBB, 0x6D, 0x4D, 0x71, 0x21, 0xF4,
    0x8D, 0xB0, 0xE5, 0x93, 0xFE, 0x8F, 0xE6, 0xCF, 0x43, 0x45, 0x31, 0x22, 0x37, 0x36, 0x96, 0xFA,
    0xBC, 0x0F, 0x08, 0x52, 0x1D, 0x55, 0x1A, 0xC5, 0x4E, 0x23, 0x69, 0x7A, 0x92, 0xFF, 0x5B, 0x5A,
    0xEB, 0x9A, 0x1C, 0xA9, 0xD1, 0x7E, 0x0D, 0xFC, 0x50, 0x8A, 0xB6, 0x62, 0xF5, 0x0A, 0xF8, 0xDC,
    0x03, 0x3C, 0x0C, 0x39, 0xF1, 0xB8, 0xF3, 0x3D, 0xF2, 0xD5, 0x97, 0x66, 0x81, 0x32, 0xA0, 0x00,
    0x06, 0xCE, 0xF6, 0xEA, 0xB7, 0x17, 0xF7, 0x8C, 0x79, 0xD6, 0xA7, 0xBF, 0x8B, 0x3F, 0x1F, 0x53,
    0x63, 0x75, 0x35, 0x2C, 0x60, 0xFD, 0x27, 0xD3, 0x94, 0xA5, 0x7C, 0xA1, 0x05, 0x58, 0x2D, 0xBD,
    0xD9, 0xC7, 0xAF, 0x6B, 0x54, 0x0B, 0xE0, 0x38, 0x04, 0xC8, 0x9D, 0xE7, 0x14, 0xB1, 0x87, 0x9C,
    0xDF, 0x6F, 0xF9, 0xDA, 0x2A, 0xC4, 0x59, 0x16, 0x74, 0x91, 0xAB, 0x26, 0x61, 0x76, 0x34, 0x2B,
    0xAD, 0x99, 0xFB, 0x72, 0xEC, 0x33, 0x12, 0xDE, 0x98, 0x3B, 0xC0, 0x9B, 0x3E, 0x18, 0x10, 0x3A,
    0x56, 0xE1, 0x77, 0xC9, 0x1E, 0x9E, 0x95, 0xA3, 0x90, 0x19, 0xA8, 0x6C, 0x09, 0xD0, 0xF0, 0x86,
];

#[inline]

// Multiply by x in GF(2^8), reducing with `c`.
fn mul_x(v: u8, c: u8) -> u8 {
    if v & 0x80 != 0 { (v << 1) ^ c } else { v << 1 }
}

fn mul_x_pow(v: u8, i: u8, c: u8) -> u8 {
    (0..i).fold(v, |acc, _| mul_x(acc, c))
}

fn mul_alpha(c: u8) -> u32 {
    u32::from_be_bytes([
        mul_x_pow(c, 23, 0xA9),
        mul_x_pow(c, 245, 0xA9),
        mul_x_pow(c, 48, 0xA9),
        mul_x_pow(c, 239, 0xA9),
    ])
}

fn div_alpha(c: u8) -> u32 {
    u32::from_be_bytes([
        mul_x_pow(c, 16, 0xA9),
        mul_x_pow(c, 39, 0xA9),
        mul_x_pow(c, 6, 0xA9),
        mul_x_pow(c, 64, 0xA9),
    ])
}

// S-box substitution of each byte followed by the MixColumn-style diffusion shared by S1 and S2.
fn substitute(w: u32, sbox: &[u8; 256], c: u8) -> u32 {
    let [a, b, d, e] = w.to_be_bytes().map(|x| sbox[x as usize]);
    u32::from_be_bytes([
        mul_x(a, c) ^ b ^ d ^ mul_x(e, c) ^ e,
        mul_x(a, c) ^ a ^ mul_x(b, c) ^ d ^ e,
        a ^ mul_x(b, c) ^ b ^ mul_x(d, c) ^ e,
        a ^ b ^ mul_x(d, c) ^ d ^ mul_x(e, c),
    ])
}

fn s1(w: u32) -> u32 {
    substitute(w, &SR, 0x1B)
}

fn s2(w: u32) -> u32 {
    substitute(w, &SQ, 0x69)
}

/// SNOW 3G generator state (ETSI/SAGE UEA2 & UIA2 Document 2).  Key and IV words are indexed as
/// in that document, so `key[0]` is k0.
pub struct Snow3g {
    s: [u32; 16],
    r1: u32,
    r2: u32,
    r3: u32,
}

impl Snow3g {
    pub fn new(key: &[u32; 4], iv: &[u32; 4]) -> Self {
        let [k0, k1, k2, k3] = *key;
        let ones = u32::MAX;
        let mut snow = Snow3g {
            s: [
                k0 ^ ones,
                k1 ^ ones,
                k2 ^ ones,
                k3 ^ ones,
                k0,
                k1,
                k2,
                k3,
                k0 ^ ones,
                k1 ^ ones ^ iv[3],
                k2 ^ ones ^ iv[2],
                k3 ^ ones,
                k0 ^ iv[1],
                k1,
                k2,
                k3 ^ iv[0],
            ],
            r1: 0,
            r2: 0,
            r3: 0,
        };
        for _ in 0..32 {
            let f = snow.clock_fsm();
            snow.clock_lfsr(f);
        }
        snow.clock_fsm();
        snow.clock_lfsr(0);
        snow
    }

    pub fn next_word(&mut self) -> u32 {
        let z = self.clock_fsm() ^ self.s[0];
        self.clock_lfsr(0);
        z
    }

    // `f` is zero in keystream mode.
    fn clock_lfsr(&mut self, f: u32) {
        let s = &self.s;
        let v = (s[0] << 8)
            ^ mul_alpha((s[0] >> 24) as u8)
            ^ s[2]
            ^ (s[11] >> 8)
            ^ div_alpha(s[11] as u8)
            ^ f;
        self.s.copy_within(1.., 0);
        self.s[15] = v;
    }

    fn clock_fsm(&mut self) -> u32 {
        let f = self.s[15].wrapping_add(self.r1) ^ self.r2;
        let r = self.r2.wrapping_add(self.r3 ^ self.s[5]);
        self.r3 = s2(self.r2);
        self.r2 = s1(self.r1);
        self.r1 = r;
        f
    }
}

// CK or IK as the k0..k3 words of the generator; k3 holds the first 32 bits of the key.
fn key_words(key: &[u8; 16]) -> [u32; 4] {
    let word = |i: usize| u32::from_be_bytes([key[i], key[i + 1], key[i + 2], key[i + 3]]);
    [word(12), word(8), word(4), word(0)]
}

/// f8 confidentiality function.  XORs keystream into `data` in place.
pub fn f8(key: &[u8; 16], count: u32, bearer: u8, direction: u8, data: &mut [u8]) {
    let b = ((bearer as u32 & 0x1F) << 27) | ((direction as u32 & 1) << 26);
    let mut snow = Snow3g::new(&key_words(key), &[b, count, b, count]);
    for chunk in data.chunks_mut(4) {
        for (d, k) in chunk.iter_mut().zip(snow.next_word().to_be_bytes()) {
            *d ^= k;
        }
    }
}

// Multiply by x in GF(2^64), reducing with `c`.
fn mul64x(v: u64, c: u64) -> u64 {
    if v & (1 << 63) != 0 { (v << 1) ^ c } else { v << 1 }
}

fn mul64(v: u64, p: u64, c: u64) -> u64 {
    let mut result = 0;
    let mut power = v;
    for i in 0..64 {
        if (p >> i) & 1 != 0 {
            result ^= power;
        }
        power = mul64x(power, c);
    }
    result
}

/// f9 integrity function over a message of any bit length.
pub fn f9(key: &[u8; 16], count: u32, fresh: u32, direction: u8, message: &BitSlice<u8, Msb0>) -> [u8; 4] {
    let dir = direction as u32 & 1;
    let iv = [fresh ^ (dir << 15), count ^ (dir << 31), fresh, count];
    let mut snow = Snow3g::new(&key_words(key), &iv);
    let z: Vec<u32> = (0..5).map(|_| snow.next_word()).collect();
    let p = ((z[0] as u64) << 32) | z[1] as u64;
    let q = ((z[2] as u64) << 32) | z[3] as u64;

    // Bits beyond the message length are zero in the final block.
    let length = message.len() as u64;
    let mut padded = message.to_bitvec();
    padded.force_align();
    padded.resize(message.len().div_ceil(64).max(1) * 64, false);
    let octets = padded.into_vec();

    let mut eval = 0u64;
    for block in octets.chunks_exact(8) {
        let m = u64::from_be_bytes(block.try_into().unwrap_or_default());
        eval = mul64(eval ^ m, p, 0x1B);
    }
    eval ^= length;
    eval = mul64(eval, q, 0x1B);
    (((eval >> 32) as u32) ^ z[4]).to_be_bytes()
}
