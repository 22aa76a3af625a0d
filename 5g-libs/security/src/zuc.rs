//! zuc - the 128-EEA3 / 128-EIA3 algorithms over the ZUC-128 keystream generator

use bitvec::prelude::*;
use zuc::ZUC128;

fn keystream(key: &[u8; 16], iv: &[u8; 16], words: usize) -> Vec<u32> {
    let mut zuc = ZUC128::new(key, iv);
    (0..words).map(|_| zuc.generate()).collect()
}

// 32 keystream bits starting at bit offset i.
fn word_at(z: &[u32], i: usize) -> u32 {
    let (j, t) = (i / 32, i % 32);
    if t == 0 {
        z[j]
    } else {
        (z[j] << t) | (z[j + 1] >> (32 - t))
    }
}

/// 128-EIA3.  `message` may be any number of bits.
pub fn eia3(
    key: &[u8; 16],
    count: u32,
    bearer: u8,
    direction: u8,
    message: &BitSlice<u8, Msb0>,
) -> [u8; 4] {
    let [c0, c1, c2, c3] = count.to_be_bytes();
    let b = (bearer & 0x1F) << 3;
    let dir = (direction & 1) << 7;
    let iv = [
        c0, c1, c2, c3, b, 0, 0, 0, c0 ^ dir, c1, c2, c3, b, 0, dir, 0,
    ];

    let length = message.len();
    let words = length.div_ceil(32) + 2;
    let z = keystream(key, &iv, words);

    let mut t = 0u32;
    for i in message.iter_ones() {
        t ^= word_at(&z, i);
    }
    t ^= word_at(&z, length);
    (t ^ z[words - 1]).to_be_bytes()
}

/// 128-EEA3.  Ciphers `data` in place; encryption and decryption are the same operation.
pub fn eea3(key: &[u8; 16], count: u32, bearer: u8, direction: u8, data: &mut [u8]) {
    let mut iv = [0u8; 16];
    iv[0..4].copy_from_slice(&count.to_be_bytes());
    iv[4] = ((bearer & 0x1F) << 3) | ((direction & 1) << 2);
    iv.copy_within(0..8, 8);

    let mut zuc = ZUC128::new(key, &iv);
    for chunk in data.chunks_mut(4) {
        let ks = zuc.generate().to_be_bytes();
        for (d, k) in chunk.iter_mut().zip(ks) {
            *d ^= k;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_zuc_keystream_all_zero() {
        assert_eq!(keystream(&[0; 16], &[0; 16], 2), vec![0x27bede74, 0x018082da]);
    }

    #[test]
    fn test_zuc_keystream_all_ones() {
        assert_eq!(
            keystream(&[0xff; 16], &[0xff; 16], 2),
            vec![0x0657cfa0, 0x7096398b]
        );
    }

    #[test]
    fn test_eia3_test_set_1() {
        let message = hex!("00000000");
        let mac = eia3(&[0; 16], 0, 0, 0, &message.view_bits::<Msb0>()[..1]);
        assert_eq!(mac, hex!("c8a9595e"));
    }

    #[test]
    fn test_eia3_sensitive_to_message_and_count() {
        let key = hex!("47 05 41 25 56 1e b2 dd a9 40 59 da 05 09 78 50");
        let mut message = hex!("00 00 00 00 00 00 00 00 00 00 00 00");
        let mac = eia3(&key, 0x561eb2dd, 0x14, 0, message.view_bits());
        assert_eq!(mac, eia3(&key, 0x561eb2dd, 0x14, 0, message.view_bits()));
        assert_ne!(mac, eia3(&key, 0x561eb2de, 0x14, 0, message.view_bits()));
        message[5] ^= 0x08;
        assert_ne!(mac, eia3(&key, 0x561eb2dd, 0x14, 0, message.view_bits()));
    }

    #[test]
    fn test_eea3_test_set_1() {
        // The first 192 of the set's 193 bits.
        let key = hex!("17 3d 14 ba 50 03 73 1d 7a 60 04 94 70 f0 0a 29");
        let mut data = hex!(
            "6c f6 53 40 73 55 52 ab 0c 97 52 fa 6f 90 25 fe 0b d6 75 d9 00 58 75 b2"
        );
        eea3(&key, 0x66035492, 0x0f, 0, &mut data);
        assert_eq!(
            data,
            hex!("a6 c8 5f c6 6a fb 85 33 aa fc 25 18 df e7 84 94 0e e1 e4 b0 30 23 8c c8")
        );
    }

    #[test]
    fn test_eea3_is_an_involution() {
        let key = hex!("17 3d 14 ba 50 03 73 1d 7a 60 04 94 70 f0 0a 29");
        let plain = hex!("6c f6 53 40 73 55 52 ab 0c 97 52 fa 6f 90 25");
        let mut data = plain;
        eea3(&key, 0x66035492, 0x0f, 0, &mut data);
        assert_ne!(data, plain);
        eea3(&key, 0x66035492, 0x0f, 0, &mut data);
        assert_eq!(data, plain);
    }
}
