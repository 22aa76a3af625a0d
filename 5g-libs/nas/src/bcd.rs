// Telephony BCD: two digits per octet, first digit in the low nibble, 0xF filler.

pub(crate) fn digit(c: char) -> Result<u8, String> {
    c.to_digit(10)
        .map(|d| d as u8)
        .ok_or_else(|| format!("non decimal digit {c:?}"))
}

pub(crate) fn encode(digits: &str) -> Result<Vec<u8>, String> {
    let nibbles = digits.chars().map(digit).collect::<Result<Vec<_>, _>>()?;
    Ok(nibbles
        .chunks(2)
        .map(|pair| pair[0] | (pair.get(1).copied().unwrap_or(0xf) << 4))
        .collect())
}

pub(crate) fn decode(octets: &[u8]) -> Result<String, String> {
    let mut digits = String::with_capacity(octets.len() * 2);
    for (i, octet) in octets.iter().enumerate() {
        for nibble in [octet & 0xf, octet >> 4] {
            match nibble {
                0..=9 => digits.push((b'0' + nibble) as char),
                0xf if i == octets.len() - 1 => (),
                _ => return Err(format!("invalid BCD octet {octet:#04x}")),
            }
        }
    }
    Ok(digits)
}
