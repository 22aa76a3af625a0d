use crate::bcd;
use std::fmt;

/// PLMN identity in its 3 octet encoded form (TS24.008, 10.5.1.3).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Plmn(pub [u8; 3]);

impl Plmn {
    pub fn new(mcc: &str, mnc: &str) -> Result<Self, String> {
        if mcc.len() != 3 || !(2..=3).contains(&mnc.len()) {
            return Err(format!("bad MCC / MNC {mcc}/{mnc}"));
        }
        let m: Vec<u8> = mcc.chars().map(bcd::digit).collect::<Result<_, _>>()?;
        let n: Vec<u8> = mnc.chars().map(bcd::digit).collect::<Result<_, _>>()?;
        let mnc3 = n.get(2).copied().unwrap_or(0xf);
        Ok(Plmn([m[1] << 4 | m[0], mnc3 << 4 | m[2], n[1] << 4 | n[0]]))
    }

    pub fn mcc(&self) -> String {
        let o = self.0;
        [o[0] & 0xf, o[0] >> 4, o[1] & 0xf]
            .iter()
            .map(|d| (b'0' + d) as char)
            .collect()
    }

    pub fn mnc(&self) -> String {
        let o = self.0;
        let mut digits = vec![o[2] & 0xf, o[2] >> 4];
        if o[1] >> 4 != 0xf {
            digits.push(o[1] >> 4);
        }
        digits.iter().map(|d| (b'0' + d) as char).collect()
    }

    /// e.g. "5G:mnc093.mcc208.3gppnetwork.org" (TS24.501, 9.12.1).
    pub fn serving_network_name(&self) -> String {
        format!(
            "5G:mnc{:0>3}.mcc{}.3gppnetwork.org",
            self.mnc(),
            self.mcc()
        )
    }
}

impl fmt::Debug for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plmn({}-{})", self.mcc(), self.mnc())
    }
}

impl fmt::Display for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mcc(), self.mnc())
    }
}
