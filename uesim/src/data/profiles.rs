use anyhow::{Result, anyhow, bail, ensure};
use bits::Bit36;
use derive_deref::Deref;
use hex::FromHex;
use nas::ie::{NasKeySetIdentifier, Nssai, Plmn, SNssai, Suci};
use ngap::{NrCgi, RrcEstablishmentCause, Tai, UserLocationInformationNr};
use security::OperatorKey;
use serde::{Deserialize, Deserializer};
use slog::{Logger, error, info};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;

/// One simulated UE as provisioned in a profiles file.
#[derive(Deserialize, Debug, Clone)]
pub struct Profile {
    pub mcc: String,
    pub mnc: String,
    pub msin: String,
    #[serde(default = "default_routing_indicator")]
    pub routing_indicator: String,

    #[serde(with = "hex")]
    pub key: [u8; 16],
    #[serde(default, deserialize_with = "optional_hex")]
    pub op: Option<[u8; 16]>,
    #[serde(default, deserialize_with = "optional_hex")]
    pub opc: Option<[u8; 16]>,

    // Authentication management field the home network provisions for this subscriber.
    #[serde(default = "default_amf", with = "hex")]
    pub amf: [u8; 2],

    // Highest SQN the USIM has accepted.
    #[serde(default, with = "hex")]
    pub sqn: [u8; 6],

    pub imei: String,
    #[serde(default)]
    pub imeisv: Option<String>,

    #[serde(default)]
    pub requested_nssai: Vec<SliceConfig>,

    pub ran_ue_ngap_id: u32,
    #[serde(default = "default_nr_cell_identity")]
    pub nr_cell_identity: u64,
    #[serde(default = "default_tac")]
    pub tac: u32,

    // TS38.413 RRCEstablishmentCause enumeration index.  3 is mo-Signalling.
    #[serde(default = "default_rrc_establishment_cause")]
    pub rrc_establishment_cause: u8,

    // 7 means no key is available.
    #[serde(default = "default_ng_ksi")]
    pub ng_ksi: u8,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceConfig {
    pub sst: u8,
    #[serde(default, deserialize_with = "optional_hex")]
    pub sd: Option<[u8; 3]>,
}

fn default_routing_indicator() -> String {
    "0000".to_string()
}

fn default_amf() -> [u8; 2] {
    [0x80, 0x00]
}

fn default_nr_cell_identity() -> u64 {
    0x10
}

fn default_tac() -> u32 {
    1
}

fn default_rrc_establishment_cause() -> u8 {
    RrcEstablishmentCause::MoSignalling.into()
}

fn default_ng_ksi() -> u8 {
    NasKeySetIdentifier::NO_KEY_AVAILABLE
}

fn optional_hex<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromHex,
    <T as FromHex>::Error: Display,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| T::from_hex(s).map_err(serde::de::Error::custom))
        .transpose()
}

impl Profile {
    pub fn imsi(&self) -> String {
        format!("{}{}{}", self.mcc, self.mnc, self.msin)
    }
}

/// What a registration needs to know about its UE, checked and converted to protocol types.
#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub supi: String,
    pub plmn: Plmn,
    pub suci: Suci,
    pub key: [u8; 16],
    pub operator_key: OperatorKey,
    pub sqn: [u8; 6],
    pub imei: String,
    pub imeisv: Option<String>,
    pub requested_nssai: Nssai,
    pub ran_ue_ngap_id: u32,
    pub user_location: UserLocationInformationNr,
    pub rrc_establishment_cause: RrcEstablishmentCause,
    pub ngksi: NasKeySetIdentifier,
    pub serving_network_name: String,
}

fn digits(s: &str, count: usize) -> bool {
    s.len() == count && s.chars().all(|c| c.is_ascii_digit())
}

impl TryFrom<&Profile> for RegistrationInput {
    type Error = anyhow::Error;

    fn try_from(profile: &Profile) -> Result<Self> {
        let imsi = profile.imsi();
        let plmn = Plmn::new(&profile.mcc, &profile.mnc).map_err(|e| anyhow!("IMSI {imsi} - {e}"))?;
        let suci = Suci::null_scheme(plmn, &profile.routing_indicator, &profile.msin)
            .map_err(|e| anyhow!("IMSI {imsi} - bad SUCI input {e}"))?;

        let operator_key = match (profile.op, profile.opc) {
            (Some(op), None) => OperatorKey::Op(op),
            (None, Some(opc)) => OperatorKey::Opc(opc),
            _ => bail!("IMSI {imsi} - exactly one of op and opc must be provisioned"),
        };

        ensure!(
            digits(&profile.imei, 15),
            "IMSI {imsi} - IMEI {} is not 15 digits",
            profile.imei
        );
        if let Some(imeisv) = &profile.imeisv {
            ensure!(
                digits(imeisv, 16),
                "IMSI {imsi} - IMEISV {imeisv} is not 16 digits"
            );
        }

        ensure!(
            profile.tac <= 0xff_ffff,
            "IMSI {imsi} - TAC {:#x} is wider than 24 bits",
            profile.tac
        );
        let [_, tac @ ..] = profile.tac.to_be_bytes();
        let user_location = UserLocationInformationNr {
            nr_cgi: NrCgi {
                plmn: plmn.0,
                nr_cell_identity: Bit36::new(profile.nr_cell_identity)?,
            },
            tai: Tai { plmn: plmn.0, tac },
        };

        let Ok(rrc_establishment_cause) =
            RrcEstablishmentCause::try_from(profile.rrc_establishment_cause)
        else {
            bail!(
                "IMSI {imsi} - unknown RRC establishment cause {}",
                profile.rrc_establishment_cause
            )
        };
        ensure!(
            profile.ng_ksi <= NasKeySetIdentifier::NO_KEY_AVAILABLE,
            "IMSI {imsi} - ngKSI {} out of range",
            profile.ng_ksi
        );

        Ok(RegistrationInput {
            serving_network_name: plmn.serving_network_name(),
            supi: imsi,
            plmn,
            suci,
            key: profile.key,
            operator_key,
            sqn: profile.sqn,
            imei: profile.imei.clone(),
            imeisv: profile.imeisv.clone(),
            requested_nssai: Nssai(
                profile
                    .requested_nssai
                    .iter()
                    .map(|s| SNssai::new(s.sst, s.sd))
                    .collect(),
            ),
            ran_ue_ngap_id: profile.ran_ue_ngap_id,
            user_location,
            rrc_establishment_cause,
            ngksi: NasKeySetIdentifier::native(profile.ng_ksi),
        })
    }
}

#[derive(Deserialize)]
struct ProfilesFile {
    #[serde(default)]
    ue: BTreeMap<String, Profile>,
}

/// Profiles keyed by IMSI.
#[derive(Deref, Debug)]
pub struct ProfileTable(BTreeMap<String, Profile>);

/// Load the UE profiles from file into memory.
pub fn load_profiles_file(filename: &str, logger: &Logger) -> Result<&'static ProfileTable> {
    let path = std::env::current_dir()?;
    let contents = fs::read_to_string(filename).inspect_err(|e| {
        error!(
            logger,
            "Failed to load profiles file {filename} (current directory {}) with error code {e}",
            path.display()
        )
    })?;
    let table = parse_profiles(&contents, logger)?;
    info!(logger, "Loaded {} profiles from {filename}", table.len());
    let b = Box::new(table);
    Ok(Box::leak(b))
}

/// Parses `[ue.<imsi>]` tables, checking each profile.
pub fn parse_profiles(contents: &str, logger: &Logger) -> Result<ProfileTable> {
    let file: ProfilesFile = toml::from_str(contents)?;
    for (key, profile) in file.ue.iter() {
        if *key != profile.imsi() {
            bail!(
                "Profile ue.{key} has MCC, MNC and MSIN of IMSI {}",
                profile.imsi()
            )
        }
        RegistrationInput::try_from(profile)?;
        info!(logger, "Loaded profile for IMSI: {key}");
    }
    Ok(ProfileTable(file.ue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use slog::{Discard, o};

    const PROFILES: &str = r#"
[ue.001010000000001]
mcc = "001"
mnc = "01"
msin = "0000000001"
key = "465b5ce8b199b49faa5f0a2ee238a6bc"
opc = "cd63cb71954a9f4e48a5994e37a02baf"
sqn = "000000000020"
imei = "356938035643803"
imeisv = "3569380356438091"
requested_nssai = [{ sst = 1 }, { sst = 2, sd = "000001" }]
ran_ue_ngap_id = 1

[ue.001010000000002]
mcc = "001"
mnc = "01"
msin = "0000000002"
key = "465b5ce8b199b49faa5f0a2ee238a6bc"
op = "cdc202d5123e20f62b6d676ac72cb318"
imei = "356938035643811"
ran_ue_ngap_id = 2
tac = 0x000102
nr_cell_identity = 0x123456789
"#;

    fn logger() -> Logger {
        Logger::root(Discard, o!())
    }

    #[test]
    fn profiles_load_with_defaults() {
        let table = parse_profiles(PROFILES, &logger()).unwrap();
        assert_eq!(table.len(), 2);

        let p = &table["001010000000001"];
        assert_eq!(p.amf, [0x80, 0x00]);
        assert_eq!(p.sqn, hex!("000000000020"));
        assert_eq!(p.routing_indicator, "0000");
        assert_eq!(p.ng_ksi, 7);
        assert_eq!(
            p.requested_nssai,
            vec![
                SliceConfig { sst: 1, sd: None },
                SliceConfig {
                    sst: 2,
                    sd: Some(hex!("000001"))
                }
            ]
        );

        let p = &table["001010000000002"];
        assert_eq!(p.op, Some(hex!("cdc202d5123e20f62b6d676ac72cb318")));
        assert_eq!(p.opc, None);
        assert_eq!(p.sqn, [0; 6]);
    }

    #[test]
    fn registration_input_conversion() {
        let table = parse_profiles(PROFILES, &logger()).unwrap();
        let input = RegistrationInput::try_from(&table["001010000000002"]).unwrap();
        assert_eq!(input.supi, "001010000000002");
        assert_eq!(input.plmn.0, hex!("00f110"));
        assert_eq!(
            input.serving_network_name,
            "5G:mnc001.mcc001.3gppnetwork.org"
        );
        assert_eq!(input.suci.imsi().unwrap(), "001010000000002");
        assert_eq!(input.user_location.tai.tac, hex!("000102"));
        assert_eq!(
            input.user_location.nr_cgi.nr_cell_identity.value(),
            0x123456789
        );
        assert_eq!(
            input.rrc_establishment_cause,
            RrcEstablishmentCause::MoSignalling
        );
        assert_eq!(input.ngksi, NasKeySetIdentifier::no_key());
        assert!(matches!(input.operator_key, OperatorKey::Op(_)));
    }

    #[test]
    fn key_must_match_identity() {
        let contents = PROFILES.replace("[ue.001010000000002]", "[ue.001010000000009]");
        assert!(parse_profiles(&contents, &logger()).is_err());
    }

    #[test]
    fn exactly_one_operator_key() {
        let table = parse_profiles(PROFILES, &logger()).unwrap();
        let mut p = table["001010000000001"].clone();
        p.op = Some([0; 16]);
        assert!(RegistrationInput::try_from(&p).is_err());
        p.op = None;
        p.opc = None;
        assert!(RegistrationInput::try_from(&p).is_err());
    }

    #[test]
    fn bad_values_are_rejected() {
        let table = parse_profiles(PROFILES, &logger()).unwrap();
        let good = table["001010000000001"].clone();

        let mut p = good.clone();
        p.imei = "35693803564380".to_string();
        assert!(RegistrationInput::try_from(&p).is_err());

        let mut p = good.clone();
        p.tac = 0x100_0000;
        assert!(RegistrationInput::try_from(&p).is_err());

        let mut p = good.clone();
        p.nr_cell_identity = 1 << 36;
        assert!(RegistrationInput::try_from(&p).is_err());

        let mut p = good;
        p.rrc_establishment_cause = 10;
        assert!(RegistrationInput::try_from(&p).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_profiles_file("no-such-profiles.toml", &logger()).is_err());
    }
}
