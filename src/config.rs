use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::witness_gen::header::EmailFormat;
use crate::witness_gen::limbs::LimbParams;
use crate::witness_gen::signature::KEY_BITS;

/// Parameters of one generation run. Missing fields in a config file take
/// the values of `GenerationConfig::default()`, except the header capacity
/// which follows the email format unless set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerationConfig {
    pub survey_id: String,
    pub vote_choice: String,
    pub secret: String,
    pub email_format: EmailFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_header_bytes: Option<usize>,
    pub key_bits: usize,
    pub limbs: LimbParams,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            survey_id: "123456".to_string(),
            vote_choice: "1".to_string(),
            secret: "987654321".to_string(),
            email_format: EmailFormat::Hybrid,
            max_header_bytes: None,
            key_bits: KEY_BITS,
            limbs: LimbParams::default(),
        }
    }
}

impl GenerationConfig {
    pub fn for_format(email_format: EmailFormat) -> Self {
        Self {
            email_format,
            ..Self::default()
        }
    }

    /// Bytes of the padded header buffer: `max_header_bytes` if set, the
    /// format's default otherwise.
    pub fn header_capacity(&self) -> usize {
        self.max_header_bytes
            .unwrap_or_else(|| self.email_format.default_capacity())
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.header_capacity() == 0 {
            return Err(Error::Configuration(
                "maxHeaderBytes must be positive".to_string(),
            ));
        }
        if self.key_bits == 0 {
            return Err(Error::Configuration("keyBits must be positive".to_string()));
        }
        self.limbs.ensure_covers(self.key_bits)
    }
}

#[test]
fn test_format_defaults() {
    let config = GenerationConfig::default();
    assert_eq!(config.email_format, EmailFormat::Hybrid);
    assert_eq!(config.header_capacity(), 128);
    assert_eq!(config.limbs, LimbParams { count: 17, bits: 121 });
    config.validate().unwrap();

    assert_eq!(
        GenerationConfig::for_format(EmailFormat::FixedPosition).header_capacity(),
        256
    );
    assert_eq!(
        GenerationConfig::for_format(EmailFormat::FullRegex).header_capacity(),
        512
    );

    let config = GenerationConfig {
        max_header_bytes: Some(1024),
        ..GenerationConfig::for_format(EmailFormat::FullRegex)
    };
    assert_eq!(config.header_capacity(), 1024);
}

#[test]
fn test_capacity_follows_format_in_config_file() {
    let config: GenerationConfig =
        serde_json::from_str(r#"{ "emailFormat": "full-regex" }"#).unwrap();
    assert_eq!(config.max_header_bytes, None);
    assert_eq!(config.header_capacity(), 512);

    let config: GenerationConfig =
        serde_json::from_str(r#"{ "emailFormat": "fixed-position" }"#).unwrap();
    assert_eq!(config.header_capacity(), 256);

    let config: GenerationConfig =
        serde_json::from_str(r#"{ "emailFormat": "fixed-position", "maxHeaderBytes": 128 }"#)
            .unwrap();
    assert_eq!(config.header_capacity(), 128);

    let json = serde_json::to_string(&GenerationConfig::default()).unwrap();
    assert!(!json.contains("maxHeaderBytes"));
}

#[test]
fn test_partial_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "surveyId": "777", "emailFormat": "full-regex", "maxHeaderBytes": 512 }"#,
    )
    .unwrap();

    let config = GenerationConfig::from_json_file(&path).unwrap();
    assert_eq!(config.survey_id, "777");
    assert_eq!(config.email_format, EmailFormat::FullRegex);
    assert_eq!(config.header_capacity(), 512);
    assert_eq!(config.secret, "987654321");
    assert_eq!(config.key_bits, 2048);

    std::fs::write(&path, r#"{ "emailFormat": "nope" }"#).unwrap();
    assert!(matches!(
        GenerationConfig::from_json_file(&path),
        Err(Error::Serialization(_))
    ));
}

#[test]
fn test_validate() {
    let mut config = GenerationConfig::default();
    config.max_header_bytes = Some(0);
    assert!(matches!(config.validate(), Err(Error::Configuration(_))));

    let mut config = GenerationConfig::default();
    config.key_bits = 4096;
    assert!(matches!(config.validate(), Err(Error::Configuration(_))));

    config.limbs = LimbParams { count: 34, bits: 121 };
    config.validate().unwrap();

    let config: GenerationConfig = serde_json::from_str(
        r#"{ "limbs": { "count": 18446744073709551615, "bits": 2 } }"#,
    )
    .unwrap();
    assert!(matches!(config.validate(), Err(Error::Configuration(_))));
}
