use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

const FROM_LINE: &str = "From: voter@example.com\r\n";

/// Header layout the target circuit expects the survey id in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailFormat {
    /// No survey id in the subject, it is a private circuit input instead.
    #[default]
    Hybrid,
    /// `Survey #<id>` at a fixed offset of the subject line.
    FixedPosition,
    /// `#<id>` somewhere in free subject text, located by regex.
    FullRegex,
}

impl EmailFormat {
    pub const ALL: [EmailFormat; 3] = [
        EmailFormat::Hybrid,
        EmailFormat::FixedPosition,
        EmailFormat::FullRegex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmailFormat::Hybrid => "hybrid",
            EmailFormat::FixedPosition => "fixed-position",
            EmailFormat::FullRegex => "full-regex",
        }
    }

    /// Max header bytes of the circuit compiled for this format.
    pub fn default_capacity(&self) -> usize {
        match self {
            EmailFormat::Hybrid => 128,
            EmailFormat::FixedPosition => 256,
            EmailFormat::FullRegex => 512,
        }
    }
}

impl fmt::Display for EmailFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmailFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "unknown email format `{}`, expected one of hybrid, fixed-position, full-regex",
                    s
                ))
            })
    }
}

/// Renders the minimal `From`/`Subject` header signed for the vector.
/// The survey id is interpolated verbatim.
pub fn render_header(format: EmailFormat, survey_id: &str) -> String {
    match format {
        EmailFormat::FixedPosition => {
            format!("{}Subject: Survey #{}\r\n", FROM_LINE, survey_id)
        }
        EmailFormat::FullRegex => {
            format!("{}Subject: Vote on issue #{} please\r\n", FROM_LINE, survey_id)
        }
        EmailFormat::Hybrid => format!("{}Subject: My Vote\r\n", FROM_LINE),
    }
}

#[test]
fn test_fixed_position_header() {
    let header = render_header(EmailFormat::FixedPosition, "123456");
    assert_eq!(
        header,
        "From: voter@example.com\r\nSubject: Survey #123456\r\n"
    );
    // 25 bytes per line
    assert_eq!(header.len(), 50);
}

#[test]
fn test_survey_id_placement() {
    let id = "424242";
    assert!(render_header(EmailFormat::FixedPosition, id).contains(id));
    assert!(render_header(EmailFormat::FullRegex, id).contains(id));
    assert!(!render_header(EmailFormat::Hybrid, id).contains(id));

    let header = render_header(EmailFormat::FullRegex, id);
    assert!(header.ends_with("#424242 please\r\n"));
}

#[test]
fn test_format_names() {
    for format in EmailFormat::ALL {
        assert_eq!(format.as_str().parse::<EmailFormat>().unwrap(), format);
        assert_eq!(format.default_capacity() % 64, 0);
    }
    assert!(matches!(
        "regex".parse::<EmailFormat>(),
        Err(Error::Configuration(_))
    ));

    let json = serde_json::to_string(&EmailFormat::FixedPosition).unwrap();
    assert_eq!(json, "\"fixed-position\"");
}
