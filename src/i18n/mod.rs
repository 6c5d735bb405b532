//! Static message catalog for the supported response languages.
//!
//! Every user-facing string in an error envelope is produced here from a typed
//! [`Message`], so adding a locale means adding one match arm per message.

use serde::Serialize;

use crate::errors::FieldRule;

/// Languages the API can answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Id,
}

impl Locale {
    /// Parse a language tag such as `en`, `en-US` or `id_ID`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Self::En),
            "id" => Some(Self::Id),
            _ => None,
        }
    }

    /// Pick the first supported language from an `Accept-Language` header value.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|entry| entry.split(';').next())
            .find_map(Self::from_tag)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Id => "id",
        }
    }
}

/// A translatable message with its interpolation arguments.
#[derive(Debug, Clone, Copy)]
pub enum Message<'a> {
    JsonSyntax(&'a str),
    JsonType(&'a str),
    JsonUnreadable,
    Server,
    DataValidation,
    DataNotFound,
    EmailAlreadyExists(&'a str),
    MobilePhoneAlreadyExists(&'a str),
    InvalidUrlParam,
    UrlParamOutOfRange,
    InvalidQueryParam,
    QueryParamOutOfRange,
    FieldRule { field: &'a str, rule: &'a FieldRule },
}

impl Message<'_> {
    pub fn render(&self, locale: Locale) -> String {
        match locale {
            Locale::En => self.english(),
            Locale::Id => self.indonesian(),
        }
    }

    fn english(&self) -> String {
        match self {
            Self::JsonSyntax(detail) => format!("Request body contains badly-formed JSON ({detail})"),
            Self::JsonType(detail) => format!("Request body contains an invalid value ({detail})"),
            Self::JsonUnreadable => "Request body could not be read as JSON".to_string(),
            Self::Server => "An internal server error occurred".to_string(),
            Self::DataValidation => "The given data was invalid".to_string(),
            Self::DataNotFound => "Data not found".to_string(),
            Self::EmailAlreadyExists(email) => format!("Email {email} is already registered"),
            Self::MobilePhoneAlreadyExists(phone) => {
                format!("Mobile phone {phone} is already registered")
            }
            Self::InvalidUrlParam => "Invalid URL parameter".to_string(),
            Self::UrlParamOutOfRange => "URL parameter is out of range".to_string(),
            Self::InvalidQueryParam => "Invalid query parameter".to_string(),
            Self::QueryParamOutOfRange => "Query parameter is out of range".to_string(),
            Self::FieldRule { field, rule } => match rule {
                FieldRule::Required => format!("{field} is a required field"),
                FieldRule::Email => format!("{field} must be a valid email address"),
                FieldRule::Min(min) => {
                    format!("{field} must be at least {min} characters in length")
                }
                FieldRule::Max(max) => {
                    format!("{field} must be a maximum of {max} characters in length")
                }
                FieldRule::Other(code) => format!("{field} failed on the '{code}' rule"),
            },
        }
    }

    fn indonesian(&self) -> String {
        match self {
            Self::JsonSyntax(detail) => format!("Format JSON pada body request tidak valid ({detail})"),
            Self::JsonType(detail) => format!("Body request berisi nilai yang tidak valid ({detail})"),
            Self::JsonUnreadable => "Body request tidak dapat dibaca sebagai JSON".to_string(),
            Self::Server => "Terjadi kesalahan pada server".to_string(),
            Self::DataValidation => "Data yang diberikan tidak valid".to_string(),
            Self::DataNotFound => "Data tidak ditemukan".to_string(),
            Self::EmailAlreadyExists(email) => format!("Email {email} sudah terdaftar"),
            Self::MobilePhoneAlreadyExists(phone) => {
                format!("Nomor handphone {phone} sudah terdaftar")
            }
            Self::InvalidUrlParam => "Parameter URL tidak valid".to_string(),
            Self::UrlParamOutOfRange => "Parameter URL di luar jangkauan".to_string(),
            Self::InvalidQueryParam => "Parameter query tidak valid".to_string(),
            Self::QueryParamOutOfRange => "Parameter query di luar jangkauan".to_string(),
            Self::FieldRule { field, rule } => match rule {
                FieldRule::Required => format!("{field} wajib diisi"),
                FieldRule::Email => format!("{field} harus berupa alamat email yang valid"),
                FieldRule::Min(min) => format!("panjang minimal {field} adalah {min} karakter"),
                FieldRule::Max(max) => format!("panjang maksimal {field} adalah {max} karakter"),
                FieldRule::Other(code) => format!("{field} tidak memenuhi aturan '{code}'"),
            },
        }
    }
}
