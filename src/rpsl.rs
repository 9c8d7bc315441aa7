//! RPSL object primitives: case-insensitive strings, object and attribute
//! types, and a parser for the `attribute: value` text format.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

static ATTRIBUTE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9_-]*):[ \t]*(.*)$").expect("valid attribute regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RpslError {
    #[error("empty object")]
    Empty,
    #[error("line {0}: malformed attribute")]
    Malformed(usize),
    #[error("unknown object type: {0}")]
    UnknownType(String),
    #[error("{0} object has no primary key")]
    MissingKey(&'static str),
}

/// String that compares, hashes and orders without regard to letter case while
/// keeping the original spelling for display.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CIString {
    value: String,
    folded: String,
}

impl CIString {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let folded = value.to_lowercase();
        Self { value, folded }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Lower-cased form used for comparisons.
    pub fn folded(&self) -> &str {
        &self.folded
    }
}

impl PartialEq for CIString {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for CIString {}

impl Hash for CIString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl PartialOrd for CIString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CIString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.folded.cmp(&other.folded)
    }
}

impl From<String> for CIString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for CIString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<CIString> for String {
    fn from(value: CIString) -> Self {
        value.value
    }
}

impl fmt::Display for CIString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Debug for CIString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectType {
    AsBlock,
    AsSet,
    AutNum,
    Domain,
    FilterSet,
    Inet6num,
    Inetnum,
    InetRtr,
    Irt,
    KeyCert,
    Mntner,
    Organisation,
    PeeringSet,
    Person,
    Role,
    Route,
    Route6,
    RouteSet,
    RtrSet,
}

impl ObjectType {
    pub const ALL: [ObjectType; 19] = [
        ObjectType::AsBlock,
        ObjectType::AsSet,
        ObjectType::AutNum,
        ObjectType::Domain,
        ObjectType::FilterSet,
        ObjectType::Inet6num,
        ObjectType::Inetnum,
        ObjectType::InetRtr,
        ObjectType::Irt,
        ObjectType::KeyCert,
        ObjectType::Mntner,
        ObjectType::Organisation,
        ObjectType::PeeringSet,
        ObjectType::Person,
        ObjectType::Role,
        ObjectType::Route,
        ObjectType::Route6,
        ObjectType::RouteSet,
        ObjectType::RtrSet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::AsBlock => "as-block",
            ObjectType::AsSet => "as-set",
            ObjectType::AutNum => "aut-num",
            ObjectType::Domain => "domain",
            ObjectType::FilterSet => "filter-set",
            ObjectType::Inet6num => "inet6num",
            ObjectType::Inetnum => "inetnum",
            ObjectType::InetRtr => "inet-rtr",
            ObjectType::Irt => "irt",
            ObjectType::KeyCert => "key-cert",
            ObjectType::Mntner => "mntner",
            ObjectType::Organisation => "organisation",
            ObjectType::PeeringSet => "peering-set",
            ObjectType::Person => "person",
            ObjectType::Role => "role",
            ObjectType::Route => "route",
            ObjectType::Route6 => "route6",
            ObjectType::RouteSet => "route-set",
            ObjectType::RtrSet => "rtr-set",
        }
    }

    /// Attributes whose first values, concatenated, form the primary key.
    fn key_attributes(&self) -> &'static [&'static str] {
        match self {
            ObjectType::Person | ObjectType::Role => &["nic-hdl"],
            ObjectType::Route => &["route", "origin"],
            ObjectType::Route6 => &["route6", "origin"],
            ObjectType::AsBlock => &["as-block"],
            ObjectType::AsSet => &["as-set"],
            ObjectType::AutNum => &["aut-num"],
            ObjectType::Domain => &["domain"],
            ObjectType::FilterSet => &["filter-set"],
            ObjectType::Inet6num => &["inet6num"],
            ObjectType::Inetnum => &["inetnum"],
            ObjectType::InetRtr => &["inet-rtr"],
            ObjectType::Irt => &["irt"],
            ObjectType::KeyCert => &["key-cert"],
            ObjectType::Mntner => &["mntner"],
            ObjectType::Organisation => &["organisation"],
            ObjectType::PeeringSet => &["peering-set"],
            ObjectType::RouteSet => &["route-set"],
            ObjectType::RtrSet => &["rtr-set"],
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = RpslError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RpslError::UnknownType(s.trim().to_string()))
    }
}

/// Attributes the notifier reads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeType {
    Notify,
    MntBy,
    MntNfy,
    RefNfy,
    IrtNfy,
    UpdTo,
    Org,
    MntIrt,
    Source,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Notify => "notify",
            AttributeType::MntBy => "mnt-by",
            AttributeType::MntNfy => "mnt-nfy",
            AttributeType::RefNfy => "ref-nfy",
            AttributeType::IrtNfy => "irt-nfy",
            AttributeType::UpdTo => "upd-to",
            AttributeType::Org => "org",
            AttributeType::MntIrt => "mnt-irt",
            AttributeType::Source => "source",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpslAttribute {
    pub name: CIString,
    pub value: String,
}

impl RpslAttribute {
    /// Individual values: comments stripped, comma-separated lists split,
    /// blanks dropped.
    pub fn clean_values(&self) -> impl Iterator<Item = CIString> + '_ {
        let uncommented = match self.value.split_once('#') {
            Some((before, _)) => before,
            None => self.value.as_str(),
        };
        uncommented
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(CIString::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpslObject {
    object_type: ObjectType,
    key: CIString,
    attributes: Vec<RpslAttribute>,
}

impl RpslObject {
    pub fn new(attributes: Vec<RpslAttribute>) -> Result<Self, RpslError> {
        let first = attributes.first().ok_or(RpslError::Empty)?;
        let object_type: ObjectType = first.name.as_str().parse()?;

        let mut key = String::new();
        for name in object_type.key_attributes() {
            let value = attributes
                .iter()
                .find(|a| a.name.folded() == *name)
                .and_then(|a| a.clean_values().next())
                .ok_or(RpslError::MissingKey(object_type.as_str()))?;
            key.push_str(value.as_str());
        }

        Ok(Self {
            object_type,
            key: CIString::new(key),
            attributes,
        })
    }

    /// Parse a single object. Lines starting with whitespace or `+` continue
    /// the previous attribute; lines starting with `%` are ignored.
    pub fn parse(text: &str) -> Result<Self, RpslError> {
        let mut attributes: Vec<RpslAttribute> = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() || line.starts_with('%') {
                continue;
            }
            if line.starts_with([' ', '\t', '+']) {
                let last = attributes.last_mut().ok_or(RpslError::Malformed(idx + 1))?;
                let continued = line.trim_start_matches('+').trim();
                if !continued.is_empty() {
                    if !last.value.is_empty() {
                        last.value.push(' ');
                    }
                    last.value.push_str(continued);
                }
                continue;
            }
            let caps = ATTRIBUTE_LINE
                .captures(line)
                .ok_or(RpslError::Malformed(idx + 1))?;
            attributes.push(RpslAttribute {
                name: CIString::new(&caps[1]),
                value: caps[2].trim_end().to_string(),
            });
        }
        Self::new(attributes)
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn key(&self) -> &CIString {
        &self.key
    }

    pub fn attributes(&self) -> &[RpslAttribute] {
        &self.attributes
    }

    /// Every value of every attribute named `attribute_type`, in object order.
    pub fn get_values_for_attribute(&self, attribute_type: AttributeType) -> Vec<CIString> {
        self.attributes
            .iter()
            .filter(|a| a.name.folded() == attribute_type.as_str())
            .flat_map(RpslAttribute::clean_values)
            .collect()
    }
}

impl fmt::Display for RpslObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for attribute in &self.attributes {
            writeln!(f, "{}: {}", attribute.name, attribute.value)?;
        }
        Ok(())
    }
}

/// Parse a dump of objects separated by blank lines.
pub fn parse_objects(text: &str) -> Result<Vec<RpslObject>, RpslError> {
    let mut objects = Vec::new();
    let mut chunk = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !chunk.trim().is_empty() {
                objects.push(RpslObject::parse(&chunk)?);
            }
            chunk.clear();
        } else {
            chunk.push_str(line);
            chunk.push('\n');
        }
    }
    if !chunk.trim().is_empty() {
        objects.push(RpslObject::parse(&chunk)?);
    }
    Ok(objects)
}
