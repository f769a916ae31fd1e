//! Account types and the polymorphic [`Assignee`].

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::response::truncate_body;
use crate::Error;

const UNSUPPORTED_TYPE: &str = "unsupported assignee type: ";
const MISSING_TYPE: &str = "<missing>";

/// Unique numeric identifier of a user, team or organization.
pub type AccountID = u64;

/// A GitHub user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: AccountID,
    /// Login handle (e.g. "octocat").
    pub login: String,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub site_admin: bool,
}

/// A team within an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: AccountID,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub privacy: Option<String>,
}

/// An organization account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: AccountID,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Something a seat, review request or similar can be assigned to.
///
/// On the wire this is a single object whose `type` key names the concrete
/// kind; the whole object is then decoded as that kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignee {
    User(User),
    Team(Team),
    Organization(Organization),
}

impl Assignee {
    const DISCRIMINATOR: &'static str = "type";

    /// Decodes an assignee from raw JSON by dispatching on its `type` key.
    pub fn from_value(value: Value) -> Result<Assignee, Error> {
        let kind = match value.get(Self::DISCRIMINATOR) {
            Some(Value::String(kind)) => kind.clone(),
            Some(other) => {
                return Err(Error::UnsupportedAssigneeType {
                    found: Some(other.to_string()),
                })
            }
            None => return Err(Error::UnsupportedAssigneeType { found: None }),
        };

        let decoded = match kind.as_str() {
            "User" => serde_json::from_value(value.clone()).map(Assignee::User),
            "Team" => serde_json::from_value(value.clone()).map(Assignee::Team),
            "Organization" => serde_json::from_value(value.clone()).map(Assignee::Organization),
            _ => return Err(Error::UnsupportedAssigneeType { found: Some(kind) }),
        };
        decoded.map_err(|source| Error::Decode {
            source,
            snippet: truncate_body(&value.to_string()),
        })
    }

    /// The discriminator value this assignee is written with.
    pub fn kind(&self) -> &'static str {
        match self {
            Assignee::User(_) => "User",
            Assignee::Team(_) => "Team",
            Assignee::Organization(_) => "Organization",
        }
    }

    pub fn id(&self) -> AccountID {
        match self {
            Assignee::User(u) => u.id,
            Assignee::Team(t) => t.id,
            Assignee::Organization(o) => o.id,
        }
    }
}

/// Recovers the discriminator of an assignee that failed inside a larger
/// body (e.g. a [`SeatsPage`](super::SeatsPage)), where serde only keeps the
/// error message.
pub(crate) fn unsupported_type(err: &serde_json::Error) -> Option<Option<String>> {
    if !err.is_data() {
        return None;
    }
    let rendered = err.to_string();
    let position = format!(" at line {} column {}", err.line(), err.column());
    let message = rendered.strip_suffix(position.as_str()).unwrap_or(&rendered);
    let found = message.strip_prefix(UNSUPPORTED_TYPE)?;
    Some((found != MISSING_TYPE).then(|| found.to_string()))
}

impl<'de> Deserialize<'de> for Assignee {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Assignee::from_value(value).map_err(D::Error::custom)
    }
}

impl Serialize for Assignee {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = match self {
            Assignee::User(u) => serde_json::to_value(u),
            Assignee::Team(t) => serde_json::to_value(t),
            Assignee::Organization(o) => serde_json::to_value(o),
        };
        let mut value = value.map_err(S::Error::custom)?;
        if let Value::Object(map) = &mut value {
            map.insert(
                Self::DISCRIMINATOR.to_string(),
                Value::String(self.kind().to_string()),
            );
        }
        value.serialize(serializer)
    }
}
