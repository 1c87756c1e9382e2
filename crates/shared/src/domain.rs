use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(RoomId);
id_newtype!(TimeslotId);
id_newtype!(TalkId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Room,
    Timeslot,
    Talk,
}

impl EntityKind {
    /// Menu order.
    pub const ALL: [EntityKind; 3] = [EntityKind::Room, EntityKind::Timeslot, EntityKind::Talk];

    /// Path segment of the client routes (`/room`, `/talk/3/edit`).
    pub fn slug(self) -> &'static str {
        match self {
            EntityKind::Room => "room",
            EntityKind::Timeslot => "timeslot",
            EntityKind::Talk => "talk",
        }
    }

    /// Collection segment of the REST api (`/api/rooms`).
    pub fn resource(self) -> &'static str {
        match self {
            EntityKind::Room => "rooms",
            EntityKind::Timeslot => "timeslots",
            EntityKind::Talk => "talks",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Room => "Room",
            EntityKind::Timeslot => "Timeslot",
            EntityKind::Talk => "Talk",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity {0:?}")]
pub struct UnknownEntity(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownEntity(s.to_string()))
    }
}

/// A record managed by the backend under `/api/<resource>`.
///
/// `Default` is the empty record the client shows when nothing is focused.
pub trait Entity:
    fmt::Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    fn id_value(&self) -> Option<i64>;

    /// Body sent on writes. Relationship objects without an id are left out.
    fn cleaned(&self) -> Self {
        self.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RoomId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
}

impl Entity for Room {
    const KIND: EntityKind = EntityKind::Room;

    fn id_value(&self) -> Option<i64> {
        self.id.map(|id| id.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeslot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TimeslotId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl Entity for Timeslot {
    const KIND: EntityKind = EntityKind::Timeslot;

    fn id_value(&self) -> Option<i64> {
        self.id.map(|id| id.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Talk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TalkId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeslot: Option<Timeslot>,
}

impl Entity for Talk {
    const KIND: EntityKind = EntityKind::Talk;

    fn id_value(&self) -> Option<i64> {
        self.id.map(|id| id.0)
    }

    fn cleaned(&self) -> Self {
        let mut talk = self.clone();
        talk.room = talk.room.filter(|room| room.id.is_some());
        talk.timeslot = talk.timeslot.filter(|timeslot| timeslot.id.is_some());
        talk
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn talk_uses_camel_case_and_omits_missing_fields() {
        let talk = Talk {
            title: Some("blah".into()),
            abstract_text: Some("long text".into()),
            ..Talk::default()
        };

        let value = serde_json::to_value(&talk).expect("serialize");
        assert_eq!(value, json!({ "title": "blah", "abstractText": "long text" }));
    }

    #[test]
    fn decodes_nested_relationships_and_nulls() {
        let talk: Talk = serde_json::from_value(json!({
            "id": 7,
            "title": "Ownership",
            "speaker": null,
            "room": { "id": 2, "name": "Saal 1", "capacity": 120 },
            "timeslot": { "id": 3, "start": "2025-02-28T10:47:35.809Z", "end": "2025-02-28T21:13:51.598Z" }
        }))
        .expect("decode");

        assert_eq!(talk.id, Some(TalkId(7)));
        assert_eq!(talk.speaker, None);
        assert_eq!(talk.room.as_ref().and_then(|room| room.capacity), Some(120));
        assert_eq!(talk.timeslot.and_then(|slot| slot.id), Some(TimeslotId(3)));
    }

    #[test]
    fn cleaned_talk_drops_relationships_without_id() {
        let talk = Talk {
            room: Some(Room::default()),
            timeslot: Some(Timeslot {
                id: Some(TimeslotId(4)),
                ..Timeslot::default()
            }),
            ..Talk::default()
        };

        let cleaned = talk.cleaned();
        assert_eq!(cleaned.room, None);
        assert_eq!(cleaned.timeslot.and_then(|slot| slot.id), Some(TimeslotId(4)));
    }

    #[test]
    fn entity_kind_round_trips_through_slug() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.slug().parse::<EntityKind>(), Ok(kind));
        }
        assert!("speaker".parse::<EntityKind>().is_err());
    }
}
