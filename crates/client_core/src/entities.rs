//! How each entity is stored, shown and edited by the views.

use chrono::{DateTime, Utc};
use shared::domain::{Entity, Room, RoomId, Talk, TalkId, Timeslot, TimeslotId};

use crate::{
    app::Conference,
    format::{default_local_input, format_date_time, timeslot_span, to_local_input},
    store::EntityStore,
    views::form::{FieldErrors, FieldReader, FormMode, FormValues, References},
};

pub trait ConferenceEntity: Entity {
    /// The form also needs the Room and Timeslot lists.
    const NEEDS_REFERENCES: bool = false;
    /// Listed as multi-line cards instead of table rows.
    const CARD_LAYOUT: bool = false;

    fn store(conference: &Conference) -> &EntityStore<Self>;
    fn store_mut(conference: &mut Conference) -> &mut EntityStore<Self>;

    fn list_headers() -> &'static [&'static str];
    fn list_cells(&self) -> Vec<String>;
    fn detail_fields(&self) -> Vec<(&'static str, String)>;

    fn form_fields() -> &'static [&'static str];
    fn form_defaults(entity: &Self, mode: FormMode, now: DateTime<Utc>) -> FormValues;
    /// Merges `values` over `base`, resolving relationship fields against `references`.
    fn from_form(
        base: &Self,
        mode: FormMode,
        values: &FormValues,
        references: &References<'_>,
    ) -> Result<Self, FieldErrors>;

    fn render_list_entry(&self) -> String {
        self.list_cells().join(" | ")
    }
}

fn put(values: &mut FormValues, name: &str, value: Option<impl ToString>) {
    if let Some(value) = value {
        values.insert(name.to_string(), value.to_string());
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn id_text(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

impl ConferenceEntity for Room {
    fn store(conference: &Conference) -> &EntityStore<Self> {
        &conference.rooms
    }

    fn store_mut(conference: &mut Conference) -> &mut EntityStore<Self> {
        &mut conference.rooms
    }

    fn list_headers() -> &'static [&'static str] {
        &["ID", "Name", "Capacity"]
    }

    fn list_cells(&self) -> Vec<String> {
        vec![
            id_text(self.id_value()),
            text(&self.name),
            self.capacity.map(|c| c.to_string()).unwrap_or_default(),
        ]
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        let cells = self.list_cells();
        Self::list_headers().iter().copied().zip(cells).collect()
    }

    fn form_fields() -> &'static [&'static str] {
        &["id", "name", "capacity"]
    }

    fn form_defaults(entity: &Self, mode: FormMode, _now: DateTime<Utc>) -> FormValues {
        let mut values = FormValues::new();
        if mode.is_new() {
            return values;
        }
        put(&mut values, "id", entity.id_value());
        put(&mut values, "name", entity.name.as_ref());
        put(&mut values, "capacity", entity.capacity);
        values
    }

    fn from_form(
        base: &Self,
        mode: FormMode,
        values: &FormValues,
        _references: &References<'_>,
    ) -> Result<Self, FieldErrors> {
        let mut reader = FieldReader::new(values);
        let mut room = base.clone();
        room.id = reader.id(mode).map(RoomId);
        if let Some(name) = reader.required_text("name") {
            room.name = Some(name);
        }
        if let Some(capacity) = reader.optional_number::<i32>("capacity") {
            room.capacity = capacity;
        }
        reader.finish(room)
    }
}

impl ConferenceEntity for Timeslot {
    fn store(conference: &Conference) -> &EntityStore<Self> {
        &conference.timeslots
    }

    fn store_mut(conference: &mut Conference) -> &mut EntityStore<Self> {
        &mut conference.timeslots
    }

    fn list_headers() -> &'static [&'static str] {
        &["ID", "Start", "End"]
    }

    fn list_cells(&self) -> Vec<String> {
        vec![
            id_text(self.id_value()),
            format_date_time(self.start),
            format_date_time(self.end),
        ]
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        let cells = self.list_cells();
        Self::list_headers().iter().copied().zip(cells).collect()
    }

    fn form_fields() -> &'static [&'static str] {
        &["id", "start", "end"]
    }

    fn form_defaults(entity: &Self, mode: FormMode, now: DateTime<Utc>) -> FormValues {
        let mut values = FormValues::new();
        if mode.is_new() {
            values.insert("start".into(), default_local_input(now));
            values.insert("end".into(), default_local_input(now));
            return values;
        }
        put(&mut values, "id", entity.id_value());
        values.insert("start".into(), to_local_input(entity.start));
        values.insert("end".into(), to_local_input(entity.end));
        values
    }

    fn from_form(
        base: &Self,
        mode: FormMode,
        values: &FormValues,
        _references: &References<'_>,
    ) -> Result<Self, FieldErrors> {
        let mut reader = FieldReader::new(values);
        let mut timeslot = base.clone();
        timeslot.id = reader.id(mode).map(TimeslotId);
        if let Some(start) = reader.required_datetime("start") {
            timeslot.start = Some(start);
        }
        if let Some(end) = reader.required_datetime("end") {
            timeslot.end = Some(end);
        }
        reader.finish(timeslot)
    }
}

impl ConferenceEntity for Talk {
    const NEEDS_REFERENCES: bool = true;
    const CARD_LAYOUT: bool = true;

    fn store(conference: &Conference) -> &EntityStore<Self> {
        &conference.talks
    }

    fn store_mut(conference: &mut Conference) -> &mut EntityStore<Self> {
        &mut conference.talks
    }

    fn list_headers() -> &'static [&'static str] {
        &["ID", "Title", "Speaker", "Room", "Time"]
    }

    fn list_cells(&self) -> Vec<String> {
        vec![
            id_text(self.id_value()),
            text(&self.title),
            text(&self.speaker),
            self.room
                .as_ref()
                .and_then(|room| room.name.clone())
                .unwrap_or_else(|| "Not assigned".into()),
            self.timeslot
                .as_ref()
                .and_then(timeslot_span)
                .unwrap_or_else(|| "Not scheduled".into()),
        ]
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", id_text(self.id_value())),
            ("Title", text(&self.title)),
            ("Speaker", text(&self.speaker)),
            ("Abstract Text", text(&self.abstract_text)),
            (
                "Room",
                self.room
                    .as_ref()
                    .and_then(|room| room.name.clone())
                    .unwrap_or_default(),
            ),
            (
                "Timeslot",
                id_text(self.timeslot.as_ref().and_then(Timeslot::id_value)),
            ),
        ]
    }

    fn form_fields() -> &'static [&'static str] {
        &["id", "title", "speaker", "abstractText", "room", "timeslot"]
    }

    fn form_defaults(entity: &Self, mode: FormMode, _now: DateTime<Utc>) -> FormValues {
        let mut values = FormValues::new();
        if mode.is_new() {
            return values;
        }
        put(&mut values, "id", entity.id_value());
        put(&mut values, "title", entity.title.as_ref());
        put(&mut values, "speaker", entity.speaker.as_ref());
        put(&mut values, "abstractText", entity.abstract_text.as_ref());
        put(
            &mut values,
            "room",
            entity.room.as_ref().and_then(Room::id_value),
        );
        put(
            &mut values,
            "timeslot",
            entity.timeslot.as_ref().and_then(Timeslot::id_value),
        );
        values
    }

    fn from_form(
        base: &Self,
        mode: FormMode,
        values: &FormValues,
        references: &References<'_>,
    ) -> Result<Self, FieldErrors> {
        let mut reader = FieldReader::new(values);
        let mut talk = base.clone();
        talk.id = reader.id(mode).map(TalkId);
        if let Some(title) = reader.required_text("title") {
            talk.title = Some(title);
        }
        if let Some(speaker) = reader.required_text("speaker") {
            talk.speaker = Some(speaker);
        }
        if let Some(abstract_text) = reader.required_text("abstractText") {
            talk.abstract_text = Some(abstract_text);
        }
        talk.room = reader.required_reference("room", references.rooms);
        talk.timeslot = reader.required_reference("timeslot", references.timeslots);
        reader.finish(talk)
    }

    fn render_list_entry(&self) -> String {
        let cells = self.list_cells();
        let mut card = format!("[{}] {}\n", cells[0], cells[1]);
        card.push_str(&format!("    Speaker: {}\n", cells[2]));
        if let Some(abstract_text) = self.abstract_text.as_deref().filter(|t| !t.is_empty()) {
            card.push_str(&format!("    {abstract_text}\n"));
        }
        card.push_str(&format!("    Room: {}\n", cells[3]));
        card.push_str(&format!("    Time: {}", cells[4]));
        card
    }
}
