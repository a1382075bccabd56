use chrono::{TimeZone, Utc};
use cmdb_core::model::{
    ExternalLink, FieldDescriptor, FieldKind, FieldSection, FieldValue, MdsEntry, MdsValue,
    MultiDataSection, Object, ReferenceSection, SectionDescriptor, Type, User,
};
use cmdb_core::MemoryStore;
use serde_json::{json, Value};

#[allow(dead_code)]
pub const SERVER_TYPE: i64 = 1;
#[allow(dead_code)]
pub const IP_TYPE: i64 = 2;
#[allow(dead_code)]
pub const RACK_TYPE: i64 = 4;
#[allow(dead_code)]
pub const ROOM_TYPE: i64 = 5;

#[allow(dead_code)]
pub const ADMIN: i64 = 1;

/// Server type: plain fields, an IP reference, a rack reference section,
/// an interface multi-data section and one external link
#[allow(dead_code)]
pub fn server_type() -> Type {
    Type::new(SERVER_TYPE, "server", "Server")
        .with_field(FieldDescriptor::new("hostname", FieldKind::Text, "Hostname"))
        .with_field(FieldDescriptor::new("installed", FieldKind::Date, "Installed"))
        .with_field(FieldDescriptor::reference("primary-ip", "Primary IP", vec![IP_TYPE]))
        .with_field(FieldDescriptor::new(
            "rack-field",
            FieldKind::RefSectionField,
            "Rack",
        ))
        .with_field(FieldDescriptor::reference("interface-ip", "Interface IP", vec![IP_TYPE]))
        .with_section(SectionDescriptor::Field(FieldSection {
            name: "general".to_string(),
            label: "General".to_string(),
            fields: vec![
                "hostname".to_string(),
                "installed".to_string(),
                "primary-ip".to_string(),
            ],
        }))
        .with_section(SectionDescriptor::Reference(ReferenceSection::new(
            "rack", "Rack", RACK_TYPE, "location",
        )))
        .with_section(SectionDescriptor::MultiData(MultiDataSection {
            name: "interfaces".to_string(),
            label: "Interfaces".to_string(),
            fields: vec!["interface-ip".to_string()],
        }))
        .with_external(ExternalLink {
            name: "monitoring".to_string(),
            label: "Monitoring".to_string(),
            href: "https://monitor.example/{}/info".to_string(),
            icon: None,
            fields: vec!["hostname".to_string()],
        })
        .with_summary_fields(vec!["hostname".to_string()])
}

#[allow(dead_code)]
pub fn ip_type() -> Type {
    Type::new(IP_TYPE, "ip", "IP Address")
        .with_field(FieldDescriptor::new("address", FieldKind::Text, "Address"))
        .with_summary_fields(vec!["address".to_string()])
}

/// Rack type whose `location` section nests the room the rack stands in
#[allow(dead_code)]
pub fn rack_type() -> Type {
    Type::new(RACK_TYPE, "rack", "Rack")
        .with_field(FieldDescriptor::new("row", FieldKind::Text, "Row"))
        .with_field(FieldDescriptor::new(
            "room-field",
            FieldKind::RefSectionField,
            "Room",
        ))
        .with_section(SectionDescriptor::Field(FieldSection {
            name: "location".to_string(),
            label: "Location".to_string(),
            fields: vec!["row".to_string(), "room-field".to_string()],
        }))
        .with_section(SectionDescriptor::Reference(ReferenceSection::new(
            "room", "Room", ROOM_TYPE, "site",
        )))
}

/// Room type that points back at a rack, allowing reference cycles
#[allow(dead_code)]
pub fn room_type() -> Type {
    Type::new(ROOM_TYPE, "room", "Room")
        .with_field(FieldDescriptor::new("building", FieldKind::Text, "Building"))
        .with_field(FieldDescriptor::new(
            "main-rack-field",
            FieldKind::RefSectionField,
            "Main rack",
        ))
        .with_section(SectionDescriptor::Field(FieldSection {
            name: "site".to_string(),
            label: "Site".to_string(),
            fields: vec!["building".to_string(), "main-rack-field".to_string()],
        }))
        .with_section(SectionDescriptor::Reference(ReferenceSection::new(
            "main-rack",
            "Main rack",
            RACK_TYPE,
            "location",
        )))
}

#[allow(dead_code)]
pub fn interfaces(ips: &[Value]) -> MdsEntry {
    MdsEntry {
        section_id: "interfaces".to_string(),
        values: ips
            .iter()
            .map(|ip| MdsValue {
                data: vec![FieldValue::new("interface-ip", ip.clone())],
            })
            .collect(),
    }
}

/// Store holding one server (100) in rack 40, room 50 whose main rack is
/// rack 40 again, and IP 20
#[allow(dead_code)]
pub fn populated_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert_type(server_type());
    store.insert_type(ip_type());
    store.insert_type(rack_type());
    store.insert_type(room_type());

    let mut admin = User::new(ADMIN, "admin", 1);
    admin.first_name = Some("Ada".to_string());
    admin.last_name = Some("Admin".to_string());
    store.insert_user(admin);

    store.insert_object(Object::new(20, IP_TYPE, ADMIN).with_field("address", json!("10.0.0.1")));
    store.insert_object(
        Object::new(40, RACK_TYPE, ADMIN)
            .with_field("row", json!("R3"))
            .with_field("room-field", json!(50)),
    );
    store.insert_object(
        Object::new(50, ROOM_TYPE, ADMIN)
            .with_field("building", json!("HQ"))
            .with_field("main-rack-field", json!(40)),
    );
    store.insert_object(server_object());
    store
}

/// Server 100 with a fixed creation time so separately built copies compare equal
#[allow(dead_code)]
pub fn server_object() -> Object {
    let mut object = Object::new(100, SERVER_TYPE, ADMIN)
        .with_field("hostname", json!("web-01"))
        .with_field("installed", json!("2024-03-01"))
        .with_field("primary-ip", json!(20))
        .with_field("rack-field", json!(40))
        .with_multi_data_section(interfaces(&[json!(20)]));
    object.creation_time = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    object
}
