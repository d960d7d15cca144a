use saphyr_unity::{decodable, Catalogue, Error, ValueKind};

decodable! {
    pub struct Lamp as "Lamp" {
        pub intensity: f32 => "m_Intensity" | "intensity": Float32,
        pub name: String => "m_Name": Str,
    }
}

decodable! {
    pub struct Door as "Door" {
        pub open: bool => "m_Open": Bool,
    }
}

#[test]
fn register_and_resolve() {
    let mut catalogue = Catalogue::new();
    catalogue.register::<Lamp>("!lamp").unwrap();
    catalogue.register::<Door>("!door").unwrap();

    assert_eq!(catalogue.len(), 2);
    assert!(catalogue.contains("!lamp"));
    assert_eq!(catalogue.resolve("!door").map(|t| t.name()), Some("Door"));
    assert!(catalogue.resolve("!window").is_none());
    assert_eq!(catalogue.tags(), vec!["!door", "!lamp"]);
}

#[test]
fn registering_same_class_twice_is_a_no_op() {
    let mut catalogue = Catalogue::new();
    catalogue.register::<Lamp>("!lamp").unwrap();
    catalogue.register::<Lamp>("!lamp").unwrap();
    assert_eq!(catalogue.len(), 1);
}

#[test]
fn conflicting_registration_fails_and_keeps_first_binding() {
    let mut catalogue = Catalogue::new();
    catalogue.register::<Lamp>("!thing").unwrap();

    let err = catalogue.register::<Door>("!thing").unwrap_err();
    match err {
        Error::DuplicateTag {
            tag,
            existing,
            requested,
        } => {
            assert_eq!(tag, "!thing");
            assert_eq!(existing, "Lamp");
            assert_eq!(requested, "Door");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(catalogue.resolve("!thing").map(|t| t.name()), Some("Lamp"));
}

#[test]
fn same_class_under_several_tags() {
    let catalogue = Catalogue::new()
        .with::<Lamp>("!lamp")
        .and_then(|c| c.with::<Lamp>("!light"))
        .unwrap();
    assert_eq!(catalogue.len(), 2);
    assert_eq!(catalogue.resolve("!light").map(|t| t.name()), Some("Lamp"));
}

#[test]
fn property_lookup_follows_name_alias_then_case_rules() {
    let catalogue = Catalogue::new().with::<Lamp>("!lamp").unwrap();
    let lamp = catalogue.resolve("!lamp").unwrap();

    let by_name = catalogue.property_for(lamp, "m_Intensity", false).unwrap();
    assert_eq!(by_name.name, "m_Intensity");
    assert!(matches!(by_name.kind, ValueKind::Float32));

    let by_alias = catalogue.property_for(lamp, "intensity", false).unwrap();
    assert_eq!(by_alias.name, "m_Intensity");

    assert!(catalogue.property_for(lamp, "M_NAME", false).is_none());
    assert_eq!(
        catalogue.property_for(lamp, "M_NAME", true).map(|p| p.name),
        Some("m_Name")
    );
    assert_eq!(
        catalogue.property_for(lamp, "INTENSITY", true).map(|p| p.name),
        Some("m_Intensity")
    );
    assert!(catalogue.property_for(lamp, "m_Range", true).is_none());
}

#[test]
fn unity_catalogue_uses_class_id_tags() {
    let catalogue = Catalogue::unity();
    assert_eq!(
        catalogue
            .resolve(&saphyr_unity::unity_tag(1))
            .map(|t| t.name()),
        Some("GameObject")
    );
    assert_eq!(
        catalogue
            .resolve("tag:unity3d.com,2011:4")
            .map(|t| t.name()),
        Some("Transform")
    );
}
