mod common;

use common::{
    EnumState, LargeRecord, StoredFile, SuperEmployee, large_record, purchase, stored_file,
    super_employee,
};
use tsqlgen::{JsonMergeSerializer, MemberId, MergeSerializer, XmlMergeSerializer};
use uuid::Uuid;

fn employees(id_a: Uuid, id_b: Uuid) -> [SuperEmployee; 2] {
    [
        SuperEmployee {
            employee_id: id_a,
            some_awesome_field_a: Some("Name A".to_string()),
            some_awesome_field_b: None,
        },
        SuperEmployee {
            employee_id: id_b,
            some_awesome_field_a: None,
            some_awesome_field_b: Some("Name B".to_string()),
        },
    ]
}

#[test]
fn test_json_merge_serialization_always_emits_null() {
    let id_a = Uuid::parse_str("7b8e1e9c-6f62-4b3e-9f58-1f2a8d6f0a01").unwrap();
    let id_b = Uuid::parse_str("f1f2e3d4-c5b6-4a79-8899-aabbccddeeff").unwrap();

    let serializer = JsonMergeSerializer::new(super_employee());
    let serialized = serializer.serialize_for_merge(&employees(id_a, id_b));

    assert_eq!(
        serialized,
        format!(
            "[{{\"_\":0,\"_0\":\"{id_a}\",\"_1\":\"Name A\",\"_2\":null}},{{\"_\":1,\"_0\":\"{id_b}\",\"_1\":null,\"_2\":\"Name B\"}}]"
        )
    );
}

#[test]
fn test_xml_merge_serialization_omits_null_attributes() {
    let id_a = Uuid::parse_str("7b8e1e9c-6f62-4b3e-9f58-1f2a8d6f0a01").unwrap();
    let id_b = Uuid::parse_str("f1f2e3d4-c5b6-4a79-8899-aabbccddeeff").unwrap();

    let serializer = XmlMergeSerializer::new(super_employee());
    let serialized = serializer.serialize_for_merge(&employees(id_a, id_b));

    assert_eq!(
        serialized,
        format!(
            "<_><_ _=\"0\" _0=\"{id_a}\" _1=\"Name A\" /><_ _=\"1\" _0=\"{id_b}\" _2=\"Name B\" /></_>"
        )
    );
}

#[test]
fn test_enum_serializes_as_underlying_integral_value() {
    let record = LargeRecord {
        id_a: Uuid::nil(),
        id_b: Uuid::nil(),
        state: EnumState::ValueB,
        properties: std::array::from_fn(|_| None),
    };

    let serializer = JsonMergeSerializer::new(large_record());
    let serialized = serializer.serialize_for_merge(&[record]);

    assert!(serialized.contains("\"_2\":2"));
    // Wide enough that the rolled-over aliases appear, null included.
    assert!(serialized.contains("\"_10\":null"));
    assert!(serialized.contains("\"_11\":null"));
}

#[test]
fn test_byte_arrays_travel_base64_encoded() {
    let record = StoredFile {
        id: Uuid::nil(),
        name: "report.bin".to_string(),
        file_bytes: Some(vec![1, 2, 3]),
    };

    let json = JsonMergeSerializer::new(stored_file()).serialize_for_merge(std::slice::from_ref(&record));
    assert!(json.contains("\"_2\":\"AQID\""));

    let xml = XmlMergeSerializer::new(stored_file()).serialize_for_merge(&[record]);
    assert!(xml.contains(" _2=\"AQID\""));
}

#[test]
fn test_xml_attribute_values_are_escaped() {
    let record = StoredFile {
        id: Uuid::nil(),
        name: "a&b<c>\"d\"".to_string(),
        file_bytes: None,
    };

    let xml = XmlMergeSerializer::new(stored_file()).serialize_for_merge(&[record]);
    assert!(xml.contains(" _1=\"a&amp;b&lt;c&gt;&quot;d&quot;\""));
}

#[test]
fn test_column_parser_uses_configured_length() {
    let descriptor = purchase();
    let serializer = JsonMergeSerializer::new(descriptor.clone());

    let name = descriptor.column(MemberId::new("Purchase", "Name")).unwrap();
    assert_eq!(
        serializer.build_column_parser(Some(name.as_ref())).unwrap(),
        "[Name] nvarchar(20) '$._0'"
    );
}

#[test]
fn test_column_parser_uses_configured_precision_and_scale() {
    let descriptor = purchase();
    let serializer = JsonMergeSerializer::new(descriptor.clone());

    let cost = descriptor.column(MemberId::new("Purchase", "Cost")).unwrap();
    assert_eq!(
        serializer.build_column_parser(Some(cost.as_ref())).unwrap(),
        "[Cost] decimal(10,2) '$._1'"
    );
}

#[test]
fn test_binary_column_parser_is_always_nvarchar_max() {
    let descriptor = stored_file();
    let serializer = JsonMergeSerializer::new(descriptor.clone());

    let file_bytes = descriptor
        .column(MemberId::new("StoredFile", "FileBytes"))
        .unwrap();
    assert_eq!(
        serializer.build_column_parser(Some(file_bytes.as_ref())).unwrap(),
        "[FileBytes] nvarchar(max) '$._2'"
    );
}

#[test]
fn test_correlation_index_parsers() {
    let json = JsonMergeSerializer::new(super_employee());
    assert_eq!(
        json.build_column_parser(None).unwrap(),
        "[<{CorrelationIndex}>] int '$._'"
    );

    let xml = XmlMergeSerializer::new(super_employee());
    assert_eq!(
        xml.build_column_parser(None).unwrap(),
        "[<{CorrelationIndex}>] int '@_'"
    );
}

#[test]
fn test_parser_aliases_match_serialized_aliases() {
    let descriptor = super_employee();
    let serializer = JsonMergeSerializer::new(descriptor.clone());

    let record = SuperEmployee {
        employee_id: Uuid::nil(),
        some_awesome_field_a: Some("x".to_string()),
        some_awesome_field_b: None,
    };
    let serialized = serializer.serialize_for_merge(&[record]);

    for column in descriptor.columns() {
        let alias = serializer.aliases().alias(column.member()).unwrap();
        let parser = serializer.build_column_parser(Some(column.as_ref())).unwrap();
        assert!(parser.ends_with(&format!("'$._{alias}'")));
        assert!(serialized.contains(&format!("\"_{alias}\":")));
    }
}
