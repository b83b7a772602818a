use std::{collections::HashSet, error::Error};

use crate::config::{
    mapping::{
        AxisName, KeyName, MappingConfig, StickDirection, StickSide, DEFAULT_MAPPING_ID,
    },
    LoadError,
};

#[tokio::test]
async fn test_builtin_mapping() -> Result<(), Box<dyn Error>> {
    let config = MappingConfig::builtin().expect("should parse built-in mapping table");
    assert_eq!(config.id, DEFAULT_MAPPING_ID);
    assert_eq!(config.version, 1);
    assert_eq!(config.mapping.len(), 19, "should map every gamepad input");

    // Every source event should only be mapped once
    let mut keys = HashSet::new();
    let mut axes = HashSet::new();
    for mapping in config.mapping.iter() {
        if let Some(key) = mapping.source_event.key {
            assert!(keys.insert(key), "{key:?} is mapped twice");
        }
        if let Some(axis) = mapping.source_event.axis.or(mapping.source_event.hat) {
            assert!(axes.insert(axis), "{axis:?} is mapped twice");
        }
    }

    let east = config
        .mapping
        .iter()
        .find(|m| m.source_event.key == Some(KeyName::BtnEast))
        .expect("should map east face button");
    assert_eq!(east.target_event.button.as_deref(), Some("a"));

    let left_y = config
        .mapping
        .iter()
        .find(|m| m.source_event.axis == Some(AxisName::AbsY))
        .expect("should map left stick y axis");
    let stick = left_y
        .target_event
        .stick
        .as_ref()
        .expect("should target a stick");
    assert_eq!(stick.side, StickSide::Left);
    assert_eq!(stick.axis, StickDirection::Vertical);
    assert_eq!(stick.inverted, Some(true));

    Ok(())
}

#[tokio::test]
async fn test_labels_mapping() -> Result<(), Box<dyn Error>> {
    let config =
        MappingConfig::from_yaml_file("./rootfs/usr/share/xbox-to-switch/mappings/xbox_one_labels.yaml")
            .expect("should parse label mapping table");
    assert_eq!(config.id, "xbox_one_labels");
    let south = config
        .mapping
        .iter()
        .find(|m| m.source_event.key == Some(KeyName::BtnSouth))
        .expect("should map south face button");
    assert_eq!(
        south.target_event.button.as_deref(),
        Some("a"),
        "labels table should map by printed label"
    );

    Ok(())
}

#[tokio::test]
async fn test_mapping_from_yaml() -> Result<(), Box<dyn Error>> {
    let yaml = r#"
version: 1
kind: MappingTable
name: Minimal
id: minimal
mapping:
  - name: Triggers
    source_event:
      axis: ABS_GAS
    target_event:
      trigger:
        button: zr
        shift: 8
  - name: Hat
    source_event:
      hat: ABS_HAT0Y
    target_event:
      dpad:
        negative: up
        positive: down
"#;
    let config = MappingConfig::from_yaml(yaml.to_string())?;
    assert_eq!(config.mapping.len(), 2);
    let trigger = config.mapping[0]
        .target_event
        .trigger
        .as_ref()
        .expect("should target a trigger");
    assert_eq!(trigger.button, "zr");
    assert_eq!(trigger.shift, Some(8));
    assert_eq!(config.mapping[1].source_event.hat, Some(AxisName::AbsHat0y));

    // Source codes use the kernel names
    let yaml = yaml.replace("ABS_GAS", "abs_gas");
    let result = MappingConfig::from_yaml(yaml);
    assert!(
        matches!(result, Err(LoadError::DeserializeError(_))),
        "lowercase code names should be rejected"
    );

    Ok(())
}

#[tokio::test]
async fn test_find_mapping() -> Result<(), Box<dyn Error>> {
    let config = MappingConfig::find(DEFAULT_MAPPING_ID).expect("should find built-in table");
    assert_eq!(config.id, DEFAULT_MAPPING_ID);

    let result = MappingConfig::find("does_not_exist");
    assert!(
        matches!(result, Err(LoadError::NotFound(ref id)) if id == "does_not_exist"),
        "unknown table should not be found"
    );

    Ok(())
}

#[tokio::test]
async fn test_packaged_schema_is_current() -> Result<(), Box<dyn Error>> {
    let packaged: serde_json::Value = serde_json::from_str(include_str!(
        "../../rootfs/usr/share/xbox-to-switch/schema/mapping_v1.json"
    ))?;
    let generated = serde_json::to_value(schemars::schema_for!(MappingConfig))?;

    assert_eq!(packaged["title"], generated["title"]);
    assert_eq!(packaged["required"], generated["required"]);
    assert_eq!(packaged["properties"], generated["properties"]);

    let definitions = |schema: &serde_json::Value| -> Vec<String> {
        let mut names: Vec<String> = schema["definitions"]
            .as_object()
            .map(|defs| defs.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    };
    assert_eq!(
        definitions(&packaged),
        definitions(&generated),
        "schema should be regenerated with the generate binary"
    );
    for name in ["KeyName", "AxisName"] {
        assert_eq!(
            packaged["definitions"][name]["enum"], generated["definitions"][name]["enum"],
            "{name} codes should match"
        );
    }

    Ok(())
}
